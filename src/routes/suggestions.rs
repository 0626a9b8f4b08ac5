//! Outfit suggestion endpoints.
//!
//! - POST   /api/v1/suggestions/user/:user_id  — run the suggestion engine
//! - GET    /api/v1/suggestions/user/:user_id  — list a user's records
//! - DELETE /api/v1/suggestions/user/:user_id  — bulk delete
//! - GET    /api/v1/suggestions/:id
//! - DELETE /api/v1/suggestions/:id

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models;
use crate::db::queries;
use crate::errors::{AppError, ErrorResponse};
use crate::services::suggest;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionResponse {
    pub suggestion_id: Uuid,
    pub user_id: Uuid,
    /// Gender the components were filtered by (copied from the user profile)
    pub gender: Option<String>,
    /// When the suggestion was created (ISO 8601)
    pub date_suggested: String,
    /// Ordered component groups, one per clothing category
    #[schema(value_type = Object)]
    pub outfit_details: serde_json::Value,
    pub image_url: Option<String>,
}

impl From<models::SuggestionRecord> for SuggestionResponse {
    fn from(r: models::SuggestionRecord) -> Self {
        Self {
            suggestion_id: r.suggestion_id,
            user_id: r.user_id,
            gender: r.gender,
            date_suggested: r.date_suggested.to_rfc3339(),
            outfit_details: r.outfit_details,
            image_url: r.image_url,
        }
    }
}

/// Generate a new outfit suggestion for a user from current weather,
/// trending categories, and the product catalog.
#[utoipa::path(
    post,
    path = "/api/v1/suggestions/user/{user_id}",
    tag = "Suggestions",
    params(("user_id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 201, description = "Suggestion created", body = SuggestionResponse),
        (status = 400, description = "Unknown user or no location on profile", body = ErrorResponse),
        (status = 502, description = "Weather provider unavailable", body = ErrorResponse),
    )
)]
pub async fn create_suggestion(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SuggestionResponse>), AppError> {
    let record = suggest::suggest(&state, user_id).await?;
    Ok((StatusCode::CREATED, Json(SuggestionResponse::from(record))))
}

/// List a user's suggestion records, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/suggestions/user/{user_id}",
    tag = "Suggestions",
    params(("user_id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "The user's suggestions", body = Vec<SuggestionResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn list_suggestions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<SuggestionResponse>>, AppError> {
    queries::get_user(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    let records = queries::list_suggestions_for_user(&state.pool, user_id).await?;
    Ok(Json(
        records.into_iter().map(SuggestionResponse::from).collect(),
    ))
}

/// Delete all of a user's suggestion records.
#[utoipa::path(
    delete,
    path = "/api/v1/suggestions/user/{user_id}",
    tag = "Suggestions",
    params(("user_id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 204, description = "Suggestions deleted"),
    )
)]
pub async fn delete_suggestions_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = queries::delete_suggestions_for_user(&state.pool, user_id).await?;
    tracing::debug!(%user_id, deleted, "Bulk-deleted suggestions");
    Ok(StatusCode::NO_CONTENT)
}

/// Get a single suggestion record by id.
#[utoipa::path(
    get,
    path = "/api/v1/suggestions/{suggestion_id}",
    tag = "Suggestions",
    params(("suggestion_id" = Uuid, Path, description = "Suggestion UUID")),
    responses(
        (status = 200, description = "The suggestion", body = SuggestionResponse),
        (status = 404, description = "Suggestion not found", body = ErrorResponse),
    )
)]
pub async fn get_suggestion(
    State(state): State<AppState>,
    Path(suggestion_id): Path<Uuid>,
) -> Result<Json<SuggestionResponse>, AppError> {
    let record = queries::get_suggestion(&state.pool, suggestion_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Suggestion {} not found", suggestion_id)))?;
    Ok(Json(SuggestionResponse::from(record)))
}

/// Delete a suggestion record by id.
#[utoipa::path(
    delete,
    path = "/api/v1/suggestions/{suggestion_id}",
    tag = "Suggestions",
    params(("suggestion_id" = Uuid, Path, description = "Suggestion UUID")),
    responses(
        (status = 204, description = "Suggestion deleted"),
        (status = 404, description = "Suggestion not found", body = ErrorResponse),
    )
)]
pub async fn delete_suggestion(
    State(state): State<AppState>,
    Path(suggestion_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !queries::delete_suggestion(&state.pool, suggestion_id).await? {
        return Err(AppError::NotFound(format!(
            "Suggestion {} not found",
            suggestion_id
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
