//! Outfit CRUD endpoints. An outfit groups wardrobe items via the
//! outfit_clothings association table.
//!
//! - POST   /api/v1/outfits
//! - GET    /api/v1/outfits/user/:user_id
//! - GET    /api/v1/outfits/:id
//! - DELETE /api/v1/outfits/:id

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models;
use crate::db::queries::{self, InsertOutfitParams};
use crate::errors::{AppError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOutfitRequest {
    pub user_id: Uuid,
    pub occasion: Option<String>,
    pub for_weather: Option<String>,
    /// Wardrobe item ids making up the outfit
    pub item_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OutfitResponse {
    pub outfit_id: Uuid,
    pub user_id: Uuid,
    pub occasion: Option<String>,
    pub for_weather: Option<String>,
    /// When the outfit was saved (ISO 8601)
    pub date_suggested: String,
    pub item_ids: Vec<Uuid>,
}

impl OutfitResponse {
    fn from_parts(outfit: models::Outfit, item_ids: Vec<Uuid>) -> Self {
        Self {
            outfit_id: outfit.outfit_id,
            user_id: outfit.user_id,
            occasion: outfit.occasion,
            for_weather: outfit.for_weather,
            date_suggested: outfit.date_suggested.to_rfc3339(),
            item_ids,
        }
    }
}

/// Save an outfit composed of existing wardrobe items.
#[utoipa::path(
    post,
    path = "/api/v1/outfits",
    tag = "Outfits",
    request_body = CreateOutfitRequest,
    responses(
        (status = 201, description = "Outfit created", body = OutfitResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "User or item not found", body = ErrorResponse),
    )
)]
pub async fn create_outfit(
    State(state): State<AppState>,
    Json(request): Json<CreateOutfitRequest>,
) -> Result<(StatusCode, Json<OutfitResponse>), AppError> {
    queries::get_user(&state.pool, request.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", request.user_id)))?;

    // Each member item must exist and belong to the outfit's owner.
    for item_id in &request.item_ids {
        let item = queries::get_wardrobe_item(&state.pool, *item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wardrobe item {} not found", item_id)))?;
        if item.user_id != request.user_id {
            return Err(AppError::Validation(format!(
                "Wardrobe item {} belongs to another user",
                item_id
            )));
        }
    }

    let outfit = queries::insert_outfit(
        &state.pool,
        InsertOutfitParams {
            user_id: request.user_id,
            occasion: request.occasion,
            for_weather: request.for_weather,
        },
        &request.item_ids,
    )
    .await?;

    let item_ids = queries::get_outfit_item_ids(&state.pool, outfit.outfit_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(OutfitResponse::from_parts(outfit, item_ids)),
    ))
}

/// List a user's saved outfits.
#[utoipa::path(
    get,
    path = "/api/v1/outfits/user/{user_id}",
    tag = "Outfits",
    params(("user_id" = Uuid, Path, description = "Owner UUID")),
    responses(
        (status = 200, description = "The user's outfits", body = Vec<OutfitResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn list_outfits(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<OutfitResponse>>, AppError> {
    queries::get_user(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    let outfits = queries::list_outfits_for_user(&state.pool, user_id).await?;
    let mut responses = Vec::with_capacity(outfits.len());
    for outfit in outfits {
        let item_ids = queries::get_outfit_item_ids(&state.pool, outfit.outfit_id).await?;
        responses.push(OutfitResponse::from_parts(outfit, item_ids));
    }
    Ok(Json(responses))
}

/// Get a single outfit with its member item ids.
#[utoipa::path(
    get,
    path = "/api/v1/outfits/{outfit_id}",
    tag = "Outfits",
    params(("outfit_id" = Uuid, Path, description = "Outfit UUID")),
    responses(
        (status = 200, description = "The outfit", body = OutfitResponse),
        (status = 404, description = "Outfit not found", body = ErrorResponse),
    )
)]
pub async fn get_outfit(
    State(state): State<AppState>,
    Path(outfit_id): Path<Uuid>,
) -> Result<Json<OutfitResponse>, AppError> {
    let outfit = queries::get_outfit(&state.pool, outfit_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Outfit {} not found", outfit_id)))?;
    let item_ids = queries::get_outfit_item_ids(&state.pool, outfit_id).await?;
    Ok(Json(OutfitResponse::from_parts(outfit, item_ids)))
}

/// Delete an outfit (association rows cascade).
#[utoipa::path(
    delete,
    path = "/api/v1/outfits/{outfit_id}",
    tag = "Outfits",
    params(("outfit_id" = Uuid, Path, description = "Outfit UUID")),
    responses(
        (status = 204, description = "Outfit deleted"),
        (status = 404, description = "Outfit not found", body = ErrorResponse),
    )
)]
pub async fn delete_outfit(
    State(state): State<AppState>,
    Path(outfit_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !queries::delete_outfit(&state.pool, outfit_id).await? {
        return Err(AppError::NotFound(format!("Outfit {} not found", outfit_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
