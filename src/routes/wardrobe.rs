//! Wardrobe item CRUD endpoints.
//!
//! - POST   /api/v1/wardrobe
//! - GET    /api/v1/wardrobe/user/:user_id
//! - GET    /api/v1/wardrobe/:id
//! - PUT    /api/v1/wardrobe/:id
//! - DELETE /api/v1/wardrobe/:id

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models;
use crate::db::queries::{self, InsertWardrobeItemParams, WardrobeItemUpdate};
use crate::errors::{AppError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWardrobeItemRequest {
    pub user_id: Uuid,
    pub clothing_type: String,
    pub for_weather: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
}

/// All fields optional; omitted fields keep their stored value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateWardrobeItemRequest {
    pub clothing_type: Option<String>,
    pub for_weather: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WardrobeItemResponse {
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub clothing_type: String,
    pub for_weather: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    /// When the item was added (ISO 8601)
    pub date_added: String,
}

impl From<models::WardrobeItem> for WardrobeItemResponse {
    fn from(item: models::WardrobeItem) -> Self {
        let tags = item
            .tags
            .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok());
        Self {
            item_id: item.item_id,
            user_id: item.user_id,
            clothing_type: item.clothing_type,
            for_weather: item.for_weather,
            color: item.color,
            size: item.size,
            tags,
            image_url: item.image_url,
            date_added: item.date_added.to_rfc3339(),
        }
    }
}

fn tags_to_json(tags: Option<Vec<String>>) -> Option<serde_json::Value> {
    tags.map(serde_json::Value::from)
}

/// Add a clothing item to a user's wardrobe.
#[utoipa::path(
    post,
    path = "/api/v1/wardrobe",
    tag = "Wardrobe",
    request_body = CreateWardrobeItemRequest,
    responses(
        (status = 201, description = "Item created", body = WardrobeItemResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Owner not found", body = ErrorResponse),
    )
)]
pub async fn create_wardrobe_item(
    State(state): State<AppState>,
    Json(request): Json<CreateWardrobeItemRequest>,
) -> Result<(StatusCode, Json<WardrobeItemResponse>), AppError> {
    if request.clothing_type.trim().is_empty() {
        return Err(AppError::Validation(
            "clothing_type must not be empty".to_string(),
        ));
    }

    // Verify the owner up front for a clean 404 instead of an FK error.
    queries::get_user(&state.pool, request.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", request.user_id)))?;

    let item = queries::insert_wardrobe_item(
        &state.pool,
        InsertWardrobeItemParams {
            user_id: request.user_id,
            clothing_type: request.clothing_type,
            for_weather: request.for_weather,
            color: request.color,
            size: request.size,
            tags: tags_to_json(request.tags),
            image_url: request.image_url,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(WardrobeItemResponse::from(item))))
}

/// List all wardrobe items belonging to a user.
#[utoipa::path(
    get,
    path = "/api/v1/wardrobe/user/{user_id}",
    tag = "Wardrobe",
    params(("user_id" = Uuid, Path, description = "Owner UUID")),
    responses(
        (status = 200, description = "The user's wardrobe items", body = Vec<WardrobeItemResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn list_wardrobe_items(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<WardrobeItemResponse>>, AppError> {
    queries::get_user(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    let items = queries::list_wardrobe_items_for_user(&state.pool, user_id).await?;
    Ok(Json(
        items.into_iter().map(WardrobeItemResponse::from).collect(),
    ))
}

/// Get a single wardrobe item by id.
#[utoipa::path(
    get,
    path = "/api/v1/wardrobe/{item_id}",
    tag = "Wardrobe",
    params(("item_id" = Uuid, Path, description = "Item UUID")),
    responses(
        (status = 200, description = "The item", body = WardrobeItemResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
pub async fn get_wardrobe_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<WardrobeItemResponse>, AppError> {
    let item = queries::get_wardrobe_item(&state.pool, item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Wardrobe item {} not found", item_id)))?;
    Ok(Json(WardrobeItemResponse::from(item)))
}

/// Update a wardrobe item. Omitted fields are left unchanged.
#[utoipa::path(
    put,
    path = "/api/v1/wardrobe/{item_id}",
    tag = "Wardrobe",
    params(("item_id" = Uuid, Path, description = "Item UUID")),
    request_body = UpdateWardrobeItemRequest,
    responses(
        (status = 200, description = "Updated item", body = WardrobeItemResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
pub async fn update_wardrobe_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<UpdateWardrobeItemRequest>,
) -> Result<Json<WardrobeItemResponse>, AppError> {
    let update = WardrobeItemUpdate {
        clothing_type: request.clothing_type,
        for_weather: request.for_weather,
        color: request.color,
        size: request.size,
        tags: tags_to_json(request.tags),
        image_url: request.image_url,
    };

    let item = queries::update_wardrobe_item(&state.pool, item_id, update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Wardrobe item {} not found", item_id)))?;

    Ok(Json(WardrobeItemResponse::from(item)))
}

/// Delete a wardrobe item.
#[utoipa::path(
    delete,
    path = "/api/v1/wardrobe/{item_id}",
    tag = "Wardrobe",
    params(("item_id" = Uuid, Path, description = "Item UUID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
pub async fn delete_wardrobe_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !queries::delete_wardrobe_item(&state.pool, item_id).await? {
        return Err(AppError::NotFound(format!(
            "Wardrobe item {} not found",
            item_id
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
