//! User CRUD endpoints.
//!
//! - POST   /api/v1/users
//! - GET    /api/v1/users?skip=N&limit=M
//! - GET    /api/v1/users/:id
//! - PUT    /api/v1/users/:id
//! - DELETE /api/v1/users/:id

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::db::queries::{self, InsertUserParams, UserUpdate};
use crate::db::models;
use crate::errors::{AppError, ErrorResponse};
use crate::state::AppState;

const DUPLICATE_EMAIL_MESSAGE: &str = "Email already registered";

/// Default page size for user listing.
const DEFAULT_PAGE_LIMIT: i64 = 10;
/// Maximum page size for user listing.
const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub preferences: Option<Vec<String>>,
}

/// All fields optional; omitted fields keep their stored value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub preferences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Number of users to skip (default 0)
    pub skip: Option<i64>,
    /// Maximum number of users to return (default 10, max 100)
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub preferences: Option<Vec<String>>,
    /// Account creation time (ISO 8601)
    pub date_joined: String,
}

impl From<models::User> for UserResponse {
    fn from(u: models::User) -> Self {
        let preferences = u
            .preferences
            .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok());
        Self {
            user_id: u.user_id,
            username: u.username,
            email: u.email,
            gender: u.gender,
            location: u.location,
            preferences,
            date_joined: u.date_joined.to_rfc3339(),
        }
    }
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.trim().len() < 3 {
        return Err(AppError::Validation(
            "Username must be at least 3 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if !email.contains('@') || email.trim().is_empty() {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn preferences_to_json(preferences: Option<Vec<String>>) -> Option<serde_json::Value> {
    preferences.map(|p| serde_json::Value::from(p))
}

/// Create a new user account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input or duplicate email", body = ErrorResponse),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    validate_username(&request.username)?;
    validate_email(&request.email)?;
    let password_hash = hash_password(&request.password)?;

    let user = queries::insert_user(
        &state.pool,
        InsertUserParams {
            username: request.username,
            email: request.email,
            password_hash,
            gender: request.gender,
            location: request.location,
            preferences: preferences_to_json(request.preferences),
        },
    )
    .await
    .map_err(|e| AppError::from_constraint(e, DUPLICATE_EMAIL_MESSAGE))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// List users, paginated.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);

    let users = queries::list_users(&state.pool, skip, limit).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get a single user by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "Users",
    params(("user_id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = queries::get_user(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
    Ok(Json(UserResponse::from(user)))
}

/// Update a user. Omitted fields are left unchanged (field-by-field merge).
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "Users",
    params(("user_id" = Uuid, Path, description = "User UUID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid input or duplicate email", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if let Some(ref username) = request.username {
        validate_username(username)?;
    }
    if let Some(ref email) = request.email {
        validate_email(email)?;
    }

    let update = UserUpdate {
        username: request.username,
        email: request.email,
        gender: request.gender,
        location: request.location,
        preferences: preferences_to_json(request.preferences),
    };

    let user = queries::update_user(&state.pool, user_id, update)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_EMAIL_MESSAGE))?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    Ok(Json(UserResponse::from(user)))
}

/// Delete a user and, via cascade, their wardrobe, outfits, and suggestions.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "Users",
    params(("user_id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !queries::delete_user(&state.pool, user_id).await? {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_too_short() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
    }

    #[test]
    fn test_validate_username_whitespace_not_counted() {
        assert!(validate_username("  a  ").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_hash_password_rejects_short() {
        assert!(hash_password("12345").is_err());
    }

    #[test]
    fn test_hash_password_produces_phc_string() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_preferences_round_trip() {
        let value = preferences_to_json(Some(vec!["casual".to_string(), "vintage".to_string()]));
        let back: Vec<String> = serde_json::from_value(value.unwrap()).unwrap();
        assert_eq!(back, vec!["casual", "vintage"]);
        assert_eq!(preferences_to_json(None), None);
    }
}
