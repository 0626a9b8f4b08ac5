//! Fashion trend feed endpoint (read-only snapshot of the refreshed table).
//!
//! - GET /api/v1/trends?limit=N

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::db::models;
use crate::db::queries;
use crate::errors::AppError;
use crate::state::AppState;

const DEFAULT_TREND_LIMIT: i64 = 10;
const MAX_TREND_LIMIT: i64 = 50;

#[derive(Debug, Deserialize, IntoParams)]
pub struct TrendsQuery {
    /// Maximum number of trend labels to return (default 10, max 50)
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrendResponse {
    pub trend_id: Uuid,
    pub trend_name: String,
    pub description: Option<String>,
    /// When the trend was recorded (ISO 8601)
    pub date_added: String,
}

impl From<models::TrendLabel> for TrendResponse {
    fn from(t: models::TrendLabel) -> Self {
        Self {
            trend_id: t.trend_id,
            trend_name: t.trend_name,
            description: t.description,
            date_added: t.date_added.to_rfc3339(),
        }
    }
}

/// Get the most recent fashion trend labels, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/trends",
    tag = "Trends",
    params(TrendsQuery),
    responses(
        (status = 200, description = "Latest trend labels", body = Vec<TrendResponse>),
    )
)]
pub async fn list_trends(
    State(state): State<AppState>,
    Query(params): Query<TrendsQuery>,
) -> Result<Json<Vec<TrendResponse>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_TREND_LIMIT)
        .clamp(1, MAX_TREND_LIMIT);
    let trends = queries::latest_trends(&state.pool, limit).await?;
    Ok(Json(trends.into_iter().map(TrendResponse::from).collect()))
}
