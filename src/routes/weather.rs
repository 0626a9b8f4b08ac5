//! Weather endpoint: exposes the cache-or-fetch forecast window.
//!
//! - GET /api/v1/weather?location=Austin,US&days=5[&user_id=...]

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::db::models;
use crate::errors::{AppError, ErrorResponse};
use crate::services::weather::{self, DEFAULT_WINDOW_DAYS};
use crate::state::AppState;

/// Largest forecast window the provider serves in one call.
const MAX_WINDOW_DAYS: usize = 15;

#[derive(Debug, Deserialize, IntoParams)]
pub struct WeatherQuery {
    /// Free-text location key, e.g. "Austin,US"
    pub location: String,
    /// Window size in days (default 5, max 15)
    pub days: Option<usize>,
    /// Scope rows to this user instead of the shared per-location rows
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ForecastDayResponse {
    /// Calendar day of the forecast
    pub date: NaiveDate,
    pub location: String,
    /// Daily high in °F
    pub temp_max: f64,
    /// Daily low in °F
    pub temp_min: f64,
    pub feels_max: f64,
    pub feels_min: f64,
    /// Wind speed in mph
    pub wind_speed: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Precipitation in inches
    pub precipitation: f64,
    /// Probability of precipitation in %
    pub precipitation_probability: f64,
    pub special_condition: String,
    pub weather_icon: String,
}

impl From<models::ForecastDay> for ForecastDayResponse {
    fn from(d: models::ForecastDay) -> Self {
        Self {
            date: d.forecast_date,
            location: d.location,
            temp_max: d.temp_max,
            temp_min: d.temp_min,
            feels_max: d.feels_max,
            feels_min: d.feels_min,
            wind_speed: d.wind_speed,
            humidity: d.humidity,
            precipitation: d.precipitation,
            precipitation_probability: d.precipitation_probability,
            special_condition: d.special_condition,
            weather_icon: d.weather_icon,
        }
    }
}

/// Get the forward forecast window for a location.
///
/// Serves cached rows when a complete window is stored; otherwise fetches
/// from the provider and schedules a background write-back.
#[utoipa::path(
    get,
    path = "/api/v1/weather",
    tag = "Weather",
    params(WeatherQuery),
    responses(
        (status = 200, description = "Forecast window, ascending by date", body = Vec<ForecastDayResponse>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 502, description = "Weather provider unavailable", body = ErrorResponse),
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<Vec<ForecastDayResponse>>, AppError> {
    let location = params.location.trim();
    if location.is_empty() {
        return Err(AppError::Validation("location must not be empty".to_string()));
    }

    let window_size = params.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if window_size == 0 || window_size > MAX_WINDOW_DAYS {
        return Err(AppError::Validation(format!(
            "days must be between 1 and {}",
            MAX_WINDOW_DAYS
        )));
    }

    let window = weather::get_forecast(&state, location, window_size, params.user_id).await?;
    Ok(Json(
        window.into_iter().map(ForecastDayResponse::from).collect(),
    ))
}
