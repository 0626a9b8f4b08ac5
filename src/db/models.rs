use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user account.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Profile gender used to filter catalog candidates ("male", "female",
    /// "unisex"). None means no filtering.
    pub gender: Option<String>,
    /// Free-text location key (e.g. "Austin,US"), not normalized.
    pub location: Option<String>,
    pub preferences: Option<serde_json::Value>,
    pub date_joined: DateTime<Utc>,
}

/// A clothing item owned by a user.
#[derive(Debug, Clone, FromRow)]
pub struct WardrobeItem {
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub clothing_type: String,
    pub for_weather: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub tags: Option<serde_json::Value>,
    pub image_url: Option<String>,
    pub date_added: DateTime<Utc>,
}

/// A saved outfit. Member items live in the outfit_clothings association table.
#[derive(Debug, Clone, FromRow)]
pub struct Outfit {
    pub outfit_id: Uuid,
    pub user_id: Uuid,
    pub occasion: Option<String>,
    pub for_weather: Option<String>,
    pub date_suggested: DateTime<Utc>,
}

/// One weather observation for one location/day.
///
/// Row identity is (location, forecast_date, owner_user_id); rows with a NULL
/// owner are shared across all users at the location. Written only via the
/// upsert path in `queries::upsert_forecast_day`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ForecastDay {
    pub weather_id: Uuid,
    pub forecast_date: NaiveDate,
    pub location: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub feels_max: f64,
    pub feels_min: f64,
    pub wind_speed: f64,
    pub humidity: f64,
    pub precipitation: f64,
    pub precipitation_probability: f64,
    pub special_condition: String,
    pub weather_icon: String,
    pub owner_user_id: Option<Uuid>,
    pub fetched_at: DateTime<Utc>,
}

/// A fashion-trend label from the periodically refreshed trend feed.
/// Read-only from this service's perspective.
#[derive(Debug, Clone, FromRow)]
pub struct TrendLabel {
    pub trend_id: Uuid,
    pub trend_name: String,
    pub description: Option<String>,
    pub date_added: DateTime<Utc>,
}

/// A product row from the e-commerce catalog, keyed by clothing category
/// (`suggested_item_type`) and gender. Read-only here; populated by the
/// ingestion job.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CatalogProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub suggested_item_type: String,
    pub gender: String,
    pub price: Option<Decimal>,
    pub currency: String,
    pub product_url: String,
    pub image_url: Option<String>,
    pub date_suggested: DateTime<Utc>,
}

/// One persisted outfit-suggestion result. `outfit_details` holds the ordered
/// component groups as JSON; components reference catalog rows by id without
/// a foreign key. Never mutated after creation.
#[derive(Debug, Clone, FromRow)]
pub struct SuggestionRecord {
    pub suggestion_id: Uuid,
    pub user_id: Uuid,
    pub gender: Option<String>,
    pub date_suggested: DateTime<Utc>,
    pub outfit_details: serde_json::Value,
    pub image_url: Option<String>,
}
