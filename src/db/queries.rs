use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{
    CatalogProduct, ForecastDay, Outfit, SuggestionRecord, TrendLabel, User, WardrobeItem,
};

const USER_COLUMNS: &str =
    "user_id, username, email, password_hash, gender, location, preferences, date_joined";

const WARDROBE_COLUMNS: &str =
    "item_id, user_id, clothing_type, for_weather, color, size, tags, image_url, date_added";

const FORECAST_COLUMNS: &str = "weather_id, forecast_date, location, temp_max, temp_min, \
     feels_max, feels_min, wind_speed, humidity, precipitation, precipitation_probability, \
     special_condition, weather_icon, owner_user_id, fetched_at";

const SUGGESTION_COLUMNS: &str =
    "suggestion_id, user_id, gender, date_suggested, outfit_details, image_url";

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Parameters for inserting a new user.
pub struct InsertUserParams {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

/// Optional-field update for a user, applied via a field-by-field COALESCE
/// merge. Fields left as `None` keep their stored value.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

pub async fn insert_user(pool: &PgPool, params: InsertUserParams) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (user_id, username, email, password_hash, gender, location, preferences)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&params.username)
    .bind(&params.email)
    .bind(&params.password_hash)
    .bind(&params.gender)
    .bind(&params.location)
    .bind(&params.preferences)
    .fetch_one(pool)
    .await
}

pub async fn list_users(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY date_joined, user_id OFFSET $1 LIMIT $2"
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn get_user(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn update_user(
    pool: &PgPool,
    user_id: Uuid,
    update: UserUpdate,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET
            username = COALESCE($2, username),
            email = COALESCE($3, email),
            gender = COALESCE($4, gender),
            location = COALESCE($5, location),
            preferences = COALESCE($6, preferences)
         WHERE user_id = $1
         RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(&update.username)
    .bind(&update.email)
    .bind(&update.gender)
    .bind(&update.location)
    .bind(&update.preferences)
    .fetch_optional(pool)
    .await
}

pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Wardrobe items
// ---------------------------------------------------------------------------

pub struct InsertWardrobeItemParams {
    pub user_id: Uuid,
    pub clothing_type: String,
    pub for_weather: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub tags: Option<serde_json::Value>,
    pub image_url: Option<String>,
}

/// Optional-field update for a wardrobe item (COALESCE merge).
#[derive(Debug, Default)]
pub struct WardrobeItemUpdate {
    pub clothing_type: Option<String>,
    pub for_weather: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub tags: Option<serde_json::Value>,
    pub image_url: Option<String>,
}

pub async fn insert_wardrobe_item(
    pool: &PgPool,
    params: InsertWardrobeItemParams,
) -> Result<WardrobeItem, sqlx::Error> {
    sqlx::query_as::<_, WardrobeItem>(&format!(
        "INSERT INTO wardrobe_items
            (item_id, user_id, clothing_type, for_weather, color, size, tags, image_url)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {WARDROBE_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(params.user_id)
    .bind(&params.clothing_type)
    .bind(&params.for_weather)
    .bind(&params.color)
    .bind(&params.size)
    .bind(&params.tags)
    .bind(&params.image_url)
    .fetch_one(pool)
    .await
}

pub async fn get_wardrobe_item(
    pool: &PgPool,
    item_id: Uuid,
) -> Result<Option<WardrobeItem>, sqlx::Error> {
    sqlx::query_as::<_, WardrobeItem>(&format!(
        "SELECT {WARDROBE_COLUMNS} FROM wardrobe_items WHERE item_id = $1"
    ))
    .bind(item_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_wardrobe_items_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<WardrobeItem>, sqlx::Error> {
    sqlx::query_as::<_, WardrobeItem>(&format!(
        "SELECT {WARDROBE_COLUMNS} FROM wardrobe_items
         WHERE user_id = $1 ORDER BY date_added, item_id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn update_wardrobe_item(
    pool: &PgPool,
    item_id: Uuid,
    update: WardrobeItemUpdate,
) -> Result<Option<WardrobeItem>, sqlx::Error> {
    sqlx::query_as::<_, WardrobeItem>(&format!(
        "UPDATE wardrobe_items SET
            clothing_type = COALESCE($2, clothing_type),
            for_weather = COALESCE($3, for_weather),
            color = COALESCE($4, color),
            size = COALESCE($5, size),
            tags = COALESCE($6, tags),
            image_url = COALESCE($7, image_url)
         WHERE item_id = $1
         RETURNING {WARDROBE_COLUMNS}"
    ))
    .bind(item_id)
    .bind(&update.clothing_type)
    .bind(&update.for_weather)
    .bind(&update.color)
    .bind(&update.size)
    .bind(&update.tags)
    .bind(&update.image_url)
    .fetch_optional(pool)
    .await
}

pub async fn delete_wardrobe_item(pool: &PgPool, item_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM wardrobe_items WHERE item_id = $1")
        .bind(item_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Outfits
// ---------------------------------------------------------------------------

pub struct InsertOutfitParams {
    pub user_id: Uuid,
    pub occasion: Option<String>,
    pub for_weather: Option<String>,
}

/// Insert an outfit together with its clothing associations in one transaction.
pub async fn insert_outfit(
    pool: &PgPool,
    params: InsertOutfitParams,
    item_ids: &[Uuid],
) -> Result<Outfit, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let outfit = sqlx::query_as::<_, Outfit>(
        "INSERT INTO outfits (outfit_id, user_id, occasion, for_weather)
         VALUES ($1, $2, $3, $4)
         RETURNING outfit_id, user_id, occasion, for_weather, date_suggested",
    )
    .bind(Uuid::new_v4())
    .bind(params.user_id)
    .bind(&params.occasion)
    .bind(&params.for_weather)
    .fetch_one(&mut *tx)
    .await?;

    for item_id in item_ids {
        sqlx::query("INSERT INTO outfit_clothings (outfit_id, item_id) VALUES ($1, $2)")
            .bind(outfit.outfit_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(outfit)
}

pub async fn get_outfit(pool: &PgPool, outfit_id: Uuid) -> Result<Option<Outfit>, sqlx::Error> {
    sqlx::query_as::<_, Outfit>(
        "SELECT outfit_id, user_id, occasion, for_weather, date_suggested
         FROM outfits WHERE outfit_id = $1",
    )
    .bind(outfit_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_outfits_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Outfit>, sqlx::Error> {
    sqlx::query_as::<_, Outfit>(
        "SELECT outfit_id, user_id, occasion, for_weather, date_suggested
         FROM outfits WHERE user_id = $1 ORDER BY date_suggested, outfit_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_outfit_item_ids(pool: &PgPool, outfit_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT item_id FROM outfit_clothings WHERE outfit_id = $1 ORDER BY item_id",
    )
    .bind(outfit_id)
    .fetch_all(pool)
    .await
}

pub async fn delete_outfit(pool: &PgPool, outfit_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM outfits WHERE outfit_id = $1")
        .bind(outfit_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Weather store
// ---------------------------------------------------------------------------

/// Read the cached forward-looking forecast window for a location.
///
/// The owner filter is applied with IS NOT DISTINCT FROM so `None` matches
/// shared rows only — the same key used by the upsert path.
pub async fn cached_forecast_window(
    pool: &PgPool,
    location: &str,
    owner_user_id: Option<Uuid>,
    from_date: NaiveDate,
    window_size: i64,
) -> Result<Vec<ForecastDay>, sqlx::Error> {
    sqlx::query_as::<_, ForecastDay>(&format!(
        "SELECT {FORECAST_COLUMNS} FROM weather_data
         WHERE location = $1
           AND owner_user_id IS NOT DISTINCT FROM $2
           AND forecast_date >= $3
         ORDER BY forecast_date ASC
         LIMIT $4"
    ))
    .bind(location)
    .bind(owner_user_id)
    .bind(from_date)
    .bind(window_size)
    .fetch_all(pool)
    .await
}

/// Insert-or-update one forecast row, matching on (location, date, owner).
///
/// A single conditional statement, so concurrent write-backs for the same
/// window are idempotent: the last writer's field values win and the row
/// count never grows past one per key.
pub async fn upsert_forecast_day(pool: &PgPool, day: &ForecastDay) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO weather_data (
            weather_id, forecast_date, location, temp_max, temp_min,
            feels_max, feels_min, wind_speed, humidity, precipitation,
            precipitation_probability, special_condition, weather_icon,
            owner_user_id, fetched_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (location, forecast_date, owner_user_id)
        DO UPDATE SET
            temp_max = EXCLUDED.temp_max,
            temp_min = EXCLUDED.temp_min,
            feels_max = EXCLUDED.feels_max,
            feels_min = EXCLUDED.feels_min,
            wind_speed = EXCLUDED.wind_speed,
            humidity = EXCLUDED.humidity,
            precipitation = EXCLUDED.precipitation,
            precipitation_probability = EXCLUDED.precipitation_probability,
            special_condition = EXCLUDED.special_condition,
            weather_icon = EXCLUDED.weather_icon,
            fetched_at = EXCLUDED.fetched_at",
    )
    .bind(day.weather_id)
    .bind(day.forecast_date)
    .bind(&day.location)
    .bind(day.temp_max)
    .bind(day.temp_min)
    .bind(day.feels_max)
    .bind(day.feels_min)
    .bind(day.wind_speed)
    .bind(day.humidity)
    .bind(day.precipitation)
    .bind(day.precipitation_probability)
    .bind(&day.special_condition)
    .bind(&day.weather_icon)
    .bind(day.owner_user_id)
    .bind(day.fetched_at)
    .execute(pool)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Trend feed & catalog store (read-only)
// ---------------------------------------------------------------------------

/// Most recent trend labels, newest first.
pub async fn latest_trends(pool: &PgPool, limit: i64) -> Result<Vec<TrendLabel>, sqlx::Error> {
    sqlx::query_as::<_, TrendLabel>(
        "SELECT trend_id, trend_name, description, date_added
         FROM fashion_trends ORDER BY date_added DESC, trend_id LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Candidate catalog rows for one clothing category, filtered by gender
/// compatibility (exact match or "unisex"; no filter when gender is None).
/// Ordered by name then id so downstream ranking is deterministic.
pub async fn catalog_candidates(
    pool: &PgPool,
    category: &str,
    gender: Option<&str>,
) -> Result<Vec<CatalogProduct>, sqlx::Error> {
    sqlx::query_as::<_, CatalogProduct>(
        "SELECT product_id, product_name, suggested_item_type, gender, price,
                currency, product_url, image_url, date_suggested
         FROM ecommerce_products
         WHERE suggested_item_type = $1
           AND ($2::text IS NULL OR gender = $2 OR gender = 'unisex')
         ORDER BY product_name, product_id",
    )
    .bind(category)
    .bind(gender)
    .fetch_all(pool)
    .await
}

// ---------------------------------------------------------------------------
// Outfit suggestions
// ---------------------------------------------------------------------------

pub async fn insert_suggestion(
    pool: &PgPool,
    user_id: Uuid,
    gender: Option<&str>,
    outfit_details: &serde_json::Value,
    image_url: Option<&str>,
) -> Result<SuggestionRecord, sqlx::Error> {
    sqlx::query_as::<_, SuggestionRecord>(&format!(
        "INSERT INTO outfit_suggestions (suggestion_id, user_id, gender, outfit_details, image_url)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {SUGGESTION_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(gender)
    .bind(outfit_details)
    .bind(image_url)
    .fetch_one(pool)
    .await
}

pub async fn get_suggestion(
    pool: &PgPool,
    suggestion_id: Uuid,
) -> Result<Option<SuggestionRecord>, sqlx::Error> {
    sqlx::query_as::<_, SuggestionRecord>(&format!(
        "SELECT {SUGGESTION_COLUMNS} FROM outfit_suggestions WHERE suggestion_id = $1"
    ))
    .bind(suggestion_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_suggestions_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<SuggestionRecord>, sqlx::Error> {
    sqlx::query_as::<_, SuggestionRecord>(&format!(
        "SELECT {SUGGESTION_COLUMNS} FROM outfit_suggestions
         WHERE user_id = $1 ORDER BY date_suggested DESC, suggestion_id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn delete_suggestion(pool: &PgPool, suggestion_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM outfit_suggestions WHERE suggestion_id = $1")
        .bind(suggestion_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_suggestions_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM outfit_suggestions WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
