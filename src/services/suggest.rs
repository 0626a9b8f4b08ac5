//! Outfit suggestion engine.
//!
//! Fuses the forecast window, the latest trend labels, and the product
//! catalog into gender-filtered component groups, then persists the result
//! as one suggestion record. The wardrobe is deliberately excluded: every
//! component references a catalog row, not a wardrobe item.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models::{CatalogProduct, ForecastDay, SuggestionRecord};
use crate::db::queries;
use crate::errors::AppError;
use crate::services::weather::{self, DEFAULT_WINDOW_DAYS};
use crate::state::AppState;

/// How many trend labels to consider when ranking candidates.
const TREND_LIMIT: i64 = 10;

/// Cap on components per clothing category in one suggestion.
const MAX_COMPONENTS_PER_CATEGORY: usize = 5;

/// Below this minimum temperature (°F) the outfit needs an outer layer.
pub const COLD_TEMP_THRESHOLD_F: f64 = 45.0;

/// At or above this precipitation probability (%) the outfit needs rainwear.
pub const RAIN_PROBABILITY_THRESHOLD_PCT: f64 = 50.0;

/// One outfit component: a catalog product slotted into a clothing category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OutfitComponent {
    pub clothing_type: String,
    /// Catalog pointer — never a wardrobe item id.
    pub item_id: Uuid,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_links: Option<Vec<String>>,
    pub gender: String,
}

/// One ordered list of candidates for a single clothing category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OutfitGroup {
    pub clothing_type: String,
    pub components: Vec<OutfitComponent>,
}

/// Aggregate signal derived from a forecast window.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub temp_min: f64,
    pub temp_max: f64,
    /// Most frequent condition label across the window (first seen wins ties).
    pub dominant_condition: String,
    pub max_precip_probability: f64,
}

/// Collapse a forecast window into its aggregate signal.
pub fn summarize_window(days: &[ForecastDay]) -> ForecastSummary {
    let temp_min = days.iter().map(|d| d.temp_min).fold(f64::INFINITY, f64::min);
    let temp_max = days
        .iter()
        .map(|d| d.temp_max)
        .fold(f64::NEG_INFINITY, f64::max);
    let max_precip_probability = days
        .iter()
        .map(|d| d.precipitation_probability)
        .fold(0.0, f64::max);

    // Most frequent condition; scan order breaks ties so the result is stable.
    let mut dominant_condition = String::new();
    let mut best_count = 0usize;
    for day in days {
        let count = days
            .iter()
            .filter(|d| d.special_condition == day.special_condition)
            .count();
        if count > best_count {
            best_count = count;
            dominant_condition = day.special_condition.clone();
        }
    }

    ForecastSummary {
        temp_min: if temp_min.is_finite() { temp_min } else { 0.0 },
        temp_max: if temp_max.is_finite() { temp_max } else { 0.0 },
        dominant_condition,
        max_precip_probability,
    }
}

/// Deterministic mapping from forecast summary to required clothing
/// categories, in fixed output order. Top, bottom, and footwear are always
/// required; an outer layer when it is cold or snowy; rainwear when rain is
/// likely.
pub fn required_categories(summary: &ForecastSummary) -> Vec<&'static str> {
    let mut categories = vec!["top", "bottom", "footwear"];
    let condition = summary.dominant_condition.to_lowercase();

    if summary.temp_min < COLD_TEMP_THRESHOLD_F || condition.contains("snow") {
        categories.push("outerwear");
    }
    if summary.max_precip_probability >= RAIN_PROBABILITY_THRESHOLD_PCT
        || condition.contains("rain")
    {
        categories.push("rainwear");
    }

    categories
}

fn matches_trend(product: &CatalogProduct, trends_lower: &[String]) -> bool {
    let name = product.product_name.to_lowercase();
    let category = product.suggested_item_type.to_lowercase();
    trends_lower
        .iter()
        .any(|t| name.contains(t.as_str()) || category == *t)
}

/// Order candidates: trend-matching rows first, then by name, then by id.
/// Fully deterministic for identical inputs.
pub fn rank_candidates(
    mut products: Vec<CatalogProduct>,
    trends: &[String],
) -> Vec<CatalogProduct> {
    let trends_lower: Vec<String> = trends.iter().map(|t| t.to_lowercase()).collect();
    products.sort_by(|a, b| {
        let a_trending = matches_trend(a, &trends_lower);
        let b_trending = matches_trend(b, &trends_lower);
        b_trending
            .cmp(&a_trending)
            .then_with(|| a.product_name.cmp(&b.product_name))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    products
}

fn component_from_product(category: &str, product: CatalogProduct) -> OutfitComponent {
    OutfitComponent {
        clothing_type: category.to_string(),
        item_id: product.product_id,
        product_name: product.product_name,
        image_url: product.image_url,
        purchase_links: if product.product_url.is_empty() {
            None
        } else {
            Some(vec![product.product_url])
        },
        gender: product.gender,
    }
}

/// Assemble the component groups from per-category candidate lists.
///
/// Categories with no candidates are omitted — a normal outcome, not an
/// error. Group order follows the input category order.
pub(crate) fn build_groups(
    per_category: Vec<(&str, Vec<CatalogProduct>)>,
    trends: &[String],
) -> Vec<OutfitGroup> {
    let mut groups = Vec::new();
    for (category, candidates) in per_category {
        if candidates.is_empty() {
            tracing::debug!(category, "No catalog candidates, omitting category");
            continue;
        }
        let components: Vec<OutfitComponent> = rank_candidates(candidates, trends)
            .into_iter()
            .take(MAX_COMPONENTS_PER_CATEGORY)
            .map(|p| component_from_product(category, p))
            .collect();
        groups.push(OutfitGroup {
            clothing_type: category.to_string(),
            components,
        });
    }
    groups
}

/// Produce and persist one outfit suggestion for a user.
///
/// The user must exist and have a location; weather comes through the cache
/// manager (shared per-location rows), trends and catalog rows are read-only
/// inputs. Exactly one suggestion record is written per successful call.
pub async fn suggest(state: &AppState, user_id: Uuid) -> Result<SuggestionRecord, AppError> {
    let user = queries::get_user(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::Validation(format!("User {} does not exist", user_id)))?;

    let location = user
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| {
            AppError::Validation("User has no location set; cannot suggest an outfit".to_string())
        })?;

    let window = weather::get_forecast(state, location, DEFAULT_WINDOW_DAYS, None).await?;
    let summary = summarize_window(&window);
    let categories = required_categories(&summary);

    let trends: Vec<String> = queries::latest_trends(&state.pool, TREND_LIMIT)
        .await?
        .into_iter()
        .map(|t| t.trend_name)
        .collect();

    let mut per_category = Vec::with_capacity(categories.len());
    for category in categories {
        let candidates =
            queries::catalog_candidates(&state.pool, category, user.gender.as_deref()).await?;
        per_category.push((category, candidates));
    }

    let groups = build_groups(per_category, &trends);
    let details = serde_json::to_value(&groups)
        .map_err(|e| AppError::Internal(format!("Failed to serialize outfit details: {}", e)))?;

    let record =
        queries::insert_suggestion(&state.pool, user.user_id, user.gender.as_deref(), &details, None)
            .await?;

    tracing::info!(
        user_id = %user.user_id,
        suggestion_id = %record.suggestion_id,
        groups = groups.len(),
        condition = %summary.dominant_condition,
        "Created outfit suggestion"
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn day(temp_min: f64, temp_max: f64, condition: &str, precip_prob: f64) -> ForecastDay {
        ForecastDay {
            weather_id: Uuid::new_v4(),
            forecast_date: "2026-08-24".parse().unwrap(),
            location: "Austin,US".to_string(),
            temp_max,
            temp_min,
            feels_max: temp_max,
            feels_min: temp_min,
            wind_speed: 5.0,
            humidity: 50.0,
            precipitation: 0.0,
            precipitation_probability: precip_prob,
            special_condition: condition.to_string(),
            weather_icon: String::new(),
            owner_user_id: None,
            fetched_at: Utc::now(),
        }
    }

    fn product(name: &str, category: &str, gender: &str) -> CatalogProduct {
        CatalogProduct {
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            suggested_item_type: category.to_string(),
            gender: gender.to_string(),
            price: Some(Decimal::new(2999, 2)),
            currency: "USD".to_string(),
            product_url: format!("https://shop.example/{}", name.replace(' ', "-")),
            image_url: None,
            date_suggested: Utc::now(),
        }
    }

    #[test]
    fn test_summarize_window_extremes() {
        let days = vec![
            day(50.0, 70.0, "Clear", 10.0),
            day(42.0, 65.0, "Clear", 30.0),
            day(55.0, 80.0, "Overcast", 5.0),
        ];
        let summary = summarize_window(&days);
        assert_eq!(summary.temp_min, 42.0);
        assert_eq!(summary.temp_max, 80.0);
        assert_eq!(summary.max_precip_probability, 30.0);
    }

    #[test]
    fn test_summarize_window_dominant_condition() {
        let days = vec![
            day(60.0, 75.0, "Rain", 80.0),
            day(60.0, 75.0, "Clear", 5.0),
            day(60.0, 75.0, "Rain", 70.0),
        ];
        assert_eq!(summarize_window(&days).dominant_condition, "Rain");
    }

    #[test]
    fn test_summarize_window_tie_takes_first_seen() {
        let days = vec![day(60.0, 75.0, "Clear", 0.0), day(60.0, 75.0, "Rain", 60.0)];
        assert_eq!(summarize_window(&days).dominant_condition, "Clear");
    }

    #[test]
    fn test_required_categories_mild_and_dry() {
        let summary = ForecastSummary {
            temp_min: 60.0,
            temp_max: 85.0,
            dominant_condition: "Clear".to_string(),
            max_precip_probability: 10.0,
        };
        assert_eq!(required_categories(&summary), vec!["top", "bottom", "footwear"]);
    }

    #[test]
    fn test_required_categories_cold_adds_outerwear() {
        let summary = ForecastSummary {
            temp_min: 30.0,
            temp_max: 50.0,
            dominant_condition: "Clear".to_string(),
            max_precip_probability: 0.0,
        };
        assert_eq!(
            required_categories(&summary),
            vec!["top", "bottom", "footwear", "outerwear"]
        );
    }

    #[test]
    fn test_required_categories_snow_adds_outerwear_even_when_mild() {
        let summary = ForecastSummary {
            temp_min: 50.0,
            temp_max: 60.0,
            dominant_condition: "Snow, Partially cloudy".to_string(),
            max_precip_probability: 40.0,
        };
        assert!(required_categories(&summary).contains(&"outerwear"));
    }

    #[test]
    fn test_required_categories_rain_adds_rainwear() {
        let summary = ForecastSummary {
            temp_min: 60.0,
            temp_max: 75.0,
            dominant_condition: "Rain".to_string(),
            max_precip_probability: 20.0,
        };
        assert!(required_categories(&summary).contains(&"rainwear"));
    }

    #[test]
    fn test_required_categories_high_precip_probability_adds_rainwear() {
        let summary = ForecastSummary {
            temp_min: 60.0,
            temp_max: 75.0,
            dominant_condition: "Overcast".to_string(),
            max_precip_probability: 65.0,
        };
        assert!(required_categories(&summary).contains(&"rainwear"));
    }

    #[test]
    fn test_required_categories_cold_and_wet() {
        let summary = ForecastSummary {
            temp_min: 28.0,
            temp_max: 40.0,
            dominant_condition: "Snow".to_string(),
            max_precip_probability: 90.0,
        };
        assert_eq!(
            required_categories(&summary),
            vec!["top", "bottom", "footwear", "outerwear", "rainwear"]
        );
    }

    #[test]
    fn test_rank_candidates_trending_first() {
        let plain = product("Basic Tee", "top", "unisex");
        let trending = product("Y2K Baby Tee", "top", "female");
        let ranked = rank_candidates(
            vec![plain.clone(), trending.clone()],
            &["y2k".to_string()],
        );
        assert_eq!(ranked[0].product_name, "Y2K Baby Tee");
        assert_eq!(ranked[1].product_name, "Basic Tee");
    }

    #[test]
    fn test_rank_candidates_name_breaks_non_trend_ties() {
        let b = product("Beta Jacket", "outerwear", "male");
        let a = product("Alpha Jacket", "outerwear", "male");
        let ranked = rank_candidates(vec![b, a], &[]);
        assert_eq!(ranked[0].product_name, "Alpha Jacket");
    }

    #[test]
    fn test_rank_candidates_deterministic() {
        let products = vec![
            product("Cargo Pants", "bottom", "unisex"),
            product("Denim Jeans", "bottom", "unisex"),
            product("Cargo Shorts", "bottom", "unisex"),
        ];
        let trends = vec!["cargo".to_string()];
        let once = rank_candidates(products.clone(), &trends);
        let twice = rank_candidates(products, &trends);
        let names: Vec<&str> = once.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, vec!["Cargo Pants", "Cargo Shorts", "Denim Jeans"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_build_groups_omits_empty_category() {
        let per_category = vec![
            ("top", vec![product("Basic Tee", "top", "unisex")]),
            ("bottom", Vec::new()),
            ("footwear", vec![product("Canvas Sneaker", "footwear", "unisex")]),
        ];
        let groups = build_groups(per_category, &[]);
        let kept: Vec<&str> = groups.iter().map(|g| g.clothing_type.as_str()).collect();
        assert_eq!(kept, vec!["top", "footwear"]);
    }

    #[test]
    fn test_build_groups_caps_components() {
        let candidates: Vec<CatalogProduct> = (0..8)
            .map(|i| product(&format!("Tee {}", i), "top", "unisex"))
            .collect();
        let groups = build_groups(vec![("top", candidates)], &[]);
        assert_eq!(groups[0].components.len(), MAX_COMPONENTS_PER_CATEGORY);
    }

    #[test]
    fn test_component_carries_catalog_reference_and_link() {
        let p = product("Rain Shell", "rainwear", "unisex");
        let id = p.product_id;
        let url = p.product_url.clone();
        let component = component_from_product("rainwear", p);
        assert_eq!(component.item_id, id);
        assert_eq!(component.clothing_type, "rainwear");
        assert_eq!(component.purchase_links, Some(vec![url]));
        assert_eq!(component.gender, "unisex");
    }
}
