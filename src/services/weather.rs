//! Weather cache manager: read-through caching of daily forecasts.
//!
//! Read path: the weather_data table is checked for a complete forward-looking
//! window (exactly `window_size` rows dated today or later). Anything less is
//! a miss and the whole window is refetched from the provider — no top-up of
//! partial windows. Freshly fetched rows are returned to the caller
//! immediately; persistence runs as a detached write-back task.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::ForecastDay;
use crate::db::queries;
use crate::errors::AppError;
use crate::services::provider::ProviderDay;
use crate::state::AppState;

/// Forward-looking window size used when the caller does not specify one.
pub const DEFAULT_WINDOW_DAYS: usize = 5;

/// Sentinel condition label when the provider omits `conditions`.
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// Outcome of the cache read, decided before any provider traffic.
#[derive(Debug)]
pub(crate) enum CachePlan {
    /// The stored window is complete; serve it as-is.
    Hit(Vec<ForecastDay>),
    /// Incomplete window (including empty); refetch the whole window.
    Refetch,
}

/// A cached window counts as a hit only when it is complete. A partial window
/// is discarded wholesale rather than topped up.
pub(crate) fn plan_window(rows: Vec<ForecastDay>, window_size: usize) -> CachePlan {
    if rows.len() == window_size {
        CachePlan::Hit(rows)
    } else {
        CachePlan::Refetch
    }
}

/// Map the provider's daily records into exactly `window_size` forecast rows.
///
/// Missing numeric fields default to 0.0, a missing condition label to
/// "Unknown", a missing icon to the empty string — sparse upstream days never
/// fail the fetch. An unparsable date falls back to its position in the window.
pub(crate) fn derive_window(
    days: &[ProviderDay],
    location: &str,
    owner_user_id: Option<Uuid>,
    window_size: usize,
    from_date: NaiveDate,
    fetched_at: DateTime<Utc>,
) -> Vec<ForecastDay> {
    days.iter()
        .take(window_size)
        .enumerate()
        .map(|(i, day)| ForecastDay {
            weather_id: Uuid::new_v4(),
            forecast_date: day
                .datetime
                .parse()
                .unwrap_or(from_date + Duration::days(i as i64)),
            location: location.to_string(),
            temp_max: day.tempmax.unwrap_or(0.0),
            temp_min: day.tempmin.unwrap_or(0.0),
            feels_max: day.feelslikemax.unwrap_or(0.0),
            feels_min: day.feelslikemin.unwrap_or(0.0),
            wind_speed: day.windspeed.unwrap_or(0.0),
            humidity: day.humidity.unwrap_or(0.0),
            precipitation: day.precip.unwrap_or(0.0),
            precipitation_probability: day.precipprob.unwrap_or(0.0),
            special_condition: day
                .conditions
                .clone()
                .unwrap_or_else(|| UNKNOWN_CONDITION.to_string()),
            weather_icon: day.icon.clone().unwrap_or_default(),
            owner_user_id,
            fetched_at,
        })
        .collect()
}

/// Get the forward forecast window for a location: cached rows when the
/// window is complete, otherwise one provider fetch plus a detached
/// write-back. Rows come back in ascending date order either way.
///
/// `owner_user_id = None` reads and writes the shared per-location rows;
/// passing an owner scopes the same code path to that user.
pub async fn get_forecast(
    state: &AppState,
    location: &str,
    window_size: usize,
    owner_user_id: Option<Uuid>,
) -> Result<Vec<ForecastDay>, AppError> {
    let today = Utc::now().date_naive();

    // A failed cache read downgrades to a miss; the fetch path still works.
    let cached = match queries::cached_forecast_window(
        &state.pool,
        location,
        owner_user_id,
        today,
        window_size as i64,
    )
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(location, "Weather cache read failed, refetching: {}", e);
            Vec::new()
        }
    };

    match plan_window(cached, window_size) {
        CachePlan::Hit(rows) => {
            tracing::debug!(location, window_size, "Forecast window served from cache");
            return Ok(rows);
        }
        CachePlan::Refetch => {}
    }

    let end = today + Duration::days(window_size.saturating_sub(1) as i64);
    let days = state.weather_client.fetch_daily(location, today, end).await?;
    let fresh = derive_window(&days, location, owner_user_id, window_size, today, Utc::now());

    tracing::info!(
        location,
        rows = fresh.len(),
        "Fetched fresh forecast window from provider"
    );

    // The caller gets the fresh data now; persistence is off the critical
    // path and survives request cancellation.
    spawn_write_back(state.pool.clone(), fresh.clone());

    Ok(fresh)
}

/// Detached write-back of freshly fetched rows. Failures are logged and never
/// reach the request that triggered the fetch; a repeated attempt is harmless
/// because the upsert matches on (location, date, owner).
fn spawn_write_back(pool: PgPool, rows: Vec<ForecastDay>) {
    tokio::spawn(async move {
        for row in &rows {
            if let Err(e) = queries::upsert_forecast_day(&pool, row).await {
                tracing::warn!(
                    location = %row.location,
                    date = %row.forecast_date,
                    "Weather write-back failed: {}",
                    e
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_day(datetime: &str) -> ProviderDay {
        ProviderDay {
            datetime: datetime.to_string(),
            tempmax: Some(70.0),
            tempmin: Some(50.0),
            feelslikemax: Some(68.0),
            feelslikemin: Some(48.0),
            windspeed: Some(8.0),
            humidity: Some(60.0),
            precip: Some(0.1),
            precipprob: Some(20.0),
            conditions: Some("Partially cloudy".to_string()),
            icon: Some("partly-cloudy-day".to_string()),
        }
    }

    fn sparse_day(datetime: &str) -> ProviderDay {
        ProviderDay {
            datetime: datetime.to_string(),
            tempmax: None,
            tempmin: None,
            feelslikemax: None,
            feelslikemin: None,
            windspeed: None,
            humidity: None,
            precip: None,
            precipprob: None,
            conditions: None,
            icon: None,
        }
    }

    fn cached_row(date: &str) -> ForecastDay {
        ForecastDay {
            weather_id: Uuid::new_v4(),
            forecast_date: date.parse().unwrap(),
            location: "Austin,US".to_string(),
            temp_max: 90.0,
            temp_min: 70.0,
            feels_max: 95.0,
            feels_min: 70.0,
            wind_speed: 5.0,
            humidity: 40.0,
            precipitation: 0.0,
            precipitation_probability: 5.0,
            special_condition: "Clear".to_string(),
            weather_icon: "clear-day".to_string(),
            owner_user_id: None,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_plan_window_exact_count_is_hit() {
        let rows = vec![
            cached_row("2026-08-24"),
            cached_row("2026-08-25"),
            cached_row("2026-08-26"),
            cached_row("2026-08-27"),
            cached_row("2026-08-28"),
        ];
        match plan_window(rows, 5) {
            CachePlan::Hit(got) => assert_eq!(got.len(), 5),
            CachePlan::Refetch => panic!("complete window should be a hit"),
        }
    }

    #[test]
    fn test_plan_window_partial_is_refetch() {
        // 4 of 5 days present — discarded wholesale, not topped up.
        let rows = vec![
            cached_row("2026-08-24"),
            cached_row("2026-08-25"),
            cached_row("2026-08-26"),
            cached_row("2026-08-27"),
        ];
        assert!(matches!(plan_window(rows, 5), CachePlan::Refetch));
    }

    #[test]
    fn test_plan_window_empty_is_refetch() {
        assert!(matches!(plan_window(Vec::new(), 5), CachePlan::Refetch));
    }

    #[test]
    fn test_derive_window_maps_fields() {
        let days = vec![provider_day("2026-08-24")];
        let fetched_at = Utc::now();
        let rows = derive_window(&days, "Austin,US", None, 5, "2026-08-24".parse().unwrap(), fetched_at);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.forecast_date, "2026-08-24".parse::<NaiveDate>().unwrap());
        assert_eq!(row.location, "Austin,US");
        assert_eq!(row.temp_max, 70.0);
        assert_eq!(row.temp_min, 50.0);
        assert_eq!(row.feels_max, 68.0);
        assert_eq!(row.feels_min, 48.0);
        assert_eq!(row.wind_speed, 8.0);
        assert_eq!(row.humidity, 60.0);
        assert_eq!(row.precipitation, 0.1);
        assert_eq!(row.precipitation_probability, 20.0);
        assert_eq!(row.special_condition, "Partially cloudy");
        assert_eq!(row.weather_icon, "partly-cloudy-day");
        assert_eq!(row.owner_user_id, None);
        assert_eq!(row.fetched_at, fetched_at);
    }

    #[test]
    fn test_derive_window_defaults_per_field() {
        let days = vec![sparse_day("2026-08-24")];
        let rows = derive_window(&days, "Austin,US", None, 5, "2026-08-24".parse().unwrap(), Utc::now());

        let row = &rows[0];
        assert_eq!(row.temp_max, 0.0);
        assert_eq!(row.temp_min, 0.0);
        assert_eq!(row.feels_max, 0.0);
        assert_eq!(row.feels_min, 0.0);
        assert_eq!(row.wind_speed, 0.0);
        assert_eq!(row.humidity, 0.0);
        assert_eq!(row.precipitation, 0.0);
        assert_eq!(row.precipitation_probability, 0.0);
        assert_eq!(row.special_condition, UNKNOWN_CONDITION);
        assert_eq!(row.weather_icon, "");
    }

    #[test]
    fn test_derive_window_truncates_to_window_size() {
        // Providers can return more days than requested; only the window counts.
        let days: Vec<ProviderDay> = (24..=31)
            .map(|d| provider_day(&format!("2026-08-{:02}", d)))
            .collect();
        let rows = derive_window(&days, "Austin,US", None, 5, "2026-08-24".parse().unwrap(), Utc::now());
        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows.last().unwrap().forecast_date,
            "2026-08-28".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn test_derive_window_ascending_dates() {
        let days: Vec<ProviderDay> = (24..=28)
            .map(|d| provider_day(&format!("2026-08-{:02}", d)))
            .collect();
        let rows = derive_window(&days, "Boston,US", None, 5, "2026-08-24".parse().unwrap(), Utc::now());
        for pair in rows.windows(2) {
            assert!(pair[0].forecast_date < pair[1].forecast_date);
        }
    }

    #[test]
    fn test_derive_window_bad_date_falls_back_to_position() {
        let mut day = provider_day("not-a-date");
        day.datetime = "garbage".to_string();
        let from: NaiveDate = "2026-08-24".parse().unwrap();
        let rows = derive_window(&[sparse_day("2026-08-24"), day], "Austin,US", None, 5, from, Utc::now());
        assert_eq!(rows[1].forecast_date, from + Duration::days(1));
    }

    #[test]
    fn test_derive_window_carries_owner() {
        let owner = Uuid::new_v4();
        let rows = derive_window(
            &[provider_day("2026-08-24")],
            "Austin,US",
            Some(owner),
            5,
            "2026-08-24".parse().unwrap(),
            Utc::now(),
        );
        assert_eq!(rows[0].owner_user_id, Some(owner));
    }
}
