//! Weather provider client (Visual Crossing timeline API).
//!
//! Fetches daily forecasts for a free-text location. Stateless: one network
//! call per invocation; the cache-or-fetch decision lives in
//! `services::weather`, not here.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;

/// Client for the weather provider's timeline endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// One daily record from the provider. All weather fields are optional
/// upstream; defaults are applied when deriving `ForecastDay` values.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderDay {
    /// ISO calendar date, e.g. "2026-08-24".
    pub datetime: String,
    pub tempmax: Option<f64>,
    pub tempmin: Option<f64>,
    pub feelslikemax: Option<f64>,
    pub feelslikemin: Option<f64>,
    pub windspeed: Option<f64>,
    pub humidity: Option<f64>,
    pub precip: Option<f64>,
    pub precipprob: Option<f64>,
    pub conditions: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    days: Vec<ProviderDay>,
}

impl WeatherClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch daily forecast records for `location` over [start, end].
    ///
    /// A non-success status or a response with no daily records is a hard
    /// failure; sparse fields within a day are not.
    pub async fn fetch_daily(
        &self,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProviderDay>, AppError> {
        // Location is free text ("Austin,US", "New York") — percent-encode it
        // as a path segment rather than formatting it into the URL raw.
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| AppError::Internal(format!("Invalid weather API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Weather API base URL cannot be a base".to_string()))?
            .push(location)
            .push(&start.to_string())
            .push(&end.to_string());

        let response = self
            .client
            .get(url)
            .query(&[
                ("unitGroup", "us"),
                ("include", "days"),
                ("contentType", "json"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Weather request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "Weather provider returned HTTP {}",
                response.status()
            )));
        }

        let body: ProviderResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Weather JSON parse error: {}", e)))?;

        if body.days.is_empty() {
            return Err(AppError::Provider(
                "Weather provider returned no daily records".to_string(),
            ));
        }

        Ok(body.days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_daily_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Austin,US/2026-08-24/2026-08-28"))
            .and(query_param("key", "test-key"))
            .and(query_param("unitGroup", "us"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "days": [
                    {
                        "datetime": "2026-08-24",
                        "tempmax": 98.2,
                        "tempmin": 75.1,
                        "feelslikemax": 104.0,
                        "feelslikemin": 75.1,
                        "windspeed": 9.4,
                        "humidity": 55.0,
                        "precip": 0.0,
                        "precipprob": 10.0,
                        "conditions": "Clear",
                        "icon": "clear-day"
                    },
                    {
                        "datetime": "2026-08-25",
                        "tempmax": 97.0,
                        "tempmin": 74.5
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = WeatherClient::new(&server.uri(), "test-key");
        let days = client
            .fetch_daily("Austin,US", date("2026-08-24"), date("2026-08-28"))
            .await
            .unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].datetime, "2026-08-24");
        assert_eq!(days[0].tempmax, Some(98.2));
        assert_eq!(days[0].conditions.as_deref(), Some("Clear"));
        // Sparse second day deserializes with fields absent, not an error.
        assert_eq!(days[1].windspeed, None);
        assert_eq!(days[1].conditions, None);
        assert_eq!(days[1].icon, None);
    }

    #[tokio::test]
    async fn test_fetch_daily_encodes_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/New%20York/2026-08-24/2026-08-28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "days": [{ "datetime": "2026-08-24" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = WeatherClient::new(&server.uri(), "test-key");
        let days = client
            .fetch_daily("New York", date("2026-08-24"), date("2026-08-28"))
            .await
            .unwrap();
        assert_eq!(days.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_daily_http_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = WeatherClient::new(&server.uri(), "test-key");
        let err = client
            .fetch_daily("Austin,US", date("2026-08-24"), date("2026-08-28"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Provider(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_daily_empty_days_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "days": [] })),
            )
            .mount(&server)
            .await;

        let client = WeatherClient::new(&server.uri(), "test-key");
        let err = client
            .fetch_daily("Austin,US", date("2026-08-24"), date("2026-08-28"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Provider(_)), "got {:?}", err);
    }
}
