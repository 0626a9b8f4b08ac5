use crate::services::provider::WeatherClient;

/// Shared application state: the database pool and the weather provider
/// client, passed explicitly into every handler and service call.
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub weather_client: WeatherClient,
}
