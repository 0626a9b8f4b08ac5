// LazYdrobe API v0.1
use axum::routing::{get, post};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod routes;
mod services;
mod state;

use config::AppConfig;
use services::provider::WeatherClient;
use state::AppState;

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 5;
/// Minimum number of connections kept alive in the database pool.
const DB_POOL_MIN_CONNECTIONS: u32 = 2;

/// LazYdrobe API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "LazYdrobe API",
        version = "0.1.0",
        description = "Wardrobe management API. Stores users, wardrobe items and outfits, \
            caches 5-day weather forecasts from an external provider, and generates \
            outfit suggestions from current weather, fashion trends and the product catalog.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Users", description = "User account management"),
        (name = "Wardrobe", description = "Wardrobe item management"),
        (name = "Outfits", description = "Saved outfit management"),
        (name = "Weather", description = "Cached weather forecast windows"),
        (name = "Trends", description = "Fashion trend feed"),
        (name = "Suggestions", description = "Weather- and trend-driven outfit suggestions"),
    ),
    paths(
        routes::health::health_check,
        routes::users::create_user,
        routes::users::list_users,
        routes::users::get_user,
        routes::users::update_user,
        routes::users::delete_user,
        routes::wardrobe::create_wardrobe_item,
        routes::wardrobe::list_wardrobe_items,
        routes::wardrobe::get_wardrobe_item,
        routes::wardrobe::update_wardrobe_item,
        routes::wardrobe::delete_wardrobe_item,
        routes::outfits::create_outfit,
        routes::outfits::list_outfits,
        routes::outfits::get_outfit,
        routes::outfits::delete_outfit,
        routes::weather::get_weather,
        routes::trends::list_trends,
        routes::suggestions::create_suggestion,
        routes::suggestions::list_suggestions,
        routes::suggestions::delete_suggestions_for_user,
        routes::suggestions::get_suggestion,
        routes::suggestions::delete_suggestion,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::users::CreateUserRequest,
            routes::users::UpdateUserRequest,
            routes::users::UserResponse,
            routes::wardrobe::CreateWardrobeItemRequest,
            routes::wardrobe::UpdateWardrobeItemRequest,
            routes::wardrobe::WardrobeItemResponse,
            routes::outfits::CreateOutfitRequest,
            routes::outfits::OutfitResponse,
            routes::weather::ForecastDayResponse,
            routes::trends::TrendResponse,
            routes::suggestions::SuggestionResponse,
            services::suggest::OutfitComponent,
            services::suggest::OutfitGroup,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazydrobe_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Set up database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .min_connections(DB_POOL_MIN_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Weather provider client
    let weather_client = WeatherClient::new(&config.weather_api_url, &config.weather_api_key);

    // Build shared application state
    let app_state = AppState {
        pool: pool.clone(),
        weather_client,
    };

    // CORS — read-write API, allow common methods
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/api/v1/users",
            post(routes::users::create_user).get(routes::users::list_users),
        )
        .route(
            "/api/v1/users/:user_id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route(
            "/api/v1/wardrobe",
            post(routes::wardrobe::create_wardrobe_item),
        )
        .route(
            "/api/v1/wardrobe/user/:user_id",
            get(routes::wardrobe::list_wardrobe_items),
        )
        .route(
            "/api/v1/wardrobe/:item_id",
            get(routes::wardrobe::get_wardrobe_item)
                .put(routes::wardrobe::update_wardrobe_item)
                .delete(routes::wardrobe::delete_wardrobe_item),
        )
        .route("/api/v1/outfits", post(routes::outfits::create_outfit))
        .route(
            "/api/v1/outfits/user/:user_id",
            get(routes::outfits::list_outfits),
        )
        .route(
            "/api/v1/outfits/:outfit_id",
            get(routes::outfits::get_outfit).delete(routes::outfits::delete_outfit),
        )
        .route("/api/v1/weather", get(routes::weather::get_weather))
        .route("/api/v1/trends", get(routes::trends::list_trends))
        .route(
            "/api/v1/suggestions/user/:user_id",
            post(routes::suggestions::create_suggestion)
                .get(routes::suggestions::list_suggestions)
                .delete(routes::suggestions::delete_suggestions_for_user),
        )
        .route(
            "/api/v1/suggestions/:suggestion_id",
            get(routes::suggestions::get_suggestion)
                .delete(routes::suggestions::delete_suggestion),
        )
        .with_state(app_state);

    // Health check uses PgPool to verify DB connectivity
    let health_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .with_state(pool);

    let app = Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
