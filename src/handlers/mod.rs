// handlers/mod.rs - HTTP surface of the progress tracker
//
// Public:   /, /health
// Customer: /api/customers[/:id], /api/kols/:kol_id/customers[/stats]
// Progress: /api/customers/:id/progress/*
// Rounds:   /api/rounds/summary

pub mod customers;
pub mod health;
pub mod progress;
pub mod rounds;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .merge(customer_routes())
        .merge(progress_routes())
        .route("/api/rounds/summary", post(rounds::summary))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if matches!(config.environment, Environment::Development) || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/api/customers", post(customers::create))
        .route("/api/customers/:id", get(customers::get).delete(customers::delete))
        .route("/api/kols/:kol_id/customers", get(customers::list))
        .route("/api/kols/:kol_id/customers/stats", get(customers::stats))
}

fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/api/customers/:id/progress", get(progress::get))
        .route(
            "/api/customers/:id/progress/stages/:stage",
            put(progress::stage_put).delete(progress::stage_delete),
        )
        .route("/api/customers/:id/progress/stages/:stage/memo", patch(progress::memo_patch))
        .route(
            "/api/customers/:id/progress/achievements/:flag/toggle",
            post(progress::achievement_toggle),
        )
        .route("/api/customers/:id/progress/achievements", put(progress::achievement_level))
}
