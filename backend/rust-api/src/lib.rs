#![allow(dead_code)]

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;

pub use catalog::QuestionCatalog;
pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    // The quiz frontend is served from arbitrary origins.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        .route(
            "/api/submitUserData",
            post(handlers::submissions::submit_user_data),
        )
        .route(
            "/api/getAllSubmissions",
            get(handlers::submissions::get_all_submissions),
        )
        .with_state(app_state)
        .layer(cors)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}
