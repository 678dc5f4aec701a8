//! Kingdom Hospital - HTTP API for the hospital back office
//!
//! This library wires the `database_layer` repositories into business
//! services and exposes them as a RESTful JSON API under `/api`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::*;
pub use server::HospitalServer;

use axum::{
    http::{header, Method},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the CORS layer for the application
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION])
        .max_age(Duration::from_secs(3600))
}

/// Create the main application router with all routes and middleware
pub fn create_app(server: HospitalServer) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer()),
        )
        .with_state(server)
}
