use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::HospitalServer;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall system health status
    #[schema(example = "healthy")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    #[schema(example = "2025-01-15T10:30:00Z")]
    pub timestamp: String,
    /// API version
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Active store
    #[schema(example = "postgres")]
    pub store: String,
    /// Individual component checks
    pub checks: HashMap<String, String>,
}

/// Version information response
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    /// Application name
    #[schema(example = "Kingdom Hospital")]
    pub name: String,
    /// Application version
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Enabled features
    pub features: Vec<String>,
}

/// Health check handler
#[utoipa::path(
    get,
    path = crate::routes::paths::api::HEALTH,
    tag = "health",
    responses(
        (status = 200, description = "System is healthy", body = HealthResponse),
        (status = 503, description = "The store is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(server): State<HospitalServer>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let store_healthy = server.store_healthy().await;

    let mut checks = HashMap::new();
    checks.insert(
        "database".to_string(),
        if store_healthy { "healthy" } else { "unhealthy" }.to_string(),
    );

    let response = HealthResponse {
        status: if store_healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: server.store_kind().to_string(),
        checks,
    };

    let status = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(api_success(response)))
}

/// Version information handler
#[utoipa::path(
    get,
    path = crate::routes::paths::api::VERSION,
    tag = "health",
    responses(
        (status = 200, description = "Version information retrieved successfully", body = VersionResponse)
    )
)]
pub async fn version_info() -> Result<Json<ApiResponse<VersionResponse>>, ApiError> {
    let features = vec![
        "scheduling-conflicts".to_string(),
        "prescriptions".to_string(),
        "csv-seed".to_string(),
        "openapi".to_string(),
    ];

    let response = VersionResponse {
        name: "Kingdom Hospital".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        features,
    };

    Ok(Json(api_success(response)))
}
