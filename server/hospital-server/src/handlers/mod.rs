pub mod consultations;
pub mod doctors;
pub mod health;
pub mod medicaments;
pub mod ordonnances;
pub mod patients;
pub mod specialties;

use crate::error::{api_success, ApiResponse};
use crate::routes::paths;
use axum::{
    http::{header, HeaderName, StatusCode},
    Json,
};

/// 201 with a `Location` header pointing at the new resource
pub type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<ApiResponse<T>>);

pub(crate) fn created<T>(collection: &str, id: i32, data: T) -> Created<T> {
    (
        StatusCode::CREATED,
        [(header::LOCATION, paths::location(collection, id))],
        Json(api_success(data)),
    )
}
