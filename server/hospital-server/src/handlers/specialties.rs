use super::{created, Created};
use crate::error::{api_success, ApiError, ApiResponse};
use crate::routes::paths::specialties::SPECIALTIES;
use crate::server::HospitalServer;
use crate::types::SpecialtyRequest;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use database_layer::{Doctor, Specialty};

/// List all specialties ordered by name
#[utoipa::path(
    get,
    path = crate::routes::paths::api::SPECIALTIES,
    responses(
        (status = 200, description = "Specialties retrieved successfully", body = Vec<Specialty>),
        (status = 500, description = "Internal server error")
    ),
    tag = "specialties"
)]
pub async fn list_specialties(
    State(server): State<HospitalServer>,
) -> Result<Json<ApiResponse<Vec<Specialty>>>, ApiError> {
    let specialties = server.services.specialties.list().await?;
    Ok(Json(api_success(specialties)))
}

/// Get a specialty by id
#[utoipa::path(
    get,
    path = crate::routes::paths::api::SPECIALTY_BY_ID,
    responses(
        (status = 200, description = "Specialty retrieved successfully", body = Specialty),
        (status = 404, description = "Specialty not found")
    ),
    params(("id" = i32, Path, description = "Specialty ID")),
    tag = "specialties"
)]
pub async fn get_specialty(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Specialty>>, ApiError> {
    let specialty = server.services.specialties.get(id).await?;
    Ok(Json(api_success(specialty)))
}

/// Create a specialty
#[utoipa::path(
    post,
    path = crate::routes::paths::api::SPECIALTIES,
    request_body = SpecialtyRequest,
    responses(
        (status = 201, description = "Specialty created successfully", body = Specialty),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "A specialty with the same name already exists")
    ),
    tag = "specialties"
)]
pub async fn create_specialty(
    State(server): State<HospitalServer>,
    Json(request): Json<SpecialtyRequest>,
) -> Result<Created<Specialty>, ApiError> {
    let specialty = server.services.specialties.create(&request).await?;
    Ok(created(SPECIALTIES, specialty.id, specialty))
}

/// Rename a specialty
#[utoipa::path(
    put,
    path = crate::routes::paths::api::SPECIALTY_BY_ID,
    request_body = SpecialtyRequest,
    responses(
        (status = 204, description = "Specialty updated successfully"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Specialty not found"),
        (status = 409, description = "A specialty with the same name already exists")
    ),
    params(("id" = i32, Path, description = "Specialty ID")),
    tag = "specialties"
)]
pub async fn update_specialty(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
    Json(request): Json<SpecialtyRequest>,
) -> Result<StatusCode, ApiError> {
    server.services.specialties.update(id, &request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a specialty without doctors
#[utoipa::path(
    delete,
    path = crate::routes::paths::api::SPECIALTY_BY_ID,
    responses(
        (status = 204, description = "Specialty deleted successfully"),
        (status = 404, description = "Specialty not found"),
        (status = 409, description = "The specialty still has doctors")
    ),
    params(("id" = i32, Path, description = "Specialty ID")),
    tag = "specialties"
)]
pub async fn delete_specialty(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    server.services.specialties.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Doctors practising a specialty
#[utoipa::path(
    get,
    path = crate::routes::paths::api::SPECIALTY_DOCTORS,
    responses(
        (status = 200, description = "Doctors retrieved successfully", body = Vec<Doctor>),
        (status = 404, description = "Specialty not found")
    ),
    params(("id" = i32, Path, description = "Specialty ID")),
    tag = "specialties"
)]
pub async fn list_specialty_doctors(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Doctor>>>, ApiError> {
    let doctors = server.services.specialties.doctors(id).await?;
    Ok(Json(api_success(doctors)))
}
