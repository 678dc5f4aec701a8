use super::{created, Created};
use crate::error::{api_success, ApiError, ApiResponse};
use crate::routes::paths::medicaments::MEDICAMENTS;
use crate::server::HospitalServer;
use crate::types::MedicamentRequest;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use database_layer::{Medicament, Ordonnance};

/// Medicament catalogue ordered by name
#[utoipa::path(
    get,
    path = crate::routes::paths::api::MEDICAMENTS,
    responses(
        (status = 200, description = "Medicaments retrieved successfully", body = Vec<Medicament>)
    ),
    tag = "medicaments"
)]
pub async fn list_medicaments(
    State(server): State<HospitalServer>,
) -> Result<Json<ApiResponse<Vec<Medicament>>>, ApiError> {
    let medicaments = server.services.medicaments.list().await?;
    Ok(Json(api_success(medicaments)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api::MEDICAMENT_BY_ID,
    responses(
        (status = 200, description = "Medicament retrieved successfully", body = Medicament),
        (status = 404, description = "Medicament not found")
    ),
    params(("id" = i32, Path, description = "Medicament ID")),
    tag = "medicaments"
)]
pub async fn get_medicament(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Medicament>>, ApiError> {
    let medicament = server.services.medicaments.get(id).await?;
    Ok(Json(api_success(medicament)))
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api::MEDICAMENTS,
    request_body = MedicamentRequest,
    responses(
        (status = 201, description = "Medicament created successfully", body = Medicament),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "A medicament with the same name already exists")
    ),
    tag = "medicaments"
)]
pub async fn create_medicament(
    State(server): State<HospitalServer>,
    Json(request): Json<MedicamentRequest>,
) -> Result<Created<Medicament>, ApiError> {
    let medicament = server.services.medicaments.create(&request).await?;
    Ok(created(MEDICAMENTS, medicament.id, medicament))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api::MEDICAMENT_BY_ID,
    request_body = MedicamentRequest,
    responses(
        (status = 204, description = "Medicament updated successfully"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Medicament not found"),
        (status = 409, description = "A medicament with the same name already exists")
    ),
    params(("id" = i32, Path, description = "Medicament ID")),
    tag = "medicaments"
)]
pub async fn update_medicament(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
    Json(request): Json<MedicamentRequest>,
) -> Result<StatusCode, ApiError> {
    server.services.medicaments.update(id, &request).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api::MEDICAMENT_BY_ID,
    responses(
        (status = 204, description = "Medicament deleted successfully"),
        (status = 404, description = "Medicament not found"),
        (status = 409, description = "The medicament is used in prescriptions")
    ),
    params(("id" = i32, Path, description = "Medicament ID")),
    tag = "medicaments"
)]
pub async fn delete_medicament(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    server.services.medicaments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ordonnances prescribing the medicament
#[utoipa::path(
    get,
    path = crate::routes::paths::api::MEDICAMENT_ORDONNANCES,
    responses(
        (status = 200, description = "Ordonnances retrieved successfully", body = Vec<Ordonnance>),
        (status = 404, description = "Medicament not found")
    ),
    params(("id" = i32, Path, description = "Medicament ID")),
    tag = "medicaments"
)]
pub async fn list_medicament_ordonnances(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Ordonnance>>>, ApiError> {
    let ordonnances = server.services.medicaments.ordonnances(id).await?;
    Ok(Json(api_success(ordonnances)))
}
