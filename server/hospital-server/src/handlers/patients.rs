use super::{created, Created};
use crate::error::{api_success, ApiError, ApiResponse};
use crate::routes::paths::patients::PATIENTS;
use crate::server::HospitalServer;
use crate::types::PatientRequest;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use database_layer::{Consultation, Ordonnance, Patient};

#[utoipa::path(
    get,
    path = crate::routes::paths::api::PATIENTS,
    responses(
        (status = 200, description = "Patients retrieved successfully", body = Vec<Patient>)
    ),
    tag = "patients"
)]
pub async fn list_patients(
    State(server): State<HospitalServer>,
) -> Result<Json<ApiResponse<Vec<Patient>>>, ApiError> {
    let patients = server.services.patients.list().await?;
    Ok(Json(api_success(patients)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api::PATIENT_BY_ID,
    responses(
        (status = 200, description = "Patient retrieved successfully", body = Patient),
        (status = 404, description = "Patient not found")
    ),
    params(("id" = i32, Path, description = "Patient ID")),
    tag = "patients"
)]
pub async fn get_patient(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    let patient = server.services.patients.get(id).await?;
    Ok(Json(api_success(patient)))
}

/// Register a patient
#[utoipa::path(
    post,
    path = crate::routes::paths::api::PATIENTS,
    request_body = PatientRequest,
    responses(
        (status = 201, description = "Patient created successfully", body = Patient),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Same name and birth date already registered")
    ),
    tag = "patients"
)]
pub async fn create_patient(
    State(server): State<HospitalServer>,
    Json(request): Json<PatientRequest>,
) -> Result<Created<Patient>, ApiError> {
    let patient = server.services.patients.create(&request).await?;
    Ok(created(PATIENTS, patient.id, patient))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api::PATIENT_BY_ID,
    request_body = PatientRequest,
    responses(
        (status = 204, description = "Patient updated successfully"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Patient not found"),
        (status = 409, description = "Same name and birth date already registered")
    ),
    params(("id" = i32, Path, description = "Patient ID")),
    tag = "patients"
)]
pub async fn update_patient(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
    Json(request): Json<PatientRequest>,
) -> Result<StatusCode, ApiError> {
    server.services.patients.update(id, &request).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api::PATIENT_BY_ID,
    responses(
        (status = 204, description = "Patient deleted successfully"),
        (status = 404, description = "Patient not found"),
        (status = 409, description = "The patient has consultations or prescriptions")
    ),
    params(("id" = i32, Path, description = "Patient ID")),
    tag = "patients"
)]
pub async fn delete_patient(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    server.services.patients.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api::PATIENT_CONSULTATIONS,
    responses(
        (status = 200, description = "Consultations retrieved successfully", body = Vec<Consultation>),
        (status = 404, description = "Patient not found")
    ),
    params(("id" = i32, Path, description = "Patient ID")),
    tag = "patients"
)]
pub async fn list_patient_consultations(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Consultation>>>, ApiError> {
    let consultations = server.services.patients.consultations(id).await?;
    Ok(Json(api_success(consultations)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api::PATIENT_ORDONNANCES,
    responses(
        (status = 200, description = "Ordonnances retrieved successfully", body = Vec<Ordonnance>),
        (status = 404, description = "Patient not found")
    ),
    params(("id" = i32, Path, description = "Patient ID")),
    tag = "patients"
)]
pub async fn list_patient_ordonnances(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Ordonnance>>>, ApiError> {
    let ordonnances = server.services.patients.ordonnances(id).await?;
    Ok(Json(api_success(ordonnances)))
}
