use super::{created, Created};
use crate::error::{api_success, ApiError, ApiResponse};
use crate::routes::paths::doctors::DOCTORS;
use crate::server::HospitalServer;
use crate::types::{DoctorRequest, DoctorVisitQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::{Consultation, Doctor, Ordonnance, Patient, Specialty};

/// List all doctors ordered by last name, then first name
#[utoipa::path(
    get,
    path = crate::routes::paths::api::DOCTORS,
    responses(
        (status = 200, description = "Doctors retrieved successfully", body = Vec<Doctor>)
    ),
    tag = "doctors"
)]
pub async fn list_doctors(
    State(server): State<HospitalServer>,
) -> Result<Json<ApiResponse<Vec<Doctor>>>, ApiError> {
    let doctors = server.services.doctors.list().await?;
    Ok(Json(api_success(doctors)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api::DOCTOR_BY_ID,
    responses(
        (status = 200, description = "Doctor retrieved successfully", body = Doctor),
        (status = 404, description = "Doctor not found")
    ),
    params(("id" = i32, Path, description = "Doctor ID")),
    tag = "doctors"
)]
pub async fn get_doctor(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Doctor>>, ApiError> {
    let doctor = server.services.doctors.get(id).await?;
    Ok(Json(api_success(doctor)))
}

/// Register a doctor in an existing specialty
#[utoipa::path(
    post,
    path = crate::routes::paths::api::DOCTORS,
    request_body = DoctorRequest,
    responses(
        (status = 201, description = "Doctor created successfully", body = Doctor),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Unknown specialty or duplicate doctor")
    ),
    tag = "doctors"
)]
pub async fn create_doctor(
    State(server): State<HospitalServer>,
    Json(request): Json<DoctorRequest>,
) -> Result<Created<Doctor>, ApiError> {
    let doctor = server.services.doctors.create(&request).await?;
    Ok(created(DOCTORS, doctor.id, doctor))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api::DOCTOR_BY_ID,
    request_body = DoctorRequest,
    responses(
        (status = 204, description = "Doctor updated successfully"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Doctor not found"),
        (status = 409, description = "Unknown specialty or duplicate doctor")
    ),
    params(("id" = i32, Path, description = "Doctor ID")),
    tag = "doctors"
)]
pub async fn update_doctor(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
    Json(request): Json<DoctorRequest>,
) -> Result<StatusCode, ApiError> {
    server.services.doctors.update(id, &request).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api::DOCTOR_BY_ID,
    responses(
        (status = 204, description = "Doctor deleted successfully"),
        (status = 404, description = "Doctor not found"),
        (status = 409, description = "The doctor has consultations or prescriptions")
    ),
    params(("id" = i32, Path, description = "Doctor ID")),
    tag = "doctors"
)]
pub async fn delete_doctor(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    server.services.doctors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api::DOCTOR_SPECIALTY,
    responses(
        (status = 200, description = "Specialty retrieved successfully", body = Specialty),
        (status = 404, description = "Doctor not found")
    ),
    params(("id" = i32, Path, description = "Doctor ID")),
    tag = "doctors"
)]
pub async fn get_doctor_specialty(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Specialty>>, ApiError> {
    let specialty = server.services.doctors.specialty(id).await?;
    Ok(Json(api_success(specialty)))
}

/// Move a doctor to another specialty
#[utoipa::path(
    put,
    path = crate::routes::paths::api::DOCTOR_CHANGE_SPECIALTY,
    responses(
        (status = 204, description = "Specialty changed successfully"),
        (status = 404, description = "Doctor or specialty not found"),
        (status = 409, description = "The same doctor already exists in that specialty")
    ),
    params(
        ("id" = i32, Path, description = "Doctor ID"),
        ("specialty_id" = i32, Path, description = "Specialty ID")
    ),
    tag = "doctors"
)]
pub async fn change_doctor_specialty(
    State(server): State<HospitalServer>,
    Path((id, specialty_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    server.services.doctors.change_specialty(id, specialty_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Consultations of a doctor ordered by date then hour
#[utoipa::path(
    get,
    path = crate::routes::paths::api::DOCTOR_CONSULTATIONS,
    responses(
        (status = 200, description = "Consultations retrieved successfully", body = Vec<Consultation>),
        (status = 404, description = "Doctor not found")
    ),
    params(("id" = i32, Path, description = "Doctor ID"), DoctorVisitQuery),
    tag = "doctors"
)]
pub async fn list_doctor_consultations(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
    Query(query): Query<DoctorVisitQuery>,
) -> Result<Json<ApiResponse<Vec<Consultation>>>, ApiError> {
    let consultations = server
        .services
        .doctors
        .consultations(&query.for_doctor(id))
        .await?;
    Ok(Json(api_success(consultations)))
}

/// Distinct patients the doctor has seen
#[utoipa::path(
    get,
    path = crate::routes::paths::api::DOCTOR_PATIENTS,
    responses(
        (status = 200, description = "Patients retrieved successfully", body = Vec<Patient>),
        (status = 404, description = "Doctor not found")
    ),
    params(("id" = i32, Path, description = "Doctor ID")),
    tag = "doctors"
)]
pub async fn list_doctor_patients(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Patient>>>, ApiError> {
    let patients = server.services.doctors.patients(id).await?;
    Ok(Json(api_success(patients)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api::DOCTOR_ORDONNANCES,
    responses(
        (status = 200, description = "Ordonnances retrieved successfully", body = Vec<Ordonnance>),
        (status = 404, description = "Doctor not found")
    ),
    params(("id" = i32, Path, description = "Doctor ID"), DoctorVisitQuery),
    tag = "doctors"
)]
pub async fn list_doctor_ordonnances(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
    Query(query): Query<DoctorVisitQuery>,
) -> Result<Json<ApiResponse<Vec<Ordonnance>>>, ApiError> {
    let ordonnances = server
        .services
        .doctors
        .ordonnances(&query.for_doctor(id))
        .await?;
    Ok(Json(api_success(ordonnances)))
}
