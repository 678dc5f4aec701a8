use super::{created, Created};
use crate::error::{api_success, ApiError, ApiResponse};
use crate::routes::paths::{consultations::CONSULTATIONS, ordonnances::ORDONNANCES};
use crate::server::HospitalServer;
use crate::types::{ConsultationOrdonnanceRequest, ConsultationRequest, VisitQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::{Consultation, Ordonnance, VisitFilter};

/// List consultations, optionally filtered by doctor, patient and date range
#[utoipa::path(
    get,
    path = crate::routes::paths::api::CONSULTATIONS,
    responses(
        (status = 200, description = "Consultations retrieved successfully", body = Vec<Consultation>),
        (status = 400, description = "Date filter without doctorId or patientId")
    ),
    params(VisitQuery),
    tag = "consultations"
)]
pub async fn list_consultations(
    State(server): State<HospitalServer>,
    Query(query): Query<VisitQuery>,
) -> Result<Json<ApiResponse<Vec<Consultation>>>, ApiError> {
    let filter = VisitFilter::from(query);
    let consultations = server.services.consultations.list(&filter).await?;
    Ok(Json(api_success(consultations)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api::CONSULTATION_BY_ID,
    responses(
        (status = 200, description = "Consultation retrieved successfully", body = Consultation),
        (status = 404, description = "Consultation not found")
    ),
    params(("id" = i32, Path, description = "Consultation ID")),
    tag = "consultations"
)]
pub async fn get_consultation(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Consultation>>, ApiError> {
    let consultation = server.services.consultations.get(id).await?;
    Ok(Json(api_success(consultation)))
}

/// Book a consultation
#[utoipa::path(
    post,
    path = crate::routes::paths::api::CONSULTATIONS,
    request_body = ConsultationRequest,
    responses(
        (status = 201, description = "Consultation created successfully", body = Consultation),
        (status = 409, description = "Unknown doctor or patient, or the slot is already taken")
    ),
    tag = "consultations"
)]
pub async fn create_consultation(
    State(server): State<HospitalServer>,
    Json(request): Json<ConsultationRequest>,
) -> Result<Created<Consultation>, ApiError> {
    let consultation = server.services.consultations.create(&request).await?;
    Ok(created(CONSULTATIONS, consultation.id, consultation))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api::CONSULTATION_BY_ID,
    request_body = ConsultationRequest,
    responses(
        (status = 204, description = "Consultation updated successfully"),
        (status = 404, description = "Consultation not found"),
        (status = 409, description = "Unknown doctor or patient, or the slot is already taken")
    ),
    params(("id" = i32, Path, description = "Consultation ID")),
    tag = "consultations"
)]
pub async fn update_consultation(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
    Json(request): Json<ConsultationRequest>,
) -> Result<StatusCode, ApiError> {
    server.services.consultations.update(id, &request).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api::CONSULTATION_BY_ID,
    responses(
        (status = 204, description = "Consultation deleted successfully"),
        (status = 404, description = "Consultation not found"),
        (status = 409, description = "The consultation has prescriptions")
    ),
    params(("id" = i32, Path, description = "Consultation ID")),
    tag = "consultations"
)]
pub async fn delete_consultation(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    server.services.consultations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api::CONSULTATION_ORDONNANCES,
    responses(
        (status = 200, description = "Ordonnances retrieved successfully", body = Vec<Ordonnance>),
        (status = 404, description = "Consultation not found")
    ),
    params(("id" = i32, Path, description = "Consultation ID")),
    tag = "consultations"
)]
pub async fn list_consultation_ordonnances(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Ordonnance>>>, ApiError> {
    let ordonnances = server.services.consultations.ordonnances(id).await?;
    Ok(Json(api_success(ordonnances)))
}

/// Issue an ordonnance for the doctor and patient of a consultation
#[utoipa::path(
    post,
    path = crate::routes::paths::api::CONSULTATION_ORDONNANCES,
    request_body = ConsultationOrdonnanceRequest,
    responses(
        (status = 201, description = "Ordonnance created successfully", body = Ordonnance),
        (status = 404, description = "Consultation not found"),
        (status = 409, description = "Prescription dated before the consultation")
    ),
    params(("id" = i32, Path, description = "Consultation ID")),
    tag = "consultations"
)]
pub async fn create_consultation_ordonnance(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
    Json(request): Json<ConsultationOrdonnanceRequest>,
) -> Result<Created<Ordonnance>, ApiError> {
    let ordonnance = server
        .services
        .consultations
        .create_ordonnance(id, &request)
        .await?;
    Ok(created(ORDONNANCES, ordonnance.id, ordonnance))
}
