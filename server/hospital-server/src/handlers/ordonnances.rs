use super::{created, Created};
use crate::error::{api_success, ApiError, ApiResponse};
use crate::routes::paths::{self, ordonnances::ORDONNANCES};
use crate::server::HospitalServer;
use crate::types::{CreateLigneRequest, OrdonnanceRequest, UpdateLigneRequest, VisitQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::{Ordonnance, OrdonnanceLigne, VisitFilter};

// ============================================================================
// ORDONNANCES
// ============================================================================

#[utoipa::path(
    get,
    path = crate::routes::paths::api::ORDONNANCES,
    responses(
        (status = 200, description = "Ordonnances retrieved successfully", body = Vec<Ordonnance>),
        (status = 400, description = "Date filter without doctorId or patientId")
    ),
    params(VisitQuery),
    tag = "ordonnances"
)]
pub async fn list_ordonnances(
    State(server): State<HospitalServer>,
    Query(query): Query<VisitQuery>,
) -> Result<Json<ApiResponse<Vec<Ordonnance>>>, ApiError> {
    let filter = VisitFilter::from(query);
    let ordonnances = server.services.ordonnances.list(&filter).await?;
    Ok(Json(api_success(ordonnances)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api::ORDONNANCE_BY_ID,
    responses(
        (status = 200, description = "Ordonnance retrieved successfully", body = Ordonnance),
        (status = 404, description = "Ordonnance not found")
    ),
    params(("id" = i32, Path, description = "Ordonnance ID")),
    tag = "ordonnances"
)]
pub async fn get_ordonnance(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Ordonnance>>, ApiError> {
    let ordonnance = server.services.ordonnances.get(id).await?;
    Ok(Json(api_success(ordonnance)))
}

/// Issue an ordonnance, optionally linked to a consultation
#[utoipa::path(
    post,
    path = crate::routes::paths::api::ORDONNANCES,
    request_body = OrdonnanceRequest,
    responses(
        (status = 201, description = "Ordonnance created successfully", body = Ordonnance),
        (status = 409, description = "Unknown reference, or inconsistent with the linked consultation")
    ),
    tag = "ordonnances"
)]
pub async fn create_ordonnance(
    State(server): State<HospitalServer>,
    Json(request): Json<OrdonnanceRequest>,
) -> Result<Created<Ordonnance>, ApiError> {
    let ordonnance = server.services.ordonnances.create(&request).await?;
    Ok(created(ORDONNANCES, ordonnance.id, ordonnance))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api::ORDONNANCE_BY_ID,
    request_body = OrdonnanceRequest,
    responses(
        (status = 204, description = "Ordonnance updated successfully"),
        (status = 404, description = "Ordonnance not found"),
        (status = 409, description = "Unknown reference, or inconsistent with the linked consultation")
    ),
    params(("id" = i32, Path, description = "Ordonnance ID")),
    tag = "ordonnances"
)]
pub async fn update_ordonnance(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
    Json(request): Json<OrdonnanceRequest>,
) -> Result<StatusCode, ApiError> {
    server.services.ordonnances.update(id, &request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an ordonnance and its lines
#[utoipa::path(
    delete,
    path = crate::routes::paths::api::ORDONNANCE_BY_ID,
    responses(
        (status = 204, description = "Ordonnance deleted successfully"),
        (status = 404, description = "Ordonnance not found")
    ),
    params(("id" = i32, Path, description = "Ordonnance ID")),
    tag = "ordonnances"
)]
pub async fn delete_ordonnance(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    server.services.ordonnances.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Link an ordonnance to another consultation
#[utoipa::path(
    put,
    path = crate::routes::paths::api::ORDONNANCE_LINK_CONSULTATION,
    responses(
        (status = 204, description = "Ordonnance linked successfully"),
        (status = 404, description = "Ordonnance or consultation not found"),
        (status = 409, description = "Prescription dated before the consultation")
    ),
    params(
        ("id" = i32, Path, description = "Ordonnance ID"),
        ("consultation_id" = i32, Path, description = "Consultation ID")
    ),
    tag = "ordonnances"
)]
pub async fn link_ordonnance_consultation(
    State(server): State<HospitalServer>,
    Path((id, consultation_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    server
        .services
        .ordonnances
        .link_consultation(id, consultation_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api::ORDONNANCE_CONSULTATION,
    responses(
        (status = 204, description = "Ordonnance unlinked successfully"),
        (status = 404, description = "Ordonnance not found")
    ),
    params(("id" = i32, Path, description = "Ordonnance ID")),
    tag = "ordonnances"
)]
pub async fn unlink_ordonnance_consultation(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    server.services.ordonnances.unlink_consultation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// LIGNES
// ============================================================================

#[utoipa::path(
    get,
    path = crate::routes::paths::api::ORDONNANCE_LIGNES,
    responses(
        (status = 200, description = "Lines retrieved successfully", body = Vec<OrdonnanceLigne>),
        (status = 404, description = "Ordonnance not found")
    ),
    params(("id" = i32, Path, description = "Ordonnance ID")),
    tag = "ordonnances"
)]
pub async fn list_lignes(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<OrdonnanceLigne>>>, ApiError> {
    let lignes = server.services.lignes.list(id).await?;
    Ok(Json(api_success(lignes)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api::ORDONNANCE_LIGNE_BY_ID,
    responses(
        (status = 200, description = "Line retrieved successfully", body = OrdonnanceLigne),
        (status = 404, description = "Line not found in this ordonnance")
    ),
    params(
        ("id" = i32, Path, description = "Ordonnance ID"),
        ("ligne_id" = i32, Path, description = "Line ID")
    ),
    tag = "ordonnances"
)]
pub async fn get_ligne(
    State(server): State<HospitalServer>,
    Path((id, ligne_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<OrdonnanceLigne>>, ApiError> {
    let ligne = server.services.lignes.get(id, ligne_id).await?;
    Ok(Json(api_success(ligne)))
}

/// Add a prescription line
#[utoipa::path(
    post,
    path = crate::routes::paths::api::ORDONNANCE_LIGNES,
    request_body = CreateLigneRequest,
    responses(
        (status = 201, description = "Line created successfully", body = OrdonnanceLigne),
        (status = 400, description = "Invalid line"),
        (status = 404, description = "Ordonnance not found"),
        (status = 409, description = "Unknown medicament or identical line")
    ),
    params(("id" = i32, Path, description = "Ordonnance ID")),
    tag = "ordonnances"
)]
pub async fn create_ligne(
    State(server): State<HospitalServer>,
    Path(id): Path<i32>,
    Json(request): Json<CreateLigneRequest>,
) -> Result<Created<OrdonnanceLigne>, ApiError> {
    let ligne = server.services.lignes.create(id, &request).await?;
    let collection = paths::ordonnances::ORDONNANCE_LIGNES.replace(":id", &id.to_string());
    Ok(created(&collection, ligne.id, ligne))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api::ORDONNANCE_LIGNE_BY_ID,
    request_body = UpdateLigneRequest,
    responses(
        (status = 204, description = "Line updated successfully"),
        (status = 400, description = "Invalid line"),
        (status = 404, description = "Line not found in this ordonnance"),
        (status = 409, description = "Identical line")
    ),
    params(
        ("id" = i32, Path, description = "Ordonnance ID"),
        ("ligne_id" = i32, Path, description = "Line ID")
    ),
    tag = "ordonnances"
)]
pub async fn update_ligne(
    State(server): State<HospitalServer>,
    Path((id, ligne_id)): Path<(i32, i32)>,
    Json(request): Json<UpdateLigneRequest>,
) -> Result<StatusCode, ApiError> {
    server.services.lignes.update(id, ligne_id, &request).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api::ORDONNANCE_LIGNE_BY_ID,
    responses(
        (status = 204, description = "Line deleted successfully"),
        (status = 404, description = "Line not found in this ordonnance")
    ),
    params(
        ("id" = i32, Path, description = "Ordonnance ID"),
        ("ligne_id" = i32, Path, description = "Line ID")
    ),
    tag = "ordonnances"
)]
pub async fn delete_ligne(
    State(server): State<HospitalServer>,
    Path((id, ligne_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    server.services.lignes.delete(id, ligne_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
