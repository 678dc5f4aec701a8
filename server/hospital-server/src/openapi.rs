use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use axum::Router;
use crate::routes::paths;
use crate::server::HospitalServer;

/// OpenAPI document for the whole API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kingdom Hospital API",
        description = "Specialties, doctors, patients, consultations, medicaments and prescriptions"
    ),
    paths(
        // Health
        crate::handlers::health::health_check,
        crate::handlers::health::version_info,

        // Specialties
        crate::handlers::specialties::list_specialties,
        crate::handlers::specialties::get_specialty,
        crate::handlers::specialties::create_specialty,
        crate::handlers::specialties::update_specialty,
        crate::handlers::specialties::delete_specialty,
        crate::handlers::specialties::list_specialty_doctors,

        // Doctors
        crate::handlers::doctors::list_doctors,
        crate::handlers::doctors::get_doctor,
        crate::handlers::doctors::create_doctor,
        crate::handlers::doctors::update_doctor,
        crate::handlers::doctors::delete_doctor,
        crate::handlers::doctors::get_doctor_specialty,
        crate::handlers::doctors::change_doctor_specialty,
        crate::handlers::doctors::list_doctor_consultations,
        crate::handlers::doctors::list_doctor_patients,
        crate::handlers::doctors::list_doctor_ordonnances,

        // Patients
        crate::handlers::patients::list_patients,
        crate::handlers::patients::get_patient,
        crate::handlers::patients::create_patient,
        crate::handlers::patients::update_patient,
        crate::handlers::patients::delete_patient,
        crate::handlers::patients::list_patient_consultations,
        crate::handlers::patients::list_patient_ordonnances,

        // Consultations
        crate::handlers::consultations::list_consultations,
        crate::handlers::consultations::get_consultation,
        crate::handlers::consultations::create_consultation,
        crate::handlers::consultations::update_consultation,
        crate::handlers::consultations::delete_consultation,
        crate::handlers::consultations::list_consultation_ordonnances,
        crate::handlers::consultations::create_consultation_ordonnance,

        // Medicaments
        crate::handlers::medicaments::list_medicaments,
        crate::handlers::medicaments::get_medicament,
        crate::handlers::medicaments::create_medicament,
        crate::handlers::medicaments::update_medicament,
        crate::handlers::medicaments::delete_medicament,
        crate::handlers::medicaments::list_medicament_ordonnances,

        // Ordonnances
        crate::handlers::ordonnances::list_ordonnances,
        crate::handlers::ordonnances::get_ordonnance,
        crate::handlers::ordonnances::create_ordonnance,
        crate::handlers::ordonnances::update_ordonnance,
        crate::handlers::ordonnances::delete_ordonnance,
        crate::handlers::ordonnances::link_ordonnance_consultation,
        crate::handlers::ordonnances::unlink_ordonnance_consultation,
        crate::handlers::ordonnances::list_lignes,
        crate::handlers::ordonnances::get_ligne,
        crate::handlers::ordonnances::create_ligne,
        crate::handlers::ordonnances::update_ligne,
        crate::handlers::ordonnances::delete_ligne,
    ),
    components(
        schemas(
            crate::handlers::health::HealthResponse,
            crate::handlers::health::VersionResponse,
            crate::error::ApiErrorResponse,

            // Records
            database_layer::Specialty,
            database_layer::Doctor,
            database_layer::Patient,
            database_layer::Consultation,
            database_layer::Medicament,
            database_layer::Ordonnance,
            database_layer::OrdonnanceLigne,

            // Requests
            crate::types::SpecialtyRequest,
            crate::types::DoctorRequest,
            crate::types::PatientRequest,
            crate::types::ConsultationRequest,
            crate::types::MedicamentRequest,
            crate::types::OrdonnanceRequest,
            crate::types::ConsultationOrdonnanceRequest,
            crate::types::CreateLigneRequest,
            crate::types::UpdateLigneRequest,
        )
    ),
    tags(
        (name = "health", description = "Liveness and build information"),
        (name = "specialties", description = "Medical specialties"),
        (name = "doctors", description = "Doctors and their schedules"),
        (name = "patients", description = "Patients and their history"),
        (name = "consultations", description = "Appointments between a doctor and a patient"),
        (name = "medicaments", description = "Medicament catalogue"),
        (name = "ordonnances", description = "Prescriptions and prescription lines"),
    )
)]
pub struct ApiDoc;

/// Swagger UI plus the raw OpenAPI document
pub fn create_docs_routes() -> Router<HospitalServer> {
    Router::new().merge(
        SwaggerUi::new(paths::docs::SWAGGER_UI).url(paths::docs::OPENAPI_JSON, ApiDoc::openapi()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_resource_path_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            paths::api::SPECIALTY_DOCTORS,
            paths::api::DOCTOR_CHANGE_SPECIALTY,
            paths::api::CONSULTATION_ORDONNANCES,
            paths::api::ORDONNANCE_LIGNE_BY_ID,
            paths::api::ORDONNANCE_CONSULTATION,
            paths::api::HEALTH,
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
