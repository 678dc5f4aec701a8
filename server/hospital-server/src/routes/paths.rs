//! Centralized API route path constants
//!
//! Runtime routes use axum's `:param` syntax and are relative to [`API`].
//! The [`api`] module repeats every resource path in full with `{param}`
//! placeholders for the `#[utoipa::path]` attributes on the handlers.

/// Prefix under which every resource router is nested
pub const API: &str = "/api";

/// Health check endpoints
pub mod health {
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
}

/// Documentation endpoints
pub mod docs {
    pub const SWAGGER_UI: &str = "/docs";
    pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
}

pub mod specialties {
    pub const SPECIALTIES: &str = "/specialties";
    pub const SPECIALTY_BY_ID: &str = "/specialties/:id";
    pub const SPECIALTY_DOCTORS: &str = "/specialties/:id/doctors";
}

pub mod doctors {
    pub const DOCTORS: &str = "/doctors";
    pub const DOCTOR_BY_ID: &str = "/doctors/:id";
    pub const DOCTOR_SPECIALTY: &str = "/doctors/:id/specialty";
    pub const DOCTOR_CHANGE_SPECIALTY: &str = "/doctors/:id/specialty/:specialty_id";
    pub const DOCTOR_CONSULTATIONS: &str = "/doctors/:id/consultations";
    pub const DOCTOR_PATIENTS: &str = "/doctors/:id/patients";
    pub const DOCTOR_ORDONNANCES: &str = "/doctors/:id/ordonnances";
}

pub mod patients {
    pub const PATIENTS: &str = "/patients";
    pub const PATIENT_BY_ID: &str = "/patients/:id";
    pub const PATIENT_CONSULTATIONS: &str = "/patients/:id/consultations";
    pub const PATIENT_ORDONNANCES: &str = "/patients/:id/ordonnances";
}

pub mod consultations {
    pub const CONSULTATIONS: &str = "/consultations";
    pub const CONSULTATION_BY_ID: &str = "/consultations/:id";
    pub const CONSULTATION_ORDONNANCES: &str = "/consultations/:id/ordonnances";
}

pub mod medicaments {
    pub const MEDICAMENTS: &str = "/medicaments";
    pub const MEDICAMENT_BY_ID: &str = "/medicaments/:id";
    pub const MEDICAMENT_ORDONNANCES: &str = "/medicaments/:id/ordonnances";
}

pub mod ordonnances {
    pub const ORDONNANCES: &str = "/ordonnances";
    pub const ORDONNANCE_BY_ID: &str = "/ordonnances/:id";
    pub const ORDONNANCE_LIGNES: &str = "/ordonnances/:id/lignes";
    pub const ORDONNANCE_LIGNE_BY_ID: &str = "/ordonnances/:id/lignes/:ligne_id";
    pub const ORDONNANCE_LINK_CONSULTATION: &str = "/ordonnances/:id/consultation/:consultation_id";
    pub const ORDONNANCE_CONSULTATION: &str = "/ordonnances/:id/consultation";
}

/// Full paths as they appear in the OpenAPI document
pub mod api {
    // Health
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";

    // Specialties
    pub const SPECIALTIES: &str = "/api/specialties";
    pub const SPECIALTY_BY_ID: &str = "/api/specialties/{id}";
    pub const SPECIALTY_DOCTORS: &str = "/api/specialties/{id}/doctors";

    // Doctors
    pub const DOCTORS: &str = "/api/doctors";
    pub const DOCTOR_BY_ID: &str = "/api/doctors/{id}";
    pub const DOCTOR_SPECIALTY: &str = "/api/doctors/{id}/specialty";
    pub const DOCTOR_CHANGE_SPECIALTY: &str = "/api/doctors/{id}/specialty/{specialty_id}";
    pub const DOCTOR_CONSULTATIONS: &str = "/api/doctors/{id}/consultations";
    pub const DOCTOR_PATIENTS: &str = "/api/doctors/{id}/patients";
    pub const DOCTOR_ORDONNANCES: &str = "/api/doctors/{id}/ordonnances";

    // Patients
    pub const PATIENTS: &str = "/api/patients";
    pub const PATIENT_BY_ID: &str = "/api/patients/{id}";
    pub const PATIENT_CONSULTATIONS: &str = "/api/patients/{id}/consultations";
    pub const PATIENT_ORDONNANCES: &str = "/api/patients/{id}/ordonnances";

    // Consultations
    pub const CONSULTATIONS: &str = "/api/consultations";
    pub const CONSULTATION_BY_ID: &str = "/api/consultations/{id}";
    pub const CONSULTATION_ORDONNANCES: &str = "/api/consultations/{id}/ordonnances";

    // Medicaments
    pub const MEDICAMENTS: &str = "/api/medicaments";
    pub const MEDICAMENT_BY_ID: &str = "/api/medicaments/{id}";
    pub const MEDICAMENT_ORDONNANCES: &str = "/api/medicaments/{id}/ordonnances";

    // Ordonnances
    pub const ORDONNANCES: &str = "/api/ordonnances";
    pub const ORDONNANCE_BY_ID: &str = "/api/ordonnances/{id}";
    pub const ORDONNANCE_LIGNES: &str = "/api/ordonnances/{id}/lignes";
    pub const ORDONNANCE_LIGNE_BY_ID: &str = "/api/ordonnances/{id}/lignes/{ligne_id}";
    pub const ORDONNANCE_LINK_CONSULTATION: &str =
        "/api/ordonnances/{id}/consultation/{consultation_id}";
    pub const ORDONNANCE_CONSULTATION: &str = "/api/ordonnances/{id}/consultation";
}

/// Location header value for a newly created resource
pub fn location(collection: &str, id: i32) -> String {
    format!("{}{}/{}", API, collection, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Convert an axum route to its OpenAPI form
    fn route_to_utoipa_path(route: &str) -> String {
        let path = route
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => format!("{{{}}}", name),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/");
        format!("{}{}", API, path)
    }

    #[test]
    fn test_documented_paths_match_routes() {
        let pairs = [
            (specialties::SPECIALTY_DOCTORS, api::SPECIALTY_DOCTORS),
            (doctors::DOCTOR_CHANGE_SPECIALTY, api::DOCTOR_CHANGE_SPECIALTY),
            (patients::PATIENT_ORDONNANCES, api::PATIENT_ORDONNANCES),
            (consultations::CONSULTATION_ORDONNANCES, api::CONSULTATION_ORDONNANCES),
            (medicaments::MEDICAMENT_BY_ID, api::MEDICAMENT_BY_ID),
            (ordonnances::ORDONNANCE_LIGNE_BY_ID, api::ORDONNANCE_LIGNE_BY_ID),
            (
                ordonnances::ORDONNANCE_LINK_CONSULTATION,
                api::ORDONNANCE_LINK_CONSULTATION,
            ),
        ];
        for (route, documented) in pairs {
            assert_eq!(route_to_utoipa_path(route), documented);
        }
    }

    #[test]
    fn test_location() {
        assert_eq!(location(specialties::SPECIALTIES, 7), "/api/specialties/7");
    }
}
