//! Business rules for every entity
//!
//! Services sit between the handlers and the repositories. They run every
//! check (required fields, references, uniqueness, schedules, deletion
//! guards) before the first write, then hand plain records back to the HTTP
//! layer. The store constraints still back every rule, so a concurrent writer
//! that slips past a check surfaces as a [`DatabaseError`] violation.

pub mod consultation;
pub mod doctor;
pub mod medicament;
pub mod ordonnance;
pub mod ordonnance_ligne;
pub mod patient;
pub mod specialty;

pub use consultation::ConsultationService;
pub use doctor::DoctorService;
pub use medicament::MedicamentService;
pub use ordonnance::OrdonnanceService;
pub use ordonnance_ligne::OrdonnanceLigneService;
pub use patient::PatientService;
pub use specialty::SpecialtyService;

use database_layer::{DatabaseError, Repositories, VisitFilter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Rejected input (blank, out of range, too long)
    #[error("{0}")]
    Invalid(String),

    /// The addressed resource does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// An id in the request body points at nothing
    #[error("{0}")]
    MissingReference(String),

    /// Duplicate key, double booking or consultation mismatch
    #[error("{0}")]
    Conflict(String),

    /// Delete refused while other records still point at the resource
    #[error("{0}")]
    HasDependents(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Reject a filtered listing that constrains only dates.
pub fn require_party(filter: &VisitFilter) -> ServiceResult<()> {
    if !filter.is_empty() && filter.doctor_id.is_none() && filter.patient_id.is_none() {
        return Err(ServiceError::Invalid(
            "At least doctorId or patientId must be provided.".to_string(),
        ));
    }
    Ok(())
}

/// All services, built once at startup and shared through the router state
#[derive(Clone)]
pub struct Services {
    pub specialties: SpecialtyService,
    pub doctors: DoctorService,
    pub patients: PatientService,
    pub consultations: ConsultationService,
    pub medicaments: MedicamentService,
    pub ordonnances: OrdonnanceService,
    pub lignes: OrdonnanceLigneService,
}

impl Services {
    pub fn new(repos: Repositories) -> Self {
        Self {
            specialties: SpecialtyService::new(repos.clone()),
            doctors: DoctorService::new(repos.clone()),
            patients: PatientService::new(repos.clone()),
            consultations: ConsultationService::new(repos.clone()),
            medicaments: MedicamentService::new(repos.clone()),
            ordonnances: OrdonnanceService::new(repos.clone()),
            lignes: OrdonnanceLigneService::new(repos),
        }
    }
}
