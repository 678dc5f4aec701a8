//! Repository interfaces, one per entity.
//!
//! Services only see these traits. Two backends implement them:
//! [`postgres`] for production and [`memory`] for tests and database-less
//! development runs. Both enforce the same unique and foreign-key rules, so a
//! constraint that slips past a service check still surfaces as
//! [`DatabaseError::UniqueViolation`](crate::DatabaseError::UniqueViolation).

pub mod memory;
pub mod postgres;

use crate::connection::DatabasePool;
use crate::error::DatabaseResult;
use crate::models::*;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

#[async_trait]
pub trait SpecialtyRepository: Send + Sync {
    /// All specialties ordered by name
    async fn list(&self) -> DatabaseResult<Vec<Specialty>>;

    async fn get(&self, id: i32) -> DatabaseResult<Option<Specialty>>;

    async fn find_by_name(&self, name: &str) -> DatabaseResult<Option<Specialty>>;

    /// Exact, case-sensitive name match, ignoring `exclude_id`
    async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> DatabaseResult<bool>;

    async fn has_doctors(&self, id: i32) -> DatabaseResult<bool>;

    async fn count(&self) -> DatabaseResult<i64>;

    async fn insert(&self, specialty: &NewSpecialty) -> DatabaseResult<Specialty>;

    async fn update(&self, id: i32, specialty: &NewSpecialty) -> DatabaseResult<Option<Specialty>>;

    async fn delete(&self, id: i32) -> DatabaseResult<bool>;

    async fn exists(&self, id: i32) -> DatabaseResult<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// All doctors ordered by last name, then first name
    async fn list(&self) -> DatabaseResult<Vec<Doctor>>;

    async fn list_by_specialty(&self, specialty_id: i32) -> DatabaseResult<Vec<Doctor>>;

    async fn get(&self, id: i32) -> DatabaseResult<Option<Doctor>>;

    async fn identity_exists(
        &self,
        last_name: &str,
        first_name: &str,
        specialty_id: i32,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool>;

    /// True when a consultation or an ordonnance references the doctor
    async fn has_dependents(&self, id: i32) -> DatabaseResult<bool>;

    /// Distinct patients the doctor has consulted, ordered by name
    async fn patients_of(&self, id: i32) -> DatabaseResult<Vec<Patient>>;

    async fn count(&self) -> DatabaseResult<i64>;

    async fn insert(&self, doctor: &NewDoctor) -> DatabaseResult<Doctor>;

    async fn update(&self, id: i32, doctor: &NewDoctor) -> DatabaseResult<Option<Doctor>>;

    async fn delete(&self, id: i32) -> DatabaseResult<bool>;

    async fn exists(&self, id: i32) -> DatabaseResult<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// All patients ordered by last name, then first name
    async fn list(&self) -> DatabaseResult<Vec<Patient>>;

    async fn get(&self, id: i32) -> DatabaseResult<Option<Patient>>;

    async fn identity_exists(
        &self,
        last_name: &str,
        first_name: &str,
        birth_date: NaiveDate,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool>;

    /// True when a consultation or an ordonnance references the patient
    async fn has_dependents(&self, id: i32) -> DatabaseResult<bool>;

    async fn count(&self) -> DatabaseResult<i64>;

    async fn insert(&self, patient: &NewPatient) -> DatabaseResult<Patient>;

    async fn update(&self, id: i32, patient: &NewPatient) -> DatabaseResult<Option<Patient>>;

    async fn delete(&self, id: i32) -> DatabaseResult<bool>;

    async fn exists(&self, id: i32) -> DatabaseResult<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

#[async_trait]
pub trait ConsultationRepository: Send + Sync {
    /// Matching consultations ordered by date, then hour
    async fn list(&self, filter: &VisitFilter) -> DatabaseResult<Vec<Consultation>>;

    async fn get(&self, id: i32) -> DatabaseResult<Option<Consultation>>;

    async fn doctor_slot_taken(
        &self,
        doctor_id: i32,
        date: NaiveDate,
        hour: NaiveTime,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool>;

    async fn patient_slot_taken(
        &self,
        patient_id: i32,
        date: NaiveDate,
        hour: NaiveTime,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool>;

    async fn has_ordonnances(&self, id: i32) -> DatabaseResult<bool>;

    async fn count(&self) -> DatabaseResult<i64>;

    async fn insert(&self, consultation: &NewConsultation) -> DatabaseResult<Consultation>;

    async fn update(
        &self,
        id: i32,
        consultation: &NewConsultation,
    ) -> DatabaseResult<Option<Consultation>>;

    async fn delete(&self, id: i32) -> DatabaseResult<bool>;
}

#[async_trait]
pub trait MedicamentRepository: Send + Sync {
    /// All medicaments ordered by name
    async fn list(&self) -> DatabaseResult<Vec<Medicament>>;

    async fn get(&self, id: i32) -> DatabaseResult<Option<Medicament>>;

    async fn find_by_name(&self, name: &str) -> DatabaseResult<Option<Medicament>>;

    async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> DatabaseResult<bool>;

    async fn has_lines(&self, id: i32) -> DatabaseResult<bool>;

    async fn count(&self) -> DatabaseResult<i64>;

    async fn insert(&self, medicament: &NewMedicament) -> DatabaseResult<Medicament>;

    async fn update(
        &self,
        id: i32,
        medicament: &NewMedicament,
    ) -> DatabaseResult<Option<Medicament>>;

    async fn delete(&self, id: i32) -> DatabaseResult<bool>;

    async fn exists(&self, id: i32) -> DatabaseResult<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

#[async_trait]
pub trait OrdonnanceRepository: Send + Sync {
    /// Matching ordonnances ordered by date, then id
    async fn list(&self, filter: &VisitFilter) -> DatabaseResult<Vec<Ordonnance>>;

    async fn list_by_consultation(&self, consultation_id: i32) -> DatabaseResult<Vec<Ordonnance>>;

    /// Distinct ordonnances with at least one line for the medicament
    async fn list_by_medicament(&self, medicament_id: i32) -> DatabaseResult<Vec<Ordonnance>>;

    async fn get(&self, id: i32) -> DatabaseResult<Option<Ordonnance>>;

    async fn count(&self) -> DatabaseResult<i64>;

    async fn insert(&self, ordonnance: &NewOrdonnance) -> DatabaseResult<Ordonnance>;

    async fn update(
        &self,
        id: i32,
        ordonnance: &NewOrdonnance,
    ) -> DatabaseResult<Option<Ordonnance>>;

    /// Point the ordonnance at `consultation`, copying its doctor and patient.
    async fn link_consultation(
        &self,
        id: i32,
        consultation: &Consultation,
    ) -> DatabaseResult<Option<Ordonnance>>;

    async fn unlink_consultation(&self, id: i32) -> DatabaseResult<Option<Ordonnance>>;

    /// Removes the ordonnance; its lines go with it.
    async fn delete(&self, id: i32) -> DatabaseResult<bool>;
}

#[async_trait]
pub trait OrdonnanceLigneRepository: Send + Sync {
    /// Lines of one ordonnance in insertion order
    async fn list(&self, ordonnance_id: i32) -> DatabaseResult<Vec<OrdonnanceLigne>>;

    async fn get(&self, ordonnance_id: i32, ligne_id: i32)
        -> DatabaseResult<Option<OrdonnanceLigne>>;

    async fn duplicate_exists(
        &self,
        ordonnance_id: i32,
        ligne: &NewOrdonnanceLigne,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool>;

    async fn count(&self) -> DatabaseResult<i64>;

    async fn insert(
        &self,
        ordonnance_id: i32,
        ligne: &NewOrdonnanceLigne,
    ) -> DatabaseResult<OrdonnanceLigne>;

    async fn update(
        &self,
        ordonnance_id: i32,
        ligne_id: i32,
        ligne: &NewOrdonnanceLigne,
    ) -> DatabaseResult<Option<OrdonnanceLigne>>;

    async fn delete(&self, ordonnance_id: i32, ligne_id: i32) -> DatabaseResult<bool>;
}

/// Every repository behind one cloneable handle
#[derive(Clone)]
pub struct Repositories {
    pub specialties: Arc<dyn SpecialtyRepository>,
    pub doctors: Arc<dyn DoctorRepository>,
    pub patients: Arc<dyn PatientRepository>,
    pub consultations: Arc<dyn ConsultationRepository>,
    pub medicaments: Arc<dyn MedicamentRepository>,
    pub ordonnances: Arc<dyn OrdonnanceRepository>,
    pub lignes: Arc<dyn OrdonnanceLigneRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(database: &DatabasePool) -> Self {
        let pool = database.pool().clone();
        Self {
            specialties: Arc::new(postgres::PgSpecialtyRepository::new(pool.clone())),
            doctors: Arc::new(postgres::PgDoctorRepository::new(pool.clone())),
            patients: Arc::new(postgres::PgPatientRepository::new(pool.clone())),
            consultations: Arc::new(postgres::PgConsultationRepository::new(pool.clone())),
            medicaments: Arc::new(postgres::PgMedicamentRepository::new(pool.clone())),
            ordonnances: Arc::new(postgres::PgOrdonnanceRepository::new(pool.clone())),
            lignes: Arc::new(postgres::PgOrdonnanceLigneRepository::new(pool)),
        }
    }

    /// Process-local repositories over a fresh [`memory::InMemoryStore`]
    pub fn in_memory() -> Self {
        let store = memory::InMemoryStore::new();
        Self {
            specialties: Arc::new(store.clone()),
            doctors: Arc::new(store.clone()),
            patients: Arc::new(store.clone()),
            consultations: Arc::new(store.clone()),
            medicaments: Arc::new(store.clone()),
            ordonnances: Arc::new(store.clone()),
            lignes: Arc::new(store),
        }
    }
}
