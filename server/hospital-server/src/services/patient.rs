use super::{ServiceError, ServiceResult};
use crate::types::PatientRequest;
use crate::validation::RequestValidation;
use database_layer::{Consultation, NewPatient, Ordonnance, Patient, Repositories, VisitFilter};
use tracing::{info, warn};

const DUPLICATE: &str = "A patient with the same name and birth date already exists.";
const HAS_DEPENDENTS: &str = "Cannot delete a patient with consultations or prescriptions.";

#[derive(Clone)]
pub struct PatientService {
    repos: Repositories,
}

impl PatientService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Patient>> {
        Ok(self.repos.patients.list().await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Patient> {
        self.repos
            .patients
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("Patient"))
    }

    async fn check_identity(&self, patient: &NewPatient, exclude_id: Option<i32>) -> ServiceResult<()> {
        if self
            .repos
            .patients
            .identity_exists(
                &patient.last_name,
                &patient.first_name,
                patient.birth_date,
                exclude_id,
            )
            .await?
        {
            warn!(
                last_name = %patient.last_name,
                first_name = %patient.first_name,
                birth_date = %patient.birth_date,
                "Duplicate patient rejected"
            );
            return Err(ServiceError::Conflict(DUPLICATE.to_string()));
        }
        Ok(())
    }

    pub async fn create(&self, request: &PatientRequest) -> ServiceResult<Patient> {
        request.validate()?;
        let patient = request.normalized();
        self.check_identity(&patient, None).await?;

        let created = self.repos.patients.insert(&patient).await?;
        info!(patient_id = created.id, "Patient created");
        Ok(created)
    }

    pub async fn update(&self, id: i32, request: &PatientRequest) -> ServiceResult<Patient> {
        self.get(id).await?;
        request.validate()?;
        let patient = request.normalized();
        self.check_identity(&patient, Some(id)).await?;

        let updated = self
            .repos
            .patients
            .update(id, &patient)
            .await?
            .ok_or(ServiceError::NotFound("Patient"))?;
        info!(patient_id = id, "Patient updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        self.get(id).await?;
        if self.repos.patients.has_dependents(id).await? {
            warn!(patient_id = id, "Patient still has consultations or prescriptions");
            return Err(ServiceError::HasDependents(HAS_DEPENDENTS.to_string()));
        }
        if !self.repos.patients.delete(id).await? {
            return Err(ServiceError::NotFound("Patient"));
        }
        info!(patient_id = id, "Patient deleted");
        Ok(())
    }

    pub async fn consultations(&self, id: i32) -> ServiceResult<Vec<Consultation>> {
        self.get(id).await?;
        let filter = VisitFilter {
            patient_id: Some(id),
            ..VisitFilter::default()
        };
        Ok(self.repos.consultations.list(&filter).await?)
    }

    pub async fn ordonnances(&self, id: i32) -> ServiceResult<Vec<Ordonnance>> {
        self.get(id).await?;
        let filter = VisitFilter {
            patient_id: Some(id),
            ..VisitFilter::default()
        };
        Ok(self.repos.ordonnances.list(&filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use database_layer::{NewDoctor, NewOrdonnance, NewSpecialty};

    fn request(birth: (i32, u32, u32)) -> PatientRequest {
        PatientRequest {
            last_name: "Dupont".to_string(),
            first_name: "Alice".to_string(),
            birth_date: NaiveDate::from_ymd_opt(birth.0, birth.1, birth.2).unwrap(),
        }
    }

    #[tokio::test]
    async fn same_name_and_birth_date_is_a_duplicate() {
        let service = PatientService::new(Repositories::in_memory());
        service.create(&request((1990, 3, 12))).await.unwrap();

        let err = service.create(&request((1990, 3, 12))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == DUPLICATE));

        // A different birth date is another person.
        service.create(&request((1991, 3, 12))).await.unwrap();
        assert_eq!(service.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn birth_date_is_validated() {
        let service = PatientService::new(Repositories::in_memory());
        let err = service.create(&request((1850, 1, 1))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(ref m) if m == "Invalid BirthDate."));
    }

    #[tokio::test]
    async fn missing_patient_is_not_found_before_validation() {
        let service = PatientService::new(Repositories::in_memory());
        let mut invalid = request((1990, 3, 12));
        invalid.last_name = String::new();
        let err = service.update(42, &invalid).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Patient")));
        assert!(matches!(service.consultations(42).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn patient_without_dependents_can_be_deleted() {
        let service = PatientService::new(Repositories::in_memory());
        let patient = service.create(&request((2000, 11, 20))).await.unwrap();
        service.delete(patient.id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_blocked_by_a_standalone_ordonnance() {
        let repos = Repositories::in_memory();
        let service = PatientService::new(repos.clone());
        let patient = service.create(&request((1990, 3, 12))).await.unwrap();
        let specialty = repos
            .specialties
            .insert(&NewSpecialty {
                name: "Pédiatrie".to_string(),
            })
            .await
            .unwrap();
        let doctor = repos
            .doctors
            .insert(&NewDoctor {
                specialty_id: specialty.id,
                last_name: "Wilson".to_string(),
                first_name: "James".to_string(),
            })
            .await
            .unwrap();
        repos
            .ordonnances
            .insert(&NewOrdonnance {
                doctor_id: doctor.id,
                patient_id: patient.id,
                consultation_id: None,
                date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                notes: Some("Sans consultation".to_string()),
            })
            .await
            .unwrap();

        let err = service.delete(patient.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::HasDependents(ref m) if m == HAS_DEPENDENTS));
        assert_eq!(service.list().await.unwrap(), vec![patient]);
    }
}
