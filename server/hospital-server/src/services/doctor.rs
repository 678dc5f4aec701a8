use super::{ServiceError, ServiceResult};
use crate::types::DoctorRequest;
use crate::validation::RequestValidation;
use database_layer::{
    Consultation, Doctor, NewDoctor, Ordonnance, Patient, Repositories, Specialty, VisitFilter,
};
use tracing::{info, warn};

const DUPLICATE: &str = "A doctor with same name and specialty already exists.";
const HAS_DEPENDENTS: &str = "Cannot delete a doctor with consultations or prescriptions.";

#[derive(Clone)]
pub struct DoctorService {
    repos: Repositories,
}

impl DoctorService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Doctor>> {
        Ok(self.repos.doctors.list().await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Doctor> {
        self.repos
            .doctors
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("Doctor"))
    }

    /// Reference, then natural-key checks shared by create and update
    async fn check(&self, doctor: &NewDoctor, exclude_id: Option<i32>) -> ServiceResult<()> {
        if !self.repos.specialties.exists(doctor.specialty_id).await? {
            warn!(specialty_id = doctor.specialty_id, "Doctor references a missing specialty");
            return Err(ServiceError::MissingReference(
                "Specialty does not exist.".to_string(),
            ));
        }
        if self
            .repos
            .doctors
            .identity_exists(
                &doctor.last_name,
                &doctor.first_name,
                doctor.specialty_id,
                exclude_id,
            )
            .await?
        {
            warn!(
                last_name = %doctor.last_name,
                first_name = %doctor.first_name,
                specialty_id = doctor.specialty_id,
                "Duplicate doctor rejected"
            );
            return Err(ServiceError::Conflict(DUPLICATE.to_string()));
        }
        Ok(())
    }

    pub async fn create(&self, request: &DoctorRequest) -> ServiceResult<Doctor> {
        request.validate()?;
        let doctor = request.normalized();
        self.check(&doctor, None).await?;

        let created = self.repos.doctors.insert(&doctor).await?;
        info!(doctor_id = created.id, specialty_id = created.specialty_id, "Doctor created");
        Ok(created)
    }

    pub async fn update(&self, id: i32, request: &DoctorRequest) -> ServiceResult<Doctor> {
        self.get(id).await?;
        request.validate()?;
        let doctor = request.normalized();
        self.check(&doctor, Some(id)).await?;

        let updated = self
            .repos
            .doctors
            .update(id, &doctor)
            .await?
            .ok_or(ServiceError::NotFound("Doctor"))?;
        info!(doctor_id = id, "Doctor updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        self.get(id).await?;
        if self.repos.doctors.has_dependents(id).await? {
            warn!(doctor_id = id, "Doctor still has consultations or prescriptions");
            return Err(ServiceError::HasDependents(HAS_DEPENDENTS.to_string()));
        }
        if !self.repos.doctors.delete(id).await? {
            return Err(ServiceError::NotFound("Doctor"));
        }
        info!(doctor_id = id, "Doctor deleted");
        Ok(())
    }

    pub async fn specialty(&self, id: i32) -> ServiceResult<Specialty> {
        let doctor = self.get(id).await?;
        self.repos
            .specialties
            .get(doctor.specialty_id)
            .await?
            .ok_or(ServiceError::NotFound("Specialty"))
    }

    /// Move the doctor to another specialty; both ids come from the path.
    pub async fn change_specialty(&self, id: i32, specialty_id: i32) -> ServiceResult<Doctor> {
        let current = self.get(id).await?;
        if !self.repos.specialties.exists(specialty_id).await? {
            return Err(ServiceError::NotFound("Specialty"));
        }

        let doctor = NewDoctor {
            specialty_id,
            last_name: current.last_name,
            first_name: current.first_name,
        };
        self.check(&doctor, Some(id)).await?;

        let updated = self
            .repos
            .doctors
            .update(id, &doctor)
            .await?
            .ok_or(ServiceError::NotFound("Doctor"))?;
        info!(doctor_id = id, specialty_id = specialty_id, "Doctor specialty changed");
        Ok(updated)
    }

    pub async fn consultations(&self, filter: &VisitFilter) -> ServiceResult<Vec<Consultation>> {
        if let Some(id) = filter.doctor_id {
            self.get(id).await?;
        }
        Ok(self.repos.consultations.list(filter).await?)
    }

    pub async fn patients(&self, id: i32) -> ServiceResult<Vec<Patient>> {
        self.get(id).await?;
        Ok(self.repos.doctors.patients_of(id).await?)
    }

    pub async fn ordonnances(&self, filter: &VisitFilter) -> ServiceResult<Vec<Ordonnance>> {
        if let Some(id) = filter.doctor_id {
            self.get(id).await?;
        }
        Ok(self.repos.ordonnances.list(filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use database_layer::{NewConsultation, NewOrdonnance, NewPatient, NewSpecialty};

    async fn fixture() -> (DoctorService, Repositories, Specialty) {
        let repos = Repositories::in_memory();
        let specialty = repos
            .specialties
            .insert(&NewSpecialty {
                name: "Cardiologie".to_string(),
            })
            .await
            .unwrap();
        (DoctorService::new(repos.clone()), repos, specialty)
    }

    fn request(specialty_id: i32) -> DoctorRequest {
        DoctorRequest {
            last_name: " Wilson ".to_string(),
            first_name: "James".to_string(),
            specialty_id,
        }
    }

    #[tokio::test]
    async fn duplicate_doctor_is_a_conflict() {
        let (service, _, specialty) = fixture().await;
        let created = service.create(&request(specialty.id)).await.unwrap();
        assert_eq!(created.last_name, "Wilson");

        let err = service.create(&request(specialty.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == DUPLICATE));
    }

    #[tokio::test]
    async fn missing_specialty_is_a_reference_error() {
        let (service, _, _) = fixture().await;
        let err = service.create(&request(404)).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingReference(ref m) if m == "Specialty does not exist."));
    }

    #[tokio::test]
    async fn delete_is_blocked_by_consultations() {
        let (service, repos, specialty) = fixture().await;
        let busy = service.create(&request(specialty.id)).await.unwrap();
        let idle = service
            .create(&DoctorRequest {
                last_name: "House".to_string(),
                first_name: "Gregory".to_string(),
                specialty_id: specialty.id,
            })
            .await
            .unwrap();
        let patient = repos
            .patients
            .insert(&NewPatient {
                last_name: "Dupont".to_string(),
                first_name: "Alice".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1990, 3, 12).unwrap(),
            })
            .await
            .unwrap();
        repos
            .consultations
            .insert(&NewConsultation {
                doctor_id: busy.id,
                patient_id: patient.id,
                date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                hour: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                reason: None,
            })
            .await
            .unwrap();

        let err = service.delete(busy.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::HasDependents(ref m) if m == HAS_DEPENDENTS));
        service.delete(idle.id).await.unwrap();
        assert!(matches!(service.get(idle.id).await, Err(ServiceError::NotFound("Doctor"))));

        assert_eq!(service.patients(busy.id).await.unwrap(), vec![patient]);
    }

    #[tokio::test]
    async fn delete_is_blocked_by_a_standalone_ordonnance() {
        let (service, repos, specialty) = fixture().await;
        let doctor = service.create(&request(specialty.id)).await.unwrap();
        let patient = repos
            .patients
            .insert(&NewPatient {
                last_name: "Petit".to_string(),
                first_name: "Marc".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1985, 6, 1).unwrap(),
            })
            .await
            .unwrap();
        let ordonnance = repos
            .ordonnances
            .insert(&NewOrdonnance {
                doctor_id: doctor.id,
                patient_id: patient.id,
                consultation_id: None,
                date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                notes: None,
            })
            .await
            .unwrap();

        let err = service.delete(doctor.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::HasDependents(ref m) if m == HAS_DEPENDENTS));

        repos.ordonnances.delete(ordonnance.id).await.unwrap();
        service.delete(doctor.id).await.unwrap();
    }

    #[tokio::test]
    async fn change_specialty_checks_path_and_identity() {
        let (service, repos, cardio) = fixture().await;
        let neuro = repos
            .specialties
            .insert(&NewSpecialty {
                name: "Neurologie".to_string(),
            })
            .await
            .unwrap();
        let doctor = service.create(&request(cardio.id)).await.unwrap();

        let err = service.change_specialty(doctor.id, 999).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Specialty")));

        let moved = service.change_specialty(doctor.id, neuro.id).await.unwrap();
        assert_eq!(moved.specialty_id, neuro.id);
        assert_eq!(service.specialty(doctor.id).await.unwrap(), neuro);

        service.create(&request(cardio.id)).await.unwrap();
        let err = service.change_specialty(doctor.id, cardio.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }
}
