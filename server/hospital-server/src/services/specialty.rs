use super::{ServiceError, ServiceResult};
use crate::types::SpecialtyRequest;
use crate::validation::RequestValidation;
use database_layer::{Doctor, Repositories, Specialty};
use tracing::{info, warn};

const DUPLICATE: &str = "A specialty with the same name already exists.";
const HAS_DOCTORS: &str = "Cannot delete a specialty with doctors.";

#[derive(Clone)]
pub struct SpecialtyService {
    repos: Repositories,
}

impl SpecialtyService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Specialty>> {
        Ok(self.repos.specialties.list().await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Specialty> {
        self.repos
            .specialties
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("Specialty"))
    }

    pub async fn create(&self, request: &SpecialtyRequest) -> ServiceResult<Specialty> {
        request.validate()?;
        let specialty = request.normalized();

        if self.repos.specialties.name_exists(&specialty.name, None).await? {
            warn!(name = %specialty.name, "Duplicate specialty rejected");
            return Err(ServiceError::Conflict(DUPLICATE.to_string()));
        }

        let created = self.repos.specialties.insert(&specialty).await?;
        info!(specialty_id = created.id, name = %created.name, "Specialty created");
        Ok(created)
    }

    pub async fn update(&self, id: i32, request: &SpecialtyRequest) -> ServiceResult<Specialty> {
        self.get(id).await?;
        request.validate()?;
        let specialty = request.normalized();

        if self
            .repos
            .specialties
            .name_exists(&specialty.name, Some(id))
            .await?
        {
            warn!(specialty_id = id, name = %specialty.name, "Duplicate specialty rejected");
            return Err(ServiceError::Conflict(DUPLICATE.to_string()));
        }

        let updated = self
            .repos
            .specialties
            .update(id, &specialty)
            .await?
            .ok_or(ServiceError::NotFound("Specialty"))?;
        info!(specialty_id = id, "Specialty updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        self.get(id).await?;
        if self.repos.specialties.has_doctors(id).await? {
            warn!(specialty_id = id, "Specialty still has doctors");
            return Err(ServiceError::HasDependents(HAS_DOCTORS.to_string()));
        }
        if !self.repos.specialties.delete(id).await? {
            return Err(ServiceError::NotFound("Specialty"));
        }
        info!(specialty_id = id, "Specialty deleted");
        Ok(())
    }

    /// Doctors practising the specialty
    pub async fn doctors(&self, id: i32) -> ServiceResult<Vec<Doctor>> {
        self.get(id).await?;
        Ok(self.repos.doctors.list_by_specialty(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database_layer::NewDoctor;

    fn request(name: &str) -> SpecialtyRequest {
        SpecialtyRequest {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn create_trims_and_rejects_duplicates() {
        let service = SpecialtyService::new(Repositories::in_memory());
        let created = service.create(&request("  Cardiologie ")).await.unwrap();
        assert_eq!(created.name, "Cardiologie");

        let err = service.create(&request("Cardiologie")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == DUPLICATE));

        // Names are compared case-sensitively.
        assert!(service.create(&request("cardiologie")).await.is_ok());
    }

    #[tokio::test]
    async fn blank_name_is_required() {
        let service = SpecialtyService::new(Repositories::in_memory());
        let err = service.create(&request("   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(ref m) if m == "Name is required."));
    }

    #[tokio::test]
    async fn update_to_own_name_is_allowed() {
        let service = SpecialtyService::new(Repositories::in_memory());
        let created = service.create(&request("Neurologie")).await.unwrap();
        let updated = service.update(created.id, &request("Neurologie")).await.unwrap();
        assert_eq!(updated, created);

        let err = service.update(999, &request("Neurologie")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Specialty")));
    }

    #[tokio::test]
    async fn delete_is_blocked_by_doctors() {
        let repos = Repositories::in_memory();
        let service = SpecialtyService::new(repos.clone());
        let empty = service.create(&request("Dermatologie")).await.unwrap();
        let staffed = service.create(&request("Cardiologie")).await.unwrap();
        repos
            .doctors
            .insert(&NewDoctor {
                specialty_id: staffed.id,
                last_name: "Wilson".to_string(),
                first_name: "James".to_string(),
            })
            .await
            .unwrap();

        service.delete(empty.id).await.unwrap();
        let err = service.delete(staffed.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::HasDependents(ref m) if m == HAS_DOCTORS));
        assert_eq!(service.doctors(staffed.id).await.unwrap().len(), 1);
    }
}
