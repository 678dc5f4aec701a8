use super::{ServiceError, ServiceResult};
use crate::types::MedicamentRequest;
use crate::validation::RequestValidation;
use database_layer::{Medicament, Ordonnance, Repositories};
use tracing::{info, warn};

const DUPLICATE: &str = "A medicament with the same name already exists.";
const IN_USE: &str = "Cannot delete a medicament used in prescriptions.";

#[derive(Clone)]
pub struct MedicamentService {
    repos: Repositories,
}

impl MedicamentService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Medicament>> {
        Ok(self.repos.medicaments.list().await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Medicament> {
        self.repos
            .medicaments
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("Medicament"))
    }

    pub async fn create(&self, request: &MedicamentRequest) -> ServiceResult<Medicament> {
        request.validate()?;
        let medicament = request.normalized();

        if self.repos.medicaments.name_exists(&medicament.name, None).await? {
            warn!(name = %medicament.name, "Duplicate medicament rejected");
            return Err(ServiceError::Conflict(DUPLICATE.to_string()));
        }

        let created = self.repos.medicaments.insert(&medicament).await?;
        info!(medicament_id = created.id, name = %created.name, "Medicament created");
        Ok(created)
    }

    pub async fn update(&self, id: i32, request: &MedicamentRequest) -> ServiceResult<Medicament> {
        self.get(id).await?;
        request.validate()?;
        let medicament = request.normalized();

        if self
            .repos
            .medicaments
            .name_exists(&medicament.name, Some(id))
            .await?
        {
            warn!(medicament_id = id, name = %medicament.name, "Duplicate medicament rejected");
            return Err(ServiceError::Conflict(DUPLICATE.to_string()));
        }

        let updated = self
            .repos
            .medicaments
            .update(id, &medicament)
            .await?
            .ok_or(ServiceError::NotFound("Medicament"))?;
        info!(medicament_id = id, "Medicament updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        self.get(id).await?;
        if self.repos.medicaments.has_lines(id).await? {
            warn!(medicament_id = id, "Medicament still used by prescription lines");
            return Err(ServiceError::HasDependents(IN_USE.to_string()));
        }
        if !self.repos.medicaments.delete(id).await? {
            return Err(ServiceError::NotFound("Medicament"));
        }
        info!(medicament_id = id, "Medicament deleted");
        Ok(())
    }

    /// Ordonnances with at least one line for the medicament
    pub async fn ordonnances(&self, id: i32) -> ServiceResult<Vec<Ordonnance>> {
        self.get(id).await?;
        Ok(self.repos.ordonnances.list_by_medicament(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> MedicamentRequest {
        MedicamentRequest {
            name: name.to_string(),
            dosage_form: "Comprimé".to_string(),
            strength: "500mg".to_string(),
            atc_code: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn trailing_whitespace_does_not_make_a_new_name() {
        let service = MedicamentService::new(Repositories::in_memory());
        let created = service.create(&request("Paracetamol")).await.unwrap();
        assert_eq!(created.atc_code, None);

        let err = service.create(&request("Paracetamol  ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == DUPLICATE));

        assert!(service.create(&request("paracetamol")).await.is_ok());
    }

    #[tokio::test]
    async fn update_and_delete_unused_medicament() {
        let service = MedicamentService::new(Repositories::in_memory());
        let created = service.create(&request("Ibuprofene")).await.unwrap();

        let mut changed = request("Ibuprofene");
        changed.strength = "400mg".to_string();
        let updated = service.update(created.id, &changed).await.unwrap();
        assert_eq!(updated.strength, "400mg");

        assert!(service.ordonnances(created.id).await.unwrap().is_empty());
        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.delete(created.id).await,
            Err(ServiceError::NotFound("Medicament"))
        ));
    }
}
