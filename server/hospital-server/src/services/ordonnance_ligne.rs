use super::{ServiceError, ServiceResult};
use crate::types::{CreateLigneRequest, UpdateLigneRequest};
use crate::validation::RequestValidation;
use database_layer::{NewOrdonnanceLigne, OrdonnanceLigne, Repositories};
use tracing::{info, warn};

const DUPLICATE: &str = "An identical prescription line already exists for this ordonnance.";

#[derive(Clone)]
pub struct OrdonnanceLigneService {
    repos: Repositories,
}

impl OrdonnanceLigneService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn require_ordonnance(&self, ordonnance_id: i32) -> ServiceResult<()> {
        if self.repos.ordonnances.get(ordonnance_id).await?.is_none() {
            return Err(ServiceError::NotFound("Ordonnance"));
        }
        Ok(())
    }

    async fn reject_duplicate(
        &self,
        ordonnance_id: i32,
        ligne: &NewOrdonnanceLigne,
        exclude_id: Option<i32>,
    ) -> ServiceResult<()> {
        if self
            .repos
            .lignes
            .duplicate_exists(ordonnance_id, ligne, exclude_id)
            .await?
        {
            warn!(
                ordonnance_id = ordonnance_id,
                medicament_id = ligne.medicament_id,
                "Duplicate prescription line rejected"
            );
            return Err(ServiceError::Conflict(DUPLICATE.to_string()));
        }
        Ok(())
    }

    pub async fn list(&self, ordonnance_id: i32) -> ServiceResult<Vec<OrdonnanceLigne>> {
        self.require_ordonnance(ordonnance_id).await?;
        Ok(self.repos.lignes.list(ordonnance_id).await?)
    }

    pub async fn get(&self, ordonnance_id: i32, ligne_id: i32) -> ServiceResult<OrdonnanceLigne> {
        self.repos
            .lignes
            .get(ordonnance_id, ligne_id)
            .await?
            .ok_or(ServiceError::NotFound("OrdonnanceLigne"))
    }

    pub async fn create(
        &self,
        ordonnance_id: i32,
        request: &CreateLigneRequest,
    ) -> ServiceResult<OrdonnanceLigne> {
        let fields = request.fields();
        fields.validate()?;

        self.require_ordonnance(ordonnance_id).await?;
        if !self.repos.medicaments.exists(request.medicament_id).await? {
            return Err(ServiceError::MissingReference(
                "Medicament does not exist.".to_string(),
            ));
        }

        let ligne = fields.to_new(request.medicament_id);
        self.reject_duplicate(ordonnance_id, &ligne, None).await?;

        let created = self.repos.lignes.insert(ordonnance_id, &ligne).await?;
        info!(
            ordonnance_id = ordonnance_id,
            ligne_id = created.id,
            medicament_id = created.medicament_id,
            "Prescription line added"
        );
        Ok(created)
    }

    /// Rewrite dosage, frequency, duration, quantity and instructions of a line.
    pub async fn update(
        &self,
        ordonnance_id: i32,
        ligne_id: i32,
        request: &UpdateLigneRequest,
    ) -> ServiceResult<OrdonnanceLigne> {
        let current = self.get(ordonnance_id, ligne_id).await?;
        let fields = request.fields();
        fields.validate()?;

        let ligne = fields.to_new(current.medicament_id);
        self.reject_duplicate(ordonnance_id, &ligne, Some(ligne_id)).await?;

        let updated = self
            .repos
            .lignes
            .update(ordonnance_id, ligne_id, &ligne)
            .await?
            .ok_or(ServiceError::NotFound("OrdonnanceLigne"))?;
        info!(ordonnance_id = ordonnance_id, ligne_id = ligne_id, "Prescription line updated");
        Ok(updated)
    }

    pub async fn delete(&self, ordonnance_id: i32, ligne_id: i32) -> ServiceResult<()> {
        if !self.repos.lignes.delete(ordonnance_id, ligne_id).await? {
            return Err(ServiceError::NotFound("OrdonnanceLigne"));
        }
        info!(ordonnance_id = ordonnance_id, ligne_id = ligne_id, "Prescription line removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use database_layer::{
        Medicament, NewDoctor, NewMedicament, NewOrdonnance, NewPatient, NewSpecialty, Ordonnance,
    };

    async fn fixture() -> (OrdonnanceLigneService, Ordonnance, Medicament) {
        let repos = Repositories::in_memory();
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
                last_name: "Martin".to_string(),
                first_name: "Emma".to_string(),
            })
            .await
            .unwrap();
        let patient = repos
            .patients
            .insert(&NewPatient {
                last_name: "Leroy".to_string(),
                first_name: "Thomas".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1978, 5, 1).unwrap(),
            })
            .await
            .unwrap();
        let ordonnance = repos
            .ordonnances
            .insert(&NewOrdonnance {
                doctor_id: doctor.id,
                patient_id: patient.id,
                consultation_id: None,
                date: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
                notes: None,
            })
            .await
            .unwrap();
        let medicament = repos
            .medicaments
            .insert(&NewMedicament {
                name: "Paracetamol".to_string(),
                dosage_form: "Comprimé".to_string(),
                strength: "500mg".to_string(),
                atc_code: None,
            })
            .await
            .unwrap();
        (OrdonnanceLigneService::new(repos), ordonnance, medicament)
    }

    fn request(medicament_id: i32, quantity: i32) -> CreateLigneRequest {
        CreateLigneRequest {
            medicament_id,
            dosage: " 500mg ".to_string(),
            frequency: "3x/jour".to_string(),
            duration: "3 jours".to_string(),
            quantity,
            instructions: None,
        }
    }

    #[tokio::test]
    async fn quantity_must_be_positive() {
        let (service, ordonnance, medicament) = fixture().await;
        let err = service
            .create(ordonnance.id, &request(medicament.id, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(ref m) if m == "Quantity must be greater than 0."));

        let created = service
            .create(ordonnance.id, &request(medicament.id, 1))
            .await
            .unwrap();
        assert_eq!(created.dosage, "500mg");
        assert_eq!(created.quantity, 1);
    }

    #[tokio::test]
    async fn references_are_checked_after_validation() {
        let (service, ordonnance, medicament) = fixture().await;
        let err = service.create(999, &request(medicament.id, 9)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Ordonnance")));

        let err = service.create(ordonnance.id, &request(999, 9)).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingReference(ref m) if m == "Medicament does not exist."));

        let err = service.create(999, &request(999, 0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[tokio::test]
    async fn identical_line_is_rejected_but_update_may_keep_itself() {
        let (service, ordonnance, medicament) = fixture().await;
        let line = service
            .create(ordonnance.id, &request(medicament.id, 9))
            .await
            .unwrap();
        let err = service
            .create(ordonnance.id, &request(medicament.id, 12))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == DUPLICATE));

        let updated = service
            .update(
                ordonnance.id,
                line.id,
                &UpdateLigneRequest {
                    dosage: "500mg".to_string(),
                    frequency: "3x/jour".to_string(),
                    duration: "3 jours".to_string(),
                    quantity: 12,
                    instructions: Some(" Après les repas ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.medicament_id, medicament.id);
        assert_eq!(updated.quantity, 12);
        assert_eq!(updated.instructions.as_deref(), Some("Après les repas"));
    }

    #[tokio::test]
    async fn lines_are_scoped_to_their_ordonnance() {
        let (service, ordonnance, medicament) = fixture().await;
        let line = service
            .create(ordonnance.id, &request(medicament.id, 9))
            .await
            .unwrap();
        assert!(matches!(
            service.get(ordonnance.id + 1, line.id).await,
            Err(ServiceError::NotFound("OrdonnanceLigne"))
        ));
        assert!(service.delete(ordonnance.id + 1, line.id).await.is_err());
        service.delete(ordonnance.id, line.id).await.unwrap();
        assert!(service.list(ordonnance.id).await.unwrap().is_empty());
    }
}
