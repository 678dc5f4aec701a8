use super::{require_party, ServiceError, ServiceResult};
use crate::types::OrdonnanceRequest;
use database_layer::{NewOrdonnance, Ordonnance, Repositories, VisitFilter};
use tracing::{info, warn};

const MISMATCH: &str = "Doctor and patient must match the linked consultation.";
const BEFORE_CONSULTATION: &str = "Prescription date cannot be earlier than the consultation date.";

#[derive(Clone)]
pub struct OrdonnanceService {
    repos: Repositories,
}

impl OrdonnanceService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self, filter: &VisitFilter) -> ServiceResult<Vec<Ordonnance>> {
        require_party(filter)?;
        Ok(self.repos.ordonnances.list(filter).await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Ordonnance> {
        self.repos
            .ordonnances
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("Ordonnance"))
    }

    /// References first, then consistency with the linked consultation
    async fn check_links(&self, ordonnance: &NewOrdonnance) -> ServiceResult<()> {
        if !self.repos.doctors.exists(ordonnance.doctor_id).await? {
            return Err(ServiceError::MissingReference("Doctor does not exist.".to_string()));
        }
        if !self.repos.patients.exists(ordonnance.patient_id).await? {
            return Err(ServiceError::MissingReference("Patient does not exist.".to_string()));
        }

        let Some(consultation_id) = ordonnance.consultation_id else {
            return Ok(());
        };
        let Some(consultation) = self.repos.consultations.get(consultation_id).await? else {
            return Err(ServiceError::MissingReference(
                "Consultation does not exist.".to_string(),
            ));
        };
        if consultation.doctor_id != ordonnance.doctor_id
            || consultation.patient_id != ordonnance.patient_id
        {
            warn!(
                consultation_id = consultation_id,
                doctor_id = ordonnance.doctor_id,
                patient_id = ordonnance.patient_id,
                "Ordonnance does not match its consultation"
            );
            return Err(ServiceError::Conflict(MISMATCH.to_string()));
        }
        if ordonnance.date < consultation.date {
            warn!(
                consultation_id = consultation_id,
                date = %ordonnance.date,
                consultation_date = %consultation.date,
                "Ordonnance dated before its consultation"
            );
            return Err(ServiceError::Conflict(BEFORE_CONSULTATION.to_string()));
        }
        Ok(())
    }

    pub async fn create(&self, request: &OrdonnanceRequest) -> ServiceResult<Ordonnance> {
        let ordonnance = request.normalized();
        self.check_links(&ordonnance).await?;

        let created = self.repos.ordonnances.insert(&ordonnance).await?;
        info!(
            ordonnance_id = created.id,
            doctor_id = created.doctor_id,
            patient_id = created.patient_id,
            consultation_id = ?created.consultation_id,
            "Ordonnance created"
        );
        Ok(created)
    }

    pub async fn update(&self, id: i32, request: &OrdonnanceRequest) -> ServiceResult<Ordonnance> {
        self.get(id).await?;
        let ordonnance = request.normalized();
        self.check_links(&ordonnance).await?;

        let updated = self
            .repos
            .ordonnances
            .update(id, &ordonnance)
            .await?
            .ok_or(ServiceError::NotFound("Ordonnance"))?;
        info!(ordonnance_id = id, "Ordonnance updated");
        Ok(updated)
    }

    /// Deletes the ordonnance together with its lines.
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        self.get(id).await?;
        if !self.repos.ordonnances.delete(id).await? {
            return Err(ServiceError::NotFound("Ordonnance"));
        }
        info!(ordonnance_id = id, "Ordonnance deleted");
        Ok(())
    }

    /// Attach to another consultation, taking over its doctor and patient.
    pub async fn link_consultation(
        &self,
        id: i32,
        consultation_id: i32,
    ) -> ServiceResult<Ordonnance> {
        let ordonnance = self.get(id).await?;
        let consultation = self
            .repos
            .consultations
            .get(consultation_id)
            .await?
            .ok_or(ServiceError::NotFound("Consultation"))?;
        if ordonnance.date < consultation.date {
            warn!(
                ordonnance_id = id,
                consultation_id = consultation_id,
                "Relink would date the ordonnance before its consultation"
            );
            return Err(ServiceError::Conflict(BEFORE_CONSULTATION.to_string()));
        }

        let linked = self
            .repos
            .ordonnances
            .link_consultation(id, &consultation)
            .await?
            .ok_or(ServiceError::NotFound("Ordonnance"))?;
        info!(ordonnance_id = id, consultation_id = consultation_id, "Ordonnance linked");
        Ok(linked)
    }

    pub async fn unlink_consultation(&self, id: i32) -> ServiceResult<Ordonnance> {
        self.get(id).await?;
        let unlinked = self
            .repos
            .ordonnances
            .unlink_consultation(id)
            .await?
            .ok_or(ServiceError::NotFound("Ordonnance"))?;
        info!(ordonnance_id = id, "Ordonnance unlinked");
        Ok(unlinked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use database_layer::{
        Consultation, NewConsultation, NewDoctor, NewPatient, NewSpecialty,
    };

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    /// Two doctors, two patients, and consultations (doctor 1, patient 1, day 15)
    /// and (doctor 2, patient 2, day 18)
    async fn fixture() -> (OrdonnanceService, Repositories, Consultation, Consultation) {
        let repos = Repositories::in_memory();
        let specialty = repos
            .specialties
            .insert(&NewSpecialty {
                name: "Neurologie".to_string(),
            })
            .await
            .unwrap();
        let mut consultations = Vec::new();
        for (n, date) in [(1, day(15)), (2, day(18))] {
            let doctor = repos
                .doctors
                .insert(&NewDoctor {
                    specialty_id: specialty.id,
                    last_name: format!("Doctor{n}"),
                    first_name: "Test".to_string(),
                })
                .await
                .unwrap();
            let patient = repos
                .patients
                .insert(&NewPatient {
                    last_name: format!("Patient{n}"),
                    first_name: "Test".to_string(),
                    birth_date: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
                })
                .await
                .unwrap();
            consultations.push(
                repos
                    .consultations
                    .insert(&NewConsultation {
                        doctor_id: doctor.id,
                        patient_id: patient.id,
                        date,
                        hour: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                        reason: None,
                    })
                    .await
                    .unwrap(),
            );
        }
        let second = consultations.pop().unwrap();
        let first = consultations.pop().unwrap();
        (OrdonnanceService::new(repos.clone()), repos, first, second)
    }

    fn request(consultation: &Consultation, date: NaiveDate) -> OrdonnanceRequest {
        OrdonnanceRequest {
            doctor_id: consultation.doctor_id,
            patient_id: consultation.patient_id,
            consultation_id: Some(consultation.id),
            date,
            notes: Some(format!("  {}", "n".repeat(300))),
        }
    }

    #[tokio::test]
    async fn linked_ordonnance_must_match_consultation() {
        let (service, _, first, second) = fixture().await;
        let mut mismatched = request(&first, day(15));
        mismatched.patient_id = second.patient_id;
        let err = service.create(&mismatched).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == MISMATCH));

        let created = service.create(&request(&first, day(15))).await.unwrap();
        assert_eq!(created.notes.map(|n| n.chars().count()), Some(255));
    }

    #[tokio::test]
    async fn ordonnance_cannot_predate_consultation() {
        let (service, _, first, _) = fixture().await;
        let err = service.create(&request(&first, day(14))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == BEFORE_CONSULTATION));
    }

    #[tokio::test]
    async fn missing_consultation_is_a_reference_error() {
        let (service, _, first, _) = fixture().await;
        let mut orphan = request(&first, day(15));
        orphan.consultation_id = Some(999);
        let err = service.create(&orphan).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingReference(ref m) if m == "Consultation does not exist."));
    }

    #[tokio::test]
    async fn relink_copies_parties_and_checks_date() {
        let (service, _, first, second) = fixture().await;
        let early = service.create(&request(&first, day(16))).await.unwrap();

        // Day 16 is before the second consultation (day 18).
        let err = service.link_consultation(early.id, second.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == BEFORE_CONSULTATION));

        let late = service.create(&request(&first, day(20))).await.unwrap();
        let relinked = service.link_consultation(late.id, second.id).await.unwrap();
        assert_eq!(relinked.doctor_id, second.doctor_id);
        assert_eq!(relinked.patient_id, second.patient_id);
        assert_eq!(relinked.consultation_id, Some(second.id));

        let err = service.link_consultation(late.id, 999).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Consultation")));

        let unlinked = service.unlink_consultation(late.id).await.unwrap();
        assert_eq!(unlinked.consultation_id, None);
    }

    #[tokio::test]
    async fn delete_cascades_to_lines() {
        let (service, repos, first, _) = fixture().await;
        let ordonnance = service.create(&request(&first, day(15))).await.unwrap();
        let medicament = repos
            .medicaments
            .insert(&database_layer::NewMedicament {
                name: "Paracetamol".to_string(),
                dosage_form: "Comprimé".to_string(),
                strength: "500mg".to_string(),
                atc_code: None,
            })
            .await
            .unwrap();
        repos
            .lignes
            .insert(
                ordonnance.id,
                &database_layer::NewOrdonnanceLigne {
                    medicament_id: medicament.id,
                    dosage: "500mg".to_string(),
                    frequency: "3x/jour".to_string(),
                    duration: "5 jours".to_string(),
                    quantity: 15,
                    instructions: None,
                },
            )
            .await
            .unwrap();

        service.delete(ordonnance.id).await.unwrap();
        assert_eq!(repos.lignes.count().await.unwrap(), 0);
        assert!(matches!(
            service.get(ordonnance.id).await,
            Err(ServiceError::NotFound("Ordonnance"))
        ));
    }
}
