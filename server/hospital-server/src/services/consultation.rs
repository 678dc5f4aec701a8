use super::{require_party, ServiceError, ServiceResult};
use crate::services::OrdonnanceService;
use crate::types::{ConsultationOrdonnanceRequest, ConsultationRequest, OrdonnanceRequest};
use database_layer::{Consultation, NewConsultation, Ordonnance, Repositories, VisitFilter};
use tracing::{info, warn};

const DOCTOR_BUSY: &str = "The doctor already has a consultation at this date and time.";
const PATIENT_BUSY: &str = "The patient already has a consultation at this date and time.";
const HAS_ORDONNANCES: &str = "Cannot delete a consultation with prescriptions.";
const LINKED_PARTIES: &str =
    "Cannot change the doctor or patient of a consultation with prescriptions.";
const LINKED_DATE: &str =
    "Consultation date cannot be later than the date of its prescriptions.";

#[derive(Clone)]
pub struct ConsultationService {
    repos: Repositories,
}

impl ConsultationService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Full list when `filter` is empty, otherwise the matching consultations
    pub async fn list(&self, filter: &VisitFilter) -> ServiceResult<Vec<Consultation>> {
        require_party(filter)?;
        Ok(self.repos.consultations.list(filter).await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Consultation> {
        self.repos
            .consultations
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("Consultation"))
    }

    /// Reference checks, then both double-booking checks
    async fn check_schedule(
        &self,
        consultation: &NewConsultation,
        exclude_id: Option<i32>,
    ) -> ServiceResult<()> {
        if !self.repos.doctors.exists(consultation.doctor_id).await? {
            return Err(ServiceError::MissingReference("Doctor does not exist.".to_string()));
        }
        if !self.repos.patients.exists(consultation.patient_id).await? {
            return Err(ServiceError::MissingReference("Patient does not exist.".to_string()));
        }
        if self
            .repos
            .consultations
            .doctor_slot_taken(
                consultation.doctor_id,
                consultation.date,
                consultation.hour,
                exclude_id,
            )
            .await?
        {
            warn!(
                doctor_id = consultation.doctor_id,
                date = %consultation.date,
                hour = %consultation.hour,
                "Doctor double booking rejected"
            );
            return Err(ServiceError::Conflict(DOCTOR_BUSY.to_string()));
        }
        if self
            .repos
            .consultations
            .patient_slot_taken(
                consultation.patient_id,
                consultation.date,
                consultation.hour,
                exclude_id,
            )
            .await?
        {
            warn!(
                patient_id = consultation.patient_id,
                date = %consultation.date,
                hour = %consultation.hour,
                "Patient double booking rejected"
            );
            return Err(ServiceError::Conflict(PATIENT_BUSY.to_string()));
        }
        Ok(())
    }

    /// Linked ordonnances must keep matching the consultation they point to
    async fn check_linked_ordonnances(
        &self,
        id: i32,
        consultation: &NewConsultation,
    ) -> ServiceResult<()> {
        let linked = self.repos.ordonnances.list_by_consultation(id).await?;
        for ordonnance in &linked {
            if ordonnance.doctor_id != consultation.doctor_id
                || ordonnance.patient_id != consultation.patient_id
            {
                warn!(
                    consultation_id = id,
                    ordonnance_id = ordonnance.id,
                    "Consultation update would detach its prescriptions"
                );
                return Err(ServiceError::Conflict(LINKED_PARTIES.to_string()));
            }
            if ordonnance.date < consultation.date {
                warn!(
                    consultation_id = id,
                    ordonnance_id = ordonnance.id,
                    date = %consultation.date,
                    "Consultation moved after its prescriptions"
                );
                return Err(ServiceError::Conflict(LINKED_DATE.to_string()));
            }
        }
        Ok(())
    }

    pub async fn create(&self, request: &ConsultationRequest) -> ServiceResult<Consultation> {
        let consultation = request.normalized();
        self.check_schedule(&consultation, None).await?;

        let created = self.repos.consultations.insert(&consultation).await?;
        info!(
            consultation_id = created.id,
            doctor_id = created.doctor_id,
            patient_id = created.patient_id,
            "Consultation created"
        );
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i32,
        request: &ConsultationRequest,
    ) -> ServiceResult<Consultation> {
        self.get(id).await?;
        let consultation = request.normalized();
        self.check_schedule(&consultation, Some(id)).await?;
        self.check_linked_ordonnances(id, &consultation).await?;

        let updated = self
            .repos
            .consultations
            .update(id, &consultation)
            .await?
            .ok_or(ServiceError::NotFound("Consultation"))?;
        info!(consultation_id = id, "Consultation updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        self.get(id).await?;
        if self.repos.consultations.has_ordonnances(id).await? {
            warn!(consultation_id = id, "Consultation still has prescriptions");
            return Err(ServiceError::HasDependents(HAS_ORDONNANCES.to_string()));
        }
        if !self.repos.consultations.delete(id).await? {
            return Err(ServiceError::NotFound("Consultation"));
        }
        info!(consultation_id = id, "Consultation deleted");
        Ok(())
    }

    pub async fn ordonnances(&self, id: i32) -> ServiceResult<Vec<Ordonnance>> {
        self.get(id).await?;
        Ok(self.repos.ordonnances.list_by_consultation(id).await?)
    }

    /// Issue an ordonnance for the consultation's doctor and patient.
    pub async fn create_ordonnance(
        &self,
        id: i32,
        request: &ConsultationOrdonnanceRequest,
    ) -> ServiceResult<Ordonnance> {
        let consultation = self.get(id).await?;
        let ordonnance = OrdonnanceRequest {
            doctor_id: consultation.doctor_id,
            patient_id: consultation.patient_id,
            consultation_id: Some(consultation.id),
            date: request.date,
            notes: request.notes.clone(),
        };
        OrdonnanceService::new(self.repos.clone())
            .create(&ordonnance)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use database_layer::{Doctor, NewDoctor, NewPatient, NewSpecialty, Patient};

    struct Fixture {
        service: ConsultationService,
        wilson: Doctor,
        house: Doctor,
        alice: Patient,
        marc: Patient,
    }

    async fn fixture() -> Fixture {
        let repos = Repositories::in_memory();
        let specialty = repos
            .specialties
            .insert(&NewSpecialty {
                name: "Cardiologie".to_string(),
            })
            .await
            .unwrap();
        let mut doctors = Vec::new();
        for (last, first) in [("Wilson", "James"), ("House", "Gregory")] {
            doctors.push(
                repos
                    .doctors
                    .insert(&NewDoctor {
                        specialty_id: specialty.id,
                        last_name: last.to_string(),
                        first_name: first.to_string(),
                    })
                    .await
                    .unwrap(),
            );
        }
        let mut patients = Vec::new();
        for (last, first) in [("Dupont", "Alice"), ("Petit", "Marc")] {
            patients.push(
                repos
                    .patients
                    .insert(&NewPatient {
                        last_name: last.to_string(),
                        first_name: first.to_string(),
                        birth_date: NaiveDate::from_ymd_opt(1990, 3, 12).unwrap(),
                    })
                    .await
                    .unwrap(),
            );
        }
        let marc = patients.pop().unwrap();
        let alice = patients.pop().unwrap();
        let house = doctors.pop().unwrap();
        let wilson = doctors.pop().unwrap();
        Fixture {
            service: ConsultationService::new(repos),
            wilson,
            house,
            alice,
            marc,
        }
    }

    fn slot(doctor: &Doctor, patient: &Patient, hour: u32) -> ConsultationRequest {
        ConsultationRequest {
            doctor_id: doctor.id,
            patient_id: patient.id,
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            hour: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            reason: Some("  Contrôle  ".to_string()),
        }
    }

    #[tokio::test]
    async fn doctor_cannot_be_double_booked() {
        let f = fixture().await;
        let created = f.service.create(&slot(&f.wilson, &f.alice, 9)).await.unwrap();
        assert_eq!(created.reason.as_deref(), Some("Contrôle"));

        let err = f.service.create(&slot(&f.wilson, &f.marc, 9)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == DOCTOR_BUSY));
    }

    #[tokio::test]
    async fn patient_cannot_be_double_booked() {
        let f = fixture().await;
        f.service.create(&slot(&f.wilson, &f.alice, 9)).await.unwrap();
        let err = f.service.create(&slot(&f.house, &f.alice, 9)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == PATIENT_BUSY));
    }

    #[tokio::test]
    async fn update_to_own_slot_succeeds() {
        let f = fixture().await;
        let created = f.service.create(&slot(&f.wilson, &f.alice, 9)).await.unwrap();
        let mut request = slot(&f.wilson, &f.alice, 9);
        request.reason = None;
        let updated = f.service.update(created.id, &request).await.unwrap();
        assert_eq!(updated.reason, None);
    }

    #[tokio::test]
    async fn unknown_doctor_is_checked_before_patient() {
        let f = fixture().await;
        let mut request = slot(&f.wilson, &f.alice, 9);
        request.doctor_id = 999;
        request.patient_id = 999;
        let err = f.service.create(&request).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingReference(ref m) if m == "Doctor does not exist."));
    }

    #[tokio::test]
    async fn filter_requires_doctor_or_patient() {
        let f = fixture().await;
        f.service.create(&slot(&f.wilson, &f.alice, 9)).await.unwrap();
        f.service.create(&slot(&f.house, &f.marc, 10)).await.unwrap();

        assert_eq!(f.service.list(&VisitFilter::default()).await.unwrap().len(), 2);
        let by_patient = VisitFilter {
            patient_id: Some(f.marc.id),
            ..VisitFilter::default()
        };
        assert_eq!(f.service.list(&by_patient).await.unwrap().len(), 1);

        let dates_only = VisitFilter {
            from: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..VisitFilter::default()
        };
        assert!(matches!(
            f.service.list(&dates_only).await,
            Err(ServiceError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_blocked_by_ordonnances() {
        let f = fixture().await;
        let consultation = f.service.create(&slot(&f.wilson, &f.alice, 9)).await.unwrap();
        let ordonnance = f
            .service
            .create_ordonnance(
                consultation.id,
                &ConsultationOrdonnanceRequest {
                    date: consultation.date,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(ordonnance.doctor_id, f.wilson.id);
        assert_eq!(ordonnance.consultation_id, Some(consultation.id));

        let err = f.service.delete(consultation.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::HasDependents(ref m) if m == HAS_ORDONNANCES));
        assert_eq!(f.service.ordonnances(consultation.id).await.unwrap(), vec![ordonnance]);
    }

    #[tokio::test]
    async fn update_keeps_linked_ordonnances_consistent() {
        let f = fixture().await;
        let consultation = f.service.create(&slot(&f.wilson, &f.alice, 9)).await.unwrap();
        f.service
            .create_ordonnance(
                consultation.id,
                &ConsultationOrdonnanceRequest {
                    date: consultation.date,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let err = f
            .service
            .update(consultation.id, &slot(&f.house, &f.alice, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == LINKED_PARTIES));

        let mut later = slot(&f.wilson, &f.alice, 9);
        later.date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let err = f.service.update(consultation.id, &later).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == LINKED_DATE));

        let mut earlier = slot(&f.wilson, &f.alice, 11);
        earlier.date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let moved = f.service.update(consultation.id, &earlier).await.unwrap();
        assert_eq!(moved.date, earlier.date);

        let current = f.service.get(consultation.id).await.unwrap();
        assert_eq!(current.doctor_id, f.wilson.id);
    }
}
