//! Create and update payloads
//!
//! String fields default to empty so that a missing field is reported by
//! validation ("X is required.") instead of by the JSON extractor.

use crate::services::ServiceError;
use crate::validation::{clip, clip_optional, trim_optional, RequestValidation};
use crate::{validate_field, validate_length, validate_required};
use chrono::{NaiveDate, NaiveTime};
use database_layer::models::hour_format;
use database_layer::{
    NewConsultation, NewDoctor, NewMedicament, NewOrdonnance, NewOrdonnanceLigne, NewPatient,
    NewSpecialty,
};
use serde::Deserialize;
use utoipa::ToSchema;

pub const NAME_MAX: usize = 30;
pub const REASON_MAX: usize = 100;
pub const MEDICAMENT_NAME_MAX: usize = 100;
pub const DOSAGE_FORM_MAX: usize = 30;
pub const STRENGTH_MAX: usize = 30;
pub const ATC_CODE_MAX: usize = 20;
pub const NOTES_MAX: usize = 255;
pub const DOSAGE_MAX: usize = 50;
pub const FREQUENCY_MAX: usize = 50;
pub const DURATION_MAX: usize = 30;
pub const INSTRUCTIONS_MAX: usize = 255;

// ============================================================================
// SPECIALTIES
// ============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyRequest {
    #[serde(default)]
    #[schema(example = "Cardiologie")]
    pub name: String,
}

impl RequestValidation for SpecialtyRequest {
    fn validate(&self) -> Result<(), ServiceError> {
        validate_required!(self.name, "Name is required.");
        Ok(())
    }
}

impl SpecialtyRequest {
    pub fn normalized(&self) -> NewSpecialty {
        NewSpecialty {
            name: clip(&self.name, NAME_MAX),
        }
    }
}

// ============================================================================
// DOCTORS
// ============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRequest {
    #[serde(default)]
    #[schema(example = "Wilson")]
    pub last_name: String,
    #[serde(default)]
    #[schema(example = "James")]
    pub first_name: String,
    pub specialty_id: i32,
}

impl RequestValidation for DoctorRequest {
    fn validate(&self) -> Result<(), ServiceError> {
        validate_required!(self.last_name, "LastName is required.");
        validate_required!(self.first_name, "FirstName is required.");
        Ok(())
    }
}

impl DoctorRequest {
    pub fn normalized(&self) -> NewDoctor {
        NewDoctor {
            specialty_id: self.specialty_id,
            last_name: clip(&self.last_name, NAME_MAX),
            first_name: clip(&self.first_name, NAME_MAX),
        }
    }
}

// ============================================================================
// PATIENTS
// ============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRequest {
    #[serde(default)]
    #[schema(example = "Dupont")]
    pub last_name: String,
    #[serde(default)]
    #[schema(example = "Alice")]
    pub first_name: String,
    #[schema(value_type = String, format = Date, example = "1990-03-12")]
    pub birth_date: NaiveDate,
}

/// Earliest accepted birth date
pub fn min_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

impl RequestValidation for PatientRequest {
    fn validate(&self) -> Result<(), ServiceError> {
        validate_required!(self.last_name, "LastName is required.");
        validate_required!(self.first_name, "FirstName is required.");
        let today = chrono::Local::now().date_naive();
        validate_field!(
            self.birth_date,
            self.birth_date >= min_birth_date() && self.birth_date <= today,
            "Invalid BirthDate."
        );
        Ok(())
    }
}

impl PatientRequest {
    pub fn normalized(&self) -> NewPatient {
        NewPatient {
            last_name: clip(&self.last_name, NAME_MAX),
            first_name: clip(&self.first_name, NAME_MAX),
            birth_date: self.birth_date,
        }
    }
}

// ============================================================================
// CONSULTATIONS
// ============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    pub doctor_id: i32,
    pub patient_id: i32,
    #[schema(value_type = String, format = Date, example = "2025-01-15")]
    pub date: NaiveDate,
    #[serde(with = "hour_format")]
    #[schema(value_type = String, example = "09:00")]
    pub hour: NaiveTime,
    #[schema(example = "Douleurs thoraciques")]
    pub reason: Option<String>,
}

impl ConsultationRequest {
    pub fn normalized(&self) -> NewConsultation {
        NewConsultation {
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            date: self.date,
            hour: self.hour,
            reason: clip_optional(self.reason.as_deref(), REASON_MAX),
        }
    }
}

// ============================================================================
// MEDICAMENTS
// ============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicamentRequest {
    #[serde(default)]
    #[schema(example = "Paracetamol")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Comprimé")]
    pub dosage_form: String,
    #[serde(default)]
    #[schema(example = "500mg")]
    pub strength: String,
    #[schema(example = "N02BE01")]
    pub atc_code: Option<String>,
}

impl RequestValidation for MedicamentRequest {
    fn validate(&self) -> Result<(), ServiceError> {
        validate_required!(self.name, "Name is required.");
        validate_required!(self.dosage_form, "DosageForm is required.");
        validate_required!(self.strength, "Strength is required.");
        Ok(())
    }
}

impl MedicamentRequest {
    pub fn normalized(&self) -> NewMedicament {
        NewMedicament {
            name: clip(&self.name, MEDICAMENT_NAME_MAX),
            dosage_form: clip(&self.dosage_form, DOSAGE_FORM_MAX),
            strength: clip(&self.strength, STRENGTH_MAX),
            atc_code: clip_optional(self.atc_code.as_deref(), ATC_CODE_MAX),
        }
    }
}

// ============================================================================
// ORDONNANCES
// ============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrdonnanceRequest {
    pub doctor_id: i32,
    pub patient_id: i32,
    pub consultation_id: Option<i32>,
    #[schema(value_type = String, format = Date, example = "2025-01-15")]
    pub date: NaiveDate,
    #[schema(example = "Traitement initial")]
    pub notes: Option<String>,
}

impl OrdonnanceRequest {
    pub fn normalized(&self) -> NewOrdonnance {
        NewOrdonnance {
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            consultation_id: self.consultation_id,
            date: self.date,
            notes: clip_optional(self.notes.as_deref(), NOTES_MAX),
        }
    }
}

/// Body of `POST /consultations/{id}/ordonnances`; doctor and patient come from the consultation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationOrdonnanceRequest {
    #[schema(value_type = String, format = Date, example = "2025-01-15")]
    pub date: NaiveDate,
    pub notes: Option<String>,
}

// ============================================================================
// ORDONNANCE LIGNES
// ============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLigneRequest {
    pub medicament_id: i32,
    #[serde(default)]
    #[schema(example = "500mg")]
    pub dosage: String,
    #[serde(default)]
    #[schema(example = "3x/jour")]
    pub frequency: String,
    #[serde(default)]
    #[schema(example = "5 jours")]
    pub duration: String,
    #[schema(example = 15)]
    pub quantity: i32,
    pub instructions: Option<String>,
}

/// Line update; the medicament of an existing line never changes.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLigneRequest {
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    pub quantity: i32,
    pub instructions: Option<String>,
}

/// Line fields shared by create and update
#[derive(Debug, Clone, Copy)]
pub struct LigneFields<'a> {
    pub dosage: &'a str,
    pub frequency: &'a str,
    pub duration: &'a str,
    pub quantity: i32,
    pub instructions: Option<&'a str>,
}

impl RequestValidation for LigneFields<'_> {
    fn validate(&self) -> Result<(), ServiceError> {
        validate_required!(self.dosage, "Dosage is required.");
        validate_required!(self.frequency, "Frequency is required.");
        validate_required!(self.duration, "Duration is required.");
        validate_field!(self.quantity, self.quantity > 0, "Quantity must be greater than 0.");
        validate_length!(self.dosage, DOSAGE_MAX, "Dosage must be at most 50 characters.");
        validate_length!(self.frequency, FREQUENCY_MAX, "Frequency must be at most 50 characters.");
        validate_length!(self.duration, DURATION_MAX, "Duration must be at most 30 characters.");
        if let Some(instructions) = self.instructions {
            validate_length!(
                instructions,
                INSTRUCTIONS_MAX,
                "Instructions must be at most 255 characters."
            );
        }
        Ok(())
    }
}

impl LigneFields<'_> {
    /// Build the line to store; call after [`RequestValidation::validate`].
    pub fn to_new(self, medicament_id: i32) -> NewOrdonnanceLigne {
        NewOrdonnanceLigne {
            medicament_id,
            dosage: self.dosage.trim().to_string(),
            frequency: self.frequency.trim().to_string(),
            duration: self.duration.trim().to_string(),
            quantity: self.quantity,
            instructions: trim_optional(self.instructions),
        }
    }
}

impl CreateLigneRequest {
    pub fn fields(&self) -> LigneFields<'_> {
        LigneFields {
            dosage: &self.dosage,
            frequency: &self.frequency,
            duration: &self.duration,
            quantity: self.quantity,
            instructions: self.instructions.as_deref(),
        }
    }
}

impl UpdateLigneRequest {
    pub fn fields(&self) -> LigneFields<'_> {
        LigneFields {
            dosage: &self.dosage,
            frequency: &self.frequency,
            duration: &self.duration,
            quantity: self.quantity,
            instructions: self.instructions.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(result: Result<(), ServiceError>) -> String {
        match result {
            Err(ServiceError::Invalid(message)) => message,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn specialty_name_is_trimmed_and_clipped() {
        let request = SpecialtyRequest {
            name: format!("  {}  ", "x".repeat(40)),
        };
        assert!(request.validate().is_ok());
        assert_eq!(request.normalized().name.chars().count(), NAME_MAX);
    }

    #[test]
    fn blank_doctor_names_are_required() {
        let request = DoctorRequest {
            last_name: "Wilson".to_string(),
            first_name: "  ".to_string(),
            specialty_id: 1,
        };
        assert_eq!(invalid(request.validate()), "FirstName is required.");
    }

    #[test]
    fn birth_date_must_be_within_range() {
        let mut request = PatientRequest {
            last_name: "Dupont".to_string(),
            first_name: "Alice".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1899, 12, 31).unwrap(),
        };
        assert_eq!(invalid(request.validate()), "Invalid BirthDate.");

        request.birth_date = min_birth_date();
        assert!(request.validate().is_ok());

        request.birth_date = chrono::Local::now().date_naive() + chrono::Days::new(1);
        assert_eq!(invalid(request.validate()), "Invalid BirthDate.");
    }

    #[test]
    fn blank_reason_is_dropped() {
        let request = ConsultationRequest {
            doctor_id: 1,
            patient_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            hour: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            reason: Some("   ".to_string()),
        };
        assert_eq!(request.normalized().reason, None);
    }

    #[test]
    fn medicament_fields_are_required_in_order() {
        let request = MedicamentRequest {
            name: "Paracetamol".to_string(),
            dosage_form: String::new(),
            strength: String::new(),
            atc_code: None,
        };
        assert_eq!(invalid(request.validate()), "DosageForm is required.");
    }

    #[test]
    fn line_checks_required_before_quantity_before_length() {
        let mut request = CreateLigneRequest {
            medicament_id: 1,
            dosage: " ".to_string(),
            frequency: "3x/jour".to_string(),
            duration: "x".repeat(31),
            quantity: 0,
            instructions: None,
        };
        assert_eq!(invalid(request.fields().validate()), "Dosage is required.");

        request.dosage = "500mg".to_string();
        assert_eq!(invalid(request.fields().validate()), "Quantity must be greater than 0.");

        request.quantity = 1;
        assert_eq!(
            invalid(request.fields().validate()),
            "Duration must be at most 30 characters."
        );

        request.duration = "5 jours".to_string();
        request.instructions = Some("y".repeat(256));
        assert_eq!(
            invalid(request.fields().validate()),
            "Instructions must be at most 255 characters."
        );
    }

    #[test]
    fn line_lengths_count_after_trimming() {
        let request = CreateLigneRequest {
            medicament_id: 1,
            dosage: format!("  {}  ", "d".repeat(50)),
            frequency: "3x/jour".to_string(),
            duration: "5 jours".to_string(),
            quantity: 1,
            instructions: Some("   ".to_string()),
        };
        assert!(request.fields().validate().is_ok());
        let line = request.fields().to_new(request.medicament_id);
        assert_eq!(line.dosage.len(), 50);
        assert_eq!(line.instructions, None);
    }

    #[test]
    fn missing_name_deserializes_as_blank() {
        let request: SpecialtyRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(invalid(request.validate()), "Name is required.");
    }

    #[test]
    fn hour_accepts_seconds() {
        let request: ConsultationRequest = serde_json::from_value(serde_json::json!({
            "doctorId": 1,
            "patientId": 2,
            "date": "2025-01-15",
            "hour": "09:30:00"
        }))
        .unwrap();
        assert_eq!(request.hour, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(request.reason, None);
    }
}
