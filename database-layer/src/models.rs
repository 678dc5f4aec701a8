// Database models
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Medical specialization practised by doctors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Specialty {
    pub id: i32,
    #[schema(example = "Cardiologie")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSpecialty {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: i32,
    pub specialty_id: i32,
    #[schema(example = "Wilson")]
    pub last_name: String,
    #[schema(example = "James")]
    pub first_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDoctor {
    pub specialty_id: i32,
    pub last_name: String,
    pub first_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i32,
    #[schema(example = "Dupont")]
    pub last_name: String,
    #[schema(example = "Alice")]
    pub first_name: String,
    #[schema(value_type = String, format = Date, example = "1990-03-12")]
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub last_name: String,
    pub first_name: String,
    pub birth_date: NaiveDate,
}

/// A doctor seeing a patient at a given date and hour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub id: i32,
    pub doctor_id: i32,
    pub patient_id: i32,
    #[schema(value_type = String, format = Date, example = "2025-01-15")]
    pub date: NaiveDate,
    #[serde(with = "hour_format")]
    #[schema(value_type = String, example = "09:00")]
    pub hour: NaiveTime,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConsultation {
    pub doctor_id: i32,
    pub patient_id: i32,
    pub date: NaiveDate,
    pub hour: NaiveTime,
    pub reason: Option<String>,
}

/// Medication catalogue entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Medicament {
    pub id: i32,
    #[schema(example = "Paracetamol")]
    pub name: String,
    #[schema(example = "Comprimé")]
    pub dosage_form: String,
    #[schema(example = "500mg")]
    pub strength: String,
    #[schema(example = "N02BE01")]
    pub atc_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedicament {
    pub name: String,
    pub dosage_form: String,
    pub strength: String,
    pub atc_code: Option<String>,
}

/// Prescription issued by a doctor to a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ordonnance {
    pub id: i32,
    pub doctor_id: i32,
    pub patient_id: i32,
    pub consultation_id: Option<i32>,
    #[schema(value_type = String, format = Date, example = "2025-01-15")]
    pub date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrdonnance {
    pub doctor_id: i32,
    pub patient_id: i32,
    pub consultation_id: Option<i32>,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

/// Single medication entry of an ordonnance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrdonnanceLigne {
    pub id: i32,
    pub ordonnance_id: i32,
    pub medicament_id: i32,
    #[schema(example = "500mg")]
    pub dosage: String,
    #[schema(example = "3x/jour")]
    pub frequency: String,
    #[schema(example = "5 jours")]
    pub duration: String,
    #[schema(example = 15)]
    pub quantity: i32,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrdonnanceLigne {
    pub medicament_id: i32,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub quantity: i32,
    pub instructions: Option<String>,
}

/// Filter shared by consultation and ordonnance listings.
///
/// Date bounds are inclusive; `None` fields do not constrain the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitFilter {
    pub doctor_id: Option<i32>,
    pub patient_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl VisitFilter {
    pub fn is_empty(&self) -> bool {
        self.doctor_id.is_none()
            && self.patient_id.is_none()
            && self.from.is_none()
            && self.to.is_none()
    }

    pub fn matches(&self, doctor_id: i32, patient_id: i32, date: NaiveDate) -> bool {
        self.doctor_id.map_or(true, |id| id == doctor_id)
            && self.patient_id.map_or(true, |id| id == patient_id)
            && self.from.map_or(true, |from| date >= from)
            && self.to.map_or(true, |to| date <= to)
    }
}

/// `HH:MM` wire format for consultation hours; `HH:MM:SS` is accepted on input.
pub mod hour_format {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(hour: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&hour.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid hour '{raw}'")))
    }

    /// Parse an hour of day, dropping seconds so slots are compared per minute.
    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        let parsed = NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, FORMAT))
            .ok()?;
        NaiveTime::from_hms_opt(parsed.hour(), parsed.minute(), 0)
    }
}
