//! Query parameters for filtered listings

use chrono::NaiveDate;
use database_layer::VisitFilter;
use serde::Deserialize;
use utoipa::IntoParams;

/// `GET /consultations` and `GET /ordonnances`
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VisitQuery {
    /// Only visits with this doctor
    pub doctor_id: Option<i32>,
    /// Only visits of this patient
    pub patient_id: Option<i32>,
    /// Inclusive lower date bound
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound
    #[param(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
}

impl From<VisitQuery> for VisitFilter {
    fn from(query: VisitQuery) -> Self {
        Self {
            doctor_id: query.doctor_id,
            patient_id: query.patient_id,
            from: query.from,
            to: query.to,
        }
    }
}

/// Filters for the visits of one doctor
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DoctorVisitQuery {
    pub patient_id: Option<i32>,
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
}

impl DoctorVisitQuery {
    pub fn for_doctor(self, doctor_id: i32) -> VisitFilter {
        VisitFilter {
            doctor_id: Some(doctor_id),
            patient_id: self.patient_id,
            from: self.from,
            to: self.to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_query_pins_the_doctor() {
        let filter = DoctorVisitQuery {
            patient_id: Some(4),
            ..DoctorVisitQuery::default()
        }
        .for_doctor(7);
        assert_eq!(filter.doctor_id, Some(7));
        assert_eq!(filter.patient_id, Some(4));
        assert_eq!(filter.from, None);
    }
}
