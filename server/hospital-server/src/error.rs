use crate::services::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use database_layer::DatabaseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type/code
    #[schema(example = "conflict")]
    pub error_type: String,
    /// Human-readable error message
    #[schema(example = "The doctor already has a consultation at this date and time.")]
    pub message: String,
    /// Timestamp when error occurred
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Suggested actions for resolving the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource_type}")]
    NotFound { resource_type: String },

    #[error("Resource conflict: {message}")]
    Conflict { message: String },

    #[error("Invalid reference: {message}")]
    InvalidReference { message: String },

    #[error("Resource has dependents: {message}")]
    HasDependents { message: String },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl ApiError {
    /// Create a not found error
    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::InvalidReference { .. } => StatusCode::CONFLICT,
            ApiError::HasDependents { .. } => StatusCode::CONFLICT,
            ApiError::Database(db_err) => match db_err {
                DatabaseError::UniqueViolation { .. } | DatabaseError::ForeignKeyViolation { .. } => {
                    StatusCode::CONFLICT
                }
                DatabaseError::ConnectionFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::InvalidReference { .. } => "invalid_reference",
            ApiError::HasDependents { .. } => "has_dependents",
            ApiError::Database(DatabaseError::UniqueViolation { .. }) => "conflict",
            ApiError::Database(DatabaseError::ForeignKeyViolation { .. }) => "invalid_reference",
            ApiError::Database(_) => "database_error",
        }
    }

    /// Message sent to the client
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation { message }
            | ApiError::Conflict { message }
            | ApiError::InvalidReference { message }
            | ApiError::HasDependents { message } => message.clone(),
            ApiError::NotFound { resource_type } => format!("{resource_type} not found."),
            ApiError::Database(db_err) => ApiError::format_database_error(db_err),
        }
    }

    /// Get suggested actions for resolving the error
    pub fn suggestions(&self) -> Option<Vec<String>> {
        match self {
            ApiError::Validation { .. } => Some(vec![
                "Check the request payload for invalid fields".to_string(),
                "Ensure all required fields are provided".to_string(),
            ]),
            ApiError::NotFound { .. } => Some(vec![
                "Verify the resource ID is correct".to_string(),
            ]),
            ApiError::InvalidReference { .. } => Some(vec![
                "Create the referenced record first or correct its ID".to_string(),
            ]),
            ApiError::HasDependents { .. } => Some(vec![
                "Delete or reassign the dependent records first".to_string(),
            ]),
            ApiError::Database(DatabaseError::ConnectionFailed(_)) => Some(vec![
                "Try again in a few moments".to_string(),
                "Contact support if the issue persists".to_string(),
            ]),
            _ => None,
        }
    }

    /// Pretty format database errors for better user experience
    pub fn format_database_error(db_error: &DatabaseError) -> String {
        match db_error {
            DatabaseError::ConnectionFailed(_) => "Unable to connect to the database.".to_string(),
            DatabaseError::UniqueViolation { constraint } => match constraint.as_str() {
                "uq_specialties_name" => "A specialty with the same name already exists.",
                "uq_doctors_identity" => "A doctor with same name and specialty already exists.",
                "uq_patients_identity" => {
                    "A patient with the same name and birth date already exists."
                }
                "uq_consultations_doctor_slot" => {
                    "The doctor already has a consultation at this date and time."
                }
                "uq_consultations_patient_slot" => {
                    "The patient already has a consultation at this date and time."
                }
                "uq_medicaments_name" => "A medicament with the same name already exists.",
                "uq_ordonnance_lignes_identity" => {
                    "An identical prescription line already exists for this ordonnance."
                }
                _ => "A record with these details already exists.",
            }
            .to_string(),
            DatabaseError::ForeignKeyViolation { .. } => {
                "Referenced record does not exist or is still in use.".to_string()
            }
            DatabaseError::QueryFailed(msg) if msg.contains("check constraint") => {
                "The provided data does not meet validation requirements.".to_string()
            }
            DatabaseError::SqlxError(sqlx::Error::RowNotFound) => {
                "Requested record not found.".to_string()
            }
            _ => "An unexpected database error occurred.".to_string(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Invalid(message) => ApiError::Validation { message },
            ServiceError::NotFound(resource) => ApiError::not_found(resource),
            ServiceError::MissingReference(message) => ApiError::InvalidReference { message },
            ServiceError::Conflict(message) => ApiError::Conflict { message },
            ServiceError::HasDependents(message) => ApiError::HasDependents { message },
            ServiceError::Database(db_err) => ApiError::Database(db_err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        // Log the error with correlation ID
        error!(
            error_id = %error_id,
            error_type = %self.error_type(),
            status_code = %status_code.as_u16(),
            error = %self,
            "API error occurred"
        );

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            message: self.message(),
            timestamp: chrono::Utc::now(),
            suggestions: self.suggestions(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}
