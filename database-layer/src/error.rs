use thiserror::Error;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Database error: {0}")]
    SqlxError(sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl DatabaseError {
    pub fn unique(constraint: impl Into<String>) -> Self {
        Self::UniqueViolation {
            constraint: constraint.into(),
        }
    }

    pub fn foreign_key(constraint: impl Into<String>) -> Self {
        Self::ForeignKeyViolation {
            constraint: constraint.into(),
        }
    }

    /// True for errors raised by a store constraint rather than by the store itself.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::UniqueViolation { .. } | Self::ForeignKeyViolation { .. }
        )
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            let constraint = db_error.constraint().unwrap_or_default().to_string();
            match db_error.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return Self::UniqueViolation { constraint },
                Some(FOREIGN_KEY_VIOLATION) => return Self::ForeignKeyViolation { constraint },
                _ => {}
            }
        }
        Self::SqlxError(error)
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        Self::MigrationError(error.to_string())
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_stays_a_sqlx_error() {
        let err = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DatabaseError::SqlxError(sqlx::Error::RowNotFound)));
        assert!(!err.is_constraint_violation());
    }

    #[test]
    fn constraint_helpers_build_violations() {
        assert!(DatabaseError::unique("uq_specialties_name").is_constraint_violation());
        assert!(DatabaseError::foreign_key("fk_doctors_specialty").is_constraint_violation());
        assert_eq!(
            DatabaseError::unique("uq_medicaments_name").to_string(),
            "Unique constraint violated: uq_medicaments_name"
        );
    }
}
