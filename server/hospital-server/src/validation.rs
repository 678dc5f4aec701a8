//! Request validation utilities for consistent validation across services
//!
//! Every create/update payload implements [`RequestValidation`] for the
//! checks that reject a request outright (required fields, ranges, hard
//! length limits). Normalisation helpers then trim and clip the accepted
//! values before they reach a repository.

use crate::services::ServiceError;

/// Trait for validating request payloads
///
/// # Example
///
/// ```rust,ignore
/// impl RequestValidation for SpecialtyRequest {
///     fn validate(&self) -> Result<(), ServiceError> {
///         validate_required!(self.name, "Name is required.");
///         Ok(())
///     }
/// }
/// ```
pub trait RequestValidation {
    /// Returns `Err(ServiceError::Invalid)` with the first failing rule.
    fn validate(&self) -> Result<(), ServiceError>;
}

/// Macro for validating fields with custom predicates
///
/// # Usage
///
/// ```rust,ignore
/// validate_field!(self.quantity, self.quantity > 0, "Quantity must be greater than 0.");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::services::ServiceError::Invalid($message.into()));
        }
    };
}

/// Macro for validating required fields (non-blank strings)
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Macro for validating the trimmed length of a string, counted in characters
///
/// # Usage
///
/// ```rust,ignore
/// validate_length!(self.dosage, 50, "Dosage must be at most 50 characters.");
/// ```
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $max:expr, $message:expr) => {
        $crate::validate_field!(
            $field,
            $crate::validation::char_len(&$field) <= $max,
            $message
        );
    };
}

/// Number of characters once surrounding whitespace is removed
pub fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

/// Trim and keep at most `max` characters.
pub fn clip(value: &str, max: usize) -> String {
    value.trim().chars().take(max).collect()
}

/// Trim and clip an optional value; blank becomes `None`.
pub fn clip_optional(value: Option<&str>, max: usize) -> Option<String> {
    value.map(|v| clip(v, max)).filter(|v| !v.is_empty())
}

/// Trim an optional value without clipping; blank becomes `None`.
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct TestRequest {
        name: String,
        quantity: i32,
    }

    impl RequestValidation for TestRequest {
        fn validate(&self) -> Result<(), ServiceError> {
            validate_required!(self.name, "Name is required.");
            validate_field!(self.quantity, self.quantity > 0, "Quantity must be greater than 0.");
            validate_length!(self.name, 5, "Name must be at most 5 characters.");
            Ok(())
        }
    }

    fn message(result: Result<(), ServiceError>) -> String {
        match result {
            Err(ServiceError::Invalid(message)) => message,
            other => format!("{other:?}"),
        }
    }

    #[test]
    fn test_validation_success() {
        let request = TestRequest {
            name: " Anna ".to_string(),
            quantity: 1,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_rules_run_in_order() {
        let blank = TestRequest {
            name: "   ".to_string(),
            quantity: 0,
        };
        assert_eq!(message(blank.validate()), "Name is required.");

        let zero = TestRequest {
            name: "Anna".to_string(),
            quantity: 0,
        };
        assert_eq!(message(zero.validate()), "Quantity must be greater than 0.");

        let long = TestRequest {
            name: "Annabelle".to_string(),
            quantity: 3,
        };
        assert_eq!(message(long.validate()), "Name must be at most 5 characters.");
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let request = TestRequest {
            name: "éééé".to_string(),
            quantity: 1,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_blank_optional_becomes_none() {
        assert_eq!(clip_optional(Some("   "), 10), None);
        assert_eq!(clip_optional(None, 10), None);
        assert_eq!(clip_optional(Some(" ok "), 10), Some("ok".to_string()));
        assert_eq!(trim_optional(Some("\t")), None);
    }

    proptest! {
        #[test]
        fn clip_never_exceeds_max(value in "\\PC*", max in 0usize..64) {
            prop_assert!(clip(&value, max).chars().count() <= max);
        }

        #[test]
        fn clip_is_idempotent(value in "\\PC*", max in 1usize..64) {
            let once = clip(&value, max);
            prop_assert_eq!(clip(&once, max), once.trim().to_string());
        }

        #[test]
        fn clip_keeps_short_trimmed_values(value in "[a-zA-Zé ]{0,20}") {
            let trimmed = value.trim().to_string();
            prop_assert_eq!(clip(&value, 30), trimmed);
        }
    }
}
