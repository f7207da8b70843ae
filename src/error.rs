//! Error types for u-timetable.
//!
//! Only problems with the *input* are errors. Infeasibility and budget
//! exhaustion are ordinary outcomes, see
//! [`SolveOutcome`](crate::scheduler::SolveOutcome).

use thiserror::Error;

use crate::validation::ValidationError;

/// Main error type.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// Malformed or self-contradictory entity data, detected before search.
    #[error("invalid input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),

    /// Configuration values outside their legal range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, TimetableError>;

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_display_summarizes_validation_errors() {
        let err = TimetableError::InvalidInput(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "Duplicate room ID: R1"),
            ValidationError::new(ValidationErrorKind::DuplicateId, "Duplicate room ID: R2"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid input: Duplicate room ID: R1 (and 1 more)"
        );

        let err = TimetableError::InvalidConfig("population_size must be positive".into());
        assert!(err.to_string().contains("population_size"));
    }
}
