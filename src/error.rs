//! Error types for step progress bars.

use thiserror::Error;

/// Errors reported when input cannot be placed on the bar.
///
/// Missing data (no steps, no current value, one-sided bounds) is never an
/// error; it degrades to the 0%/100% fallbacks of [`crate::percent::percent_of`].
/// Only values that have no position on a numeric axis are rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum StepError {
    /// A step value is NaN or infinite.
    #[error("invalid step value {value}: must be a finite number")]
    InvalidStep {
        /// The rejected value.
        value: f64,
    },

    /// A current value is NaN or infinite.
    #[error("invalid current value {value}: must be a finite number")]
    InvalidCurrentValue {
        /// The rejected value.
        value: f64,
    },
}

/// Checks that a step value can be ordered and scaled.
pub(crate) fn validate_step_value(value: f64) -> Result<f64, StepError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StepError::InvalidStep { value })
    }
}

/// Checks an optional current value. `None` is always valid.
pub(crate) fn validate_current_value(value: Option<f64>) -> Result<Option<f64>, StepError> {
    match value {
        Some(v) if !v.is_finite() => Err(StepError::InvalidCurrentValue { value: v }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_values_pass() {
        assert_eq!(validate_step_value(12.5), Ok(12.5));
        assert_eq!(validate_current_value(None), Ok(None));
        assert_eq!(validate_current_value(Some(-3.0)), Ok(Some(-3.0)));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        assert!(matches!(
            validate_step_value(f64::NAN),
            Err(StepError::InvalidStep { .. })
        ));
        assert_eq!(
            validate_current_value(Some(f64::INFINITY)),
            Err(StepError::InvalidCurrentValue {
                value: f64::INFINITY
            })
        );
    }

    #[test]
    fn test_error_messages() {
        let err = StepError::InvalidStep {
            value: f64::NEG_INFINITY,
        };
        assert_eq!(
            err.to_string(),
            "invalid step value -inf: must be a finite number"
        );
    }
}
