use crate::errors::{EngageError, EngageResult};
use crate::features::{Feature, UserInput};

/// Caller-facing bounds for the four request inputs. These belong to the
/// request surfaces only; completion and inference accept any finite value.
pub struct InputValidator {
    bounds: [(Feature, f64); 4],
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl InputValidator {
    pub fn new() -> Self {
        Self {
            bounds: [
                (Feature::MessageCountSum, 0.0),
                (Feature::MeetingCountSum, 0.0),
                (Feature::SessionCount, 1.0),
                (Feature::SessionDurationSecMean, 1.0),
            ],
        }
    }

    pub fn validate(&self, input: &UserInput) -> EngageResult<()> {
        for (feature, min) in &self.bounds {
            let Some(value) = input.get(*feature) else {
                continue;
            };
            if !value.is_finite() {
                return Err(EngageError::validation(feature.name(), "must be a finite number"));
            }
            if value < *min {
                return Err(EngageError::validation(
                    feature.name(),
                    format!("must be >= {min}, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_values_at_the_minimum() {
        let input = UserInput {
            message_count_sum: Some(0.0),
            meeting_count_sum: Some(0.0),
            session_count: Some(1.0),
            session_duration_sec_mean: Some(1.0),
        };
        assert!(InputValidator::new().validate(&input).is_ok());
    }

    #[test]
    fn accepts_empty_input() {
        assert!(InputValidator::new().validate(&UserInput::default()).is_ok());
    }

    #[test]
    fn rejects_zero_sessions() {
        let input = UserInput {
            session_count: Some(0.0),
            ..Default::default()
        };
        let err = InputValidator::new().validate(&input).unwrap_err();
        assert!(err.to_string().contains("session_count"));
    }

    #[test]
    fn rejects_negative_messages_and_nan() {
        let validator = InputValidator::new();
        let negative = UserInput {
            message_count_sum: Some(-1.0),
            ..Default::default()
        };
        let nan = UserInput {
            session_duration_sec_mean: Some(f64::NAN),
            ..Default::default()
        };
        assert!(validator.validate(&negative).is_err());
        assert!(validator.validate(&nan).is_err());
    }
}
