//! Validation errors raised before a schedule is computed.

use thiserror::Error;

/// The only failure mode of the calculator: bad input, caught up front.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid time '{input}': {reason}")]
    InvalidTimeFormat { input: String, reason: String },

    #[error("invalid duration for '{label}' (item {position}): {value}")]
    InvalidDuration {
        label: String,
        position: usize,
        value: String,
    },
}

impl ValidationError {
    pub(crate) fn time(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTimeFormat {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn duration(label: impl Into<String>, position: usize, value: impl ToString) -> Self {
        Self::InvalidDuration {
            label: label.into(),
            position,
            value: value.to_string(),
        }
    }

    /// Name of the offending input field, for caller-facing messages.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidTimeFormat { .. } => "time",
            Self::InvalidDuration { label, .. } => label,
        }
    }
}

pub type Result<T, E = ValidationError> = std::result::Result<T, E>;
