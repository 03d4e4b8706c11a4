//! Validation error types

use std::fmt;

/// Validation error for request input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is missing or empty
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., email, date)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Record type outside account/contact/opportunity
    InvalidRecordType,

    /// Note created without any record association
    NoAssociations,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} is required", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidRecordType => write!(
                f,
                "Invalid record type. Must be 'account', 'contact', or 'opportunity'"
            ),
            Self::NoAssociations => write!(f, "At least one record association is required"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Require a non-blank string field.
pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

/// Require a non-nil identifier field.
pub fn required_id(field: &'static str, value: uuid::Uuid) -> Result<uuid::Uuid, ValidationError> {
    if value.is_nil() {
        return Err(ValidationError::Empty { field });
    }
    Ok(value)
}

/// Treat empty strings as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
