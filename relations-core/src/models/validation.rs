//! Validation error types

use std::fmt;

/// Validation error for input models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds the column length
    TooLong { field: &'static str, max: usize },

    /// Numeric field below zero
    Negative { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::Negative { field } => write!(f, "{} cannot be negative", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trim `s` and check it against `max` characters.
pub(crate) fn bounded_text(
    field: &'static str,
    s: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 100,
        };
        assert_eq!(
            err.to_string(),
            "title exceeds maximum length of 100 characters"
        );
        assert_eq!(
            ValidationError::Negative { field: "price" }.to_string(),
            "price cannot be negative"
        );
    }

    #[test]
    fn bounded_text_counts_chars_not_bytes() {
        // 4 chars, 8 bytes
        assert!(bounded_text("name", "Жаня", 4).is_ok());
        assert!(bounded_text("name", "Жаня!", 4).is_err());
    }
}
