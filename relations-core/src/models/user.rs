//! Username validation

use super::validation::bounded_text;
use super::ValidationError;

/// Matches the `users.username` column length
pub const MAX_USERNAME_LEN: usize = 32;

/// Validated username
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a username, trimming surrounding whitespace.
    ///
    /// # Example
    /// ```
    /// use relations_core::Username;
    ///
    /// assert_eq!(Username::new("  john ").unwrap().as_str(), "john");
    /// assert!(Username::new("").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("username", s, MAX_USERNAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid() {
        assert!(Username::new("john").is_ok());
        assert!(Username::new("a").is_ok());
    }

    #[test]
    fn rejects_blank() {
        let err = Username::new("   ").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn max_length() {
        assert!(Username::new(&"a".repeat(32)).is_ok());

        let err = Username::new(&"a".repeat(33)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 32, .. }));
    }
}
