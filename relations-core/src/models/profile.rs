use super::validation::bounded_text;
use super::ValidationError;

const MAX_NAME_LEN: usize = 40;

/// First or last name on a profile (40 chars)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("name", s, MAX_NAME_LEN).map(Self)
    }

    /// Validate an optional name; `None` stays `None`.
    pub fn optional(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        s.map(Self::new).transpose()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
