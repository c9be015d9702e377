use super::validation::bounded_text;
use super::ValidationError;

const MAX_TITLE_LEN: usize = 100;

/// Validated post title (`posts.title`, 100 chars)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTitle(String);

impl PostTitle {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("title", s, MAX_TITLE_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
