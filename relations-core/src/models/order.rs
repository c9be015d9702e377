use super::validation::bounded_text;
use super::ValidationError;

const MAX_PROMOCODE_LEN: usize = 32;

/// Promotional code attached to an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promocode(String);

impl Promocode {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("promocode", s, MAX_PROMOCODE_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promocode_bounds() {
        assert_eq!(Promocode::new("promo").unwrap().as_str(), "promo");
        assert!(Promocode::new("").is_err());
        assert!(Promocode::new(&"p".repeat(33)).is_err());
    }
}
