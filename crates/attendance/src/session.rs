use serde::{Deserialize, Serialize};

use taproll_core::{DomainError, DomainResult, ValueObject};

/// Opaque key identifying one attendance-taking window (e.g. a class period).
///
/// The service does not interpret the key and never rolls sessions over by
/// time; callers own the windowing scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl AsRef<str>) -> DomainResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("session id cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for SessionId {}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let s = SessionId::new(" 2024-05-01-P1 ").unwrap();
        assert_eq!(s.as_str(), "2024-05-01-P1");
    }

    #[test]
    fn rejects_blank() {
        assert!(SessionId::new("  ").is_err());
        assert!(SessionId::new("").is_err());
    }
}
