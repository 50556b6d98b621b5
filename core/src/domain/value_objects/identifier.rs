//! Canonical phone identifier under which attempt state is tracked.

use std::fmt;

use og_shared::phone::{canonicalize_phone_number, mask_phone_number};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::ValidationError;

/// A phone number in canonical E.164 form
///
/// Construction goes through [`Identifier::parse`], so every value reaching
/// the engine has already passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Normalize and validate a raw phone number
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        canonicalize_phone_number(raw)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidIdentifier {
                value: mask_phone_number(raw),
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Masked form for logs and audit rows
    pub fn masked(&self) -> String {
        mask_phone_number(&self.0)
    }

    /// SHA-256 hex digest, used as storage key and audit correlation id
    pub fn hashed(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonicalizes_formatting() {
        let id = Identifier::parse("+1 (555) 010-0").unwrap();
        assert_eq!(id.as_str(), "+15550100");
        assert_eq!(id, Identifier::parse("+15550100").unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        let err = Identifier::parse("5550100").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidIdentifier { .. }));
        assert!(Identifier::parse("").is_err());
        assert!(Identifier::parse("+0555010000").is_err());
    }

    #[test]
    fn test_hash_is_stable_and_hex() {
        let id = Identifier::parse("+15550100").unwrap();
        let hash = id.hashed();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, Identifier::parse("+1 555 0100").unwrap().hashed());
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_serde_validates_on_the_way_in() {
        let id: Identifier = serde_json::from_str("\"+15550100\"").unwrap();
        assert_eq!(id.masked(), "+15****0100");
        assert!(serde_json::from_str::<Identifier>("\"hello\"").is_err());
    }
}
