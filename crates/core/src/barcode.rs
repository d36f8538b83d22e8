//! Barcode value type.
//!
//! A barcode is the unique key of a ledger entry. The decoder black-box
//! guarantees format validity; here we only enforce that the text is non-empty
//! after trimming, so whitespace-only manual input can never create an entry.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Decoded barcode text (non-empty, trimmed). Compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Barcode(String);

impl Barcode {
    /// Parse barcode text, trimming surrounding whitespace.
    pub fn new(text: impl AsRef<str>) -> DomainResult<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("barcode cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Barcode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Barcode {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
