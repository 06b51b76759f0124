//! Identity atoms
//!
//! CategoryId: store-assigned record identifier
//! CategoryName: trimmed, non-empty display name

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{CoreError, InvalidId, InvalidName};

/// Category identifier assigned by the store.
///
/// Ids are positive; `0` means "no parent" in the admin forms and is
/// rejected on parse.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(u64);

impl CategoryId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Parse a user-supplied id (`"12"`, `" 12 "`, `"#12"`).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(InvalidId {
                raw: s.to_string(),
                reason: "empty".into(),
            }
            .into());
        }
        let value: u64 = digits.parse().map_err(|_| InvalidId {
            raw: s.to_string(),
            reason: "not a positive integer".into(),
        })?;
        if value == 0 {
            return Err(InvalidId {
                raw: s.to_string(),
                reason: "must be greater than zero".into(),
            }
            .into());
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CategoryId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Display name: trimmed, never empty.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidName {
                raw,
                reason: "name is required".into(),
            }
            .into());
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for CategoryName {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<CategoryName> for String {
    fn from(name: CategoryName) -> Self {
        name.0
    }
}

impl fmt::Debug for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryName({:?})", self.0)
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
