//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through a run: the
//! catalog SKU and the audit log row id assigned by the audit store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product identifier (stock keeping unit)
///
/// # Examples
///
/// ```
/// use skusync::domain::ids::Sku;
/// use std::str::FromStr;
///
/// let sku = Sku::from_str("AB-1001-BLK-M").unwrap();
/// assert_eq!(sku.as_str(), "AB-1001-BLK-M");
/// assert!(Sku::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Creates a new Sku, rejecting blank input
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("SKU cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Parses a comma-separated SKU list, skipping blank entries
    pub fn parse_list(raw: &str) -> Vec<Sku> {
        raw.split(',')
            .map(str::trim)
            .filter_map(|s| Sku::new(s).ok())
            .collect()
    }

    /// Returns the SKU as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Sku {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Sku {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Audit log row identifier
///
/// Assigned by the audit store when an entry is appended. Unique within a
/// store and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditId(i64);

impl AuditId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AuditId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
