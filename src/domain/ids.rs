//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through the pipeline.
//! Each type keeps the raw string but prevents mixing an entity id with a
//! tenant key at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity (host) identifier newtype wrapper
///
/// Opaque identifier returned by the listing endpoint. The pipeline never
/// interprets it; it only requires it to be non-empty.
///
/// # Examples
///
/// ```
/// use fleetpull::domain::ids::EntityId;
/// use std::str::FromStr;
///
/// let id = EntityId::from_str("4f1c2a9e0b7d4e5f8a6b3c2d1e0f9a8b").unwrap();
/// assert_eq!(id.as_str(), "4f1c2a9e0b7d4e5f8a6b3c2d1e0f9a8b");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Creates a new EntityId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(EntityId)` if the ID is non-blank, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Entity ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the entity ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Tenant key newtype wrapper
///
/// The key a tenant is registered under in the configuration file
/// (`[tenants.<key>]`). Lowercase ASCII letters, digits, `-` and `_`.
///
/// # Examples
///
/// ```
/// use fleetpull::domain::ids::TenantKey;
///
/// let key = TenantKey::new("acme-emea").unwrap();
/// assert_eq!(key.as_str(), "acme-emea");
/// assert!(TenantKey::new("Acme EMEA").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantKey(String);

impl TenantKey {
    /// Creates a new TenantKey, validating its character set
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.is_empty() {
            return Err("Tenant key cannot be empty".to_string());
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(format!(
                "Invalid tenant key '{key}'. Use lowercase letters, digits, '-' or '_'"
            ));
        }
        Ok(Self(key))
    }

    /// Returns the tenant key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for TenantKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
