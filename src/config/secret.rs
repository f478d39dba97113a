//! Credential handling for the catalog token and the audit store connection string
//!
//! Secrets are wrapped in `secrecy::Secret`, which zeroes memory on drop and
//! redacts `Debug` output. Callers must go through `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use skusync::config::{secret_string, masked};
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("eyJhbGciOiJSUzI1NiJ9.payload.sig".to_string());
//! assert_eq!(token.expose_secret().as_ref(), "eyJhbGciOiJSUzI1NiJ9.payload.sig");
//! assert_eq!(masked(&token), "****.sig");
//! ```

use secrecy::{CloneableSecret, DebugSecret, ExposeSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype that satisfies the trait bounds `Secret` needs
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Parse the secret value into another type
    pub fn parse<F: std::str::FromStr>(&self) -> Result<F, F::Err> {
        self.0.parse()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Zeroize-on-drop secret string
pub type SecretString = Secret<SecretValue>;

#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Masked form for display: `****` plus the last four characters
///
/// Values of eight characters or fewer are fully masked.
pub fn masked(secret: &SecretString) -> String {
    let value = secret.expose_secret().as_ref();
    let count = value.chars().count();
    if count <= 8 {
        return "****".to_string();
    }
    let tail: String = value.chars().skip(count - 4).collect();
    format!("****{tail}")
}
