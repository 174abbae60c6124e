//! Zeroizing wrapper for credentials held in configuration
//!
//! Connection strings carry database passwords, so they are kept in a
//! [`secrecy::Secret`]: `Debug` output is redacted, access goes through
//! `expose_secret()`, and the buffer is wiped on drop.
//!
//! ```rust
//! use masquerade::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let dsn = secret_string("postgresql://app:hunter2@db/masquerade".to_string());
//! assert!(dsn.expose_secret().starts_with("postgresql://"));
//! assert!(!format!("{dsn:?}").contains("hunter2"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// String contents of a secret, wiped on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretValue {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Deref for SecretValue {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// Serializes the real value: `init` writes config files through this path.
impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

/// Secret string as stored in configuration structs
pub type SecretString = Secret<SecretValue>;

/// Wrap a string in a [`SecretString`]
///
/// ```rust
/// use masquerade::config::secret_string;
///
/// let dsn = secret_string("postgresql://localhost/masquerade".to_string());
/// ```
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.map(secret_string)
}
