use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;

const MASK: &str = "**********";

/// A string whose plaintext is only reachable through [`SecretStr::reveal`].
///
/// `Display`, `Debug` and `Serialize` all emit a fixed mask, so a secret can
/// be logged or persisted by accident without leaking.
pub struct SecretStr(SecretString);

impl SecretStr {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Plaintext value.
    pub fn reveal(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.reveal().is_empty()
    }
}

impl Clone for SecretStr {
    fn clone(&self) -> Self {
        Self::new(self.reveal())
    }
}

impl From<String> for SecretStr {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretStr {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl PartialEq for SecretStr {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.reveal().as_bytes().ct_eq(other.reveal().as_bytes()))
    }
}

impl Eq for SecretStr {}

impl fmt::Display for SecretStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl fmt::Debug for SecretStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretStr('{MASK}')")
    }
}

impl Serialize for SecretStr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(MASK)
    }
}

impl<'de> Deserialize<'de> for SecretStr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}
