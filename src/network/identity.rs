//! Operator identity
//!
//! The account that pays for and signs the deployment. The key only ever
//! comes from configuration and never shows up in logs.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identity errors
#[derive(Error, Debug, PartialEq)]
pub enum IdentityError {
    #[error("Invalid account id {0:?}, expected shard.realm.num")]
    InvalidAccountId(String),
    #[error("Private key is empty")]
    EmptyKey,
    #[error("Unknown key type {0:?}, expected ecdsa or ed25519")]
    UnknownKeyType(String),
}

/// Signature algorithm of the operator key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyType {
    #[default]
    Ecdsa,
    Ed25519,
}

impl FromStr for KeyType {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ecdsa" | "secp256k1" => Ok(KeyType::Ecdsa),
            "ed25519" => Ok(KeyType::Ed25519),
            _ => Err(IdentityError::UnknownKeyType(s.to_string())),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Ecdsa => write!(f, "ecdsa"),
            KeyType::Ed25519 => write!(f, "ed25519"),
        }
    }
}

/// A hex private key that refuses to print itself
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: &str) -> Result<Self, IdentityError> {
        let key = key.trim();
        let key = key
            .strip_prefix("0x")
            .or_else(|| key.strip_prefix("0X"))
            .unwrap_or(key);
        if key.is_empty() {
            return Err(IdentityError::EmptyKey);
        }
        Ok(Self(key.to_string()))
    }

    /// Key material without any `0x` prefix
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Account id plus signing key
#[derive(Debug, Clone)]
pub struct OperatorIdentity {
    pub account_id: String,
    pub private_key: SecretKey,
    pub key_type: KeyType,
}

impl OperatorIdentity {
    pub fn new(account_id: &str, private_key: &str, key_type: KeyType) -> Result<Self, IdentityError> {
        let account_id = account_id.trim();
        if !is_entity_id(account_id) {
            return Err(IdentityError::InvalidAccountId(account_id.to_string()));
        }

        Ok(Self {
            account_id: account_id.to_string(),
            private_key: SecretKey::new(private_key)?,
            key_type,
        })
    }
}

/// `shard.realm.num` with decimal components
fn is_entity_id(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
