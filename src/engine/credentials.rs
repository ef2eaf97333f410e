use std::collections::HashMap;
use std::fmt;

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use parking_lot::RwLock;
use serde::Deserialize;

use super::account::UserId;
use super::error::CredentialError;

/// A secret supplied to re-confirm identity before money moves. Redacted in `Debug`.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<&str> for Credential {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

/// Step-up check: does `credential` prove the caller is `user`?
///
/// Independent of whatever session authentication admitted the request.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, user: &str, credential: &Credential) -> bool;
}

/// Argon2id password hashes keyed by user.
pub struct PasswordVault {
    hasher: Argon2<'static>,
    hashes: RwLock<HashMap<UserId, String>>,
}

impl Default for PasswordVault {
    fn default() -> Self {
        Self {
            hasher: Argon2::default(),
            hashes: RwLock::new(HashMap::new()),
        }
    }
}

impl fmt::Debug for PasswordVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordVault")
            .field("users", &self.hashes.read().len())
            .finish_non_exhaustive()
    }
}

impl PasswordVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vault with explicit argon2id cost parameters (memory KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, CredentialError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| CredentialError::Params(e.to_string()))?;
        Ok(Self {
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            hashes: RwLock::new(HashMap::new()),
        })
    }

    /// Store (or replace) the password hash for `user`.
    pub fn register(&self, user: &str, password: &Credential) -> Result<(), CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .to_string();

        self.hashes.write().insert(user.to_string(), hash);
        log::debug!("[credentials] Registered password for user {user}");
        Ok(())
    }
}

impl CredentialVerifier for PasswordVault {
    fn verify(&self, user: &str, credential: &Credential) -> bool {
        let Some(stored) = self.hashes.read().get(user).cloned() else {
            log::trace!("[credentials] No password registered for user {user}");
            return false;
        };

        let Ok(parsed) = PasswordHash::new(&stored) else {
            log::error!("[credentials] Stored hash for user {user} is malformed");
            return false;
        };

        self.hasher
            .verify_password(credential.expose().as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> PasswordVault {
        PasswordVault::with_params(8, 1, 1).unwrap()
    }

    #[test]
    fn test_verify_accepts_registered_password() {
        let vault = vault();
        vault.register("alice", &"s3cret".into()).unwrap();

        assert!(vault.verify("alice", &"s3cret".into()));
    }

    #[test]
    fn test_verify_rejects_wrong_password_and_unknown_user() {
        let vault = vault();
        vault.register("alice", &"s3cret".into()).unwrap();

        assert!(!vault.verify("alice", &"guess".into()));
        assert!(!vault.verify("bob", &"s3cret".into()));
    }

    #[test]
    fn test_register_replaces_previous_password() {
        let vault = vault();
        vault.register("alice", &"old".into()).unwrap();
        vault.register("alice", &"new".into()).unwrap();

        assert!(!vault.verify("alice", &"old".into()));
        assert!(vault.verify("alice", &"new".into()));
    }

    #[test]
    fn test_rejects_invalid_params() {
        assert!(matches!(
            PasswordVault::with_params(0, 0, 0),
            Err(CredentialError::Params(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credential = Credential::new("hunter2");
        assert_eq!(format!("{credential:?}"), "Credential(***)");
        assert!(Credential::new("  ").is_blank());
    }
}
