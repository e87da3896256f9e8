//! OS keyring secret store backend
//!
//! Credentials are filed in the platform secret service (Windows
//! Credential Manager, macOS Keychain, Linux Secret Service) under a
//! service name, keyed by target name. The stored payload is a small
//! JSON document carrying the username alongside the credential value:
//!
//! ```json
//! {"username": "svc-account", "secret": "..."}
//! ```
//!
//! The scratch strings holding the raw payload are zeroized as soon as
//! the parsed value has been moved into a `SecretString`.

use crate::error::{Result, VaultCopyError};
use crate::secrets::{Secret, SecretStore};
use secrecy::SecretString;
use serde::Deserialize;
use zeroize::Zeroize;

/// Secret store backed by the OS keyring.
pub struct KeyringStore {
    service: String,
}

#[derive(Deserialize)]
struct CredentialPayload {
    username: String,
    secret: String,
}

impl Drop for CredentialPayload {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl KeyringStore {
    /// Create a store scoped to the given service name.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn map_keyring_error(&self, name: &str, err: keyring::Error) -> VaultCopyError {
        match err {
            keyring::Error::NoEntry => VaultCopyError::SecretNotFound(name.to_string()),
            keyring::Error::NoStorageAccess(_) | keyring::Error::PlatformFailure(_) => {
                VaultCopyError::AccessDenied(name.to_string())
            }
            other => VaultCopyError::config(format!("keyring error for '{name}': {other}")),
        }
    }
}

impl SecretStore for KeyringStore {
    fn lookup(&self, name: &str) -> Result<Secret> {
        let entry = keyring::Entry::new(&self.service, name)
            .map_err(|e| self.map_keyring_error(name, e))?;

        let mut raw = entry
            .get_password()
            .map_err(|e| self.map_keyring_error(name, e))?;

        let parsed: std::result::Result<CredentialPayload, _> = serde_json::from_str(&raw);
        raw.zeroize();

        let mut payload = parsed.map_err(|_| {
            // Do not include the parse error; it may quote the payload.
            VaultCopyError::config(format!(
                "credential '{name}' has a malformed payload; expected {{\"username\",\"secret\"}}"
            ))
        })?;

        let value = SecretString::new(std::mem::take(&mut payload.secret));
        Ok(Secret {
            username: std::mem::take(&mut payload.username),
            value,
        })
    }
}
