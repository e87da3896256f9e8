//! In-memory secret store
//!
//! Backend for tests and ephemeral use. Values are held as
//! `SecretString` so they are zeroized when the store is dropped.

use crate::error::{Result, VaultCopyError};
use crate::secrets::{Secret, SecretStore};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

/// Secret store backed by a process-local map.
#[derive(Default)]
pub struct MemoryStore {
    entries: HashMap<String, (String, SecretString)>,
    denied: Vec<String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a credential under a target name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        username: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.entries.insert(
            name.into(),
            (username.into(), SecretString::new(value.into())),
        );
    }

    /// Mark a name as present but unreadable, for exercising the
    /// access-denied path.
    pub fn deny(&mut self, name: impl Into<String>) {
        self.denied.push(name.into());
    }
}

impl SecretStore for MemoryStore {
    fn lookup(&self, name: &str) -> Result<Secret> {
        if self.denied.iter().any(|n| n == name) {
            return Err(VaultCopyError::AccessDenied(name.to_string()));
        }

        let (username, value) = self
            .entries
            .get(name)
            .ok_or_else(|| VaultCopyError::SecretNotFound(name.to_string()))?;

        Ok(Secret {
            username: username.clone(),
            value: SecretString::new(value.expose_secret().clone()),
        })
    }
}
