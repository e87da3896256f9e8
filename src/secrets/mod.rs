//! Secret store access
//!
//! Credentials are provisioned out of band under a service name and
//! looked up here by target name. The credential value lives in a
//! [`secrecy::SecretString`] from the moment it is read: it cannot leak
//! through `Debug`/`Display` formatting and is zeroized on drop. Nothing
//! in this module writes a secret back to persistent storage.

mod keyring_store;
mod memory;

pub use keyring_store::KeyringStore;
pub use memory::MemoryStore;

use crate::error::Result;
use secrecy::SecretString;

/// A credential retrieved from the store.
///
/// Read-many, never mutated, never serialized. The value is only ever
/// exposed inside the session authentication call.
pub struct Secret {
    /// Account name associated with the credential
    pub username: String,
    /// Opaque credential value
    pub value: SecretString,
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("username", &self.username)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Name-to-credential lookup. Implementations must not log the returned
/// secret value under any circumstance.
pub trait SecretStore {
    /// Look up a credential by target name.
    ///
    /// Fails with `SecretNotFound` if the name is absent and
    /// `AccessDenied` if the caller lacks rights.
    fn lookup(&self, name: &str) -> Result<Secret>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret {
            username: "user1".to_string(),
            value: SecretString::new("p@ss".to_string()),
        };
        let debug = format!("{secret:?}");
        assert!(debug.contains("user1"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("p@ss"));
        // The value is still reachable where it is actually needed
        assert_eq!(secret.value.expose_secret(), "p@ss");
    }
}
