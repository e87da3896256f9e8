//! Remote session layer
//!
//! A [`Transport`] opens an authenticated [`Session`] against a remote
//! endpoint using a credential from the secret store. The session owns a
//! live network resource until `close` is called; the orchestrator
//! guarantees close runs on every exit path.
//!
//! The traits exist so the orchestrator can be exercised against local
//! fakes; the production implementation is [`SftpTransport`].

mod sftp;

pub use sftp::{SftpSession, SftpTransport};

use crate::config::RemoteEndpoint;
use crate::error::Result;
use crate::secrets::Secret;
use std::path::Path;

/// Counters for a completed transfer step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferTotals {
    /// Files written at the destination
    pub files: u64,
    /// Bytes written at the destination
    pub bytes: u64,
}

/// An authenticated, stateful connection to a remote endpoint.
///
/// Writes are overwrite-by-name so a retried request converges on the
/// same destination state regardless of which attempt succeeds.
pub trait Session {
    /// Upload a single file, creating parent directories as needed.
    /// Returns the number of bytes written.
    fn put_file(&mut self, local: &Path, remote: &Path) -> Result<u64>;

    /// Upload a directory tree, preserving relative paths under
    /// `remote_root`.
    fn put_tree(&mut self, local_root: &Path, remote_root: &Path) -> Result<TransferTotals>;

    /// Release the underlying network resource. Idempotent.
    fn close(&mut self) -> Result<()>;
}

/// Factory for authenticated sessions.
pub trait Transport {
    /// Open a session. Fails with `AuthenticationError` on bad
    /// credentials and `ConnectionError`/`Timeout` on unreachable
    /// endpoints.
    fn open(&self, endpoint: &RemoteEndpoint, secret: &Secret) -> Result<Box<dyn Session>>;
}
