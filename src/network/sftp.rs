//! SSH/SFTP session implementation
//!
//! Password authentication with a credential from the secret store. The
//! plaintext is exposed only inside the `userauth_password` call and is
//! never copied into a longer-lived binding.

use crate::config::RemoteEndpoint;
use crate::error::{Result, VaultCopyError};
use crate::network::{Session, Transport, TransferTotals};
use crate::secrets::Secret;
use secrecy::ExposeSecret;
use ssh2::Sftp;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

const TRANSFER_BUFFER_SIZE: usize = 1024 * 1024;

/// Transport that opens SFTP sessions over SSH.
pub struct SftpTransport {
    timeout: Duration,
}

impl SftpTransport {
    /// Create a transport with the given blocking-operation timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Transport for SftpTransport {
    fn open(&self, endpoint: &RemoteEndpoint, secret: &Secret) -> Result<Box<dyn Session>> {
        let session = SftpSession::connect(endpoint, secret, self.timeout)?;
        Ok(Box::new(session))
    }
}

/// An open SFTP session to a remote host.
pub struct SftpSession {
    session: ssh2::Session,
    sftp: Option<Sftp>,
    host: String,
    closed: bool,
}

impl SftpSession {
    /// Connect and authenticate against the remote endpoint.
    pub fn connect(
        endpoint: &RemoteEndpoint,
        secret: &Secret,
        timeout: Duration,
    ) -> Result<Self> {
        let addr = endpoint
            .addr()
            .to_socket_addrs()
            .map_err(|e| VaultCopyError::connection(&endpoint.host, e.to_string()))?
            .next()
            .ok_or_else(|| {
                VaultCopyError::connection(&endpoint.host, "no address resolved".to_string())
            })?;

        let tcp = TcpStream::connect_timeout(&addr, timeout).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                VaultCopyError::Timeout(timeout.as_secs())
            } else {
                VaultCopyError::connection(&endpoint.host, e.to_string())
            }
        })?;

        let mut session = ssh2::Session::new()
            .map_err(|e| VaultCopyError::connection(&endpoint.host, e.to_string()))?;

        // Applies to all subsequent blocking libssh2 calls.
        session.set_timeout(timeout.as_millis() as u32);
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| VaultCopyError::connection(&endpoint.host, e.to_string()))?;

        session
            .userauth_password(&endpoint.user, secret.value.expose_secret())
            .map_err(|e| VaultCopyError::auth(&endpoint.user, &endpoint.host, e.to_string()))?;

        if !session.authenticated() {
            return Err(VaultCopyError::auth(
                &endpoint.user,
                &endpoint.host,
                "authentication failed",
            ));
        }

        let sftp = session
            .sftp()
            .map_err(|e| VaultCopyError::connection(&endpoint.host, e.to_string()))?;

        Ok(Self {
            session,
            sftp: Some(sftp),
            host: endpoint.host.clone(),
            closed: false,
        })
    }

    fn sftp(&self) -> Result<&Sftp> {
        self.sftp
            .as_ref()
            .ok_or_else(|| VaultCopyError::connection(&self.host, "session already closed"))
    }

    /// Create remote directory recursively
    fn create_remote_dir_all(&self, path: &Path) -> Result<()> {
        let sftp = self.sftp()?;
        let mut current = PathBuf::new();

        for component in path.components() {
            current.push(component);

            match sftp.stat(&current) {
                Ok(stat) => {
                    if !stat.is_dir() {
                        return Err(VaultCopyError::RemoteTransferError(format!(
                            "path exists but is not a directory: {}",
                            current.display()
                        )));
                    }
                }
                Err(_) => {
                    sftp.mkdir(&current, 0o755)
                        .map_err(|e| VaultCopyError::RemoteTransferError(e.to_string()))?;
                }
            }
        }

        Ok(())
    }

    fn upload_one(&self, local: &Path, remote: &Path) -> Result<u64> {
        let local_file =
            std::fs::File::open(local).map_err(|e| VaultCopyError::io(local, e))?;

        if let Some(parent) = remote.parent() {
            self.create_remote_dir_all(parent)?;
        }

        // sftp.create truncates an existing file, so a retried request
        // converges on the same destination state.
        let mut remote_file = self
            .sftp()?
            .create(remote)
            .map_err(|e| VaultCopyError::RemoteTransferError(e.to_string()))?;

        let mut reader = std::io::BufReader::with_capacity(TRANSFER_BUFFER_SIZE, local_file);
        let mut buffer = vec![0u8; TRANSFER_BUFFER_SIZE];
        let mut bytes_copied = 0u64;

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| VaultCopyError::io(local, e))?;

            if bytes_read == 0 {
                break;
            }

            remote_file
                .write_all(&buffer[..bytes_read])
                .map_err(|e| VaultCopyError::RemoteTransferError(e.to_string()))?;

            bytes_copied += bytes_read as u64;
        }

        Ok(bytes_copied)
    }
}

impl Session for SftpSession {
    fn put_file(&mut self, local: &Path, remote: &Path) -> Result<u64> {
        self.upload_one(local, remote)
    }

    fn put_tree(&mut self, local_root: &Path, remote_root: &Path) -> Result<TransferTotals> {
        let mut totals = TransferTotals::default();

        for entry in WalkDir::new(local_root).follow_links(false) {
            let entry = entry.map_err(|e| {
                VaultCopyError::RemoteTransferError(format!("walk failed: {e}"))
            })?;

            let relative = entry
                .path()
                .strip_prefix(local_root)
                .map_err(|e| VaultCopyError::validation(e.to_string()))?;

            if relative.as_os_str().is_empty() {
                continue;
            }

            let remote_path = remote_root.join(relative);

            if entry.file_type().is_dir() {
                self.create_remote_dir_all(&remote_path)?;
            } else if entry.file_type().is_file() {
                tracing::debug!(file = %relative.display(), "uploading");
                totals.bytes += self.upload_one(entry.path(), &remote_path)?;
                totals.files += 1;
            }
            // Symlinks and special files are skipped.
        }

        Ok(totals)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Drop the SFTP channel before tearing down the session.
        self.sftp = None;
        self.session
            .disconnect(None, "closing", None)
            .map_err(|e| VaultCopyError::connection(&self.host, e.to_string()))
    }
}

impl Drop for SftpSession {
    fn drop(&mut self) {
        // Backstop only; the orchestrator closes explicitly and logs
        // the outcome.
        let _ = self.close();
    }
}
