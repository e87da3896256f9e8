//! # VaultCopy - Credential-Mediated Secure File Transfer
//!
//! VaultCopy copies a file or directory tree to a remote SFTP endpoint
//! using a credential looked up in the OS secret store. The credential
//! never persists on disk, never appears in logs, and its plaintext
//! lifetime is scoped to the session-open call.
//!
//! ## Workflow
//!
//! 1. **Secret lookup** - the named credential is fetched from the
//!    secret store; absence is fatal, no retry.
//! 2. **Session open** - an authenticated SFTP session is established;
//!    transient network failures are retried with exponential backoff,
//!    authentication failures are fatal.
//! 3. **Transfer** - single-file or recursive-directory upload,
//!    overwrite-by-name so retries are idempotent at the destination.
//! 4. **Cleanup** - the session is closed on every exit path; close
//!    failures are logged as warnings, never escalated.
//!
//! Every step appends a redacted entry to a size-rotated audit log.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vaultcopy::audit::AuditLogger;
//! use vaultcopy::config::{RemoteEndpoint, RetryPolicy, TransferConfig};
//! use vaultcopy::network::SftpTransport;
//! use vaultcopy::secrets::KeyringStore;
//! use vaultcopy::transfer::{TransferOrchestrator, TransferRequest};
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! let config = TransferConfig {
//!     source: PathBuf::from("./report.pdf"),
//!     dest_dir: PathBuf::from("/inbox"),
//!     dest_name: None,
//!     endpoint: RemoteEndpoint {
//!         user: "svc".into(),
//!         host: "files.example.com".into(),
//!         port: 22,
//!     },
//!     secret_name: "svc-files".into(),
//!     service: "vaultcopy".into(),
//!     copy_all: false,
//!     timeout: Duration::from_secs(30),
//!     retry: RetryPolicy::default(),
//!     log_file: PathBuf::from("vaultcopy.log"),
//!     log_max_size: 10 * 1024 * 1024,
//!     log_retention_days: 30,
//!     silent: false,
//!     verbose: 0,
//!     output_format: vaultcopy::config::OutputFormat::Text,
//! };
//!
//! let store = KeyringStore::new(&config.service);
//! let transport = SftpTransport::new(config.timeout);
//! let logger = AuditLogger::new(&config.log_file, config.log_max_size,
//!                               config.log_retention_days).unwrap();
//!
//! let orchestrator = TransferOrchestrator::new(&store, &transport, &logger, &config);
//! let result = orchestrator.run(&TransferRequest::from_config(&config)).unwrap();
//! result.print_summary();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod config;
pub mod error;
pub mod network;
pub mod secrets;
pub mod transfer;

// Re-export commonly used types
pub use audit::AuditLogger;
pub use config::{TransferConfig, RemoteEndpoint, RetryPolicy};
pub use error::{Result, VaultCopyError};
pub use transfer::{TransferOrchestrator, TransferRequest, TransferResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
