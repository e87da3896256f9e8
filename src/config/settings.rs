//! Configuration settings for VaultCopy
//!
//! Defines all configuration options, CLI arguments, and defaults
//! for a transfer invocation.

use crate::error::{Result, VaultCopyError};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// VaultCopy - Credential-mediated secure remote file transfer
#[derive(Parser, Debug, Clone)]
#[command(name = "vaultcopy")]
#[command(author = "VaultCopy Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Secure file transfer using credentials from the OS secret store")]
#[command(long_about = r#"
VaultCopy copies a file or directory tree to a remote SFTP endpoint,
authenticating with a credential looked up in the OS secret store.
The credential value never touches disk, argv, or the audit log.

Examples:
  vaultcopy ./report.pdf user@files.example.com:/inbox --secret svc-files
  vaultcopy ./exports user@files.example.com:/drop --secret svc-files --copy-all
  vaultcopy ./cfg.xml user@host:/etc/app --secret svc-app --dest-name app.xml
"#)]
pub struct CliArgs {
    /// Local source path (file, or directory with --copy-all)
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Remote destination (user@host:/path)
    #[arg(value_name = "DESTINATION")]
    pub destination: String,

    /// Override the destination file name (single-file mode only)
    #[arg(long, value_name = "NAME")]
    pub dest_name: Option<String>,

    /// Name of the credential in the secret store
    #[arg(short = 's', long, value_name = "NAME")]
    pub secret: String,

    /// Secret store service under which credentials are filed
    #[arg(long, default_value = "vaultcopy", value_name = "SERVICE")]
    pub service: String,

    /// SSH port
    #[arg(short = 'P', long, default_value = "22", value_name = "PORT")]
    pub port: u16,

    /// Copy the whole source directory tree, preserving relative paths
    #[arg(short = 'a', long)]
    pub copy_all: bool,

    /// Timeout for blocking network operations in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    pub timeout: u64,

    /// Retry attempts for session open on transient network failures
    #[arg(long, default_value = "3", value_name = "NUM")]
    pub connect_retries: u32,

    /// Retry attempts for the transfer itself (whole-request granularity)
    #[arg(long, default_value = "3", value_name = "NUM")]
    pub transfer_retries: u32,

    /// Base retry delay in seconds (doubles per attempt)
    #[arg(long, default_value = "1", value_name = "SECS")]
    pub retry_delay: u64,

    /// Audit log file path
    #[arg(long, default_value = "vaultcopy.log", value_name = "PATH")]
    pub log_file: PathBuf,

    /// Rotate the audit log when it exceeds this size (e.g. 10M, 64K)
    #[arg(long, default_value = "10M", value_name = "SIZE")]
    pub log_max_size: String,

    /// Delete archived audit logs older than this many days
    #[arg(long, default_value = "30", value_name = "DAYS")]
    pub log_retention_days: u32,

    /// Silent mode (suppress non-error console output)
    #[arg(short = 'q', long)]
    pub silent: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format for the transfer summary
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

/// Output format for the transfer summary
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Remote SFTP endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEndpoint {
    /// Username for authentication
    pub user: String,
    /// Remote hostname or IP
    pub host: String,
    /// SSH port
    pub port: u16,
}

impl RemoteEndpoint {
    /// Socket address string, "host:port"
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for RemoteEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Retry policy for transient failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Session-open attempts on ConnectionError/Timeout
    pub max_connect_attempts: u32,
    /// Whole-request transfer attempts
    pub max_transfer_attempts: u32,
    /// Base delay, doubled each attempt
    pub base_delay: Duration,
    /// Cap on the backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_connect_attempts: 3,
            max_transfer_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(64),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff delay for the given zero-based attempt,
    /// capped at `max_delay`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(16);
        (self.base_delay * factor as u32).min(self.max_delay)
    }
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Local source path
    pub source: PathBuf,
    /// Remote destination directory
    pub dest_dir: PathBuf,
    /// Destination file name override (single-file mode)
    pub dest_name: Option<String>,
    /// Remote endpoint
    pub endpoint: RemoteEndpoint,
    /// Secret name to look up
    pub secret_name: String,
    /// Secret store service name
    pub service: String,
    /// Recursive directory mode
    pub copy_all: bool,
    /// Network operation timeout
    pub timeout: Duration,
    /// Retry policy
    pub retry: RetryPolicy,
    /// Audit log path
    pub log_file: PathBuf,
    /// Audit log rotation threshold in bytes
    pub log_max_size: u64,
    /// Archived log retention window in days
    pub log_retention_days: u32,
    /// Suppress non-error console output
    pub silent: bool,
    /// Verbosity level (0 = normal)
    pub verbose: u8,
    /// Summary output format
    pub output_format: OutputFormat,
}

impl TransferConfig {
    /// Create config from CLI arguments, validating paths and endpoint.
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let (endpoint, dest_dir) = parse_remote_destination(&args.destination, args.port)?;

        if !args.source.exists() {
            return Err(VaultCopyError::validation(format!(
                "source path does not exist: {}",
                args.source.display()
            )));
        }
        if args.copy_all && !args.source.is_dir() {
            return Err(VaultCopyError::validation(
                "--copy-all requires the source to be a directory",
            ));
        }
        if !args.copy_all && args.source.is_dir() {
            return Err(VaultCopyError::validation(
                "source is a directory; pass --copy-all for recursive transfer",
            ));
        }
        if args.dest_name.is_some() && args.copy_all {
            return Err(VaultCopyError::validation(
                "--dest-name only applies to single-file transfers",
            ));
        }
        if args.secret.trim().is_empty() {
            return Err(VaultCopyError::validation("secret name must not be empty"));
        }

        let log_max_size = parse_size(&args.log_max_size)
            .map_err(|e| VaultCopyError::config(format!("invalid --log-max-size: {e}")))?;

        Ok(Self {
            source: args.source.clone(),
            dest_dir,
            dest_name: args.dest_name.clone(),
            endpoint,
            secret_name: args.secret.clone(),
            service: args.service.clone(),
            copy_all: args.copy_all,
            timeout: Duration::from_secs(args.timeout),
            retry: RetryPolicy {
                max_connect_attempts: args.connect_retries.max(1),
                max_transfer_attempts: args.transfer_retries.max(1),
                base_delay: Duration::from_secs(args.retry_delay),
                ..Default::default()
            },
            log_file: args.log_file.clone(),
            log_max_size,
            log_retention_days: args.log_retention_days,
            silent: args.silent,
            verbose: args.verbose,
            output_format: args.output_format,
        })
    }
}

/// Parse a remote destination of the form `user@host:/path`.
///
/// The path component is required; a bare `user@host` is rejected so a
/// typo cannot silently target the remote home directory.
pub fn parse_remote_destination(dest: &str, port: u16) -> Result<(RemoteEndpoint, PathBuf)> {
    let (user_host, remote_path) = dest
        .split_once(':')
        .ok_or_else(|| VaultCopyError::validation(format!("destination must be user@host:/path, got '{dest}'")))?;

    let (user, host) = user_host
        .split_once('@')
        .ok_or_else(|| VaultCopyError::validation(format!("destination must be user@host:/path, got '{dest}'")))?;

    if user.is_empty() || host.is_empty() || remote_path.is_empty() {
        return Err(VaultCopyError::validation(format!(
            "destination must be user@host:/path, got '{dest}'"
        )));
    }

    Ok((
        RemoteEndpoint {
            user: user.to_string(),
            host: host.to_string(),
            port,
        },
        PathBuf::from(remote_path),
    ))
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        let num = size.trim_end_matches(|c| c == 'G' || c == 'B');
        (num, 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        let num = size.trim_end_matches(|c| c == 'M' || c == 'B');
        (num, 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        let num = size.trim_end_matches(|c| c == 'K' || c == 'B');
        (num, 1024u64)
    } else if size.ends_with('B') {
        let num = size.trim_end_matches('B');
        (num, 1u64)
    } else {
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {num_str}"))?;

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1K").unwrap(), 1024);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("10M").unwrap(), 10 * 1024 * 1024);
        assert_eq!(parse_size("1G").unwrap(), 1024 * 1024 * 1024);
        assert!(parse_size("").is_err());
        assert!(parse_size("abc").is_err());
    }

    #[test]
    fn test_parse_remote_destination() {
        let (ep, path) = parse_remote_destination("user@host:/path/to/dir", 22).unwrap();
        assert_eq!(ep.user, "user");
        assert_eq!(ep.host, "host");
        assert_eq!(ep.port, 22);
        assert_eq!(path, PathBuf::from("/path/to/dir"));
        assert_eq!(ep.addr(), "host:22");
        assert_eq!(ep.to_string(), "user@host:22");
    }

    #[test]
    fn test_parse_remote_destination_rejects_malformed() {
        assert!(parse_remote_destination("/local/path", 22).is_err());
        assert!(parse_remote_destination("user@host", 22).is_err());
        assert!(parse_remote_destination("host:/path", 22).is_err());
        assert!(parse_remote_destination("user@:/path", 22).is_err());
        assert!(parse_remote_destination("user@host:", 22).is_err());
    }

    #[test]
    fn test_backoff_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(8));
        // Caps at max_delay
        assert_eq!(policy.backoff_delay(10), Duration::from_secs(64));
    }

    #[test]
    fn test_from_cli_validation() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.bin");
        std::fs::write(&file, b"payload").unwrap();

        let mut args = CliArgs {
            source: file.clone(),
            destination: "user@host:/inbox".to_string(),
            dest_name: None,
            secret: "svc-files".to_string(),
            service: "vaultcopy".to_string(),
            port: 22,
            copy_all: false,
            timeout: 30,
            connect_retries: 3,
            transfer_retries: 3,
            retry_delay: 1,
            log_file: dir.path().join("audit.log"),
            log_max_size: "10M".to_string(),
            log_retention_days: 30,
            silent: false,
            verbose: 0,
            output_format: OutputFormat::Text,
        };

        let config = TransferConfig::from_cli(&args).unwrap();
        assert_eq!(config.endpoint.host, "host");
        assert_eq!(config.log_max_size, 10 * 1024 * 1024);

        // Directory source without --copy-all is rejected
        args.source = dir.path().to_path_buf();
        assert!(TransferConfig::from_cli(&args).is_err());

        // Directory source with --copy-all is accepted
        args.copy_all = true;
        assert!(TransferConfig::from_cli(&args).is_ok());

        // --dest-name conflicts with --copy-all
        args.dest_name = Some("renamed.bin".to_string());
        assert!(TransferConfig::from_cli(&args).is_err());

        // Missing source
        args.copy_all = false;
        args.dest_name = None;
        args.source = dir.path().join("missing.bin");
        assert!(TransferConfig::from_cli(&args).is_err());
    }
}
