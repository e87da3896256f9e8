//! Transfer orchestration
//!
//! Drives one request through secret lookup, session open, transfer,
//! and unconditional cleanup, with bounded retry on transient failures.

mod orchestrator;

pub use orchestrator::TransferOrchestrator;

use crate::config::TransferConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// One transfer request. Immutable once constructed; created per
/// invocation and discarded after completion.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Local source path
    pub source: PathBuf,
    /// Remote destination directory
    pub dest_dir: PathBuf,
    /// Destination file name override (single-file mode)
    pub dest_name: Option<String>,
    /// Recursive directory mode
    pub copy_all: bool,
}

impl TransferRequest {
    /// Build the request from validated runtime configuration.
    pub fn from_config(config: &TransferConfig) -> Self {
        Self {
            source: config.source.clone(),
            dest_dir: config.dest_dir.clone(),
            dest_name: config.dest_name.clone(),
            copy_all: config.copy_all,
        }
    }
}

/// Outcome of a completed transfer. Carries no secret material.
#[derive(Debug, Clone, Serialize)]
pub struct TransferResult {
    /// Files written at the destination
    pub files_transferred: u64,
    /// Bytes written at the destination
    pub bytes_transferred: u64,
    /// Wall-clock duration in seconds
    pub duration_secs: f64,
}

impl TransferResult {
    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Transfer Summary ===");
        println!("Files transferred: {}", self.files_transferred);
        println!(
            "Bytes transferred: {}",
            humansize::format_size(self.bytes_transferred, humansize::BINARY)
        );
        println!("Duration:          {:.2}s", self.duration_secs);
    }

    /// Render the summary as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Orchestrator state machine phases.
///
/// `Failed` is reachable from any step; `Cleanup` runs unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    /// Not yet started
    Idle,
    /// Fetching the credential from the secret store
    SecretLookup,
    /// Opening the authenticated session (retried on transient errors)
    SessionOpen,
    /// Uploading the request payload
    Transferring,
    /// Releasing the session, unconditional
    Cleanup,
    /// Completed successfully
    Done,
    /// Terminal failure
    Failed,
}

/// Shared helper: duration as fractional seconds for results.
pub(crate) fn duration_secs(duration: Duration) -> f64 {
    duration.as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_json_round_trip() {
        let result = TransferResult {
            files_transferred: 3,
            bytes_transferred: 4096,
            duration_secs: 1.25,
        };
        let json = result.to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files_transferred"], 3);
        assert_eq!(value["bytes_transferred"], 4096);
    }
}
