//! Transfer orchestrator
//!
//! State machine: `Idle -> SecretLookup -> SessionOpen -> Transferring
//! -> Cleanup -> Done`, with `Failed` reachable from any step.
//!
//! Retry policy:
//! - secret lookup failures are fatal, never retried
//! - session open is retried with exponential backoff on connection
//!   errors and timeouts; authentication failures are fatal
//! - the transfer is retried at whole-request granularity; sessions
//!   overwrite by name, so a retried request converges on the same
//!   destination state
//! - cleanup runs exactly once per invocation, even after a fatal
//!   failure, and close failures are logged as warnings, not escalated

use crate::audit::{AuditLogger, Severity};
use crate::config::{RemoteEndpoint, RetryPolicy, TransferConfig};
use crate::error::{Result, VaultCopyError};
use crate::network::{Session, Transport, TransferTotals};
use crate::secrets::SecretStore;
use crate::transfer::{duration_secs, TransferPhase, TransferRequest, TransferResult};
use std::time::Instant;

/// Drives one transfer request to completion.
pub struct TransferOrchestrator<'a> {
    store: &'a dyn SecretStore,
    transport: &'a dyn Transport,
    logger: &'a AuditLogger,
    endpoint: RemoteEndpoint,
    secret_name: String,
    retry: RetryPolicy,
}

impl<'a> TransferOrchestrator<'a> {
    /// Create an orchestrator for the configured endpoint and secret.
    pub fn new(
        store: &'a dyn SecretStore,
        transport: &'a dyn Transport,
        logger: &'a AuditLogger,
        config: &TransferConfig,
    ) -> Self {
        Self {
            store,
            transport,
            logger,
            endpoint: config.endpoint.clone(),
            secret_name: config.secret_name.clone(),
            retry: config.retry.clone(),
        }
    }

    /// Run the request to completion.
    pub fn run(&self, request: &TransferRequest) -> Result<TransferResult> {
        let started = Instant::now();
        self.enter(TransferPhase::Idle);
        self.audit(
            Severity::Info,
            &format!(
                "transfer started: {} -> {}:{} (secret '{}')",
                request.source.display(),
                self.endpoint,
                request.dest_dir.display(),
                self.secret_name
            ),
        );

        let mut session: Option<Box<dyn Session>> = None;
        let outcome = self.execute(request, &mut session);

        // Cleanup phase: unconditional, exactly once per invocation.
        self.enter(TransferPhase::Cleanup);
        if let Some(mut session) = session {
            if let Err(e) = session.close() {
                self.audit(
                    Severity::Warn,
                    &format!("cleanup warning: session close failed: {e}"),
                );
            }
        }

        match outcome {
            Ok(totals) => {
                self.enter(TransferPhase::Done);
                let result = TransferResult {
                    files_transferred: totals.files,
                    bytes_transferred: totals.bytes,
                    duration_secs: duration_secs(started.elapsed()),
                };
                self.audit(
                    Severity::Info,
                    &format!(
                        "transfer complete: {} files, {} bytes in {:.2}s",
                        result.files_transferred,
                        result.bytes_transferred,
                        result.duration_secs
                    ),
                );
                Ok(result)
            }
            Err(e) => {
                self.enter(TransferPhase::Failed);
                self.audit(Severity::Error, &format!("transfer failed: {e}"));
                Err(e)
            }
        }
    }

    /// Lookup, open, transfer. Cleanup belongs to the caller so it runs
    /// no matter where this returns.
    fn execute(
        &self,
        request: &TransferRequest,
        session_slot: &mut Option<Box<dyn Session>>,
    ) -> Result<TransferTotals> {
        self.enter(TransferPhase::SecretLookup);
        // Credentials are not assumed to become available mid-run.
        let secret = self.store.lookup(&self.secret_name)?;
        tracing::debug!(secret = %self.secret_name, user = %secret.username, "credential found");

        self.enter(TransferPhase::SessionOpen);
        let session = session_slot.insert(self.open_with_retry(&secret)?);
        // Plaintext scope ends with session open.
        drop(secret);

        self.enter(TransferPhase::Transferring);
        self.transfer_with_retry(session.as_mut(), request)
    }

    /// Open a session, retrying connection errors and timeouts with
    /// exponential backoff. Authentication failures are fatal.
    fn open_with_retry(&self, secret: &crate::secrets::Secret) -> Result<Box<dyn Session>> {
        let mut attempt = 0u32;

        loop {
            match self.transport.open(&self.endpoint, secret) {
                Ok(session) => return Ok(session),
                Err(e) if is_connect_retryable(&e)
                    && attempt + 1 < self.retry.max_connect_attempts =>
                {
                    let delay = self.retry.backoff_delay(attempt);
                    self.audit(
                        Severity::Warn,
                        &format!(
                            "session open attempt {} failed: {e}; retrying in {}s",
                            attempt + 1,
                            delay.as_secs()
                        ),
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Retry the transfer at whole-request granularity. Partial writes
    /// from a failed attempt are not assumed rolled back; sessions
    /// overwrite by name, so retries are idempotent at the destination.
    fn transfer_with_retry(
        &self,
        session: &mut dyn Session,
        request: &TransferRequest,
    ) -> Result<TransferTotals> {
        let mut attempt = 0u32;

        loop {
            match self.transfer_once(session, request) {
                Ok(totals) => return Ok(totals),
                Err(e) if e.is_retryable() && attempt + 1 < self.retry.max_transfer_attempts => {
                    let delay = self.retry.backoff_delay(attempt);
                    self.audit(
                        Severity::Warn,
                        &format!(
                            "transfer attempt {} failed: {e}; retrying in {}s",
                            attempt + 1,
                            delay.as_secs()
                        ),
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn transfer_once(
        &self,
        session: &mut dyn Session,
        request: &TransferRequest,
    ) -> Result<TransferTotals> {
        if request.copy_all {
            session.put_tree(&request.source, &request.dest_dir)
        } else {
            let name = match &request.dest_name {
                Some(name) => name.clone(),
                None => request
                    .source
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .ok_or_else(|| {
                        VaultCopyError::validation(format!(
                            "source has no file name: {}",
                            request.source.display()
                        ))
                    })?,
            };
            let remote = request.dest_dir.join(name);
            let bytes = session.put_file(&request.source, &remote)?;
            Ok(TransferTotals { files: 1, bytes })
        }
    }

    fn enter(&self, phase: TransferPhase) {
        tracing::debug!(?phase, "orchestrator phase");
    }

    /// Append to the audit log. A failing audit write must not abort a
    /// transfer already in flight; it degrades to a diagnostic warning.
    fn audit(&self, severity: Severity, message: &str) {
        let outcome = match severity {
            Severity::Info => self.logger.info(message),
            Severity::Warn => self.logger.warn(message),
            Severity::Error => self.logger.error(message),
        };
        if let Err(e) = outcome {
            tracing::warn!("audit log write failed: {e}");
        }
    }
}

fn is_connect_retryable(err: &VaultCopyError) -> bool {
    matches!(
        err,
        VaultCopyError::ConnectionError { .. } | VaultCopyError::Timeout(_)
    )
}
