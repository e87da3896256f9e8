//! Audit logging
//!
//! Append-only, size-rotated audit trail for transfer runs. Every
//! message is scrubbed before formatting so credential fragments from
//! underlying libraries can never reach the file.

mod logger;
mod redact;

pub use logger::{AuditLogger, Severity};
pub use redact::scrub;
