//! Rotating audit log
//!
//! One UTF-8 line per entry, `"<ISO-8601 timestamp> - <message>"`.
//! When the active file exceeds the size threshold it is moved into an
//! `archive/` directory next to it with a timestamp suffix, and a fresh
//! file is started. A maintenance pass at construction deletes archives
//! older than the retention window.

use crate::audit::redact::scrub;
use crate::error::{Result, VaultCopyError};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const ARCHIVE_DIR: &str = "archive";
const ARCHIVE_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Entry severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine progress entries
    Info,
    /// Non-fatal anomalies (cleanup failures, retried attempts)
    Warn,
    /// Fatal failures
    Error,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// Append-only audit logger with size-based rotation.
pub struct AuditLogger {
    path: PathBuf,
    max_size: u64,
    retention_days: u32,
}

impl AuditLogger {
    /// Open (or create) the audit log and run the retention pass over
    /// its archive directory.
    pub fn new(path: impl Into<PathBuf>, max_size: u64, retention_days: u32) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| VaultCopyError::io(parent, e))?;
            }
        }

        let logger = Self {
            path,
            max_size,
            retention_days,
        };
        logger.prune_archives()?;
        Ok(logger)
    }

    /// Active log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an informational entry.
    pub fn info(&self, message: &str) -> Result<()> {
        self.write_entry(Severity::Info, message)
    }

    /// Append a warning entry.
    pub fn warn(&self, message: &str) -> Result<()> {
        self.write_entry(Severity::Warn, message)
    }

    /// Append an error entry.
    pub fn error(&self, message: &str) -> Result<()> {
        self.write_entry(Severity::Error, message)
    }

    fn write_entry(&self, severity: Severity, message: &str) -> Result<()> {
        self.rotate_if_needed()?;

        let line = format_line(Local::now(), severity, &scrub(message));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| VaultCopyError::LogError(format!("open {}: {e}", self.path.display())))?;

        writeln!(file, "{line}")
            .map_err(|e| VaultCopyError::LogError(format!("write {}: {e}", self.path.display())))
    }

    /// Move the active file into the archive directory once it exceeds
    /// the size threshold.
    fn rotate_if_needed(&self) -> Result<()> {
        let size = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(_) => return Ok(()),
        };
        if size <= self.max_size {
            return Ok(());
        }

        let archive_dir = self.archive_dir();
        fs::create_dir_all(&archive_dir).map_err(|e| VaultCopyError::io(&archive_dir, e))?;

        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audit".to_string());
        let stamp = Utc::now().format(ARCHIVE_STAMP_FORMAT);
        let mut archived = archive_dir.join(format!("{stem}-{stamp}.log"));

        // Same-second rotations must not clobber an earlier archive.
        let mut counter = 1;
        while archived.exists() {
            archived = archive_dir.join(format!("{stem}-{stamp}-{counter}.log"));
            counter += 1;
        }

        fs::rename(&self.path, &archived)
            .map_err(|e| VaultCopyError::LogError(format!("rotate to archive: {e}")))
    }

    /// Delete archived logs older than the retention window. Files whose
    /// names do not carry a parseable timestamp suffix are left alone.
    pub fn prune_archives(&self) -> Result<()> {
        let archive_dir = self.archive_dir();
        let entries = match fs::read_dir(&archive_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(()),
        };

        let cutoff = Utc::now() - ChronoDuration::days(i64::from(self.retention_days));

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(stamp) = archive_timestamp(&path) {
                if stamp < cutoff {
                    tracing::debug!(file = %path.display(), "pruning expired archive");
                    fs::remove_file(&path).map_err(|e| {
                        VaultCopyError::LogError(format!("prune {}: {e}", path.display()))
                    })?;
                }
            }
        }

        Ok(())
    }

    fn archive_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join(ARCHIVE_DIR)
    }
}

/// Format a single audit line.
fn format_line(timestamp: DateTime<Local>, severity: Severity, message: &str) -> String {
    format!(
        "{} - [{}] {}",
        timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        severity.label(),
        message
    )
}

/// Extract the UTC timestamp encoded in an archive file name
/// (`<stem>-YYYYmmddHHMMSS[-n].log`).
fn archive_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    let stem = path.file_stem()?.to_str()?;
    let candidate = stem
        .rsplit('-')
        .find(|part| part.len() == 14 && part.chars().all(|c| c.is_ascii_digit()))?;
    let naive = NaiveDateTime::parse_from_str(candidate, ARCHIVE_STAMP_FORMAT).ok()?;
    Some(naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_log(path: &Path) -> String {
        fs::read_to_string(path).unwrap_or_default()
    }

    #[test]
    fn test_line_format() {
        let ts = Local::now();
        let line = format_line(ts, Severity::Info, "transfer complete");
        // "<ISO-8601 timestamp> - <message>"
        let (stamp, rest) = line.split_once(" - ").unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
        assert_eq!(rest, "[INFO] transfer complete");
    }

    #[test]
    fn test_append_only() {
        let dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(dir.path().join("audit.log"), 1024 * 1024, 30).unwrap();

        logger.info("first").unwrap();
        logger.warn("second").unwrap();
        logger.error("third").unwrap();

        let content = read_log(logger.path());
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("[INFO] first"));
        assert!(lines[1].contains("[WARN] second"));
        assert!(lines[2].contains("[ERROR] third"));
    }

    #[test]
    fn test_writes_are_scrubbed() {
        let dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(dir.path().join("audit.log"), 1024 * 1024, 30).unwrap();

        logger.error("ssh failed: password=p@ss for user1").unwrap();

        let content = read_log(logger.path());
        assert!(!content.contains("p@ss"));
        assert!(content.contains("password=***"));
    }

    #[test]
    fn test_rotation_on_threshold() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(&log_path, 150, 30).unwrap();

        // Three entries push the active file past the threshold; the fourth
        // write triggers rotation and lands in a fresh file.
        logger.info("a long enough entry to fill the file").unwrap();
        logger.info("a long enough entry to fill the file").unwrap();
        logger.info("a long enough entry to fill the file").unwrap();
        logger.info("this write lands in a fresh file").unwrap();

        let archive_dir = dir.path().join("archive");
        let archived: Vec<_> = fs::read_dir(&archive_dir).unwrap().flatten().collect();
        assert_eq!(archived.len(), 1);
        let archived_name = archived[0].file_name().to_string_lossy().to_string();
        assert!(archived_name.starts_with("audit-"));
        assert!(archived_name.ends_with(".log"));

        // Fresh file holds only the last entry.
        let content = read_log(&log_path);
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("fresh file"));
    }

    #[test]
    fn test_retention_prunes_only_expired() {
        let dir = TempDir::new().unwrap();
        let archive_dir = dir.path().join("archive");
        fs::create_dir_all(&archive_dir).unwrap();

        let old_stamp = (Utc::now() - ChronoDuration::days(45)).format(ARCHIVE_STAMP_FORMAT);
        let new_stamp = (Utc::now() - ChronoDuration::days(5)).format(ARCHIVE_STAMP_FORMAT);
        let old_file = archive_dir.join(format!("audit-{old_stamp}.log"));
        let new_file = archive_dir.join(format!("audit-{new_stamp}.log"));
        let odd_file = archive_dir.join("notes.txt");
        fs::write(&old_file, "old").unwrap();
        fs::write(&new_file, "new").unwrap();
        fs::write(&odd_file, "keep").unwrap();

        // Construction runs the retention pass.
        let _logger = AuditLogger::new(dir.path().join("audit.log"), 1024, 30).unwrap();

        assert!(!old_file.exists());
        assert!(new_file.exists());
        assert!(odd_file.exists());
    }

    #[test]
    fn test_archive_timestamp_parsing() {
        let ts = archive_timestamp(Path::new("/x/archive/audit-20260815120000.log")).unwrap();
        assert_eq!(ts.format("%Y-%m-%d").to_string(), "2026-08-15");
        assert!(archive_timestamp(Path::new("/x/archive/notes.txt")).is_none());
        // Disambiguation suffix still parses
        assert!(archive_timestamp(Path::new("/x/archive/audit-20260815120000-1.log")).is_some());
    }
}
