// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Append-only JSON Lines role change log.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{AuditError, AuditResult};
use super::types::{AuditFilter, RoleChangeRecord};
use super::AuditLogger;

/// File-backed role change log, one JSON object per line.
///
/// Records are flushed after every write so that a crash loses at most the
/// record being written. Lines that fail to parse on query are skipped.
#[derive(Debug)]
pub struct JsonLinesAuditLogger {
    path: PathBuf,
    writer: Arc<Mutex<BufWriter<File>>>,
    records_written: AtomicU64,
}

impl JsonLinesAuditLogger {
    /// Opens (or creates) the log file at `path`.
    pub fn open(path: impl AsRef<Path>) -> AuditResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = Self::open_file(&path)?;
        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
            records_written: AtomicU64::new(0),
        })
    }

    fn open_file(path: &Path) -> AuditResult<File> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                AuditError::write_failed_with(format!("Failed to open {}", path.display()), e)
            })
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of records written by this instance.
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    fn write_record(&self, record: &RoleChangeRecord) -> AuditResult<()> {
        let line = serde_json::to_string(record)?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        self.records_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn read_records(&self) -> AuditResult<Vec<RoleChangeRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AuditError::query_failed(format!(
                    "Failed to open {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RoleChangeRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed audit line"
                ),
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl AuditLogger for JsonLinesAuditLogger {
    async fn log(&self, record: RoleChangeRecord) -> AuditResult<()> {
        self.write_record(&record)
    }

    async fn query(&self, filter: AuditFilter) -> AuditResult<Vec<RoleChangeRecord>> {
        let matched = self
            .read_records()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        Ok(filter.finish(matched))
    }

    async fn flush(&self) -> AuditResult<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "jsonl"
    }

    fn supports_query(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Email, RoleKey};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_jsonl_logger_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit/role-changes.jsonl");

        {
            let logger = JsonLinesAuditLogger::open(&path).unwrap();
            logger
                .log(RoleChangeRecord::initial_assignment(
                    Email::parse("a@x.com").unwrap(),
                    RoleKey::new("VIEWER"),
                ))
                .await
                .unwrap();
            assert_eq!(logger.records_written(), 1);
        }

        let logger = JsonLinesAuditLogger::open(&path).unwrap();
        logger
            .log(RoleChangeRecord::automatic(
                Email::parse("a@x.com").unwrap(),
                RoleKey::new("VIEWER"),
                RoleKey::new("DEVELOPER"),
            ))
            .await
            .unwrap();

        let all = logger.query(AuditFilter::new()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].from_role.is_none());
        assert_eq!(all[1].to_role.as_str(), "DEVELOPER");
    }

    #[tokio::test]
    async fn test_jsonl_logger_skips_malformed_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        fs::write(&path, "{not json}\n\n").unwrap();

        let logger = JsonLinesAuditLogger::open(&path).unwrap();
        logger
            .log(RoleChangeRecord::initial_assignment(
                Email::parse("b@x.com").unwrap(),
                RoleKey::new("VIEWER"),
            ))
            .await
            .unwrap();

        let all = logger.query(AuditFilter::new().email("b@x.com")).await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
