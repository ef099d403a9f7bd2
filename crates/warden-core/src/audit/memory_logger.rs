// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory role change log.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::AuditResult;
use super::types::{AuditFilter, RoleChangeRecord};
use super::AuditLogger;

/// In-memory role change log for tests and single-process deployments.
///
/// Cloning shares the underlying buffer.
#[derive(Debug, Clone)]
pub struct InMemoryAuditLogger {
    records: Arc<RwLock<Vec<RoleChangeRecord>>>,
    /// Maximum number of records to keep (0 = unlimited).
    max_entries: usize,
}

impl Default for InMemoryAuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuditLogger {
    /// Creates a new in-memory logger with unlimited capacity.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            max_entries: 0,
        }
    }

    /// Creates a logger that keeps only the newest `max_entries` records.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::with_capacity(max_entries.min(10_000)))),
            max_entries,
        }
    }

    /// Returns all records in insertion order.
    pub fn entries(&self) -> Vec<RoleChangeRecord> {
        self.records.read().clone()
    }

    /// Returns records for one principal.
    pub fn entries_for(&self, email: &str) -> Vec<RoleChangeRecord> {
        let email = crate::types::Email::normalize(email);
        self.records
            .read()
            .iter()
            .filter(|r| r.email.as_str() == email)
            .cloned()
            .collect()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Clears all records.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

#[async_trait]
impl AuditLogger for InMemoryAuditLogger {
    async fn log(&self, record: RoleChangeRecord) -> AuditResult<()> {
        let mut records = self.records.write();
        if self.max_entries > 0 && records.len() >= self.max_entries {
            records.remove(0);
        }
        records.push(record);
        Ok(())
    }

    async fn query(&self, filter: AuditFilter) -> AuditResult<Vec<RoleChangeRecord>> {
        let matched = self
            .records
            .read()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        Ok(filter.finish(matched))
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
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

    fn record(email: &str, to: &str) -> RoleChangeRecord {
        RoleChangeRecord::initial_assignment(Email::parse(email).unwrap(), RoleKey::new(to))
    }

    #[tokio::test]
    async fn test_memory_logger_query() {
        let logger = InMemoryAuditLogger::new();
        logger.log(record("a@x.com", "VIEWER")).await.unwrap();
        logger.log(record("b@x.com", "VIEWER")).await.unwrap();
        logger.log(record("a@x.com", "DEVELOPER")).await.unwrap();

        assert_eq!(logger.len(), 3);
        assert_eq!(logger.entries_for("A@X.COM").len(), 2);

        let newest = logger
            .query(AuditFilter::new().email("a@x.com").descending().limit(1))
            .await
            .unwrap();
        assert_eq!(newest.len(), 1);
        assert_eq!(newest[0].to_role.as_str(), "DEVELOPER");
    }

    #[tokio::test]
    async fn test_memory_logger_capacity() {
        let logger = InMemoryAuditLogger::with_capacity(2);
        logger.log(record("a@x.com", "VIEWER")).await.unwrap();
        logger.log(record("b@x.com", "VIEWER")).await.unwrap();
        logger.log(record("c@x.com", "VIEWER")).await.unwrap();

        let emails: Vec<String> = logger
            .entries()
            .into_iter()
            .map(|r| r.email.into_inner())
            .collect();
        assert_eq!(emails, vec!["b@x.com", "c@x.com"]);
    }
}
