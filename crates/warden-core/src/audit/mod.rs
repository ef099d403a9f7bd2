// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role change audit log.
//!
//! Every change of a principal's role, automatic or administrative, produces
//! one [`RoleChangeRecord`]. Loggers are append-only. Callers in the identity
//! service treat logger failures as non-fatal: the change itself stands and
//! the failure is reported through `tracing`.
//!
//! # Components
//!
//! - [`AuditLogger`]: Core trait for log implementations
//! - [`InMemoryAuditLogger`]: Shared in-memory buffer, queryable
//! - [`JsonLinesAuditLogger`]: Append-only JSON Lines file, queryable
//! - [`NoOpAuditLogger`]: Discards everything

mod error;
mod file_logger;
mod memory_logger;
mod types;

pub use error::{AuditError, AuditResult};
pub use file_logger::JsonLinesAuditLogger;
pub use memory_logger::InMemoryAuditLogger;
pub use types::{AuditFilter, RoleChangeRecord, SYSTEM_ACTOR};

use async_trait::async_trait;

// =============================================================================
// Core Trait
// =============================================================================

/// Trait for role change log implementations.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Appends a record.
    async fn log(&self, record: RoleChangeRecord) -> AuditResult<()>;

    /// Appends several records.
    ///
    /// The default implementation calls `log` for each record.
    async fn log_batch(&self, records: Vec<RoleChangeRecord>) -> AuditResult<()> {
        for record in records {
            self.log(record).await?;
        }
        Ok(())
    }

    /// Queries records with the given filter.
    async fn query(&self, filter: AuditFilter) -> AuditResult<Vec<RoleChangeRecord>>;

    /// Flushes any buffered records.
    async fn flush(&self) -> AuditResult<()>;

    /// Returns the logger name for identification.
    fn name(&self) -> &str {
        "audit_logger"
    }

    /// Returns `true` if this logger supports querying.
    fn supports_query(&self) -> bool {
        false
    }
}

// =============================================================================
// No-Op Logger
// =============================================================================

/// A logger that discards all records.
#[derive(Debug, Default, Clone)]
pub struct NoOpAuditLogger;

impl NoOpAuditLogger {
    /// Creates a new no-op logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLogger for NoOpAuditLogger {
    async fn log(&self, _record: RoleChangeRecord) -> AuditResult<()> {
        Ok(())
    }

    async fn query(&self, _filter: AuditFilter) -> AuditResult<Vec<RoleChangeRecord>> {
        Ok(Vec::new())
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
