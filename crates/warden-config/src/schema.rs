// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema for warden.
//!
//! Every section carries `#[serde(default)]`, so an empty document yields
//! the built-in role table, route table and session timings.
//!
//! Mappings and roles are lists of records rather than maps keyed by email
//! or role key: the YAML path goes through the `config` crate, and record
//! values keep their case where map keys might not.

use std::collections::HashSet;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use warden_core::role::default_roles;
use warden_core::{
    AuditLogger, Email, IdentityService, InMemoryAuditLogger, JsonLinesAuditLogger,
    NoOpAuditLogger, RoleConfig, RoleRegistry, DEFAULT_ROLE, DEFAULT_TOP_ROLE,
};
use warden_session::{
    FileSessionStore, HierarchyRule, MemorySessionStore, RouteGuard, RouteRule, SessionConfig,
    SessionContext, SessionStore, TokenRefresher, DEFAULT_LOGIN_PATH,
};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// WardenConfig
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Role table.
    pub roles: RolesConfig,
    /// Static email-to-role mappings.
    pub mappings: Vec<StaticMapping>,
    /// Route guard table.
    pub routes: RoutesConfig,
    /// Session timings.
    pub session: SessionConfig,
    /// Session persistence.
    pub session_store: SessionStoreConfig,
    /// Identity resolution.
    pub identity: IdentityConfig,
    /// Role change log.
    pub audit: AuditConfig,
    /// HTTP surface.
    pub api: ApiSettings,
    /// Logging.
    pub logging: LoggingConfig,
}

impl WardenConfig {
    /// Validates the whole configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.roles.validate()?;
        let known: HashSet<&str> = self.roles.definitions.iter().map(|r| r.key.as_str()).collect();

        for (i, mapping) in self.mappings.iter().enumerate() {
            mapping.validate(i, &known)?;
        }
        self.routes.validate(&known)?;
        validate_session(&self.session)?;
        self.identity.validate()?;
        self.audit.validate()?;
        self.api.validate()?;
        Ok(())
    }

    /// Returns non-fatal findings worth showing to an operator.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut seen = HashSet::new();
        for mapping in &self.mappings {
            let email = Email::normalize(&mapping.email);
            if !seen.insert(email.clone()) {
                warnings.push(format!(
                    "mappings: '{}' is listed more than once; the first entry wins",
                    email
                ));
            }
        }

        if self.routes.rules.is_empty() {
            warnings.push("routes.rules: no route rules; every route only requires a session".into());
        }

        if self.api.token_secret.as_deref().map_or(true, str::is_empty) {
            warnings.push(
                "api.token_secret: not set; bearer signatures are not verified".into(),
            );
        }

        if matches!(self.audit.backend, AuditBackend::None) {
            warnings.push("audit.backend: role changes are not recorded".into());
        }

        warnings
    }

    // =========================================================================
    // Runtime construction
    // =========================================================================

    /// Builds the role registry.
    pub fn build_registry(&self) -> ConfigResult<Arc<RoleRegistry>> {
        let registry = RoleRegistry::builder()
            .add_roles(self.roles.definitions.iter().cloned())
            .top_role(self.roles.top_role.as_str())
            .default_role(self.roles.default_role.as_str())
            .build()?;
        debug!(roles = registry.len(), "Role registry built");
        Ok(Arc::new(registry))
    }

    /// Builds the audit logger selected by `audit.backend`.
    pub fn build_audit_logger(&self) -> ConfigResult<Arc<dyn AuditLogger>> {
        let logger: Arc<dyn AuditLogger> = match self.audit.backend {
            AuditBackend::Memory => Arc::new(InMemoryAuditLogger::with_capacity(self.audit.max_entries)),
            AuditBackend::Jsonl => Arc::new(
                JsonLinesAuditLogger::open(&self.audit.path)
                    .map_err(|e| ConfigError::build("audit logger", e.to_string()))?,
            ),
            AuditBackend::None => Arc::new(NoOpAuditLogger::new()),
        };
        Ok(logger)
    }

    /// Builds the identity service over `registry`.
    pub fn build_identity_service(&self, registry: Arc<RoleRegistry>) -> ConfigResult<IdentityService> {
        let service = IdentityService::builder(registry)
            .static_mappings(
                self.mappings
                    .iter()
                    .map(|m| (m.email.as_str(), m.role.as_str())),
            )
            .audit_logger(self.build_audit_logger()?)
            .store_timeout(self.identity.lookup_timeout())
            .build();
        Ok(service)
    }

    /// Builds the route guard over `registry`.
    pub fn build_route_guard(&self, registry: Arc<RoleRegistry>) -> RouteGuard {
        let mut guard = RouteGuard::new(registry)
            .with_login_path(self.routes.login_path.as_str())
            .with_exempt_paths(self.routes.exempt.iter().cloned())
            .with_routes(self.routes.rules.iter().cloned());
        if self.routes.default_exempt {
            guard = guard.with_default_exempt_paths();
        }
        for rule in &self.routes.hierarchy {
            guard = guard.with_hierarchy_rule(rule.clone());
        }
        guard
    }

    /// Builds the session snapshot store selected by `session_store.dir`.
    pub fn build_session_store(&self) -> ConfigResult<Arc<dyn SessionStore>> {
        let store: Arc<dyn SessionStore> = match &self.session_store.dir {
            Some(dir) => Arc::new(
                FileSessionStore::new(dir)
                    .map_err(|e| ConfigError::build("session store", e.to_string()))?,
            ),
            None => Arc::new(MemorySessionStore::new()),
        };
        Ok(store)
    }

    /// Builds a session context with the configured timings and store.
    pub fn build_session_context(
        &self,
        registry: Arc<RoleRegistry>,
        refresher: Option<Arc<dyn TokenRefresher>>,
    ) -> ConfigResult<SessionContext> {
        let mut builder = SessionContext::builder(registry)
            .config(self.session.clone())
            .store(self.build_session_store()?);
        if let Some(refresher) = refresher {
            builder = builder.refresher(refresher);
        }
        debug!(
            persistent = self.session_store.dir.is_some(),
            storage_key = %self.session.storage_key,
            "Session context built"
        );
        Ok(builder.build())
    }
}

// =============================================================================
// Roles
// =============================================================================

/// Role table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    /// Role that bypasses every permission check.
    pub top_role: String,
    /// Role given when no mapping matches.
    pub default_role: String,
    /// Role definitions.
    pub definitions: Vec<RoleConfig>,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            top_role: DEFAULT_TOP_ROLE.to_string(),
            default_role: DEFAULT_ROLE.to_string(),
            definitions: default_roles(),
        }
    }
}

impl RolesConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.definitions.is_empty() {
            return Err(ConfigError::validation("roles.definitions", "cannot be empty"));
        }

        let mut keys = HashSet::new();
        for (i, role) in self.definitions.iter().enumerate() {
            let field = format!("roles.definitions[{}]", i);
            if role.key.as_str().trim().is_empty() {
                return Err(ConfigError::validation(format!("{}.key", field), "cannot be empty"));
            }
            if !keys.insert(role.key.as_str()) {
                return Err(ConfigError::validation(
                    format!("{}.key", field),
                    format!("duplicate role '{}'", role.key),
                ));
            }
            for (j, grant) in role.permissions.iter().enumerate() {
                let field = format!("{}.permissions[{}]", field, j);
                if grant.resource.trim().is_empty() {
                    return Err(ConfigError::validation(
                        format!("{}.resource", field),
                        "cannot be empty",
                    ));
                }
                if grant.actions.is_empty() || grant.actions.iter().any(|a| a.trim().is_empty()) {
                    return Err(ConfigError::validation(
                        format!("{}.actions", field),
                        "needs at least one non-empty action",
                    ));
                }
            }
        }

        if !keys.contains(self.top_role.as_str()) {
            return Err(ConfigError::validation(
                "roles.top_role",
                format!("'{}' is not a defined role", self.top_role),
            ));
        }
        if !keys.contains(self.default_role.as_str()) {
            return Err(ConfigError::validation(
                "roles.default_role",
                format!("'{}' is not a defined role", self.default_role),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Mappings
// =============================================================================

/// One static email-to-role mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticMapping {
    /// Email address (normalised on use).
    pub email: String,
    /// Role key.
    pub role: String,
}

impl StaticMapping {
    /// Creates a mapping.
    pub fn new(email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: role.into(),
        }
    }

    fn validate(&self, index: usize, known: &HashSet<&str>) -> ConfigResult<()> {
        let field = format!("mappings[{}]", index);
        Email::parse(&self.email).map_err(|e| {
            ConfigError::validation(format!("{}.email", field), e.to_string())
        })?;
        if !known.contains(self.role.as_str()) {
            return Err(ConfigError::validation(
                format!("{}.role", field),
                format!("unknown role '{}'", self.role),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Route guard table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Where unauthenticated navigation is sent.
    pub login_path: String,
    /// Also exempt the login, OAuth callback and debug paths.
    pub default_exempt: bool,
    /// Extra exempt paths; a trailing `*` makes a prefix match.
    pub exempt: Vec<String>,
    /// Route to `(resource, action)` requirements.
    pub rules: Vec<RouteRule>,
    /// Minimum role requirements.
    pub hierarchy: Vec<HierarchyRule>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            default_exempt: true,
            exempt: Vec::new(),
            rules: default_route_rules(),
            hierarchy: vec![
                HierarchyRule::new("/settings", "MANAGER"),
                HierarchyRule::new("/admin", "ADMIN"),
            ],
        }
    }
}

impl RoutesConfig {
    fn validate(&self, known: &HashSet<&str>) -> ConfigResult<()> {
        if !self.login_path.starts_with('/') {
            return Err(ConfigError::validation("routes.login_path", "must start with '/'"));
        }

        for (i, rule) in self.rules.iter().enumerate() {
            let field = format!("routes.rules[{}]", i);
            if !rule.path.starts_with('/') {
                return Err(ConfigError::validation(format!("{}.path", field), "must start with '/'"));
            }
            if rule.resource.trim().is_empty() {
                return Err(ConfigError::validation(format!("{}.resource", field), "cannot be empty"));
            }
            if rule.action.trim().is_empty() {
                return Err(ConfigError::validation(format!("{}.action", field), "cannot be empty"));
            }
        }

        for (i, rule) in self.hierarchy.iter().enumerate() {
            if !known.contains(rule.min_role.as_str()) {
                return Err(ConfigError::validation(
                    format!("routes.hierarchy[{}].min_role", i),
                    format!("unknown role '{}'", rule.min_role),
                ));
            }
        }
        Ok(())
    }
}

/// The built-in route table of the project-management UI.
pub fn default_route_rules() -> Vec<RouteRule> {
    vec![
        RouteRule::new("/projects", "projects", "read"),
        RouteRule::new("/projects/new", "projects", "create"),
        RouteRule::new("/tasks", "tasks", "read"),
        RouteRule::new("/tasks/new", "tasks", "create"),
        RouteRule::new("/users", "users", "read"),
        RouteRule::new("/users/roles", "roles", "read"),
        RouteRule::new("/reports", "reports", "read"),
        RouteRule::new("/files", "files", "read"),
        RouteRule::new("/audit", "audit", "read"),
        RouteRule::new("/settings", "settings", "read"),
    ]
}

// =============================================================================
// Session
// =============================================================================

fn validate_session(session: &SessionConfig) -> ConfigResult<()> {
    let positive = [
        ("session.token_lifetime", session.token_lifetime),
        ("session.local_lifetime", session.local_lifetime),
        ("session.refresh_lifetime", session.refresh_lifetime),
        ("session.refresh_timeout", session.refresh_timeout),
    ];
    for (field, value) in positive {
        if value.is_zero() {
            return Err(ConfigError::validation(field, "must be positive"));
        }
    }
    if session.refresh_lookahead >= session.token_lifetime {
        return Err(ConfigError::validation(
            "session.refresh_lookahead",
            "must be shorter than session.token_lifetime",
        ));
    }
    if session.storage_key.trim().is_empty() {
        return Err(ConfigError::validation("session.storage_key", "cannot be empty"));
    }
    Ok(())
}

/// Session persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStoreConfig {
    /// Directory of the file store; in-memory when unset.
    pub dir: Option<PathBuf>,
}

// =============================================================================
// Identity
// =============================================================================

/// Identity resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Time budget for one override store call, in milliseconds.
    pub lookup_timeout_ms: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: 2_000,
        }
    }
}

impl IdentityConfig {
    /// Returns the lookup timeout.
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "identity.lookup_timeout_ms",
                "must be positive",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Audit
// =============================================================================

/// Where role change records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditBackend {
    /// Bounded in-process buffer.
    #[default]
    Memory,
    /// Append-only JSON lines file.
    Jsonl,
    /// Discard.
    None,
}

/// Role change log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Backend.
    pub backend: AuditBackend,
    /// File for the `jsonl` backend.
    pub path: PathBuf,
    /// Capacity of the `memory` backend.
    pub max_entries: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: AuditBackend::Memory,
            path: PathBuf::from("data/role-changes.jsonl"),
            max_entries: 10_000,
        }
    }
}

impl AuditConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.backend {
            AuditBackend::Jsonl if self.path.as_os_str().is_empty() => {
                Err(ConfigError::validation("audit.path", "required for the jsonl backend"))
            }
            AuditBackend::Memory if self.max_entries == 0 => {
                Err(ConfigError::validation("audit.max_entries", "must be positive"))
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// API
// =============================================================================

/// HTTP surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Paths served without a bearer token.
    pub public_paths: Vec<String>,
    /// CORS origins; `*` allows any.
    pub allowed_origins: Vec<String>,
    /// HS256 secret for verifying bearer tokens.
    #[serde(skip_serializing)]
    pub token_secret: Option<String>,
    /// Required token issuer.
    pub token_issuer: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_paths: vec!["/health".to_string()],
            allowed_origins: vec!["*".to_string()],
            token_secret: None,
            token_issuer: None,
        }
    }
}

impl ApiSettings {
    /// Returns the parsed bind address.
    pub fn host_addr(&self) -> ConfigResult<IpAddr> {
        self.host
            .parse()
            .map_err(|_| ConfigError::validation("api.host", format!("'{}' is not an IP address", self.host)))
    }

    fn validate(&self) -> ConfigResult<()> {
        self.host_addr()?;
        if self.port == 0 {
            return Err(ConfigError::validation("api.port", "must be positive"));
        }
        Ok(())
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: LogLevel,
    /// Log format.
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable.
    #[default]
    Text,
    /// Single-line compact.
    Compact,
    /// JSON for log shippers.
    Json,
}

// =============================================================================
// Tests
// =============================================================================
