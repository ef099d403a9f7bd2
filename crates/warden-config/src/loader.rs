// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading for warden.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick the format from its extension
//! 2. Resolve `${VAR}` and `${VAR:default}` placeholders
//! 3. Parse YAML, TOML or JSON into [`WardenConfig`]
//! 4. Apply `WARDEN_*` environment overrides
//! 5. Resolve relative paths against the file's directory
//! 6. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! WARDEN_DEFAULT_ROLE=DEVELOPER
//! WARDEN_API_PORT=9090
//! WARDEN_LOG_LEVEL=debug
//! WARDEN_SESSION_DIR=/var/lib/warden/sessions
//! WARDEN_TOKEN_SECRET=...
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogLevel, WardenConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "WARDEN";

const INLINE_SOURCE: &str = "<inline>";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader.
///
/// # Examples
///
/// ```no_run
/// use warden_config::ConfigLoader;
///
/// let config = ConfigLoader::new().load("warden.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Base directory for resolving relative paths.
    base_path: Option<PathBuf>,

    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve placeholders and apply overrides.
    resolve_env_vars: bool,

    /// Whether to resolve relative paths.
    resolve_paths: bool,
}

impl ConfigLoader {
    /// Creates a loader with default settings.
    pub fn new() -> Self {
        Self {
            base_path: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            resolve_paths: true,
        }
    }

    /// Creates a builder for configuring the loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the base path for resolving relative paths.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable handling.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables relative path resolution.
    pub fn with_path_resolution(mut self, enabled: bool) -> Self {
        self.resolve_paths = enabled;
        self
    }

    /// Loads and validates configuration from a file.
    ///
    /// The format follows the extension: `.yaml`/`.yml`, `.toml` or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<WardenConfig> {
        let config = self.load_unvalidated(path)?;
        config.validate()?;

        info!("Configuration loaded successfully");
        debug!(
            roles = config.roles.definitions.len(),
            mappings = config.mappings.len(),
            routes = config.routes.rules.len(),
            "Configuration summary"
        );
        Ok(config)
    }

    /// Loads configuration from a file without validating it.
    ///
    /// Used by `warden validate`, which reports validation failures itself.
    pub fn load_unvalidated(&self, path: impl AsRef<Path>) -> ConfigResult<WardenConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let base_path = self.base_path.clone().unwrap_or_else(|| {
            path.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let mut config = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }
        if self.resolve_paths {
            resolve_relative_paths(&mut config, &base_path);
        }
        Ok(config)
    }

    /// Loads and validates configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<WardenConfig> {
        let mut config = self.parse_content(content, format, Path::new(INLINE_SOURCE))?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise the built-in defaults.
    pub fn load_or_default(&self, path: Option<&Path>) -> ConfigResult<WardenConfig> {
        match path {
            Some(path) => self.load(path),
            None => {
                let mut config = WardenConfig::default();
                if self.resolve_env_vars {
                    self.apply_env_overrides(&mut config)?;
                }
                config.validate()?;
                Ok(config)
            }
        }
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn parse_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<WardenConfig> {
        let content = if self.resolve_env_vars {
            resolve_env_placeholders(content, |name| env::var(name).ok())
        } else {
            content.to_string()
        };

        parse_str(&content, format).map_err(|message| ConfigError::parse(path, message))
    }

    /// Applies `{prefix}_*` overrides from the process environment.
    fn apply_env_overrides(&self, config: &mut WardenConfig) -> ConfigResult<()> {
        apply_overrides(config, &self.env_prefix, |name| env::var(name).ok())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for [`ConfigLoader`].
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    base_path: Option<PathBuf>,
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
    resolve_paths: Option<bool>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base path.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables environment variable handling.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Enables or disables path resolution.
    pub fn resolve_paths(mut self, enabled: bool) -> Self {
        self.resolve_paths = Some(enabled);
        self
    }

    /// Builds the loader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();

        if let Some(base_path) = self.base_path {
            loader.base_path = Some(base_path);
        }
        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }
        if let Some(resolve_paths) = self.resolve_paths {
            loader.resolve_paths = resolve_paths;
        }

        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_str(content: &str, format: ConfigFormat) -> Result<WardenConfig, String> {
    match format {
        ConfigFormat::Yaml => parse_yaml(content),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    }
}

/// YAML goes through the `config` crate, which carries the YAML backend.
fn parse_yaml(content: &str) -> Result<WardenConfig, String> {
    if content.trim().is_empty() {
        return Ok(WardenConfig::default());
    }

    config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| e.to_string())
}

/// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
///
/// A variable that is unset and has no default keeps its placeholder.
fn resolve_env_placeholders<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' || chars.peek() != Some(&'{') {
            result.push(c);
            continue;
        }
        chars.next();

        let mut var_content = String::new();
        let mut found_close = false;
        for c in chars.by_ref() {
            if c == '}' {
                found_close = true;
                break;
            }
            var_content.push(c);
        }

        if !found_close {
            result.push_str("${");
            result.push_str(&var_content);
            continue;
        }

        let (var_name, default_value) = match var_content.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (var_content.as_str(), None),
        };

        match (lookup(var_name), default_value) {
            (Some(value), _) => result.push_str(&value),
            (None, Some(default)) => result.push_str(default),
            (None, None) => {
                warn!("Environment variable '{}' not found", var_name);
                result.push_str(&format!("${{{}}}", var_name));
            }
        }
    }

    result
}

fn apply_overrides<F>(config: &mut WardenConfig, prefix: &str, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| format!("{}_{}", prefix, suffix);

    if let Some(value) = lookup(&var("DEFAULT_ROLE")) {
        config.roles.default_role = value.trim().to_string();
    }

    if let Some(value) = lookup(&var("API_PORT")) {
        config.api.port = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid_env_var(var("API_PORT"), "expected valid port number"))?;
    }
    if let Some(value) = lookup(&var("API_HOST")) {
        config.api.host = value.trim().to_string();
    }
    if let Some(value) = lookup(&var("TOKEN_SECRET")) {
        config.api.token_secret = Some(value).filter(|s| !s.is_empty());
    }

    if let Some(value) = lookup(&var("LOG_LEVEL")) {
        config.logging.level = LogLevel::parse(&value).ok_or_else(|| {
            ConfigError::invalid_env_var(var("LOG_LEVEL"), format!("unknown level '{}'", value))
        })?;
    }

    if let Some(value) = lookup(&var("SESSION_DIR")) {
        config.session_store.dir = Some(PathBuf::from(value));
    }

    Ok(())
}

fn resolve_relative_paths(config: &mut WardenConfig, base_path: &Path) {
    if config.audit.path.is_relative() && !config.audit.path.as_os_str().is_empty() {
        config.audit.path = base_path.join(&config.audit.path);
    }
    if let Some(ref mut dir) = config.session_store.dir {
        if dir.is_relative() {
            *dir = base_path.join(&dir);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AuditBackend, LogFormat};
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const YAML: &str = r#"
roles:
  default_role: VIEWER
mappings:
  - email: Lead@TheQexle.com
    role: TEAM_LEAD
  - email: dev@theqexle.com
    role: DEVELOPER
audit:
  backend: jsonl
  path: logs/changes.jsonl
logging:
  level: debug
  format: json
"#;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn loader() -> ConfigLoader {
        ConfigLoader::builder().resolve_env_vars(false).build()
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")).unwrap(), ConfigFormat::Json);
        assert!(ConfigFormat::from_path(Path::new("a.ini")).is_err());
        assert!(ConfigFormat::from_path(Path::new("warden")).is_err());
    }

    #[test]
    fn test_load_yaml_keeps_case() {
        let config = loader().load_from_str(YAML, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.mappings.len(), 2);
        assert_eq!(config.mappings[0].role, "TEAM_LEAD");
        assert_eq!(config.audit.backend, AuditBackend::Jsonl);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        // untouched sections fall back to their defaults
        assert_eq!(config.roles.definitions.len(), 6);
        assert_eq!(config.api.port, 8080);
    }

    #[test]
    fn test_load_empty_yaml_is_default() {
        let config = loader().load_from_str("", ConfigFormat::Yaml).unwrap();
        assert_eq!(config.roles.top_role, "SUPER_ADMIN");
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
[[mappings]]
email = "pm@theqexle.com"
role = "MANAGER"

[api]
port = 9000

[session]
token_lifetime = 1800
refresh_lookahead = 120
"#;
        let config = loader().load_from_str(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.session.token_lifetime.as_secs(), 1800);
        assert_eq!(config.mappings[0].role, "MANAGER");
    }

    #[test]
    fn test_load_json() {
        let json = r#"{"identity": {"lookup_timeout_ms": 500}}"#;
        let config = loader().load_from_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.identity.lookup_timeout_ms, 500);
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = loader()
            .load_from_str("{ not json", ConfigFormat::Json)
            .unwrap_err();
        assert!(err.to_string().contains(INLINE_SOURCE));
    }

    #[test]
    fn test_validation_runs_on_load() {
        let yaml = "mappings:\n  - email: a@b.com\n    role: GHOST\n";
        let err = loader().load_from_str(yaml, ConfigFormat::Yaml).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_load_file_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.yaml");
        fs::write(&path, YAML).unwrap();

        let config = loader().load(&path).unwrap();
        assert_eq!(config.audit.path, dir.path().join("logs/changes.jsonl"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = loader().load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let mut file = NamedTempFile::with_suffix(".ini").unwrap();
        writeln!(file, "x = 1").unwrap();
        let err = loader().load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_resolve_env_placeholders() {
        let lookup = lookup_from(&[("SECRET", "s3cr3t")]);
        assert_eq!(resolve_env_placeholders("a ${SECRET} b", &lookup), "a s3cr3t b");
        assert_eq!(resolve_env_placeholders("${MISSING:fallback}", &lookup), "fallback");
        assert_eq!(resolve_env_placeholders("${MISSING}", &lookup), "${MISSING}");
        assert_eq!(resolve_env_placeholders("${UNCLOSED", &lookup), "${UNCLOSED");
        assert_eq!(resolve_env_placeholders("cost: $5", &lookup), "cost: $5");
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = WardenConfig::default();
        let lookup = lookup_from(&[
            ("WARDEN_DEFAULT_ROLE", "DEVELOPER"),
            ("WARDEN_API_PORT", "9443"),
            ("WARDEN_LOG_LEVEL", "warn"),
            ("WARDEN_SESSION_DIR", "/tmp/sessions"),
            ("WARDEN_TOKEN_SECRET", "hush"),
        ]);
        apply_overrides(&mut config, "WARDEN", lookup).unwrap();

        assert_eq!(config.roles.default_role, "DEVELOPER");
        assert_eq!(config.api.port, 9443);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.session_store.dir, Some(PathBuf::from("/tmp/sessions")));
        assert_eq!(config.api.token_secret.as_deref(), Some("hush"));
    }

    #[test]
    fn test_apply_overrides_rejects_bad_port() {
        let mut config = WardenConfig::default();
        let err = apply_overrides(&mut config, "WARDEN", lookup_from(&[("WARDEN_API_PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { .. }));
    }
}
