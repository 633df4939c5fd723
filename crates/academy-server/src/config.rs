//! Server configuration loading from file and environment variables.

use academy_db::{DbRuntimeSettings, DbSettings};
use academy_types::NewAdminUser;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Store location and local pool settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Startup seeding.
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// File path or `libsql://`/`https://` URL of a remote database.
    #[serde(default = "default_db_url")]
    pub url: String,

    /// Bearer token for the remote backend. Ignored for local files.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Schema file replayed at startup. The embedded schema is used when unset.
    #[serde(default)]
    pub schema_path: Option<PathBuf>,

    /// SQLite busy timeout, in milliseconds. Local files only.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum pooled SQLite connections. Local files only.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "academy_db=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Admin account created at startup when both credentials are set.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub admin_email: Option<String>,

    /// Precomputed password hash. Plain passwords are never accepted here.
    #[serde(default)]
    pub admin_password_hash: Option<String>,

    #[serde(default = "default_admin_name")]
    pub admin_name: String,

    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    4000
}

fn default_db_url() -> String {
    "academy.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_admin_name() -> String {
    "System Admin".to_string()
}

fn default_admin_role() -> String {
    "super_admin".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            auth_token: None,
            schema_path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_email: None,
            admin_password_hash: None,
            admin_name: default_admin_name(),
            admin_role: default_admin_role(),
        }
    }
}

impl DatabaseConfig {
    /// Executor settings for [`academy_db::connect`].
    pub fn settings(&self) -> DbSettings {
        let mut settings = DbSettings::new(&self.url);
        if let Some(token) = &self.auth_token {
            settings = settings.with_auth_token(token);
        }
        settings.runtime = DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            pool_max_size: self.pool_max_size,
        };
        settings
    }
}

impl SeedConfig {
    /// The admin to seed, if both email and hash are configured.
    pub fn admin(&self) -> Option<NewAdminUser> {
        let email = self.admin_email.as_deref().filter(|e| !e.trim().is_empty())?;
        let hash = self
            .admin_password_hash
            .as_deref()
            .filter(|h| !h.trim().is_empty())?;
        Some(NewAdminUser {
            email: email.to_string(),
            password_hash: hash.to_string(),
            full_name: self.admin_name.clone(),
            role: self.admin_role.clone(),
        })
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `DATABASE_URL` overrides `database.url`
/// - `TURSO_AUTH_TOKEN` overrides `database.auth_token`
/// - `ACADEMY_SCHEMA_PATH` overrides `database.schema_path`
/// - `ACADEMY_HOST` overrides `server.host`
/// - `ACADEMY_PORT` overrides `server.port`
/// - `ACADEMY_LOG_LEVEL` overrides `logging.level`
/// - `ACADEMY_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `ADMIN_EMAIL` overrides `seed.admin_email`
/// - `ADMIN_PASSWORD_HASH` overrides `seed.admin_password_hash`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn apply_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(url) = var("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
        config.database.url = url;
    }
    if let Some(token) = var("TURSO_AUTH_TOKEN") {
        config.database.auth_token = Some(token);
    }
    if let Some(path) = var("ACADEMY_SCHEMA_PATH") {
        config.database.schema_path = Some(PathBuf::from(path));
    }
    if let Some(host) = var("ACADEMY_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("ACADEMY_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = var("ACADEMY_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("ACADEMY_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(email) = var("ADMIN_EMAIL") {
        config.seed.admin_email = Some(email);
    }
    if let Some(hash) = var("ADMIN_PASSWORD_HASH") {
        config.seed.admin_password_hash = Some(hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overridden(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = Config::default();
        apply_overrides(&mut config, |key| vars.get(key).cloned());
        config
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [database]
            url = "libsql://academy.example.turso.io"
            "#,
        )
        .unwrap();
        assert_eq!(config.database.url, "libsql://academy.example.turso.io");
        assert_eq!(config.database.busy_timeout_ms, 5000);
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.seed.admin_role, "super_admin");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(
            load_config(path.to_str()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn environment_overrides_database_and_seed() {
        let config = overridden(&[
            ("DATABASE_URL", "https://academy.example.turso.io"),
            ("TURSO_AUTH_TOKEN", "tok"),
            ("ACADEMY_PORT", "8080"),
            ("ACADEMY_HOST", "not-an-ip"),
            ("ACADEMY_LOG_JSON", "1"),
            ("ADMIN_EMAIL", "admin@academy.test"),
            ("ADMIN_PASSWORD_HASH", "$2b$10$hash"),
        ]);

        assert_eq!(config.database.url, "https://academy.example.turso.io");
        assert_eq!(config.database.settings().auth_token.as_deref(), Some("tok"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, default_host(), "unparseable host is ignored");
        assert!(config.logging.json);

        let admin = config.seed.admin().unwrap();
        assert_eq!(admin.email, "admin@academy.test");
        assert_eq!(admin.full_name, "System Admin");
    }

    #[test]
    fn blank_database_url_keeps_configured_value() {
        let config = overridden(&[("DATABASE_URL", "  ")]);
        assert_eq!(config.database.url, "academy.db");
    }

    #[test]
    fn admin_requires_both_credentials() {
        assert!(overridden(&[("ADMIN_EMAIL", "a@b.c")]).seed.admin().is_none());
        assert!(overridden(&[("ADMIN_PASSWORD_HASH", "h")]).seed.admin().is_none());
    }
}
