//! The executor contract and backend selection.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DbError;
use crate::local::LocalExecutor;
use crate::pool::DbRuntimeSettings;
use crate::remote::RemoteExecutor;
use crate::value::{ExecResult, Statement};

/// Which concrete store an executor talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Embedded SQLite file.
    Local,
    /// libSQL server over HTTP.
    Remote,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs one SQL statement and returns a normalized result.
///
/// Implementations must always suspend the caller: the local backend hands
/// its blocking work to the runtime's blocking pool, the remote one awaits
/// the network. Failures are never retried.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Executes `stmt` and returns its rows, affected-row count, and
    /// last inserted row id.
    ///
    /// # Errors
    ///
    /// Returns whatever the backend reported: malformed SQL, constraint
    /// violations, and connectivity failures all surface as [`DbError`].
    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbError>;

    /// The backend this executor is bound to.
    fn backend(&self) -> BackendKind;
}

/// The process-wide executor handle shared by every repository.
pub type SharedExecutor = Arc<dyn StatementExecutor>;

/// Connection settings for [`connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    /// File path or `libsql://` / `https://` URL.
    pub location: String,
    /// Bearer token for the remote backend. Ignored for local files.
    pub auth_token: Option<String>,
    /// Local pool tuning. Ignored for the remote backend.
    pub runtime: DbRuntimeSettings,
}

impl DbSettings {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            auth_token: None,
            runtime: DbRuntimeSettings::default(),
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

const REMOTE_SCHEMES: &[&str] = &["libsql://", "https://", "http://", "wss://", "ws://"];

/// Returns `true` when a location names a remote libSQL server.
pub fn is_remote_location(location: &str) -> bool {
    let location = location.trim();
    REMOTE_SCHEMES.iter().any(|scheme| {
        location
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Builds the executor named by `settings.location`.
///
/// Call this once at startup and share the returned handle.
///
/// # Errors
///
/// Returns `DbError::Config` for an empty location, or the backend's own
/// error if the pool or HTTP client cannot be built.
pub fn connect(settings: &DbSettings) -> Result<SharedExecutor, DbError> {
    let location = settings.location.trim();
    if location.is_empty() {
        return Err(DbError::Config("database location is empty".to_string()));
    }

    if is_remote_location(location) {
        if settings.auth_token.is_none() {
            tracing::warn!(location, "remote database configured without an auth token");
        }
        let executor = RemoteExecutor::new(location, settings.auth_token.clone())?;
        tracing::info!(url = executor.pipeline_url(), "using remote libSQL database");
        Ok(Arc::new(executor))
    } else {
        let path = location.strip_prefix("file:").unwrap_or(location);
        let executor = LocalExecutor::open(path, settings.runtime)?;
        tracing::info!(path, "using local SQLite database");
        Ok(Arc::new(executor))
    }
}
