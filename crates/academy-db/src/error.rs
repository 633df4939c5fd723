//! Error type shared by every backend.

use thiserror::Error;

/// Errors surfaced by the statement executor and its helpers.
///
/// Store failures are returned exactly as the backend reported them; the
/// executor never retries or suppresses them.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to build the local connection pool or check out a connection.
    #[error("database connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// The local SQLite engine rejected or failed a statement.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The remote database could not be reached.
    #[error("remote database request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote database answered with a non-success HTTP status.
    #[error("remote database returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The remote database executed the statement and reported an error.
    #[error("remote statement failed: {message}")]
    Remote {
        /// Error message from the server.
        message: String,
        /// Machine-readable error code, when the server sends one.
        code: Option<String>,
    },

    /// The remote response did not match the pipeline protocol.
    #[error("malformed remote response: {0}")]
    Protocol(String),

    /// A row did not contain a column, or the column had the wrong type.
    #[error("row decode error: {0}")]
    Decode(String),

    /// Reading a schema file or creating the database directory failed.
    #[error("database io error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking task running a local statement panicked or was cancelled.
    #[error("database task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The configured location or credentials are unusable.
    #[error("invalid database configuration: {0}")]
    Config(String),
}
