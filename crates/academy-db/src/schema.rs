//! One-shot schema replay.
//!
//! A schema source is a list of `;`-separated DDL statements. Each one is
//! sent through the executor on its own, in order, so the same replay works
//! against either backend. There is no version tracking: statements must be
//! idempotent (`IF NOT EXISTS`).

use std::path::Path;

use crate::error::DbError;
use crate::executor::StatementExecutor;
use crate::value::Statement;

/// The bundled schema for applications, videos, and admin users.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// SQL expression for "now" at millisecond resolution, matching the column
/// defaults in [`SCHEMA_SQL`].
pub const NOW_SQL: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";

/// SQL expression for a new `updated_at` value that is always strictly
/// greater than the stored one.
///
/// Two writes in the same millisecond would otherwise share a stamp, so the
/// stored value is bumped by one millisecond when the clock has not moved
/// past it.
pub const TOUCH_UPDATED_AT_SQL: &str = "CASE \
     WHEN strftime('%Y-%m-%d %H:%M:%f', 'now') > updated_at \
     THEN strftime('%Y-%m-%d %H:%M:%f', 'now') \
     ELSE strftime('%Y-%m-%d %H:%M:%f', updated_at, '+0.001 seconds') \
     END";

/// Splits a schema source into individual statements.
///
/// `--` comment lines are dropped and chunks left empty are skipped.
pub fn split_statements(source: &str) -> Vec<String> {
    source
        .split(';')
        .map(|chunk| {
            chunk
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|stmt| !stmt.is_empty())
        .collect()
}

/// Replays every statement in `source` through the executor.
///
/// Returns the number of statements executed.
///
/// # Errors
///
/// Stops at the first failing statement and returns its error.
pub async fn replay_schema(
    executor: &dyn StatementExecutor,
    source: &str,
) -> Result<usize, DbError> {
    let statements = split_statements(source);
    for (idx, sql) in statements.iter().enumerate() {
        tracing::debug!(
            statement = idx + 1,
            total = statements.len(),
            "replaying schema statement"
        );
        if let Err(e) = executor.execute(Statement::new(sql.as_str())).await {
            tracing::error!(statement = idx + 1, error = %e, "schema statement failed");
            return Err(e);
        }
    }
    tracing::info!(
        count = statements.len(),
        backend = %executor.backend(),
        "database schema initialized"
    );
    Ok(statements.len())
}

/// Reads a schema file from disk.
///
/// A missing file is not an error: it is logged as a warning and `None` is
/// returned so startup can continue.
///
/// # Errors
///
/// Returns `DbError::Io` if the file exists but cannot be read.
pub fn load_schema(path: &Path) -> Result<Option<String>, DbError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "schema file not found, skipping schema replay");
            Ok(None)
        }
        Err(e) => Err(DbError::Io(e)),
    }
}
