//! Embedded SQLite backend.
//!
//! The intent detected by [`StatementKind`] decides what is reported: reads
//! collect their rows, writes are stepped to completion and report the
//! change count and row id. All SQLite work runs on the blocking thread pool.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql};

use crate::error::DbError;
use crate::executor::{BackendKind, StatementExecutor};
use crate::pool::{create_pool, DbPool, DbRuntimeSettings};
use crate::value::{placeholder_name, ExecResult, Params, Row, Statement, StatementKind, Value};

/// Statement executor backed by a pooled local SQLite file.
#[derive(Clone)]
pub struct LocalExecutor {
    pool: DbPool,
}

impl LocalExecutor {
    /// Opens (creating if needed) the database file at `path`.
    ///
    /// The parent directory is created when missing.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Io` if the directory cannot be created, or
    /// `DbError::Pool` if the database cannot be opened.
    pub fn open(path: &str, settings: DbRuntimeSettings) -> Result<Self, DbError> {
        if path != ":memory:" {
            if let Some(dir) = Path::new(path).parent() {
                if !dir.as_os_str().is_empty() && !dir.exists() {
                    std::fs::create_dir_all(dir)?;
                    tracing::debug!(dir = %dir.display(), "created database directory");
                }
            }
        }
        Ok(Self::from_pool(create_pool(path, settings)?))
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl StatementExecutor for LocalExecutor {
    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            run_statement(&conn, &stmt)
        })
        .await?
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Local
    }
}

/// Prepares, binds, and runs one statement on a connection.
pub(crate) fn run_statement(conn: &Connection, stmt: &Statement) -> Result<ExecResult, DbError> {
    let mut prepared = conn.prepare(&stmt.sql)?;
    bind_params(&mut prepared, &stmt.params)?;

    match stmt.kind() {
        StatementKind::Read => {
            let names: Vec<String> = prepared
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();

            let mut rows = Vec::new();
            let mut cursor = prepared.raw_query();
            while let Some(raw) = cursor.next()? {
                let mut row = Row::new();
                for (idx, name) in names.iter().enumerate() {
                    row.push(name.clone(), value_from_ref(raw.get_ref(idx)?));
                }
                rows.push(row);
            }
            tracing::trace!(rows = rows.len(), "local read complete");
            Ok(ExecResult::read(rows))
        }
        StatementKind::Write => {
            // Step to completion; rows from RETURNING clauses or pragmas are
            // discarded.
            let mut cursor = prepared.raw_query();
            while cursor.next()?.is_some() {}
            drop(cursor);
            Ok(ExecResult::write(conn.changes(), conn.last_insert_rowid()))
        }
    }
}

fn bind_params(prepared: &mut rusqlite::Statement<'_>, params: &Params) -> Result<(), DbError> {
    match params {
        Params::None => {}
        Params::Positional(values) => {
            let expected = prepared.parameter_count();
            if values.len() != expected {
                return Err(rusqlite::Error::InvalidParameterCount(values.len(), expected).into());
            }
            for (idx, value) in values.iter().enumerate() {
                prepared.raw_bind_parameter(idx + 1, value)?;
            }
        }
        Params::Named(pairs) => {
            for (key, value) in pairs {
                let name = placeholder_name(key);
                let idx = prepared
                    .parameter_index(&name)?
                    .ok_or(rusqlite::Error::InvalidParameterName(name))?;
                prepared.raw_bind_parameter(idx, value)?;
            }
        }
    }
    Ok(())
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}
