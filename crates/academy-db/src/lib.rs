//! Database access layer for the academy admin backend.
//!
//! The store is either a local SQLite file or a remote libSQL database
//! reached over HTTP. Both are hidden behind [`StatementExecutor`], which runs
//! one SQL statement with its parameters and returns a normalized
//! [`ExecResult`]. Nothing outside this crate branches on the backend.
//!
//! # Design decisions
//!
//! - **Location selects the backend**: [`connect`] inspects the configured
//!   location string. `libsql://` and HTTP(S) URLs get the remote executor,
//!   anything else is treated as a file path.
//! - **Intent is detected from the text**: a statement is a read when its
//!   trimmed text starts with `SELECT` (case-insensitive). Reads report zero
//!   affected rows and no insert id on every backend.
//! - **Plain integers only**: remote integers arrive as decimal strings and
//!   are parsed to `i64` at the executor boundary.
//! - **No retries**: statements may have side effects, so every failure is
//!   returned to the caller unchanged.
//! - **One shared handle**: the executor is built once at startup and cloned
//!   (as an `Arc`) into every repository.

mod error;
mod executor;
mod local;
mod pool;
mod remote;
mod schema;
mod value;

pub mod query;

pub use error::DbError;
pub use executor::{
    connect, is_remote_location, BackendKind, DbSettings, SharedExecutor, StatementExecutor,
};
pub use local::LocalExecutor;
pub use pool::{create_pool, DbPool, DbRuntimeSettings};
pub use remote::RemoteExecutor;
pub use schema::{
    load_schema, replay_schema, split_statements, NOW_SQL, SCHEMA_SQL, TOUCH_UPDATED_AT_SQL,
};
pub use value::{ExecResult, FromValue, Params, Row, Statement, StatementKind, Value};
