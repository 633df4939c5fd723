//! Error types for the record repositories.

use academy_db::DbError;
use academy_types::ParseStatusError;

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The executor failed: bad SQL, constraint violation, or connectivity.
    #[error("record store error: {0}")]
    Store(#[from] DbError),

    /// A stored status string is not one of the known statuses.
    #[error("invalid stored application status: {0}")]
    InvalidStatus(#[from] ParseStatusError),

    /// Registration attempted with an email that already has an account.
    #[error("an admin account already exists for {0}")]
    EmailTaken(String),

    /// An insert succeeded but the store did not report the new row id.
    #[error("store did not return an id for the new {0}")]
    MissingId(&'static str),
}
