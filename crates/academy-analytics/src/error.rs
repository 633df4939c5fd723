//! Error types for the analytics views.

use academy_db::DbError;
use academy_records::RecordError;

/// Errors that can occur while computing a view.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// An aggregate statement failed or returned an unexpected shape.
    #[error("analytics query failed: {0}")]
    Store(#[from] DbError),

    /// Loading the recent applications failed.
    #[error("analytics record lookup failed: {0}")]
    Records(#[from] RecordError),
}
