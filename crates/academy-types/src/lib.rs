//! Shared types for the academy admin backend.
//!
//! Everything in this crate is plain data: stored entities, the paging
//! envelope returned by list operations, and the rows produced by the
//! analytics views. Nothing here performs I/O, so the HTTP and export layers
//! can serialise these values to JSON or CSV without touching the store.
//!
//! Ids and counts are `i64` throughout. Backend-specific integer encodings
//! never cross this boundary.

use serde::{Deserialize, Serialize};

mod records;
mod stats;

pub use records::{
    AdminUser, Application, NewAdminUser, NewApplication, NewVideo, Video, VideoUpdate,
};
pub use stats::{AgeBucket, AgeGroup, MonthlyTrend, Overview, ProgramShare};

/// Review status of an academy application.
///
/// Any status may follow any other; the store does not enforce a state
/// machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted, awaiting review. Default for new applications.
    Pending,
    /// Accepted by staff, not yet enrolled.
    Approved,
    /// Declined.
    Rejected,
    /// Player has joined a program.
    Enrolled,
}

impl ApplicationStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [ApplicationStatus; 4] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Enrolled,
    ];

    /// Returns the stored string form of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Enrolled => "enrolled",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "enrolled" => Ok(Self::Enrolled),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown application status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl std::fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown application status: {}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

/// One window of a filtered, paginated listing.
///
/// `total` is the size of the whole filtered set, independent of the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records in this window, newest first.
    pub data: Vec<T>,
    /// Number of records matching the filter across all pages.
    pub total: i64,
    /// 1-based page number that was requested.
    pub page: i64,
    /// Page size that was requested.
    pub limit: i64,
}

/// A freshly inserted record: the caller's input echoed back with the id the
/// store assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Created<T> {
    /// Store-assigned row id.
    pub id: i64,
    /// The fields exactly as supplied to `create`.
    #[serde(flatten)]
    pub record: T,
}
