//! Rows produced by the analytics views.

use serde::{Deserialize, Serialize};

use crate::Application;

/// Dashboard headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_applications: i64,
    pub enrolled: i64,
    pub pending: i64,
    pub videos: i64,
    /// The five most recently created applications.
    pub recent_applications: Vec<Application>,
}

/// Share of applications asking for one program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramShare {
    pub program: String,
    pub count: i64,
    /// `count * 100 / total`, or 0 when there are no applications.
    pub percentage: f64,
}

/// Applications and enrollments created in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM`.
    pub month: String,
    pub applications: i64,
    pub enrollments: i64,
}

/// Age band used by the age distribution view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "Under 10")]
    Under10,
    #[serde(rename = "10-12")]
    From10To12,
    #[serde(rename = "13-15")]
    From13To15,
    #[serde(rename = "16-18")]
    From16To18,
    #[serde(rename = "Over 18")]
    Over18,
}

impl AgeGroup {
    /// All bands, youngest first.
    pub const ALL: [AgeGroup; 5] = [
        Self::Under10,
        Self::From10To12,
        Self::From13To15,
        Self::From16To18,
        Self::Over18,
    ];

    /// Returns the display label of this band.
    pub fn label(self) -> &'static str {
        match self {
            Self::Under10 => "Under 10",
            Self::From10To12 => "10-12",
            Self::From13To15 => "13-15",
            Self::From16To18 => "16-18",
            Self::Over18 => "Over 18",
        }
    }
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of applicants in one age band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBucket {
    pub age_group: AgeGroup,
    pub count: i64,
}
