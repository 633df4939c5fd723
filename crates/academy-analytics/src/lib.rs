//! Dashboard analytics over the application and video tables.
//!
//! Four read-only views:
//!
//! | View | Output |
//! |------|--------|
//! | [`Analytics::overview`] | headline counts and the five newest applications |
//! | [`Analytics::by_program`] | count and percentage per preferred program |
//! | [`Analytics::monthly_trend`] | applications and enrollments per month, last 12 |
//! | [`Analytics::age_distribution`] | applicants per age band |
//!
//! Every view issues its own statements through the shared executor. The
//! overview runs five independent queries with no enclosing snapshot, so
//! under concurrent writes its numbers can disagree slightly with each
//! other. Percentages and age bands are computed here rather than in SQL so
//! both backends produce identical results.

mod error;
mod views;

pub use error::AnalyticsError;
pub use views::{
    bucket_age, bucket_birth_years, percentage, share_by_program, Analytics, RECENT_LIMIT,
    TREND_MONTHS,
};
