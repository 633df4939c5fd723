//! Aggregate queries and the arithmetic applied to their results.

use chrono::Datelike;

use academy_db::{SharedExecutor, Statement};
use academy_records::ApplicationRepository;
use academy_types::{AgeBucket, AgeGroup, MonthlyTrend, Overview, ProgramShare};

use crate::error::AnalyticsError;

/// Number of applications listed in the overview.
pub const RECENT_LIMIT: i64 = 5;

/// Number of months returned by the trend view.
pub const TREND_MONTHS: i64 = 12;

/// Computes the dashboard views from the shared executor.
#[derive(Clone)]
pub struct Analytics {
    db: SharedExecutor,
    applications: ApplicationRepository,
}

impl Analytics {
    pub fn new(db: SharedExecutor) -> Self {
        Self {
            applications: ApplicationRepository::new(db.clone()),
            db,
        }
    }

    async fn count(&self, sql: &str, status: Option<&str>) -> Result<i64, AnalyticsError> {
        let stmt = match status {
            Some(status) => Statement::new(sql).positional(vec![status.into()]),
            None => Statement::new(sql),
        };
        Ok(self.db.execute(stmt).await?.scalar_i64("count")?)
    }

    /// Headline counts plus the most recent applications.
    ///
    /// # Errors
    ///
    /// Returns the first failing sub-query.
    pub async fn overview(&self) -> Result<Overview, AnalyticsError> {
        let total_applications = self
            .count("SELECT COUNT(*) AS count FROM applications", None)
            .await?;
        let enrolled = self
            .count(
                "SELECT COUNT(*) AS count FROM applications WHERE status = ?",
                Some("enrolled"),
            )
            .await?;
        let pending = self
            .count(
                "SELECT COUNT(*) AS count FROM applications WHERE status = ?",
                Some("pending"),
            )
            .await?;
        let videos = self.count("SELECT COUNT(*) AS count FROM videos", None).await?;
        let recent_applications = self.applications.recent(RECENT_LIMIT).await?;

        Ok(Overview {
            total_applications,
            enrolled,
            pending,
            videos,
            recent_applications,
        })
    }

    /// Applications per preferred program, largest first.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Store` on executor failure.
    pub async fn by_program(&self) -> Result<Vec<ProgramShare>, AnalyticsError> {
        let result = self
            .db
            .execute(Statement::new(
                "SELECT preferred_program AS program, COUNT(*) AS count
                 FROM applications
                 GROUP BY preferred_program
                 ORDER BY count DESC, program ASC",
            ))
            .await?;

        let groups = result
            .rows
            .iter()
            .map(|row| -> Result<(String, i64), AnalyticsError> {
                Ok((row.get("program")?, row.get("count")?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(share_by_program(groups))
    }

    /// Applications and enrollments per creation month, newest month first,
    /// limited to the last [`TREND_MONTHS`] months that have data.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Store` on executor failure.
    pub async fn monthly_trend(&self) -> Result<Vec<MonthlyTrend>, AnalyticsError> {
        let result = self
            .db
            .execute(
                Statement::new(
                    "SELECT strftime('%Y-%m', created_at) AS month,
                            COUNT(*) AS applications,
                            SUM(CASE WHEN status = ? THEN 1 ELSE 0 END) AS enrollments
                     FROM applications
                     GROUP BY month
                     ORDER BY month DESC
                     LIMIT ?",
                )
                .positional(vec!["enrolled".into(), TREND_MONTHS.into()]),
            )
            .await?;

        result
            .rows
            .iter()
            .map(|row| -> Result<MonthlyTrend, AnalyticsError> {
                Ok(MonthlyTrend {
                    month: row.get("month")?,
                    applications: row.get("applications")?,
                    enrollments: row.get("enrollments")?,
                })
            })
            .collect()
    }

    /// Applicants per age band, using the current UTC year.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Store` on executor failure.
    pub async fn age_distribution(&self) -> Result<Vec<AgeBucket>, AnalyticsError> {
        self.age_distribution_for_year(chrono::Utc::now().year()).await
    }

    /// Applicants per age band, with age computed as `year - birth year`.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Store` on executor failure.
    pub async fn age_distribution_for_year(
        &self,
        year: i32,
    ) -> Result<Vec<AgeBucket>, AnalyticsError> {
        let result = self
            .db
            .execute(Statement::new(
                "SELECT CAST(strftime('%Y', date_of_birth) AS INTEGER) AS birth_year,
                        COUNT(*) AS count
                 FROM applications
                 GROUP BY birth_year",
            ))
            .await?;

        let years = result
            .rows
            .iter()
            .map(|row| -> Result<(Option<i64>, i64), AnalyticsError> {
                Ok((row.get("birth_year")?, row.get("count")?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(year, groups = years.len(), "bucketing birth years");
        Ok(bucket_birth_years(&years, year))
    }
}

/// `count * 100 / total`, or 0 when `total` is 0.
pub fn percentage(count: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Attaches percentages to `(program, count)` groups.
pub fn share_by_program(groups: Vec<(String, i64)>) -> Vec<ProgramShare> {
    let total: i64 = groups.iter().map(|(_, count)| count).sum();
    groups
        .into_iter()
        .map(|(program, count)| ProgramShare {
            program,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Maps an age in whole calendar years to its band.
pub fn bucket_age(age: i64) -> AgeGroup {
    match age {
        i64::MIN..=9 => AgeGroup::Under10,
        10..=12 => AgeGroup::From10To12,
        13..=15 => AgeGroup::From13To15,
        16..=18 => AgeGroup::From16To18,
        _ => AgeGroup::Over18,
    }
}

/// Folds `(birth year, count)` groups into age bands relative to `year`.
///
/// Bands are returned youngest first and only when non-empty. A group whose
/// birth year could not be read counts toward `Over 18`.
pub fn bucket_birth_years(years: &[(Option<i64>, i64)], year: i32) -> Vec<AgeBucket> {
    let mut counts = [0_i64; AgeGroup::ALL.len()];
    for (birth_year, count) in years {
        let group = match birth_year {
            Some(birth_year) => bucket_age(i64::from(year) - birth_year),
            None => AgeGroup::Over18,
        };
        if let Some(slot) = AgeGroup::ALL.iter().position(|g| *g == group) {
            counts[slot] += count;
        }
    }

    AgeGroup::ALL
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(age_group, count)| AgeBucket { age_group, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_guards_zero_total() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }

    #[test]
    fn shares_sum_to_one_hundred() {
        let shares = share_by_program(vec![
            ("Elite Squad".into(), 1),
            ("Youth".into(), 1),
            ("Goalkeeping".into(), 1),
        ]);
        let sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9, "sum was {sum}");
    }

    #[test]
    fn age_band_edges() {
        assert_eq!(bucket_age(0), AgeGroup::Under10);
        assert_eq!(bucket_age(9), AgeGroup::Under10);
        assert_eq!(bucket_age(10), AgeGroup::From10To12);
        assert_eq!(bucket_age(12), AgeGroup::From10To12);
        assert_eq!(bucket_age(13), AgeGroup::From13To15);
        assert_eq!(bucket_age(15), AgeGroup::From13To15);
        assert_eq!(bucket_age(16), AgeGroup::From16To18);
        assert_eq!(bucket_age(18), AgeGroup::From16To18);
        assert_eq!(bucket_age(19), AgeGroup::Over18);
        assert_eq!(bucket_age(-1), AgeGroup::Under10);
    }

    #[test]
    fn birth_years_fold_into_ordered_non_empty_bands() {
        let years = [
            (Some(2008), 2),
            (Some(2026), 1),
            (Some(2007), 4),
            (None, 1),
            (Some(2014), 3),
            (Some(2015), 1),
        ];
        let buckets = bucket_birth_years(&years, 2026);
        assert_eq!(
            buckets,
            vec![
                AgeBucket { age_group: AgeGroup::Under10, count: 1 },
                AgeBucket { age_group: AgeGroup::From10To12, count: 4 },
                AgeBucket { age_group: AgeGroup::From16To18, count: 2 },
                AgeBucket { age_group: AgeGroup::Over18, count: 5 },
            ]
        );
    }
}
