//! Academy application records.

use academy_db::query::{fetch_page, ListQuery};
use academy_db::{Row, SharedExecutor, Statement, Value, TOUCH_UPDATED_AT_SQL};
use academy_types::{Application, ApplicationStatus, Created, NewApplication, Page};

use crate::error::RecordError;
use crate::insert_statement;

const TABLE: &str = "applications";

/// Listing filter for applications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationFilter {
    /// 1-based page number.
    pub page: i64,
    /// Page size.
    pub limit: i64,
    pub status: Option<ApplicationStatus>,
    /// Exact match on `preferred_program`.
    pub program: Option<String>,
    /// Substring match on player name or email.
    pub search: Option<String>,
}

impl Default for ApplicationFilter {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            status: None,
            program: None,
            search: None,
        }
    }
}

impl ApplicationFilter {
    fn to_query(&self) -> ListQuery {
        ListQuery::new(TABLE)
            .eq("status", self.status.map(ApplicationStatus::as_str))
            .eq("preferred_program", self.program.as_deref())
            .search(&["player_name", "email"], self.search.as_deref())
            .page(self.page, self.limit)
    }
}

/// Reads and writes the `applications` table.
#[derive(Clone)]
pub struct ApplicationRepository {
    db: SharedExecutor,
}

impl ApplicationRepository {
    pub fn new(db: SharedExecutor) -> Self {
        Self { db }
    }

    /// Lists applications matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Page<Application>, RecordError> {
        fetch_page(self.db.as_ref(), &filter.to_query(), application_from_row).await
    }

    /// Every application, newest first, without paging. Used for exports.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn list_all(&self) -> Result<Vec<Application>, RecordError> {
        let result = self
            .db
            .execute(Statement::new(
                "SELECT * FROM applications ORDER BY created_at DESC, id DESC",
            ))
            .await?;
        result.rows.iter().map(application_from_row).collect()
    }

    /// The `count` most recently created applications.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn recent(&self, count: i64) -> Result<Vec<Application>, RecordError> {
        let result = self
            .db
            .execute(
                Statement::new(
                    "SELECT * FROM applications ORDER BY created_at DESC, id DESC LIMIT ?",
                )
                .positional(vec![count.into()]),
            )
            .await?;
        result.rows.iter().map(application_from_row).collect()
    }

    /// Fetches one application. Returns `None` when no row has this id.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Application>, RecordError> {
        let result = self
            .db
            .execute(
                Statement::new("SELECT * FROM applications WHERE id = ?")
                    .positional(vec![id.into()]),
            )
            .await?;
        result.first().map(application_from_row).transpose()
    }

    /// Inserts a submission and returns it with the assigned id.
    ///
    /// The returned record is the input echoed back, not re-read from the
    /// store.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` if the insert fails.
    pub async fn create(
        &self,
        application: &NewApplication,
    ) -> Result<Created<NewApplication>, RecordError> {
        let result = self
            .db
            .execute(insert_statement(TABLE, insert_fields(application)))
            .await?;
        let id = result
            .last_insert_id
            .ok_or(RecordError::MissingId("application"))?;

        tracing::info!(
            id,
            program = %application.preferred_program,
            "application created"
        );

        Ok(Created {
            id,
            record: application.clone(),
        })
    }

    /// Sets the status and stamps `updated_at` with a value strictly later
    /// than the stored one.
    ///
    /// Returns `false` when no application has this id.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn update_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<bool, RecordError> {
        let result = self
            .db
            .execute(
                Statement::new(format!(
                    "UPDATE applications SET status = ?, updated_at = {TOUCH_UPDATED_AT_SQL} \
                     WHERE id = ?"
                ))
                .positional(vec![status.as_str().into(), id.into()]),
            )
            .await?;

        let changed = result.rows_affected > 0;
        if changed {
            tracing::info!(id, status = %status, "application status updated");
        } else {
            tracing::debug!(id, "status update matched no application");
        }
        Ok(changed)
    }
}

/// Columns written on insert. Optional fields are left out when absent so
/// the column defaults apply.
fn insert_fields(application: &NewApplication) -> Vec<(&'static str, Value)> {
    let mut fields = vec![
        ("player_name", Value::from(&application.player_name)),
        ("date_of_birth", Value::from(application.date_of_birth)),
        ("gender", Value::from(&application.gender)),
        ("preferred_program", Value::from(&application.preferred_program)),
        ("parent_name", Value::from(&application.parent_name)),
        ("phone", Value::from(&application.phone)),
        ("email", Value::from(&application.email)),
    ];
    if let Some(name) = &application.emergency_contact_name {
        fields.push(("emergency_contact_name", Value::from(name)));
    }
    if let Some(phone) = &application.emergency_contact_phone {
        fields.push(("emergency_contact_phone", Value::from(phone)));
    }
    fields
}

pub(crate) fn application_from_row(row: &Row) -> Result<Application, RecordError> {
    Ok(Application {
        id: row.get("id")?,
        player_name: row.get("player_name")?,
        date_of_birth: row.get("date_of_birth")?,
        gender: row.get("gender")?,
        preferred_program: row.get("preferred_program")?,
        status: row.get::<String>("status")?.parse()?,
        parent_name: row.get("parent_name")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        emergency_contact_name: row.get("emergency_contact_name")?,
        emergency_contact_phone: row.get("emergency_contact_phone")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
