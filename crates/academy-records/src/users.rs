//! Administrator accounts, consumed by the auth layer.

use academy_db::{Row, SharedExecutor, Statement, Value, NOW_SQL};
use academy_types::{AdminUser, Created, NewAdminUser};

use crate::error::RecordError;
use crate::insert_statement;

/// Reads and writes the `admin_users` table.
#[derive(Clone)]
pub struct UserRepository {
    db: SharedExecutor,
}

impl UserRepository {
    pub fn new(db: SharedExecutor) -> Self {
        Self { db }
    }

    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, RecordError> {
        let result = self
            .db
            .execute(
                Statement::new("SELECT * FROM admin_users WHERE email = ?")
                    .positional(vec![email.into()]),
            )
            .await?;
        result.first().map(user_from_row).transpose()
    }

    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<AdminUser>, RecordError> {
        let result = self
            .db
            .execute(
                Statement::new("SELECT * FROM admin_users WHERE id = ?")
                    .positional(vec![id.into()]),
            )
            .await?;
        result.first().map(user_from_row).transpose()
    }

    /// Registers an administrator.
    ///
    /// The email is looked up first; the lookup and the insert are separate
    /// statements, so two concurrent registrations of the same address can
    /// both pass the check (the table's unique index then rejects one).
    ///
    /// # Errors
    ///
    /// Returns `RecordError::EmailTaken` if the email already has an account,
    /// or `RecordError::Store` on executor failure.
    pub async fn create(&self, user: &NewAdminUser) -> Result<Created<NewAdminUser>, RecordError> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(RecordError::EmailTaken(user.email.clone()));
        }

        let fields = vec![
            ("email", Value::from(&user.email)),
            ("password_hash", Value::from(&user.password_hash)),
            ("full_name", Value::from(&user.full_name)),
            ("role", Value::from(&user.role)),
        ];
        let result = self.db.execute(insert_statement("admin_users", fields)).await?;
        let id = result.last_insert_id.ok_or(RecordError::MissingId("admin user"))?;

        tracing::info!(id, role = %user.role, "admin user created");

        Ok(Created {
            id,
            record: user.clone(),
        })
    }

    /// Stamps `last_login`. Returns `false` when no user has this id.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Store` on executor failure.
    pub async fn update_last_login(&self, id: i64) -> Result<bool, RecordError> {
        let result = self
            .db
            .execute(
                Statement::new(format!(
                    "UPDATE admin_users SET last_login = {NOW_SQL} WHERE id = ?"
                ))
                .positional(vec![id.into()]),
            )
            .await?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_row(row: &Row) -> Result<AdminUser, RecordError> {
    Ok(AdminUser {
        id: row.get("id")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        full_name: row.get("full_name")?,
        role: row.get("role")?,
        last_login: row.get("last_login")?,
        created_at: row.get("created_at")?,
    })
}
