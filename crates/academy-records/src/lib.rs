//! Record repositories for applications, videos, and admin users.
//!
//! Each repository holds a clone of the process-wide executor handle and
//! re-queries the store on every call; nothing is cached in memory.
//!
//! Writes derive their column lists from fixed, per-entity field lists
//! rather than from caller-supplied keys, so an unexpected field can never
//! reach the store as a column name.
//!
//! "Not found" is a value (`Ok(None)` or `Ok(false)`), never an error.
//! Store failures propagate unchanged as [`RecordError::Store`].

mod applications;
mod error;
mod seed;
mod users;
mod videos;

pub use applications::{ApplicationFilter, ApplicationRepository};
pub use error::RecordError;
pub use seed::{seed_database, SeedOptions, SeedReport, SAMPLE_VIDEOS};
pub use users::UserRepository;
pub use videos::{VideoFilter, VideoRepository};

use academy_db::{Statement, Value};

/// Builds `INSERT INTO table (a, b) VALUES (:a, :b)` from an ordered field
/// list.
pub(crate) fn insert_statement(
    table: &'static str,
    fields: Vec<(&'static str, Value)>,
) -> Statement {
    let columns: Vec<&str> = fields.iter().map(|(column, _)| *column).collect();
    let placeholders: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
    Statement::new(format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    ))
    .named(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_statement_preserves_field_order() {
        let stmt = insert_statement(
            "videos",
            vec![("title", Value::from("a")), ("duration", Value::from(3_i64))],
        );
        assert_eq!(
            stmt.sql,
            "INSERT INTO videos (title, duration) VALUES (:title, :duration)"
        );
        assert_eq!(
            stmt.params,
            academy_db::Params::Named(vec![
                ("title".to_string(), Value::from("a")),
                ("duration".to_string(), Value::from(3_i64)),
            ])
        );
    }
}
