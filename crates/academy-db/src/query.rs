//! Filtered, paginated listing queries.
//!
//! A [`ListQuery`] produces a COUNT statement and a SELECT statement from the
//! same predicate list, so `total` and the page contents are always computed
//! from identical WHERE clauses. The two run as separate round trips without
//! a shared transaction; under concurrent writes they may observe slightly
//! different store states.
//!
//! Table and column names are `&'static str` and come from code, never from
//! input. Every filter value is bound as a parameter.

use academy_types::Page;

use crate::error::DbError;
use crate::executor::StatementExecutor;
use crate::value::{Row, Statement, Value};

/// Builder for a COUNT/SELECT statement pair over one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    table: &'static str,
    clauses: Vec<String>,
    params: Vec<Value>,
    page: i64,
    limit: i64,
}

impl ListQuery {
    /// Starts a query over `table` with page 1 and a page size of 20.
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            clauses: Vec::new(),
            params: Vec::new(),
            page: 1,
            limit: 20,
        }
    }

    /// Adds `column = ?` when `value` is present and non-empty.
    pub fn eq(mut self, column: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.clauses.push(format!("{column} = ?"));
            self.params.push(Value::from(value));
        }
        self
    }

    /// Adds `(a LIKE ? OR b LIKE ? ...)` with `%term%` bound to every column
    /// when `term` is present and non-empty.
    pub fn search(mut self, columns: &[&'static str], term: Option<&str>) -> Self {
        if let Some(term) = term.filter(|t| !t.is_empty()) {
            if columns.is_empty() {
                return self;
            }
            let pattern = format!("%{term}%");
            let ors: Vec<String> = columns.iter().map(|c| format!("{c} LIKE ?")).collect();
            self.clauses.push(format!("({})", ors.join(" OR ")));
            self.params
                .extend(columns.iter().map(|_| Value::from(pattern.as_str())));
        }
        self
    }

    /// Sets the 1-based page and page size.
    ///
    /// Values are used as given. Callers must pass `page >= 1` and
    /// `limit >= 1`.
    pub fn page(mut self, page: i64, limit: i64) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    pub fn page_number(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    fn where_clause(&self) -> String {
        let mut clause = String::from("WHERE 1=1");
        for predicate in &self.clauses {
            clause.push_str(" AND ");
            clause.push_str(predicate);
        }
        clause
    }

    /// Builds the `(count, select)` statement pair.
    ///
    /// The count statement yields one row with a `total` column. The select
    /// statement returns whole rows, newest first.
    pub fn build(&self) -> (Statement, Statement) {
        let where_clause = self.where_clause();

        let count = Statement::new(format!(
            "SELECT COUNT(*) AS total FROM {} {where_clause}",
            self.table
        ))
        .positional(self.params.clone());

        let mut select_params = self.params.clone();
        select_params.push(Value::Integer(self.limit));
        select_params.push(Value::Integer(self.offset()));
        let select = Statement::new(format!(
            "SELECT * FROM {} {where_clause} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            self.table
        ))
        .positional(select_params);

        (count, select)
    }
}

/// Runs a [`ListQuery`] and decodes each returned row.
///
/// # Errors
///
/// Returns the executor's error for either statement, or the decoder's error
/// for the first row that fails to decode.
pub async fn fetch_page<T, E, F>(
    executor: &dyn StatementExecutor,
    query: &ListQuery,
    decode: F,
) -> Result<Page<T>, E>
where
    F: Fn(&Row) -> Result<T, E>,
    E: From<DbError>,
{
    let (count, select) = query.build();

    let total = executor.execute(count).await?.scalar_i64("total")?;
    let rows = executor.execute(select).await?.rows;

    tracing::debug!(
        table = query.table,
        total,
        returned = rows.len(),
        page = query.page,
        limit = query.limit,
        "fetched page"
    );

    let data = rows.iter().map(decode).collect::<Result<Vec<_>, E>>()?;

    Ok(Page {
        data,
        total,
        page: query.page,
        limit: query.limit,
    })
}
