pub mod leave_request;
pub mod people;
pub mod progress_report;
pub mod task;

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::MySqlPool;

use crate::access::Directory;
use crate::error::ApiError;
use crate::utils::directory_cache::DirectoryCache;

/// Current directory snapshot for a request.
pub(crate) async fn snapshot(
    cache: &DirectoryCache,
    pool: &MySqlPool,
) -> Result<Arc<Directory>, ApiError> {
    cache.get(pool).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load directory");
        ApiError::Internal
    })
}

/// Callers writing rows about themselves must have a person record.
pub(crate) fn require_person(person_id: &str, directory: &Directory) -> Result<(), ApiError> {
    if directory.contains(person_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "No person record for this account".to_string(),
        ))
    }
}

/// Returns `(page, per_page, offset)`; pages start at 1, at most 100 per page.
pub(crate) fn page_bounds(page: Option<u32>, per_page: Option<u32>) -> (u32, u32, u32) {
    let per_page = per_page.unwrap_or(10).clamp(1, 100);
    let page = page.unwrap_or(1).max(1);
    (page, per_page, (page - 1) * per_page)
}

// Helper enum for typed SQLx binding
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FilterValue {
    Str(String),
    Date(NaiveDate),
}

/// Incrementally built WHERE clause with its positional arguments.
#[derive(Debug)]
pub(crate) struct SqlFilter {
    where_sql: String,
    args: Vec<FilterValue>,
}

impl SqlFilter {
    pub(crate) fn new() -> Self {
        Self {
            where_sql: String::from(" WHERE 1=1"),
            args: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, column: &str, op: &str, value: FilterValue) {
        self.where_sql.push_str(&format!(" AND {} {} ?", column, op));
        self.args.push(value);
    }

    pub(crate) fn push_eq(&mut self, column: &str, value: impl Into<String>) {
        self.push(column, "=", FilterValue::Str(value.into()));
    }

    /// `column IN (...)`; an empty set matches nothing.
    pub(crate) fn push_in<I, S>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.where_sql.push_str(" AND 1=0");
            return;
        }

        let placeholders = vec!["?"; values.len()].join(", ");
        self.where_sql
            .push_str(&format!(" AND {} IN ({})", column, placeholders));
        self.args.extend(values.into_iter().map(FilterValue::Str));
    }

    pub(crate) fn sql(&self) -> &str {
        &self.where_sql
    }

    pub(crate) fn bind_scalar<'q, O>(
        &self,
        mut query: QueryScalar<'q, MySql, O, MySqlArguments>,
    ) -> QueryScalar<'q, MySql, O, MySqlArguments> {
        for arg in &self.args {
            query = match arg {
                FilterValue::Str(s) => query.bind(s.clone()),
                FilterValue::Date(d) => query.bind(*d),
            };
        }
        query
    }

    pub(crate) fn bind_rows<'q, O>(
        &self,
        mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    ) -> QueryAs<'q, MySql, O, MySqlArguments> {
        for arg in &self.args {
            query = match arg {
                FilterValue::Str(s) => query.bind(s.clone()),
                FilterValue::Date(d) => query.bind(*d),
            };
        }
        query
    }
}
