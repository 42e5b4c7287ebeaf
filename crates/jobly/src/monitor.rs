//! SQL logging through `tracing`.
//!
//! [`TracingClient`] wraps any [`GenericClient`] and emits one event per
//! statement on target `jobly.sql`: the statement kind, its tag, the number of
//! bound parameters, the (truncated) SQL text, the elapsed time and the
//! outcome. Bound values are never logged.
//!
//! ```ignore
//! let client = TracingClient::new(pool.get().await?).level(tracing::Level::INFO);
//! let jobs = Job::find_all(&client, &JobFilter::new()).await?;
//! ```

use crate::client::{GenericClient, Params};
use crate::error::JoblyResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tracing::Level;

/// The kind of SQL statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl StatementKind {
    /// Detect the statement kind from its leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let head = sql.trim_start();
        let keyword = head
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or("");
        if keyword.eq_ignore_ascii_case("SELECT") {
            StatementKind::Select
        } else if keyword.eq_ignore_ascii_case("INSERT") {
            StatementKind::Insert
        } else if keyword.eq_ignore_ascii_case("UPDATE") {
            StatementKind::Update
        } else if keyword.eq_ignore_ascii_case("DELETE") {
            StatementKind::Delete
        } else {
            StatementKind::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Other => "other",
        }
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A `GenericClient` wrapper that logs every statement via `tracing`.
#[derive(Debug, Clone)]
pub struct TracingClient<C> {
    client: C,
    /// Tracing event level to emit at.
    level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    max_sql_length: Option<usize>,
}

impl<C: GenericClient> TracingClient<C> {
    /// Wrap `client`, logging at DEBUG with SQL truncated to 200 bytes.
    pub fn new(client: C) -> Self {
        Self {
            client,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn emit<T>(
        &self,
        tag: &str,
        sql: &str,
        param_count: usize,
        elapsed: Duration,
        result: &JoblyResult<T>,
    ) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let statement = StatementKind::from_sql(sql).as_str();
        let sql = self.truncate_sql(sql);
        match result {
            Ok(_) => emit_at_level!(
                self.level,
                target: "jobly.sql",
                statement,
                tag,
                param_count,
                elapsed = ?elapsed,
                sql = %sql,
            ),
            Err(e) => tracing::warn!(
                target: "jobly.sql",
                statement,
                tag,
                param_count,
                elapsed = ?elapsed,
                sql = %sql,
                error = %e,
            ),
        }
    }
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    async fn query(&self, sql: &str, params: &Params<'_>) -> JoblyResult<Vec<Row>> {
        self.query_tagged("-", sql, params).await
    }

    async fn execute(&self, sql: &str, params: &Params<'_>) -> JoblyResult<u64> {
        self.execute_tagged("-", sql, params).await
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &Params<'_>,
    ) -> JoblyResult<Vec<Row>> {
        let start = Instant::now();
        let result = self.client.query_tagged(tag, sql, params).await;
        self.emit(tag, sql, params.len(), start.elapsed(), &result);
        result
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &Params<'_>,
    ) -> JoblyResult<u64> {
        let start = Instant::now();
        let result = self.client.execute_tagged(tag, sql, params).await;
        self.emit(tag, sql, params.len(), start.elapsed(), &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoblyError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, String, usize)>>);

    impl GenericClient for Recorder {
        async fn query(&self, sql: &str, params: &Params<'_>) -> JoblyResult<Vec<Row>> {
            self.query_tagged("-", sql, params).await
        }
        async fn execute(&self, _: &str, _: &Params<'_>) -> JoblyResult<u64> {
            Err(JoblyError::Connection("closed".to_string()))
        }
        async fn query_tagged(
            &self,
            tag: &str,
            sql: &str,
            params: &Params<'_>,
        ) -> JoblyResult<Vec<Row>> {
            self.0
                .lock()
                .unwrap()
                .push((tag.to_string(), sql.to_string(), params.len()));
            Ok(vec![])
        }
    }

    #[test]
    fn statement_kind_detection() {
        assert_eq!(StatementKind::from_sql("SELECT 1"), StatementKind::Select);
        assert_eq!(
            StatementKind::from_sql("\n  update jobs SET \"title\"=$1"),
            StatementKind::Update
        );
        assert_eq!(
            StatementKind::from_sql("INSERT INTO jobs (title) VALUES ($1)"),
            StatementKind::Insert
        );
        assert_eq!(
            StatementKind::from_sql("DELETE FROM jobs WHERE id = $1"),
            StatementKind::Delete
        );
        assert_eq!(StatementKind::from_sql("CREATE TABLE t ()"), StatementKind::Other);
        assert_eq!(StatementKind::from_sql(""), StatementKind::Other);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_sql_bytes("abc", 10), "abc");
        assert_eq!(truncate_sql_bytes("abcdef", 3), "abc");
        // 'é' is two bytes; cutting inside it backs off to the boundary.
        assert_eq!(truncate_sql_bytes("aé", 2), "a");
    }

    #[tokio::test]
    async fn forwards_tag_and_params() {
        let client = TracingClient::new(Recorder::default()).max_sql_length(8);
        let a = 1_i32;
        client
            .query_tagged("jobs.find_all", "SELECT * FROM jobs WHERE salary >= $1", &[&a])
            .await
            .unwrap();
        client.query("SELECT 1", &[]).await.unwrap();

        let seen = client.inner().0.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (
                    "jobs.find_all".to_string(),
                    "SELECT * FROM jobs WHERE salary >= $1".to_string(),
                    1
                ),
                ("-".to_string(), "SELECT 1".to_string(), 0),
            ]
        );
    }

    #[tokio::test]
    async fn propagates_errors_unchanged() {
        let client = TracingClient::new(Recorder::default());
        let err = client.execute("DELETE FROM jobs", &[]).await.unwrap_err();
        assert!(matches!(err, JoblyError::Connection(_)));
    }
}
