//! The execution interface every data-access call goes through.
//!
//! Statement text handed to a [`GenericClient`] holds only identifiers and `$n`
//! placeholders; the data travels in `params` and is bound by position.

use crate::error::{JoblyError, JoblyResult};
use std::future::Future;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Positional parameters for one statement.
pub type Params<'a> = [&'a (dyn ToSql + Sync)];

/// Anything a repository method can run a statement on: a connection, a
/// transaction, a pooled client or a wrapper such as
/// [`TracingClient`](crate::monitor::TracingClient).
///
/// Implementors provide [`query`](GenericClient::query) and
/// [`execute`](GenericClient::execute). Wrappers that care about the
/// observability tag override the `*_tagged` pair; the remaining helpers are
/// derived from those.
pub trait GenericClient: Send + Sync {
    fn query(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<Vec<Row>>> + Send;

    /// Run a statement, returning the affected row count.
    fn execute(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<u64>> + Send;

    /// [`query`](GenericClient::query) labelled with `tag` (e.g. `jobs.find_all`).
    /// Plain clients drop the tag.
    fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<Vec<Row>>> + Send {
        let _ = tag;
        self.query(sql, params)
    }

    /// [`execute`](GenericClient::execute) labelled with `tag`.
    fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<u64>> + Send {
        let _ = tag;
        self.execute(sql, params)
    }

    /// First returned row; zero rows is [`JoblyError::NotFound`]. Extra rows
    /// are ignored.
    fn query_one(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<Row>> + Send {
        async move { first_row(self.query(sql, params).await?) }
    }

    fn query_one_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<Row>> + Send {
        async move { first_row(self.query_tagged(tag, sql, params).await?) }
    }

    /// First returned row, if any.
    fn query_opt(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<Option<Row>>> + Send {
        async move { Ok(self.query(sql, params).await?.into_iter().next()) }
    }

    fn query_opt_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<Option<Row>>> + Send {
        async move { Ok(self.query_tagged(tag, sql, params).await?.into_iter().next()) }
    }
}

fn first_row(rows: Vec<Row>) -> JoblyResult<Row> {
    rows.into_iter()
        .next()
        .ok_or_else(|| JoblyError::not_found("statement returned no rows"))
}

/// Forward to the inherent tokio-postgres methods, classifying driver errors.
macro_rules! impl_for_tokio_postgres {
    ($($ty:ty),+ $(,)?) => {$(
        impl GenericClient for $ty {
            async fn query(&self, sql: &str, params: &Params<'_>) -> JoblyResult<Vec<Row>> {
                <$ty>::query(self, sql, params)
                    .await
                    .map_err(JoblyError::from_db_error)
            }

            async fn execute(&self, sql: &str, params: &Params<'_>) -> JoblyResult<u64> {
                <$ty>::execute(self, sql, params)
                    .await
                    .map_err(JoblyError::from_db_error)
            }
        }
    )+};
}

impl_for_tokio_postgres!(tokio_postgres::Client, tokio_postgres::Transaction<'_>);

// deadpool wrappers deref to the tokio-postgres types above.
#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &Params<'_>) -> JoblyResult<Vec<Row>> {
        let inner: &tokio_postgres::Client = self;
        GenericClient::query(inner, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &Params<'_>) -> JoblyResult<u64> {
        let inner: &tokio_postgres::Client = self;
        GenericClient::execute(inner, sql, params).await
    }
}

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &Params<'_>) -> JoblyResult<Vec<Row>> {
        let inner: &tokio_postgres::Transaction<'_> = self;
        GenericClient::query(inner, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &Params<'_>) -> JoblyResult<u64> {
        let inner: &tokio_postgres::Transaction<'_> = self;
        GenericClient::execute(inner, sql, params).await
    }
}
