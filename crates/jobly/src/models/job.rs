use super::company::Company;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{JobFilter, build_filters};
use crate::ident::ColumnMap;
use crate::partial_update::{UpdatePayload, build_set_clause};
use crate::row::{FromRow, RowExt};
use crate::value::as_params;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Columns every job-returning statement projects.
const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

const LISTING_SELECT: &str = "SELECT j.id, j.title, j.salary, j.equity, j.company_handle, \
     c.name AS company_name \
     FROM jobs j LEFT JOIN companies AS c ON c.handle = j.company_handle";

const DETAIL_SELECT: &str = "SELECT j.id, j.title, j.salary, j.equity, j.company_handle, \
     c.handle, c.name, c.description, c.num_employees, c.logo_url \
     FROM jobs j LEFT JOIN companies AS c ON c.handle = j.company_handle \
     WHERE j.id = $1";

/// A row of the `jobs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// A job as returned by [`Job::find_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    #[serde(flatten)]
    pub job: Job,
    pub company_name: Option<String>,
}

/// A job with its company, as returned by [`Job::get`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Option<Company>,
}

/// Input for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

impl FromRow for JobListing {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            job: Job::from_row(row)?,
            company_name: row.try_get_column("company_name")?,
        })
    }
}

impl FromRow for JobDetail {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        let job = Job::from_row(row)?;
        Ok(Self {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company: Company::from_joined_row(row)?,
        })
    }
}

/// Semantic field names that differ from their column.
static COLUMN_MAP: ColumnMap = ColumnMap::from_static(&[("companyHandle", "company_handle")]);

fn no_job(id: i32) -> JoblyError {
    JoblyError::not_found(format!("No job: {id}"))
}

impl Job {
    pub const TABLE: &'static str = "jobs";

    pub fn column_map() -> &'static ColumnMap {
        &COLUMN_MAP
    }

    /// Columns a partial update may not touch.
    const IMMUTABLE_COLUMNS: &'static [&'static str] = &["id", "company_handle"];

    /// Insert a job, refusing a title that already exists.
    ///
    /// `jobs.title` is also `UNIQUE`, so a duplicate that lands between the
    /// check and the INSERT still comes back as [`JoblyError::Conflict`].
    pub async fn create(conn: &impl GenericClient, data: NewJob) -> JoblyResult<Job> {
        // A SELECT's execute count is the number of rows it returned.
        let existing = conn
            .execute_tagged(
                "jobs.create.exists",
                "SELECT title FROM jobs WHERE title = $1",
                &[&data.title],
            )
            .await?;
        if existing > 0 {
            return Err(JoblyError::conflict(format!("Duplicate job: {}", data.title)));
        }

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {JOB_COLUMNS}"
        );
        let row = conn
            .query_one_tagged(
                "jobs.create",
                &sql,
                &[&data.title, &data.salary, &data.equity, &data.company_handle],
            )
            .await?;
        Job::from_row(&row)
    }

    /// Fetch one job with its company.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<JobDetail> {
        let row = conn
            .query_opt_tagged("jobs.get", DETAIL_SELECT, &[&id])
            .await?
            .ok_or_else(|| no_job(id))?;
        JobDetail::from_row(&row)
    }

    /// List jobs matching `filter`, ordered by title.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &JobFilter,
    ) -> JoblyResult<Vec<JobListing>> {
        let predicates = build_filters(filter);
        let sql = format!("{LISTING_SELECT}{} ORDER BY title", predicates.where_clause());

        let rows = conn
            .query_tagged("jobs.find_all", &sql, &as_params(&predicates.values))
            .await?;
        rows.iter().map(JobListing::from_row).collect()
    }

    /// Apply a partial update and return the updated job.
    ///
    /// `id` and `companyHandle` cannot be changed.
    pub async fn update(
        conn: &impl GenericClient,
        id: i32,
        payload: &UpdatePayload,
    ) -> JoblyResult<Job> {
        for field in payload.fields() {
            let column = COLUMN_MAP.resolve(field);
            if Self::IMMUTABLE_COLUMNS.iter().any(|c| *c == column) {
                return Err(JoblyError::validation(format!("{field} cannot be updated")));
            }
        }

        let set = build_set_clause(payload, &COLUMN_MAP)?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {JOB_COLUMNS}",
            set.text,
            set.next_placeholder()
        );

        let mut params = as_params(&set.values);
        params.push(&id as &(dyn ToSql + Sync));

        let row = conn
            .query_opt_tagged("jobs.update", &sql, &params)
            .await?
            .ok_or_else(|| no_job(id))?;
        Job::from_row(&row)
    }

    /// Delete a job by id.
    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        conn.query_opt_tagged("jobs.remove", "DELETE FROM jobs WHERE id = $1 RETURNING id", &[&id])
            .await?
            .ok_or_else(|| no_job(id))?;
        Ok(())
    }
}
