use crate::error::JoblyResult;
use crate::row::{FromRow, RowExt};
use serde::Serialize;
use tokio_postgres::Row;

/// A company as embedded in job detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

impl Company {
    /// Decode the company side of a `LEFT JOIN`; a NULL `handle` means no match.
    pub(crate) fn from_joined_row(row: &Row) -> JoblyResult<Option<Self>> {
        let handle: Option<String> = row.try_get_column("handle")?;
        match handle {
            Some(_) => Self::from_row(row).map(Some),
            None => Ok(None),
        }
    }
}
