//! Table definitions for the jobs resource.
//!
//! A single idempotent script: every statement is `IF NOT EXISTS`, so running
//! [`setup`] against an already-initialized database is a no-op.

use crate::client::GenericClient;
use crate::error::JoblyResult;

/// DDL statements, in dependency order.
pub const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS companies (
        handle VARCHAR(25) PRIMARY KEY CHECK (handle = lower(handle)),
        name TEXT UNIQUE NOT NULL,
        num_employees INTEGER CHECK (num_employees >= 0),
        description TEXT NOT NULL,
        logo_url TEXT
    )",
    "CREATE TABLE IF NOT EXISTS jobs (
        id SERIAL PRIMARY KEY,
        title TEXT UNIQUE NOT NULL,
        salary INTEGER CHECK (salary >= 0),
        equity NUMERIC CHECK (equity <= 1.0),
        company_handle VARCHAR(25) NOT NULL
            REFERENCES companies ON DELETE CASCADE
    )",
];

/// Create the `companies` and `jobs` tables if they are missing.
pub async fn setup(conn: &impl GenericClient) -> JoblyResult<()> {
    for statement in STATEMENTS {
        conn.execute_tagged("schema.setup", statement, &[]).await?;
    }
    tracing::info!(target: "jobly", tables = STATEMENTS.len(), "schema ready");
    Ok(())
}
