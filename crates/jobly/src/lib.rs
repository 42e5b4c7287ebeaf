//! # jobly
//!
//! Data-access layer for the jobs resource, built on tokio-postgres.
//!
//! ## Features
//!
//! - **Parameterized fragments**: [`build_set_clause`] and [`build_filters`] turn
//!   sparse input into SQL text holding only identifiers and `$n` placeholders,
//!   with the data returned separately as a `Vec<Value>`
//! - **Contiguous numbering**: placeholders are numbered from the length of the
//!   values accumulator, so any subset of criteria stays `$1..$n`
//! - **Distinct error kinds**: `Validation`, `NotFound` and `Conflict` are
//!   separate [`JoblyError`] variants for the boundary to map
//! - **Transaction-friendly**: pass a transaction anywhere a [`GenericClient`] is expected
//! - **Statement logging**: [`TracingClient`] reports every statement through `tracing`
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{Job, JobFilter, UpdatePayload};
//!
//! let pool = jobly::create_pool(&database_url)?;
//! let client = pool.get().await?;
//!
//! let jobs = Job::find_all(&client, &JobFilter::new().min_salary(90000)).await?;
//!
//! let payload = UpdatePayload::new().set("title", "Staff Engineer").set("salary", 150000);
//! let job = Job::update(&client, jobs[0].job.id, &payload).await?;
//! ```

pub mod client;
pub mod error;
pub mod filter;
pub mod ident;
pub mod models;
pub mod monitor;
pub mod partial_update;
pub mod row;
pub mod schema;
pub mod value;

pub use client::{GenericClient, Params};
pub use error::{JoblyError, JoblyResult};
pub use filter::{JobFilter, PredicateBuilder, PredicateFragment, build_filters, build_filters_after};
pub use ident::{ColumnMap, quote_ident};
pub use models::{Company, Job, JobDetail, JobListing, NewJob};
pub use monitor::{StatementKind, TracingClient};
pub use partial_update::{SetFragment, UpdatePayload, build_set_clause};
pub use row::{FromRow, RowExt};
pub use value::{BindError, Value};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
