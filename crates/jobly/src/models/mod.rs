//! Data-access layer for the jobs resource.

mod company;
mod job;


pub use company::Company;
pub use job::{Job, JobDetail, JobListing, NewJob};
