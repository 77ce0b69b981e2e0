pub mod applications;
pub mod catalog;

pub use catalog::{CatalogError, InMemoryJobCatalog, JobCatalog, JobId, JobSnapshot, JobStatus};
