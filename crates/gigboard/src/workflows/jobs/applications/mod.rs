//! Job-application admission and shortlist lifecycle.
//!
//! Every application is created by [`AdmissionController::submit`] and mutated only by the
//! [`ShortlistManager`]. Both run their check-then-write sequences inside the per-job section
//! held by [`JobLocks`], so counts derived from the store are always consistent with the write
//! that follows them.

pub mod admission;
pub mod clock;
pub mod domain;
pub mod intake;
pub mod locks;
pub mod repository;
pub mod router;
pub mod service;
pub mod shortlist;

#[cfg(test)]
mod tests;

pub use admission::{AdmissionController, AdmissionError};
pub use clock::{Clock, SystemClock};
pub use domain::{
    ApplicantId, Application, ApplicationId, ApplicationStatus, ApplicationView, Bid,
};
pub use intake::{BidGuard, BidPolicy, BidViolation};
pub use locks::JobLocks;
pub use repository::{ApplicationRepository, InMemoryApplicationRepository, RepositoryError};
pub use router::{
    application_router, application_router_with_guard, status_for, SubmitApplicationRequest,
};
pub use service::{ApplicationServiceError, ApplicationWindow, JobApplicationService};
pub use shortlist::{ShortlistError, ShortlistManager};
