use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::jobs::catalog::JobId;

/// Identifier assigned to an application at admission time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the freelancer placing a bid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(pub String);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApplicantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Bid payload carried alongside an application. The engine stores it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub proposed_price: f64,
    pub delivery_days: u32,
    pub pitch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_sample_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_for_creator: Option<String>,
}

/// Lifecycle of an admitted application. `Rejected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    Shortlisted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Rejected)
    }

    /// Whether the creator may move an application from `self` to `next`.
    pub const fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (ApplicationStatus::Submitted, ApplicationStatus::Shortlisted)
                | (ApplicationStatus::Submitted, ApplicationStatus::Rejected)
                | (ApplicationStatus::Shortlisted, ApplicationStatus::Rejected)
        )
    }
}

/// An admitted application as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant_id: ApplicantId,
    pub position: u32,
    pub bid: Bid,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl Application {
    pub fn view(&self) -> ApplicationView {
        ApplicationView {
            application_id: self.id.clone(),
            job_id: self.job_id.clone(),
            applicant_id: self.applicant_id.clone(),
            position: self.position,
            status: self.status.label(),
            proposed_price: self.bid.proposed_price,
            delivery_days: self.bid.delivery_days,
            created_at: self.created_at,
        }
    }
}

/// Flattened representation returned to dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub application_id: ApplicationId,
    pub job_id: JobId,
    pub applicant_id: ApplicantId,
    pub position: u32,
    pub status: &'static str,
    pub proposed_price: f64,
    pub delivery_days: u32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;

    #[test]
    fn only_forward_transitions_are_allowed() {
        assert!(Submitted.can_transition_to(Shortlisted));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(Shortlisted.can_transition_to(Rejected));

        assert!(!Shortlisted.can_transition_to(Submitted));
        assert!(!Shortlisted.can_transition_to(Shortlisted));
        assert!(!Rejected.can_transition_to(Submitted));
        assert!(!Rejected.can_transition_to(Shortlisted));
        assert!(!Rejected.can_transition_to(Rejected));
    }

    #[test]
    fn labels_match_serialized_form() {
        for status in [Submitted, Shortlisted, Rejected] {
            let json = serde_json::to_value(status).expect("serializes");
            assert_eq!(json.as_str(), Some(status.label()));
        }
        assert!(Rejected.is_terminal());
        assert!(!Shortlisted.is_terminal());
    }
}
