use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::matching::{CandidateId, DocumentChecklist, OfferingId, OrganizationId};

/// Identifier wrapper for applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for published admission batches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub String);

/// Lifecycle status of an application.
///
/// `draft -> pending -> {admitted, rejected, waitlisted}`, and
/// `admitted -> selected` (terminal, at most one per candidate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Pending,
    Admitted,
    Rejected,
    Waitlisted,
    Selected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Admitted => "admitted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Waitlisted => "waitlisted",
            ApplicationStatus::Selected => "selected",
        }
    }
}

/// Institutional decision applied to a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionDecision {
    Admitted,
    Rejected,
    Waitlisted,
}

impl AdmissionDecision {
    pub const fn status(self) -> ApplicationStatus {
        match self {
            AdmissionDecision::Admitted => ApplicationStatus::Admitted,
            AdmissionDecision::Rejected => ApplicationStatus::Rejected,
            AdmissionDecision::Waitlisted => ApplicationStatus::Waitlisted,
        }
    }

    pub const fn label(self) -> &'static str {
        self.status().label()
    }
}

/// A candidate's application to one offering. The `version` field backs the
/// store's compare-and-set writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub application_id: ApplicationId,
    pub candidate_id: CandidateId,
    pub offering_id: OfferingId,
    pub org_id: OrganizationId,
    pub status: ApplicationStatus,
    pub match_score: Option<u8>,
    pub auto_generated: bool,
    pub documents: DocumentChecklist,
    pub applied_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
    pub version: u64,
}

impl Application {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.application_id.clone(),
            offering_id: self.offering_id.clone(),
            status: self.status.label(),
            match_score: self.match_score,
            auto_generated: self.auto_generated,
            decided_at: self.decided_at,
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub offering_id: OfferingId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
    pub auto_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

/// One institution's bulk decision publication for a single offering.
/// Append-only history; never mutated after publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionBatch {
    pub batch_id: BatchId,
    pub org_id: OrganizationId,
    pub offering_id: OfferingId,
    pub admitted: Vec<CandidateId>,
    pub rejected: Vec<CandidateId>,
    pub waitlisted: Vec<CandidateId>,
    pub published_at: DateTime<Utc>,
}
