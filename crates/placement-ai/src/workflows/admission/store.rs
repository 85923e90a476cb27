use serde::{Deserialize, Serialize};

use super::domain::{AdmissionBatch, AdmissionDecision, Application, ApplicationId};
use crate::workflows::matching::{CandidateId, CandidateProfile, Offering, OfferingId};

/// Error enumeration for document-store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("concurrent modification detected")]
    Version,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Candidate collection access.
pub trait CandidateStore: Send + Sync {
    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, StoreError>;
    fn update(&self, profile: CandidateProfile) -> Result<(), StoreError>;
}

/// Offering collection access.
pub trait OfferingStore: Send + Sync {
    fn fetch(&self, id: &OfferingId) -> Result<Option<Offering>, StoreError>;
    /// Open offerings in creation order; suggestion ranking relies on the
    /// ordering for stable tie-breaks.
    fn open_offerings(&self) -> Result<Vec<Offering>, StoreError>;
}

/// Application collection access. `update` and `update_all` are
/// compare-and-set on `Application::version`: a mismatch fails with
/// `StoreError::Version` and leaves nothing written. `update_all` must apply
/// all writes or none.
pub trait ApplicationStore: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, StoreError>;
    fn update(&self, application: Application) -> Result<Application, StoreError>;
    fn update_all(&self, applications: Vec<Application>) -> Result<(), StoreError>;
    fn delete(&self, id: &ApplicationId) -> Result<(), StoreError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError>;
    fn for_candidate(&self, id: &CandidateId) -> Result<Vec<Application>, StoreError>;
    fn for_offering(&self, id: &OfferingId) -> Result<Vec<Application>, StoreError>;
}

/// Admission-batch history; insert-only.
pub trait BatchStore: Send + Sync {
    fn insert(&self, batch: AdmissionBatch) -> Result<AdmissionBatch, StoreError>;
    fn for_offering(&self, id: &OfferingId) -> Result<Vec<AdmissionBatch>, StoreError>;
}

/// Outbound event delivered to the external notification dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: CandidateId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ApplicationDecision,
    Selection,
    AutoApplication,
}

/// Dispatch error for notification and e-mail transports.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("dispatch transport unavailable: {0}")]
    Transport(String),
}

/// Fire-and-forget notification hook; the workflow never blocks on delivery
/// and never retries.
pub trait NotificationDispatcher: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), DispatchError>;
}

/// Admission decision e-mail payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionEmail {
    pub candidate_id: CandidateId,
    pub offering_name: String,
    pub decision: AdmissionDecision,
}

/// Strong job-match e-mail payload for the notification fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatchEmail {
    pub candidate_id: CandidateId,
    pub offering_name: String,
    pub score: u8,
}

/// Outbound e-mail hook, same fire-and-forget contract as notifications.
pub trait EmailService: Send + Sync {
    fn send_admission_email(&self, email: AdmissionEmail) -> Result<(), DispatchError>;
    fn send_job_email(&self, email: JobMatchEmail) -> Result<(), DispatchError>;
}
