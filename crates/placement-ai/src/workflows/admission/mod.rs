//! Application lifecycle, batch admission decisioning, and auto-application
//! orchestration built on injected store and dispatcher collaborators.

pub mod allocator;
pub mod autoapply;
pub mod domain;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use allocator::{
    AdmissionAllocator, DecisionLists, DecisionRecord, PublishOutcome, SkippedDecision,
};
pub use autoapply::{
    AutoApplyOptions, AutoApplyOrchestrator, AutoApplyReport, BatchAutoApplyOutcome,
    CandidateAnalytics, SkippedOffering,
};
pub use domain::{
    AdmissionBatch, AdmissionDecision, Application, ApplicationId, ApplicationStatus,
    ApplicationStatusView, BatchId,
};
pub use router::{admission_router, AdmissionState};
pub use service::{ApplicationWorkflow, WorkflowError, ORG_APPLICATION_CAP};
pub use store::{
    AdmissionEmail, ApplicationStore, BatchStore, CandidateStore, DispatchError, EmailService,
    JobMatchEmail, Notification, NotificationDispatcher, NotificationKind, OfferingStore,
    StoreError,
};
