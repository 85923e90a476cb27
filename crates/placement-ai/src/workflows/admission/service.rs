use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{AdmissionDecision, Application, ApplicationId, ApplicationStatus};
use super::store::{
    ApplicationStore, CandidateStore, Notification, NotificationDispatcher, NotificationKind,
    OfferingStore, StoreError,
};
use crate::workflows::matching::{CandidateId, Offering, OfferingId};

/// Maximum applications one candidate may hold with a single organization.
/// Drafts are proposals and do not count until promoted.
pub const ORG_APPLICATION_CAP: usize = 2;

/// Error raised by the application workflow and the batch services built on
/// top of it.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("quota exceeded: {0}")]
    Quota(String),
    #[error("invalid state: {0}")]
    State(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// State machine governing a single application's lifecycle and the
/// per-candidate constraints around it. All collaborators are injected so the
/// workflow can be exercised against in-memory doubles.
pub struct ApplicationWorkflow<C, O, A, N> {
    candidates: Arc<C>,
    offerings: Arc<O>,
    applications: Arc<A>,
    notifier: Arc<N>,
}

impl<C, O, A, N> Clone for ApplicationWorkflow<C, O, A, N> {
    fn clone(&self) -> Self {
        Self {
            candidates: Arc::clone(&self.candidates),
            offerings: Arc::clone(&self.offerings),
            applications: Arc::clone(&self.applications),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<C, O, A, N> ApplicationWorkflow<C, O, A, N>
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(candidates: Arc<C>, offerings: Arc<O>, applications: Arc<A>, notifier: Arc<N>) -> Self {
        Self {
            candidates,
            offerings,
            applications,
            notifier,
        }
    }

    pub fn candidates(&self) -> &Arc<C> {
        &self.candidates
    }

    pub fn offerings(&self) -> &Arc<O> {
        &self.offerings
    }

    pub fn applications(&self) -> &Arc<A> {
        &self.applications
    }

    pub(crate) fn load_candidate(
        &self,
        id: &CandidateId,
    ) -> Result<crate::workflows::matching::CandidateProfile, WorkflowError> {
        self.candidates
            .fetch(id)?
            .ok_or_else(|| WorkflowError::NotFound(format!("candidate {}", id.0)))
    }

    pub(crate) fn load_offering(&self, id: &OfferingId) -> Result<Offering, WorkflowError> {
        self.offerings
            .fetch(id)?
            .ok_or_else(|| WorkflowError::NotFound(format!("offering {}", id.0)))
    }

    /// Submit a new application, enforcing the duplicate gate and the
    /// per-organization cap. The stored record snapshots the candidate's
    /// current document checklist.
    pub fn submit(
        &self,
        candidate_id: &CandidateId,
        offering_id: &OfferingId,
        match_score: Option<u8>,
        auto_generated: bool,
    ) -> Result<Application, WorkflowError> {
        let candidate = self.load_candidate(candidate_id)?;
        let offering = self.load_offering(offering_id)?;
        let existing = self.applications.for_candidate(candidate_id)?;
        enforce_submission_rules(&existing, None, &offering)?;

        let now = Utc::now();
        let application = Application {
            application_id: next_application_id(),
            candidate_id: candidate_id.clone(),
            offering_id: offering_id.clone(),
            org_id: offering.org_id.clone(),
            status: ApplicationStatus::Pending,
            match_score,
            auto_generated,
            documents: candidate.documents,
            applied_at: Some(now),
            submitted_at: Some(now),
            decided_at: None,
            version: 0,
        };

        Ok(self.applications.insert(application)?)
    }

    /// Transition a pending application to an institutional decision and emit
    /// a notification event to the candidate.
    pub fn decide(
        &self,
        application_id: &ApplicationId,
        decision: AdmissionDecision,
    ) -> Result<Application, WorkflowError> {
        let mut application = self
            .applications
            .fetch(application_id)?
            .ok_or_else(|| WorkflowError::NotFound(format!("application {}", application_id.0)))?;

        if application.status != ApplicationStatus::Pending {
            return Err(WorkflowError::State(format!(
                "cannot decide application in status '{}'",
                application.status.label()
            )));
        }

        application.status = decision.status();
        application.decided_at = Some(Utc::now());
        let updated = self.applications.update(application)?;

        self.dispatch(Notification {
            user_id: updated.candidate_id.clone(),
            kind: NotificationKind::ApplicationDecision,
            title: format!("Application {}", decision.label()),
            message: format!(
                "Your application for offering {} was {}.",
                updated.offering_id.0,
                decision.label()
            ),
            related_id: Some(updated.application_id.0.clone()),
        });

        Ok(updated)
    }

    /// Commit the candidate to one admitted offering. Every other admitted
    /// application of the same candidate is rejected in the same atomic
    /// write; concurrent selections for one candidate always overlap on at
    /// least one record, so the loser surfaces as a conflict.
    pub fn select(
        &self,
        candidate_id: &CandidateId,
        application_id: &ApplicationId,
    ) -> Result<Application, WorkflowError> {
        let mut candidate = self.load_candidate(candidate_id)?;
        let applications = self.applications.for_candidate(candidate_id)?;

        let target = applications
            .iter()
            .find(|application| application.application_id == *application_id)
            .ok_or_else(|| WorkflowError::NotFound(format!("application {}", application_id.0)))?;

        if target.candidate_id != *candidate_id {
            return Err(WorkflowError::Validation(
                "application does not belong to candidate".to_string(),
            ));
        }
        if applications
            .iter()
            .any(|application| application.status == ApplicationStatus::Selected)
        {
            return Err(WorkflowError::Conflict(
                "an offering has already been selected".to_string(),
            ));
        }
        if target.status != ApplicationStatus::Admitted {
            return Err(WorkflowError::State(format!(
                "only admitted applications can be selected (status '{}')",
                target.status.label()
            )));
        }

        let now = Utc::now();
        let selected_offering = target.offering_id.clone();
        let mut writes = Vec::new();
        for application in applications {
            if application.application_id == *application_id {
                let mut chosen = application;
                chosen.status = ApplicationStatus::Selected;
                writes.push(chosen);
            } else if application.status == ApplicationStatus::Admitted {
                let mut displaced = application;
                displaced.status = ApplicationStatus::Rejected;
                displaced.decided_at = Some(now);
                writes.push(displaced);
            }
        }

        self.applications
            .update_all(writes)
            .map_err(|err| match err {
                StoreError::Version => WorkflowError::Conflict(
                    "selection raced with a concurrent update".to_string(),
                ),
                other => WorkflowError::Store(other),
            })?;

        candidate.enrolled_offering = Some(selected_offering.clone());
        self.candidates.update(candidate)?;

        self.dispatch(Notification {
            user_id: candidate_id.clone(),
            kind: NotificationKind::Selection,
            title: "Enrollment confirmed".to_string(),
            message: format!("You are now enrolled via offering {}.", selected_offering.0),
            related_id: Some(application_id.0.clone()),
        });

        self.applications
            .fetch(application_id)?
            .ok_or_else(|| WorkflowError::NotFound(format!("application {}", application_id.0)))
    }

    /// Create a draft application. Drafts are proposals: the duplicate and
    /// cap checks are deliberately skipped here and re-run at promotion.
    pub fn create_draft(
        &self,
        candidate_id: &CandidateId,
        offering_id: &OfferingId,
        match_score: Option<u8>,
        auto_generated: bool,
    ) -> Result<Application, WorkflowError> {
        let candidate = self.load_candidate(candidate_id)?;
        let offering = self.load_offering(offering_id)?;

        let application = Application {
            application_id: next_application_id(),
            candidate_id: candidate_id.clone(),
            offering_id: offering_id.clone(),
            org_id: offering.org_id.clone(),
            status: ApplicationStatus::Draft,
            match_score,
            auto_generated,
            documents: candidate.documents,
            applied_at: None,
            submitted_at: None,
            decided_at: None,
            version: 0,
        };

        Ok(self.applications.insert(application)?)
    }

    pub fn delete_draft(&self, application_id: &ApplicationId) -> Result<(), WorkflowError> {
        let application = self
            .applications
            .fetch(application_id)?
            .ok_or_else(|| WorkflowError::NotFound(format!("application {}", application_id.0)))?;

        if application.status != ApplicationStatus::Draft {
            return Err(WorkflowError::State(format!(
                "only draft applications can be deleted (status '{}')",
                application.status.label()
            )));
        }

        Ok(self.applications.delete(application_id)?)
    }

    /// Promote a draft to a submitted application. The cap and duplicate
    /// rules are re-validated because other applications may have landed
    /// since the draft was created.
    pub fn promote_draft(&self, application_id: &ApplicationId) -> Result<Application, WorkflowError> {
        let mut application = self
            .applications
            .fetch(application_id)?
            .ok_or_else(|| WorkflowError::NotFound(format!("application {}", application_id.0)))?;

        if application.status != ApplicationStatus::Draft {
            return Err(WorkflowError::State(format!(
                "only draft applications can be promoted (status '{}')",
                application.status.label()
            )));
        }

        let offering = self.load_offering(&application.offering_id)?;
        let existing = self.applications.for_candidate(&application.candidate_id)?;
        enforce_submission_rules(&existing, Some(application_id), &offering)?;

        let now = Utc::now();
        application.status = ApplicationStatus::Pending;
        application.applied_at = Some(now);
        application.submitted_at = Some(now);
        Ok(self.applications.update(application)?)
    }

    pub(crate) fn dispatch(&self, notification: Notification) {
        if let Err(err) = self.notifier.notify(notification) {
            tracing::warn!(%err, "notification dispatch failed");
        }
    }
}

/// Duplicate and per-organization cap checks shared by submit and promote.
/// `exclude` carries the application being promoted so it does not count
/// against itself. A draft still blocks a second record for the same
/// offering, but only promoted applications count toward the org cap.
fn enforce_submission_rules(
    existing: &[Application],
    exclude: Option<&ApplicationId>,
    offering: &Offering,
) -> Result<(), WorkflowError> {
    let considered = existing
        .iter()
        .filter(|application| exclude != Some(&application.application_id));

    let mut org_count = 0usize;
    for application in considered {
        if application.offering_id == offering.offering_id {
            return Err(WorkflowError::Conflict(format!(
                "an application for offering {} already exists",
                offering.offering_id.0
            )));
        }
        if application.status != ApplicationStatus::Draft && application.org_id == offering.org_id {
            org_count += 1;
        }
    }

    if org_count >= ORG_APPLICATION_CAP {
        return Err(WorkflowError::Quota(format!(
            "application cap of {ORG_APPLICATION_CAP} reached for organization {}",
            offering.org_id.0
        )));
    }

    Ok(())
}
