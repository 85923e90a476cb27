use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::{
    AdmissionBatch, AdmissionDecision, ApplicationId, ApplicationStatus, BatchId,
};
use super::service::{ApplicationWorkflow, WorkflowError};
use super::store::{
    AdmissionEmail, ApplicationStore, BatchStore, CandidateStore, EmailService,
    NotificationDispatcher, OfferingStore,
};
use crate::workflows::matching::{CandidateId, OfferingId, OrganizationId};

/// The three disjoint decision lists an institution publishes for one
/// offering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionLists {
    pub admitted: Vec<CandidateId>,
    pub rejected: Vec<CandidateId>,
    pub waitlisted: Vec<CandidateId>,
}

impl DecisionLists {
    fn pairs(&self) -> impl Iterator<Item = (AdmissionDecision, &CandidateId)> {
        let admitted = self
            .admitted
            .iter()
            .map(|id| (AdmissionDecision::Admitted, id));
        let rejected = self
            .rejected
            .iter()
            .map(|id| (AdmissionDecision::Rejected, id));
        let waitlisted = self
            .waitlisted
            .iter()
            .map(|id| (AdmissionDecision::Waitlisted, id));
        admitted.chain(rejected).chain(waitlisted)
    }
}

/// Decision applied to one candidate during a publish pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    pub candidate_id: CandidateId,
    pub decision: AdmissionDecision,
    pub application_id: ApplicationId,
}

/// Candidate skipped during a publish pass, with the reason recorded instead
/// of failing the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDecision {
    pub candidate_id: CandidateId,
    pub decision: AdmissionDecision,
    pub reason: String,
}

/// Itemized result of one publish pass. The batch record itself is immutable
/// history; `decided` and `skipped` report the per-candidate outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub batch: AdmissionBatch,
    pub decided: Vec<DecisionRecord>,
    pub skipped: Vec<SkippedDecision>,
}

static BATCH_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_batch_id() -> BatchId {
    let id = BATCH_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BatchId(format!("batch-{id:06}"))
}

/// Batch-processes institution decisions for one offering, applying workflow
/// transitions per candidate and recording skips instead of aborting.
pub struct AdmissionAllocator<C, O, A, B, N, E> {
    workflow: ApplicationWorkflow<C, O, A, N>,
    batches: Arc<B>,
    email: Arc<E>,
}

impl<C, O, A, B, N, E> Clone for AdmissionAllocator<C, O, A, B, N, E> {
    fn clone(&self) -> Self {
        Self {
            workflow: self.workflow.clone(),
            batches: Arc::clone(&self.batches),
            email: Arc::clone(&self.email),
        }
    }
}

impl<C, O, A, B, N, E> AdmissionAllocator<C, O, A, B, N, E>
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    pub fn new(workflow: ApplicationWorkflow<C, O, A, N>, batches: Arc<B>, email: Arc<E>) -> Self {
        Self {
            workflow,
            batches,
            email,
        }
    }

    /// Publish an immutable admission batch and decide every matched pending
    /// application. Overlapping lists are rejected before any mutation; a
    /// missing application for one candidate is a recorded skip, never a
    /// batch failure.
    pub fn publish(
        &self,
        org_id: &OrganizationId,
        offering_id: &OfferingId,
        lists: DecisionLists,
    ) -> Result<PublishOutcome, WorkflowError> {
        validate_disjoint(&lists)?;

        let offering = self.workflow.load_offering(offering_id)?;
        if offering.org_id != *org_id {
            return Err(WorkflowError::Validation(format!(
                "offering {} is not owned by organization {}",
                offering_id.0, org_id.0
            )));
        }

        let batch = self.batches.insert(AdmissionBatch {
            batch_id: next_batch_id(),
            org_id: org_id.clone(),
            offering_id: offering_id.clone(),
            admitted: lists.admitted.clone(),
            rejected: lists.rejected.clone(),
            waitlisted: lists.waitlisted.clone(),
            published_at: Utc::now(),
        })?;

        // One batch fetch keyed by candidate instead of a read per decision.
        let pending: HashMap<CandidateId, ApplicationId> = self
            .workflow
            .applications()
            .for_offering(offering_id)?
            .into_iter()
            .filter(|application| application.status == ApplicationStatus::Pending)
            .map(|application| (application.candidate_id.clone(), application.application_id))
            .collect();

        let mut decided = Vec::new();
        let mut skipped = Vec::new();

        for (decision, candidate_id) in lists.pairs() {
            let Some(application_id) = pending.get(candidate_id) else {
                tracing::warn!(
                    candidate = %candidate_id.0,
                    offering = %offering_id.0,
                    "no pending application for published decision; skipping"
                );
                skipped.push(SkippedDecision {
                    candidate_id: candidate_id.clone(),
                    decision,
                    reason: "no pending application for offering".to_string(),
                });
                continue;
            };

            match self.workflow.decide(application_id, decision) {
                Ok(updated) => {
                    if decision == AdmissionDecision::Admitted {
                        self.send_admission_email(candidate_id, &offering.name, decision);
                    }
                    decided.push(DecisionRecord {
                        candidate_id: candidate_id.clone(),
                        decision,
                        application_id: updated.application_id,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        candidate = %candidate_id.0,
                        offering = %offering_id.0,
                        %err,
                        "decision failed during batch publish; skipping"
                    );
                    skipped.push(SkippedDecision {
                        candidate_id: candidate_id.clone(),
                        decision,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(PublishOutcome {
            batch,
            decided,
            skipped,
        })
    }

    /// Published batch history for one offering.
    pub fn history(&self, offering_id: &OfferingId) -> Result<Vec<AdmissionBatch>, WorkflowError> {
        Ok(self.batches.for_offering(offering_id)?)
    }

    fn send_admission_email(
        &self,
        candidate_id: &CandidateId,
        offering_name: &str,
        decision: AdmissionDecision,
    ) {
        let email = AdmissionEmail {
            candidate_id: candidate_id.clone(),
            offering_name: offering_name.to_string(),
            decision,
        };
        if let Err(err) = self.email.send_admission_email(email) {
            tracing::warn!(candidate = %candidate_id.0, %err, "admission email dispatch failed");
        }
    }
}

fn validate_disjoint(lists: &DecisionLists) -> Result<(), WorkflowError> {
    let mut seen = HashSet::new();
    for (_, candidate_id) in lists.pairs() {
        if !seen.insert(candidate_id) {
            return Err(WorkflowError::Validation(format!(
                "candidate {} appears in more than one decision list",
                candidate_id.0
            )));
        }
    }
    Ok(())
}
