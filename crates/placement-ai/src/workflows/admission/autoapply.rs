use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::domain::ApplicationId;
use super::service::{ApplicationWorkflow, WorkflowError};
use super::store::{
    ApplicationStore, CandidateStore, EmailService, JobMatchEmail, NotificationDispatcher,
    OfferingStore,
};
use crate::workflows::matching::{
    CandidateId, MatchEngine, MatchResult, OfferingId, OfferingKind,
};

/// Caller overrides for one auto-apply run. Unset fields fall back to the
/// candidate's own settings, then to the engine policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AutoApplyOptions {
    pub max_applications: Option<u32>,
    pub min_match_score: Option<u8>,
    #[serde(default)]
    pub auto_submit: bool,
}

/// Offering passed over during an auto-apply run, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedOffering {
    pub offering_id: OfferingId,
    pub reason: String,
}

/// Result of one candidate's auto-apply run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoApplyReport {
    pub candidate_id: CandidateId,
    pub created: Vec<ApplicationId>,
    pub submitted: bool,
    pub skipped: Vec<SkippedOffering>,
}

/// Per-candidate outcome of a batch run; one candidate's failure never
/// aborts the batch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchAutoApplyOutcome {
    Completed(AutoApplyReport),
    Skipped {
        candidate_id: CandidateId,
        reason: String,
    },
    Failed {
        candidate_id: CandidateId,
        error: String,
    },
}

/// Read-side aggregate over a candidate's own applications.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateAnalytics {
    pub candidate_id: CandidateId,
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub auto_generated: usize,
    pub manual: usize,
    pub average_match_score: Option<f32>,
}

/// Generates ranked suggestions and drives draft/submitted auto-applications
/// on top of the workflow and the pure match engine.
pub struct AutoApplyOrchestrator<C, O, A, N, E> {
    workflow: ApplicationWorkflow<C, O, A, N>,
    engine: MatchEngine,
    email: Arc<E>,
}

impl<C, O, A, N, E> Clone for AutoApplyOrchestrator<C, O, A, N, E> {
    fn clone(&self) -> Self {
        Self {
            workflow: self.workflow.clone(),
            engine: self.engine.clone(),
            email: Arc::clone(&self.email),
        }
    }
}

impl<C, O, A, N, E> AutoApplyOrchestrator<C, O, A, N, E>
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    pub fn new(
        workflow: ApplicationWorkflow<C, O, A, N>,
        engine: MatchEngine,
        email: Arc<E>,
    ) -> Self {
        Self {
            workflow,
            engine,
            email,
        }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Ranked eligible matches over all open offerings, score-descending with
    /// creation-order ties (the stable sort preserves store order).
    pub fn suggest(&self, candidate_id: &CandidateId) -> Result<Vec<MatchResult>, WorkflowError> {
        let candidate = self.workflow.load_candidate(candidate_id)?;
        let offerings = self.workflow.offerings().open_offerings()?;

        let mut results: Vec<MatchResult> = offerings
            .par_iter()
            .map(|offering| self.engine.score(&candidate, offering))
            .collect();

        results.retain(|result| result.eligible);
        results.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(results)
    }

    /// Apply to the top-N offerings at or above the cutoff, either submitting
    /// directly or leaving drafts. Offerings that would violate the cap or
    /// duplicate rules are skipped with a recorded reason, not aborted on.
    pub fn auto_apply(
        &self,
        candidate_id: &CandidateId,
        options: &AutoApplyOptions,
    ) -> Result<AutoApplyReport, WorkflowError> {
        let candidate = self.workflow.load_candidate(candidate_id)?;
        let max_applications = options
            .max_applications
            .unwrap_or(candidate.auto_apply.max_applications) as usize;
        let cutoff = options
            .min_match_score
            .or(candidate.auto_apply.min_match_score)
            .unwrap_or(self.engine.policy().suggestion_cutoff);

        let ranked = self.suggest(candidate_id)?;
        let mut report = AutoApplyReport {
            candidate_id: candidate_id.clone(),
            created: Vec::new(),
            submitted: options.auto_submit,
            skipped: Vec::new(),
        };

        for result in ranked {
            if report.created.len() >= max_applications {
                break;
            }
            if result.score < cutoff {
                break;
            }

            let created = if options.auto_submit {
                self.workflow
                    .submit(candidate_id, &result.offering_id, Some(result.score), true)
            } else {
                self.workflow
                    .create_draft(candidate_id, &result.offering_id, Some(result.score), true)
            };

            match created {
                Ok(application) => {
                    if options.auto_submit {
                        self.maybe_send_match_email(candidate_id, &result);
                    }
                    report.created.push(application.application_id);
                }
                Err(WorkflowError::Conflict(reason)) | Err(WorkflowError::Quota(reason)) => {
                    report.skipped.push(SkippedOffering {
                        offering_id: result.offering_id,
                        reason,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        Ok(report)
    }

    /// Run `auto_apply` independently for many candidates with bounded
    /// parallelism. Each pipeline is isolated: failures become per-candidate
    /// entries in the returned list.
    pub fn batch_auto_apply(
        &self,
        candidate_ids: &[CandidateId],
        options: &AutoApplyOptions,
    ) -> Vec<BatchAutoApplyOutcome> {
        candidate_ids
            .par_iter()
            .map(|candidate_id| self.run_for_candidate(candidate_id, options))
            .collect()
    }

    fn run_for_candidate(
        &self,
        candidate_id: &CandidateId,
        options: &AutoApplyOptions,
    ) -> BatchAutoApplyOutcome {
        let profile = match self.workflow.candidates().fetch(candidate_id) {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                return BatchAutoApplyOutcome::Failed {
                    candidate_id: candidate_id.clone(),
                    error: format!("candidate {} has no profile", candidate_id.0),
                }
            }
            Err(err) => {
                return BatchAutoApplyOutcome::Failed {
                    candidate_id: candidate_id.clone(),
                    error: err.to_string(),
                }
            }
        };

        if !profile.auto_apply.enabled {
            return BatchAutoApplyOutcome::Skipped {
                candidate_id: candidate_id.clone(),
                reason: "auto-apply disabled in candidate settings".to_string(),
            };
        }

        match self.auto_apply(candidate_id, options) {
            Ok(report) => BatchAutoApplyOutcome::Completed(report),
            Err(err) => {
                tracing::warn!(candidate = %candidate_id.0, %err, "auto-apply failed for candidate");
                BatchAutoApplyOutcome::Failed {
                    candidate_id: candidate_id.clone(),
                    error: err.to_string(),
                }
            }
        }
    }

    /// Pure read-side reduction over one candidate's applications.
    pub fn analytics(&self, candidate_id: &CandidateId) -> Result<CandidateAnalytics, WorkflowError> {
        self.workflow.load_candidate(candidate_id)?;
        let applications = self.workflow.applications().for_candidate(candidate_id)?;

        let mut by_status: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut auto_generated = 0usize;
        let mut score_sum = 0u32;
        let mut score_count = 0u32;
        for application in &applications {
            *by_status.entry(application.status.label()).or_default() += 1;
            if application.auto_generated {
                auto_generated += 1;
            }
            if let Some(score) = application.match_score {
                score_sum += u32::from(score);
                score_count += 1;
            }
        }

        Ok(CandidateAnalytics {
            candidate_id: candidate_id.clone(),
            total: applications.len(),
            by_status,
            auto_generated,
            manual: applications.len() - auto_generated,
            average_match_score: (score_count > 0)
                .then(|| score_sum as f32 / score_count as f32),
        })
    }

    /// Strong job matches trigger the e-mail fan-out once submitted.
    fn maybe_send_match_email(&self, candidate_id: &CandidateId, result: &MatchResult) {
        if result.score < self.engine.policy().notification_cutoff {
            return;
        }
        let offering = match self.workflow.offerings().fetch(&result.offering_id) {
            Ok(Some(offering)) => offering,
            _ => return,
        };
        if offering.kind != OfferingKind::Job {
            return;
        }
        let email = JobMatchEmail {
            candidate_id: candidate_id.clone(),
            offering_name: offering.name,
            score: result.score,
        };
        if let Err(err) = self.email.send_job_email(email) {
            tracing::warn!(candidate = %candidate_id.0, %err, "job match email dispatch failed");
        }
    }
}
