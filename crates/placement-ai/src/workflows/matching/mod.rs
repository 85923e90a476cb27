//! Pure eligibility gating and weighted match scoring for course and job
//! offerings. Everything here is a deterministic function of its inputs so
//! large matching sweeps can run in parallel with no coordination.

mod course;
pub mod domain;
mod eligibility;
mod job;
mod policy;

#[cfg(test)]
mod tests;

pub use domain::{
    AutoApplySettings, CandidateId, CandidateProfile, CompletionRecord, DocumentChecklist,
    LetterGrade, MatchFactor, MatchResult, Offering, OfferingId, OfferingKind, OfferingRequirement,
    OrganizationId, ScoreComponent,
};
pub use eligibility::EligibilityReport;
pub use policy::MatchPolicy;

/// Stateless engine applying the eligibility gate and the scoring rubric for
/// one policy configuration.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    policy: MatchPolicy,
}

impl MatchEngine {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Hard gate: decides whether a candidate may be scored at all.
    pub fn evaluate(
        &self,
        candidate: &CandidateProfile,
        requirement: &OfferingRequirement,
    ) -> EligibilityReport {
        eligibility::evaluate(candidate, requirement, &self.policy)
    }

    /// Gate then score. Ineligible candidates always come back with a zero
    /// score and the gate's reasons; eligible candidates get the itemized
    /// rubric result clamped to [0, 100].
    pub fn score(&self, candidate: &CandidateProfile, offering: &Offering) -> MatchResult {
        let gate = self.evaluate(candidate, &offering.requirement);
        if !gate.eligible {
            return MatchResult {
                offering_id: offering.offering_id.clone(),
                candidate_id: candidate.candidate_id.clone(),
                score: 0,
                eligible: false,
                reasons: gate.reasons,
            };
        }

        let components = self.components(candidate, offering);
        let score = clamp_score(&components);
        let reasons = components
            .into_iter()
            .map(|component| component.notes)
            .collect();

        MatchResult {
            offering_id: offering.offering_id.clone(),
            candidate_id: candidate.candidate_id.clone(),
            score,
            eligible: true,
            reasons,
        }
    }

    /// Itemized rubric breakdown without the eligibility gate; used by the
    /// score path and by audit views.
    pub fn components(
        &self,
        candidate: &CandidateProfile,
        offering: &Offering,
    ) -> Vec<ScoreComponent> {
        match offering.kind {
            OfferingKind::Course => course::score_course(candidate, offering, &self.policy),
            OfferingKind::Job => job::score_job(candidate, &offering.requirement),
        }
    }
}

fn clamp_score(components: &[ScoreComponent]) -> u8 {
    let total: f32 = components.iter().map(|component| component.points).sum();
    total.round().clamp(0.0, 100.0) as u8
}
