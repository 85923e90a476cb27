use serde::{Deserialize, Serialize};

/// Tunable dials for eligibility gating and ranked-list inclusion.
///
/// The defaults are the observed production values; deployments override them
/// through `MatchingConfig` rather than editing code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Required-subject coverage below this ratio is a hard eligibility
    /// failure.
    pub coverage_floor: f32,
    /// Minimum score for inclusion in auto-matching exploration.
    pub suggestion_cutoff: u8,
    /// Minimum score for active notification fan-out (strong-match e-mails).
    pub notification_cutoff: u8,
    /// Mean grade-point at or above which the excellence bonus applies.
    pub excellence_threshold: f32,
    /// Average grade-point a domain bucket's subject group must reach for the
    /// affinity bonus.
    pub affinity_floor: f32,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            coverage_floor: 0.5,
            suggestion_cutoff: 60,
            notification_cutoff: 70,
            excellence_threshold: 3.5,
            affinity_floor: 2.5,
        }
    }
}
