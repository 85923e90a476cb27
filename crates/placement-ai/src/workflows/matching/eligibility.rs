use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{CandidateProfile, LetterGrade, OfferingRequirement};
use super::policy::MatchPolicy;

/// Outcome of the eligibility gate. Ineligible candidates are never scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityReport {
    pub eligible: bool,
    pub reasons: Vec<String>,
}

/// Case-insensitive substring match in either direction, the fuzzy comparison
/// used for subjects, certificates, and fields of study.
pub(crate) fn fuzzy_match(left: &str, right: &str) -> bool {
    let left = left.trim().to_lowercase();
    let right = right.trim().to_lowercase();
    if left.is_empty() || right.is_empty() {
        return false;
    }
    left.contains(&right) || right.contains(&left)
}

/// Mean grade-point over every recorded subject. Empty records contribute
/// zero rather than erroring.
pub(crate) fn mean_grade_points(record: &BTreeMap<String, LetterGrade>) -> f32 {
    if record.is_empty() {
        return 0.0;
    }
    record.values().map(|grade| grade.points()).sum::<f32>() / record.len() as f32
}

/// Coverage ratio of required subjects plus the names of the ones missing.
pub(crate) fn subject_coverage(
    record: &BTreeMap<String, LetterGrade>,
    required: &[String],
) -> (f32, Vec<String>) {
    if required.is_empty() {
        return (1.0, Vec::new());
    }

    let mut missing = Vec::new();
    let mut matched = 0usize;
    for subject in required {
        if record.keys().any(|recorded| fuzzy_match(recorded, subject)) {
            matched += 1;
        } else {
            missing.push(subject.clone());
        }
    }

    (matched as f32 / required.len() as f32, missing)
}

/// Hard gate ahead of scoring. Rules short-circuit in order: transcript
/// proof, then required-subject coverage. Grade shortfalls alone never force
/// ineligibility; they reduce the score instead.
pub(crate) fn evaluate(
    candidate: &CandidateProfile,
    requirement: &OfferingRequirement,
    policy: &MatchPolicy,
) -> EligibilityReport {
    if requirement.requires_transcript && !candidate.has_transcript() {
        return EligibilityReport {
            eligible: false,
            reasons: vec!["transcript required but none on file".to_string()],
        };
    }

    let mut reasons = Vec::new();

    if !requirement.required_subjects.is_empty() {
        let (coverage, missing) =
            subject_coverage(&candidate.academic_record, &requirement.required_subjects);
        if coverage < policy.coverage_floor {
            return EligibilityReport {
                eligible: false,
                reasons: vec![format!(
                    "insufficient subject coverage ({:.0}%); missing: {}",
                    coverage * 100.0,
                    missing.join(", ")
                )],
            };
        }
        reasons.push(format!("subject coverage {:.0}%", coverage * 100.0));
    }

    if let Some(min_grade) = requirement.min_grade {
        let mean = mean_grade_points(&candidate.academic_record);
        if mean < min_grade.points() {
            reasons.push(format!(
                "mean grade-point {mean:.2} below required {:.2}; scored with partial credit",
                min_grade.points()
            ));
        }
    }

    if reasons.is_empty() {
        reasons.push("meets eligibility requirements".to_string());
    }

    EligibilityReport {
        eligible: true,
        reasons,
    }
}
