use super::common::*;
use crate::workflows::matching::{LetterGrade, MatchFactor, OfferingRequirement};

#[test]
fn stacked_bonuses_clamp_to_one_hundred() {
    let engine = engine();
    let candidate = candidate("clamp");
    // Transcript 30 + grade 40 + coverage 30 + interest 15 + affinity 15
    // sums well past the cap.
    let offering = course_offering("clamp", "BSc Computer Science");

    let result = engine.score(&candidate, &offering);

    assert!(result.eligible);
    assert_eq!(result.score, 100);
}

#[test]
fn score_without_bonuses_matches_component_weights() {
    let engine = engine();
    let mut candidate = candidate("plain");
    candidate.interests.clear();
    let mut offering = course_offering("plain", "Data Entry Programme");
    offering.requirement.required_subjects.clear();

    let result = engine.score(&candidate, &offering);

    // 30 transcript + 40 grade met + 20 flat coverage.
    assert_eq!(result.score, 90);
}

#[test]
fn grade_shortfall_earns_partial_credit() {
    let engine = engine();
    let mut candidate = candidate("partial");
    candidate.interests.clear();
    let mut offering = course_offering("partial", "Data Entry Programme");
    offering.requirement.required_subjects.clear();
    offering.requirement.min_grade = Some(LetterGrade::A);

    let result = engine.score(&candidate, &offering);

    // Mean 3.0 against required 4.0: 30 + (3/4)*30 + 20 = 72.5.
    assert_eq!(result.score, 73);
    assert!(result
        .reasons
        .iter()
        .any(|reason| reason.contains("partial credit")));
}

#[test]
fn excellence_bonus_applies_at_threshold() {
    let engine = engine();
    let mut candidate = candidate("excellent");
    candidate.interests.clear();
    candidate.documents.transcript = false;
    candidate.completion = None;
    for grade in candidate.academic_record.values_mut() {
        *grade = LetterGrade::A;
    }
    let mut offering = course_offering("excellent", "Data Entry Programme");
    offering.requirement = OfferingRequirement::default();

    let result = engine.score(&candidate, &offering);

    // No transcript (0) + no grade requirement (40) + flat coverage (20) +
    // excellence (10).
    assert_eq!(result.score, 70);
    assert!(result
        .reasons
        .iter()
        .any(|reason| reason.contains("excellence")));
}

#[test]
fn interest_overlap_adds_its_component() {
    let engine = engine();
    let mut without = candidate("no-interest");
    without.interests.clear();
    let with = candidate("with-interest");
    let mut offering = course_offering("interest", "Advanced Computer Programming");
    offering.requirement.required_subjects.clear();

    let base = engine.components(&without, &offering);
    let boosted = engine.components(&with, &offering);

    assert!(!base
        .iter()
        .any(|component| component.factor == MatchFactor::InterestOverlap));
    let overlap = boosted
        .iter()
        .find(|component| component.factor == MatchFactor::InterestOverlap)
        .expect("interest component present");
    assert!((overlap.points - 15.0).abs() < f32::EPSILON);
}

#[test]
fn domain_affinity_requires_strong_subject_group() {
    let engine = engine();
    let mut candidate = candidate("affinity");
    candidate.interests.clear();
    let mut offering = course_offering("affinity", "Diploma of Engineering");
    offering.requirement.required_subjects.clear();

    let strong = engine.score(&candidate, &offering);
    assert!(strong
        .reasons
        .iter()
        .any(|reason| reason.contains("science/engineering")));

    // Degrade the relevant subjects below the affinity floor.
    for grade in candidate.academic_record.values_mut() {
        *grade = LetterGrade::D;
    }
    let weak = engine.score(&candidate, &offering);
    assert!(!weak
        .reasons
        .iter()
        .any(|reason| reason.contains("science/engineering")));
}

#[test]
fn ineligible_candidates_score_zero() {
    let engine = engine();
    let mut candidate = candidate("gated");
    candidate.documents.transcript = false;
    candidate.completion = None;
    let offering = course_offering("gated", "BSc Computer Science");

    let result = engine.score(&candidate, &offering);

    assert!(!result.eligible);
    assert_eq!(result.score, 0);
}
