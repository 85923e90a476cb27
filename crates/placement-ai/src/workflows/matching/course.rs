use super::domain::{CandidateProfile, MatchFactor, Offering, ScoreComponent};
use super::eligibility::{fuzzy_match, mean_grade_points, subject_coverage};
use super::policy::MatchPolicy;

/// Subject-group heuristic mapping offering names to academic strengths.
struct DomainBucket {
    label: &'static str,
    name_keywords: &'static [&'static str],
    subjects: &'static [&'static str],
    min_subjects: usize,
}

const DOMAIN_BUCKETS: &[DomainBucket] = &[
    DomainBucket {
        label: "science/engineering",
        name_keywords: &["science", "engineering", "medicine", "medical"],
        subjects: &["mathematics", "math", "physics", "chemistry", "biology"],
        min_subjects: 2,
    },
    DomainBucket {
        label: "business/commerce",
        name_keywords: &["business", "commerce", "management", "finance", "accounting"],
        subjects: &["economics", "accounting", "commerce", "business studies"],
        min_subjects: 1,
    },
    DomainBucket {
        label: "technology",
        name_keywords: &["technology", "computing", "computer", "software", "information"],
        subjects: &["computer", "mathematics", "math", "physics"],
        min_subjects: 1,
    },
];

/// Course rubric: weights sum to 100 before bonuses; the caller clamps.
pub(crate) fn score_course(
    candidate: &CandidateProfile,
    offering: &Offering,
    policy: &MatchPolicy,
) -> Vec<ScoreComponent> {
    let requirement = &offering.requirement;
    let mut components = Vec::new();
    let mean = mean_grade_points(&candidate.academic_record);

    if candidate.has_transcript() {
        components.push(ScoreComponent {
            factor: MatchFactor::Transcript,
            points: 30.0,
            notes: "transcript on file".to_string(),
        });
    }

    match requirement.min_grade {
        Some(min_grade) if min_grade.points() > 0.0 => {
            let required = min_grade.points();
            if mean >= required {
                components.push(ScoreComponent {
                    factor: MatchFactor::GradeRequirement,
                    points: 40.0,
                    notes: format!("mean grade-point {mean:.2} meets required {required:.2}"),
                });
            } else {
                let partial = ((mean / required) * 30.0).max(0.0);
                components.push(ScoreComponent {
                    factor: MatchFactor::GradeRequirement,
                    points: partial,
                    notes: format!(
                        "mean grade-point {mean:.2} below required {required:.2}; partial credit"
                    ),
                });
            }
        }
        _ => {
            components.push(ScoreComponent {
                factor: MatchFactor::GradeRequirement,
                points: 40.0,
                notes: "no minimum grade requirement".to_string(),
            });
        }
    }

    if mean >= policy.excellence_threshold {
        components.push(ScoreComponent {
            factor: MatchFactor::Excellence,
            points: 10.0,
            notes: format!("academic excellence (mean grade-point {mean:.2})"),
        });
    }

    if requirement.required_subjects.is_empty() {
        components.push(ScoreComponent {
            factor: MatchFactor::SubjectCoverage,
            points: 20.0,
            notes: "no required subjects".to_string(),
        });
    } else {
        let (coverage, _) =
            subject_coverage(&candidate.academic_record, &requirement.required_subjects);
        components.push(ScoreComponent {
            factor: MatchFactor::SubjectCoverage,
            points: (coverage * 30.0).round(),
            notes: format!("required subject coverage {:.0}%", coverage * 100.0),
        });
    }

    if let Some(keyword) = interest_overlap(&candidate.interests, &offering.name) {
        components.push(ScoreComponent {
            factor: MatchFactor::InterestOverlap,
            points: 15.0,
            notes: format!("field of interest matches offering ({keyword})"),
        });
    }

    if let Some(label) = domain_affinity(candidate, &offering.name, policy) {
        components.push(ScoreComponent {
            factor: MatchFactor::DomainAffinity,
            points: 15.0,
            notes: format!("strong grades in {label} subjects"),
        });
    }

    components
}

/// Token overlap between candidate interests and the offering name. Short
/// tokens are ignored so "of"/"and" never match.
fn interest_overlap(interests: &[String], offering_name: &str) -> Option<String> {
    let name = offering_name.to_lowercase();
    for interest in interests {
        for token in interest.split_whitespace() {
            let token = token.trim().to_lowercase();
            if token.len() >= 3 && name.contains(&token) {
                return Some(token);
            }
        }
    }
    None
}

/// Offering name matched against a domain bucket whose subject group averages
/// at or above the affinity floor over the bucket's minimum subject count.
fn domain_affinity(
    candidate: &CandidateProfile,
    offering_name: &str,
    policy: &MatchPolicy,
) -> Option<&'static str> {
    let name = offering_name.to_lowercase();
    for bucket in DOMAIN_BUCKETS {
        if !bucket.name_keywords.iter().any(|kw| name.contains(kw)) {
            continue;
        }

        let relevant: Vec<f32> = candidate
            .academic_record
            .iter()
            .filter(|(subject, _)| {
                bucket
                    .subjects
                    .iter()
                    .any(|bucket_subject| fuzzy_match(subject, bucket_subject))
            })
            .map(|(_, grade)| grade.points())
            .collect();

        if relevant.len() >= bucket.min_subjects {
            let average = relevant.iter().sum::<f32>() / relevant.len() as f32;
            if average >= policy.affinity_floor {
                return Some(bucket.label);
            }
        }
    }
    None
}
