use super::domain::{CandidateProfile, MatchFactor, OfferingRequirement, ScoreComponent};
use super::eligibility::fuzzy_match;

/// Shared-domain keywords for the weak field-relevance credit.
const FIELD_DOMAIN_KEYWORDS: &[&str] = &[
    "engineering",
    "computer",
    "science",
    "business",
    "technology",
    "health",
    "education",
    "finance",
];

/// Job rubric: four components worth 25 each, partial credit where noted.
pub(crate) fn score_job(
    candidate: &CandidateProfile,
    requirement: &OfferingRequirement,
) -> Vec<ScoreComponent> {
    let mut components = Vec::new();

    components.push(gpa_component(candidate, requirement));
    components.push(certificate_component(candidate, requirement));
    components.push(experience_component(candidate, requirement));
    components.push(field_component(candidate, requirement));

    components
}

fn gpa_component(candidate: &CandidateProfile, requirement: &OfferingRequirement) -> ScoreComponent {
    match requirement.min_gpa {
        Some(required) if required > 0.0 => match candidate.gpa() {
            Some(gpa) if gpa >= required => ScoreComponent {
                factor: MatchFactor::Gpa,
                points: ((gpa / required) * 25.0).min(25.0),
                notes: format!("GPA {gpa:.2} meets required minimum {required:.2}"),
            },
            Some(gpa) => ScoreComponent {
                factor: MatchFactor::Gpa,
                points: 0.0,
                notes: format!("GPA {gpa:.2} below required minimum {required:.2}"),
            },
            None => ScoreComponent {
                factor: MatchFactor::Gpa,
                points: 0.0,
                notes: "no GPA on file".to_string(),
            },
        },
        _ => ScoreComponent {
            factor: MatchFactor::Gpa,
            points: 25.0,
            notes: "no GPA requirement".to_string(),
        },
    }
}

fn certificate_component(
    candidate: &CandidateProfile,
    requirement: &OfferingRequirement,
) -> ScoreComponent {
    let required = &requirement.required_certificates;
    if required.is_empty() {
        return ScoreComponent {
            factor: MatchFactor::Certificates,
            points: 25.0,
            notes: "no certificates required".to_string(),
        };
    }

    let matched = required
        .iter()
        .filter(|name| {
            candidate
                .certificates()
                .iter()
                .any(|held| fuzzy_match(held, name))
        })
        .count();

    ScoreComponent {
        factor: MatchFactor::Certificates,
        points: 25.0 * matched as f32 / required.len() as f32,
        notes: format!("{matched} of {} required certificates held", required.len()),
    }
}

fn experience_component(
    candidate: &CandidateProfile,
    requirement: &OfferingRequirement,
) -> ScoreComponent {
    let years = candidate.experience_years.max(0.0);
    match requirement.min_experience_years {
        Some(required) if required > 0.0 => {
            if years >= required {
                ScoreComponent {
                    factor: MatchFactor::Experience,
                    points: 25.0,
                    notes: format!("{years:.1} years experience meets required {required:.1}"),
                }
            } else if years > 0.0 {
                ScoreComponent {
                    factor: MatchFactor::Experience,
                    points: 25.0 * years / required,
                    notes: format!(
                        "{years:.1} of {required:.1} required years of experience; partial credit"
                    ),
                }
            } else {
                ScoreComponent {
                    factor: MatchFactor::Experience,
                    points: 0.0,
                    notes: format!("no experience against required {required:.1} years"),
                }
            }
        }
        _ => ScoreComponent {
            factor: MatchFactor::Experience,
            points: 25.0,
            notes: "no experience requirement".to_string(),
        },
    }
}

fn field_component(
    candidate: &CandidateProfile,
    requirement: &OfferingRequirement,
) -> ScoreComponent {
    let keyword = requirement
        .education_keyword
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let Some(keyword) = keyword else {
        return ScoreComponent {
            factor: MatchFactor::FieldRelevance,
            points: 15.0,
            notes: "no field requirement specified".to_string(),
        };
    };

    let Some(field) = candidate.field_of_study() else {
        return ScoreComponent {
            factor: MatchFactor::FieldRelevance,
            points: 0.0,
            notes: format!("no field of study on file (required: {keyword})"),
        };
    };

    if fuzzy_match(field, keyword) {
        return ScoreComponent {
            factor: MatchFactor::FieldRelevance,
            points: 25.0,
            notes: format!("field of study '{field}' matches '{keyword}'"),
        };
    }

    let field_lower = field.to_lowercase();
    let keyword_lower = keyword.to_lowercase();
    let shared_domain = FIELD_DOMAIN_KEYWORDS
        .iter()
        .any(|domain| field_lower.contains(domain) && keyword_lower.contains(domain));

    if shared_domain {
        ScoreComponent {
            factor: MatchFactor::FieldRelevance,
            points: 15.0,
            notes: format!("field of study '{field}' shares a domain with '{keyword}'"),
        }
    } else {
        ScoreComponent {
            factor: MatchFactor::FieldRelevance,
            points: 0.0,
            notes: format!("field of study '{field}' unrelated to '{keyword}'"),
        }
    }
}
