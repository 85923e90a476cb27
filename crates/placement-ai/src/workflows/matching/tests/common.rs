use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};

use crate::workflows::matching::{
    AutoApplySettings, CandidateId, CandidateProfile, CompletionRecord, DocumentChecklist,
    LetterGrade, MatchEngine, MatchPolicy, Offering, OfferingId, OfferingKind,
    OfferingRequirement, OrganizationId,
};

pub(super) fn engine() -> MatchEngine {
    MatchEngine::new(MatchPolicy::default())
}

pub(super) fn academic_record() -> BTreeMap<String, LetterGrade> {
    let mut record = BTreeMap::new();
    record.insert("Mathematics".to_string(), LetterGrade::A);
    record.insert("Physics".to_string(), LetterGrade::B);
    record.insert("Chemistry".to_string(), LetterGrade::B);
    record.insert("English".to_string(), LetterGrade::C);
    record
}

pub(super) fn candidate(suffix: &str) -> CandidateProfile {
    CandidateProfile {
        candidate_id: CandidateId(format!("cand-{suffix}")),
        academic_record: academic_record(),
        documents: DocumentChecklist {
            transcript: true,
            identification: true,
            certificate: false,
        },
        completion: Some(CompletionRecord {
            gpa: Some(3.8),
            field_of_study: Some("Computer Science".to_string()),
            certificates: vec![
                "First Aid Certificate".to_string(),
                "Forklift License".to_string(),
            ],
            transcript_on_file: true,
        }),
        experience_years: 3.0,
        interests: vec!["Computer Science".to_string()],
        auto_apply: AutoApplySettings {
            enabled: true,
            max_applications: 3,
            min_match_score: None,
        },
        enrolled_offering: None,
    }
}

pub(super) fn course_requirement() -> OfferingRequirement {
    OfferingRequirement {
        requires_transcript: true,
        min_grade: Some(LetterGrade::B),
        required_subjects: vec!["Mathematics".to_string(), "Physics".to_string()],
        ..OfferingRequirement::default()
    }
}

pub(super) fn course_offering(suffix: &str, name: &str) -> Offering {
    Offering {
        offering_id: OfferingId(format!("course-{suffix}")),
        org_id: OrganizationId("uni-01".to_string()),
        name: name.to_string(),
        kind: OfferingKind::Course,
        requirement: course_requirement(),
        open: true,
        created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).single().expect("valid"),
    }
}

pub(super) fn job_requirement() -> OfferingRequirement {
    OfferingRequirement {
        min_gpa: Some(3.0),
        required_certificates: vec!["First Aid".to_string(), "Forklift".to_string()],
        min_experience_years: Some(2.0),
        education_keyword: Some("Computer".to_string()),
        ..OfferingRequirement::default()
    }
}

pub(super) fn job_offering(suffix: &str, name: &str) -> Offering {
    Offering {
        offering_id: OfferingId(format!("job-{suffix}")),
        org_id: OrganizationId("acme-01".to_string()),
        name: name.to_string(),
        kind: OfferingKind::Job,
        requirement: job_requirement(),
        open: true,
        created_at: Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).single().expect("valid"),
    }
}
