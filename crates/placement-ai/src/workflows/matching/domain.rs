use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for candidates (student-role actors).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for offerings (courses and jobs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OfferingId(pub String);

/// Identifier wrapper for the institution or company that owns an offering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

/// Letter grades recorded per subject on the academic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl LetterGrade {
    pub const fn points(self) -> f32 {
        match self {
            LetterGrade::A => 4.0,
            LetterGrade::B => 3.0,
            LetterGrade::C => 2.0,
            LetterGrade::D => 1.0,
            LetterGrade::E => 0.5,
            LetterGrade::F => 0.0,
        }
    }
}

/// Flags tracking which supporting documents a candidate has on file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentChecklist {
    pub transcript: bool,
    pub identification: bool,
    pub certificate: bool,
}

/// Normalized completion record for candidates who finished prior study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub gpa: Option<f32>,
    pub field_of_study: Option<String>,
    pub certificates: Vec<String>,
    pub transcript_on_file: bool,
}

/// Per-candidate automation preferences for the auto-application pipeline.
/// An unset `min_match_score` defers to the deployment's suggestion cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoApplySettings {
    pub enabled: bool,
    pub max_applications: u32,
    pub min_match_score: Option<u8>,
}

impl Default for AutoApplySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_applications: 3,
            min_match_score: None,
        }
    }
}

/// Fixed-schema candidate profile; the matching engine reads it, never
/// mutates it. Loose source documents are validated into this shape at the
/// store boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub candidate_id: CandidateId,
    pub academic_record: BTreeMap<String, LetterGrade>,
    pub documents: DocumentChecklist,
    pub completion: Option<CompletionRecord>,
    pub experience_years: f32,
    pub interests: Vec<String>,
    pub auto_apply: AutoApplySettings,
    pub enrolled_offering: Option<OfferingId>,
}

impl CandidateProfile {
    /// Proof-of-record is satisfied by either an uploaded transcript or a
    /// completion record flagged as having one on file.
    pub fn has_transcript(&self) -> bool {
        self.documents.transcript
            || self
                .completion
                .as_ref()
                .map(|record| record.transcript_on_file)
                .unwrap_or(false)
    }

    pub fn gpa(&self) -> Option<f32> {
        self.completion.as_ref().and_then(|record| record.gpa)
    }

    pub fn field_of_study(&self) -> Option<&str> {
        self.completion
            .as_ref()
            .and_then(|record| record.field_of_study.as_deref())
    }

    pub fn certificates(&self) -> &[String] {
        self.completion
            .as_ref()
            .map(|record| record.certificates.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferingKind {
    Course,
    Job,
}

/// Requirement block attached to a published offering. Immutable for the
/// duration of a scoring pass. Every field is optional; absent data never
/// disqualifies by itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OfferingRequirement {
    pub requires_transcript: bool,
    pub min_grade: Option<LetterGrade>,
    pub required_subjects: Vec<String>,
    pub required_certificates: Vec<String>,
    pub min_experience_years: Option<f32>,
    pub education_keyword: Option<String>,
    pub min_gpa: Option<f32>,
}

/// A published course or job offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    pub offering_id: OfferingId,
    pub org_id: OrganizationId,
    pub name: String,
    pub kind: OfferingKind,
    pub requirement: OfferingRequirement,
    pub open: bool,
    pub created_at: DateTime<Utc>,
}

/// Discrete contribution to a match score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: MatchFactor,
    pub points: f32,
    pub notes: String,
}

/// Factors permitted in the scoring rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFactor {
    Transcript,
    GradeRequirement,
    Excellence,
    SubjectCoverage,
    InterestOverlap,
    DomainAffinity,
    Gpa,
    Certificates,
    Experience,
    FieldRelevance,
}

/// Ephemeral match computation for one (candidate, offering) pair. Only
/// persisted when promoted into a draft application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub offering_id: OfferingId,
    pub candidate_id: CandidateId,
    pub score: u8,
    pub eligible: bool,
    pub reasons: Vec<String>,
}
