use std::collections::BTreeMap;

use chrono::Utc;
use clap::Args;
use placement_ai::error::AppError;
use placement_ai::workflows::admission::{
    ApplicationStatus, ApplicationStore, AutoApplyOptions, BatchAutoApplyOutcome, DecisionLists,
    WorkflowError,
};
use placement_ai::workflows::matching::{
    AutoApplySettings, CandidateId, CandidateProfile, CompletionRecord, DocumentChecklist,
    LetterGrade, MatchPolicy, Offering, OfferingId, OfferingKind, OfferingRequirement,
    OrganizationId,
};

use crate::infra::{build_service, ServiceHandles};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Submit auto-applications directly instead of leaving drafts.
    #[arg(long)]
    pub(crate) auto_submit: bool,
    /// Cap the number of applications created per candidate.
    #[arg(long)]
    pub(crate) max_applications: Option<u32>,
    /// Minimum match score an offering needs before an application is created.
    #[arg(long)]
    pub(crate) min_match_score: Option<u8>,
    /// Skip the admission publishing and selection portion of the demo.
    #[arg(long)]
    pub(crate) skip_admissions: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        auto_submit,
        max_applications,
        min_match_score,
        skip_admissions,
    } = args;

    let ServiceHandles {
        state,
        candidates,
        offerings,
    } = build_service(MatchPolicy::default());

    let amara = demo_candidate_amara();
    let bilal = demo_candidate_bilal();
    let mut chen = demo_candidate_amara();
    chen.candidate_id = CandidateId("cand-chen".to_string());
    chen.auto_apply.enabled = false;

    let candidate_ids = vec![
        amara.candidate_id.clone(),
        bilal.candidate_id.clone(),
        chen.candidate_id.clone(),
    ];
    candidates.put(amara);
    candidates.put(bilal);
    candidates.put(chen);

    let cs_course = course(
        "course-cs",
        "uni-poly",
        "BSc Computer Science",
        Some(LetterGrade::B),
        &["Mathematics", "Physics"],
    );
    let cs_course_id = cs_course.offering_id.clone();
    offerings.put(cs_course);
    offerings.put(course(
        "course-business",
        "uni-metro",
        "Diploma of Business Administration",
        Some(LetterGrade::C),
        &["Mathematics"],
    ));
    offerings.put(software_job("job-dev", "acme", "Junior Software Technician"));

    println!("Placement matching demo");

    println!("\nRanked suggestions");
    for candidate_id in &candidate_ids {
        let results = state.orchestrator.suggest(candidate_id)?;
        println!("- {} ({} eligible offerings)", candidate_id.0, results.len());
        for result in &results {
            println!("    {} -> score {}", result.offering_id.0, result.score);
        }
    }

    println!("\nAuto-apply sweep");
    let options = AutoApplyOptions {
        max_applications,
        min_match_score,
        auto_submit,
    };
    let outcomes = state.orchestrator.batch_auto_apply(&candidate_ids, &options);
    for outcome in &outcomes {
        match outcome {
            BatchAutoApplyOutcome::Completed(report) => {
                println!(
                    "- {}: {} application(s) created ({}), {} skipped",
                    report.candidate_id.0,
                    report.created.len(),
                    if report.submitted {
                        "submitted"
                    } else {
                        "drafts"
                    },
                    report.skipped.len()
                );
            }
            BatchAutoApplyOutcome::Skipped {
                candidate_id,
                reason,
            } => println!("- {}: skipped ({reason})", candidate_id.0),
            BatchAutoApplyOutcome::Failed {
                candidate_id,
                error,
            } => println!("- {}: failed ({error})", candidate_id.0),
        }
    }

    if skip_admissions {
        return Ok(());
    }

    println!("\nAdmission publishing");
    let applications = state
        .workflow
        .applications()
        .for_offering(&cs_course_id)
        .map_err(WorkflowError::from)?;
    let mut pending: Vec<CandidateId> = applications
        .iter()
        .filter(|application| application.status == ApplicationStatus::Pending)
        .map(|application| application.candidate_id.clone())
        .collect();

    if pending.is_empty() {
        // Draft-mode sweeps leave nothing pending; promote a draft so the
        // publishing step has something to decide.
        if let Some(draft) = applications
            .iter()
            .find(|application| application.status == ApplicationStatus::Draft)
        {
            let promoted = state.workflow.promote_draft(&draft.application_id)?;
            println!(
                "- promoted draft {} for {}",
                promoted.application_id.0, promoted.candidate_id.0
            );
            pending.push(promoted.candidate_id);
        } else {
            let application = state
                .workflow
                .submit(&candidate_ids[0], &cs_course_id, Some(95), false)?;
            println!(
                "- submitted application {} for {}",
                application.application_id.0, candidate_ids[0].0
            );
            pending.push(candidate_ids[0].clone());
        }
    }

    let admitted = pending.remove(0);
    let outcome = state.allocator.publish(
        &OrganizationId("uni-poly".to_string()),
        &cs_course_id,
        DecisionLists {
            admitted: vec![admitted.clone()],
            rejected: pending,
            ..DecisionLists::default()
        },
    )?;
    println!(
        "- batch {} published: {} decided, {} skipped",
        outcome.batch.batch_id.0,
        outcome.decided.len(),
        outcome.skipped.len()
    );

    let admitted_application = outcome
        .decided
        .iter()
        .find(|record| record.candidate_id == admitted)
        .map(|record| record.application_id.clone());
    if let Some(application_id) = admitted_application {
        let selected = state.workflow.select(&admitted, &application_id)?;
        println!(
            "- {} selected offering {} (status {})",
            admitted.0,
            selected.offering_id.0,
            selected.status.label()
        );
    }

    println!("\nCandidate analytics");
    for candidate_id in &candidate_ids {
        let analytics = state.orchestrator.analytics(candidate_id)?;
        let by_status = analytics
            .by_status
            .iter()
            .map(|(status, count)| format!("{status}={count}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "- {}: {} total ({}), avg score {}",
            candidate_id.0,
            analytics.total,
            if by_status.is_empty() {
                "none".to_string()
            } else {
                by_status
            },
            analytics
                .average_match_score
                .map(|score| format!("{score:.1}"))
                .unwrap_or_else(|| "n/a".to_string())
        );
    }

    Ok(())
}

fn demo_candidate_amara() -> CandidateProfile {
    let mut record = BTreeMap::new();
    record.insert("Mathematics".to_string(), LetterGrade::A);
    record.insert("Physics".to_string(), LetterGrade::B);
    record.insert("Chemistry".to_string(), LetterGrade::B);
    record.insert("English".to_string(), LetterGrade::C);

    CandidateProfile {
        candidate_id: CandidateId("cand-amara".to_string()),
        academic_record: record,
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

fn demo_candidate_bilal() -> CandidateProfile {
    let mut record = BTreeMap::new();
    record.insert("Economics".to_string(), LetterGrade::A);
    record.insert("Accounting".to_string(), LetterGrade::B);
    record.insert("Mathematics".to_string(), LetterGrade::C);
    record.insert("English".to_string(), LetterGrade::B);

    CandidateProfile {
        candidate_id: CandidateId("cand-bilal".to_string()),
        academic_record: record,
        documents: DocumentChecklist {
            transcript: true,
            identification: true,
            certificate: false,
        },
        completion: Some(CompletionRecord {
            gpa: Some(3.1),
            field_of_study: Some("Business Administration".to_string()),
            certificates: Vec::new(),
            transcript_on_file: true,
        }),
        experience_years: 1.0,
        interests: vec!["Business Administration".to_string()],
        auto_apply: AutoApplySettings {
            enabled: true,
            max_applications: 2,
            min_match_score: None,
        },
        enrolled_offering: None,
    }
}

fn course(
    id: &str,
    org: &str,
    name: &str,
    min_grade: Option<LetterGrade>,
    subjects: &[&str],
) -> Offering {
    Offering {
        offering_id: OfferingId(id.to_string()),
        org_id: OrganizationId(org.to_string()),
        name: name.to_string(),
        kind: OfferingKind::Course,
        requirement: OfferingRequirement {
            requires_transcript: true,
            min_grade,
            required_subjects: subjects.iter().map(|subject| subject.to_string()).collect(),
            ..OfferingRequirement::default()
        },
        open: true,
        created_at: Utc::now(),
    }
}

fn software_job(id: &str, org: &str, name: &str) -> Offering {
    Offering {
        offering_id: OfferingId(id.to_string()),
        org_id: OrganizationId(org.to_string()),
        name: name.to_string(),
        kind: OfferingKind::Job,
        requirement: OfferingRequirement {
            min_gpa: Some(3.0),
            required_certificates: vec!["First Aid".to_string(), "Forklift".to_string()],
            min_experience_years: Some(2.0),
            education_keyword: Some("Computer".to_string()),
            ..OfferingRequirement::default()
        },
        open: true,
        created_at: Utc::now(),
    }
}
