use super::common::*;
use crate::workflows::admission::allocator::DecisionLists;
use crate::workflows::admission::domain::{AdmissionDecision, ApplicationStatus};
use crate::workflows::admission::store::ApplicationStore;
use crate::workflows::admission::WorkflowError;
use crate::workflows::matching::OrganizationId;

fn seeded_world() -> (World, Vec<crate::workflows::matching::CandidateId>) {
    let world = World::new();
    let candidates = ["alice", "bob", "carol"]
        .iter()
        .map(|name| world.add_candidate(candidate(name)))
        .collect();
    (world, candidates)
}

#[test]
fn publish_decides_every_listed_candidate() {
    let (world, candidates) = seeded_world();
    let offering_id = world.add_offering(course_offering("cs", "uni-01", "BSc Computer Science"));
    let workflow = world.workflow();
    let allocator = world.allocator();

    for candidate_id in &candidates {
        workflow
            .submit(candidate_id, &offering_id, None, false)
            .expect("submission succeeds");
    }

    let outcome = allocator
        .publish(
            &OrganizationId("uni-01".to_string()),
            &offering_id,
            DecisionLists {
                admitted: vec![candidates[0].clone()],
                rejected: vec![candidates[1].clone()],
                waitlisted: vec![candidates[2].clone()],
            },
        )
        .expect("publish succeeds");

    assert_eq!(outcome.decided.len(), 3);
    assert!(outcome.skipped.is_empty());

    let statuses: Vec<ApplicationStatus> = candidates
        .iter()
        .map(|candidate_id| {
            world
                .applications
                .for_candidate(candidate_id)
                .expect("store reachable")
                .remove(0)
                .status
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            ApplicationStatus::Admitted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Waitlisted,
        ]
    );

    // Only the admitted candidate gets the e-mail.
    let emails = world.email.admission_emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].candidate_id, candidates[0]);
    assert_eq!(emails[0].decision, AdmissionDecision::Admitted);

    let history = allocator.history(&offering_id).expect("history succeeds");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].batch_id, outcome.batch.batch_id);
}

#[test]
fn overlapping_lists_are_rejected_before_any_mutation() {
    let (world, candidates) = seeded_world();
    let offering_id = world.add_offering(course_offering("cs", "uni-01", "BSc Computer Science"));
    let workflow = world.workflow();
    let allocator = world.allocator();

    workflow
        .submit(&candidates[0], &offering_id, None, false)
        .expect("submission succeeds");

    let err = allocator
        .publish(
            &OrganizationId("uni-01".to_string()),
            &offering_id,
            DecisionLists {
                admitted: vec![candidates[0].clone()],
                rejected: vec![candidates[0].clone()],
                waitlisted: Vec::new(),
            },
        )
        .expect_err("overlap must fail");

    assert!(matches!(err, WorkflowError::Validation(_)));
    assert!(world.batches.all().is_empty());
    let application = world
        .applications
        .for_candidate(&candidates[0])
        .expect("store reachable")
        .remove(0);
    assert_eq!(application.status, ApplicationStatus::Pending);
}

#[test]
fn publish_rejects_offerings_of_other_organizations() {
    let (world, candidates) = seeded_world();
    let offering_id = world.add_offering(course_offering("cs", "uni-01", "BSc Computer Science"));
    let allocator = world.allocator();

    let err = allocator
        .publish(
            &OrganizationId("uni-99".to_string()),
            &offering_id,
            DecisionLists {
                admitted: vec![candidates[0].clone()],
                ..DecisionLists::default()
            },
        )
        .expect_err("foreign org must fail");

    assert!(matches!(err, WorkflowError::Validation(_)));
}

#[test]
fn candidates_without_pending_applications_are_skipped() {
    let (world, candidates) = seeded_world();
    let offering_id = world.add_offering(course_offering("cs", "uni-01", "BSc Computer Science"));
    let workflow = world.workflow();
    let allocator = world.allocator();

    workflow
        .submit(&candidates[0], &offering_id, None, false)
        .expect("submission succeeds");
    // candidates[1] never applied.

    let outcome = allocator
        .publish(
            &OrganizationId("uni-01".to_string()),
            &offering_id,
            DecisionLists {
                admitted: vec![candidates[0].clone(), candidates[1].clone()],
                ..DecisionLists::default()
            },
        )
        .expect("publish succeeds despite the gap");

    assert_eq!(outcome.decided.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].candidate_id, candidates[1]);
    assert!(outcome.skipped[0].reason.contains("no pending application"));
}

#[test]
fn already_decided_applications_become_recorded_skips() {
    let (world, candidates) = seeded_world();
    let offering_id = world.add_offering(course_offering("cs", "uni-01", "BSc Computer Science"));
    let workflow = world.workflow();
    let allocator = world.allocator();

    let application = workflow
        .submit(&candidates[0], &offering_id, None, false)
        .expect("submission succeeds");
    workflow
        .submit(&candidates[1], &offering_id, None, false)
        .expect("submission succeeds");

    // First batch decides candidate 0; the second batch lists them again.
    allocator
        .publish(
            &OrganizationId("uni-01".to_string()),
            &offering_id,
            DecisionLists {
                admitted: vec![candidates[0].clone()],
                ..DecisionLists::default()
            },
        )
        .expect("first publish succeeds");

    let outcome = allocator
        .publish(
            &OrganizationId("uni-01".to_string()),
            &offering_id,
            DecisionLists {
                rejected: vec![candidates[0].clone()],
                waitlisted: vec![candidates[1].clone()],
                ..DecisionLists::default()
            },
        )
        .expect("second publish succeeds");

    assert_eq!(outcome.decided.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].candidate_id, candidates[0]);

    let unchanged = world
        .applications
        .fetch(&application.application_id)
        .expect("store reachable")
        .expect("record exists");
    assert_eq!(unchanged.status, ApplicationStatus::Admitted);
}
