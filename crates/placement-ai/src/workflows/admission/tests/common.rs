use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::admission::domain::{AdmissionBatch, Application, ApplicationId};
use crate::workflows::admission::router::AdmissionState;
use crate::workflows::admission::store::{
    AdmissionEmail, ApplicationStore, BatchStore, CandidateStore, DispatchError, EmailService,
    JobMatchEmail, Notification, NotificationDispatcher, OfferingStore, StoreError,
};
use crate::workflows::admission::{
    AdmissionAllocator, ApplicationWorkflow, AutoApplyOrchestrator,
};
use crate::workflows::matching::{
    AutoApplySettings, CandidateId, CandidateProfile, CompletionRecord, DocumentChecklist,
    LetterGrade, MatchEngine, MatchPolicy, Offering, OfferingId, OfferingKind,
    OfferingRequirement, OrganizationId,
};

pub(super) type TestWorkflow =
    ApplicationWorkflow<MemoryCandidates, MemoryOfferings, MemoryApplications, MemoryNotifications>;
pub(super) type TestAllocator = AdmissionAllocator<
    MemoryCandidates,
    MemoryOfferings,
    MemoryApplications,
    MemoryBatches,
    MemoryNotifications,
    MemoryEmails,
>;
pub(super) type TestOrchestrator = AutoApplyOrchestrator<
    MemoryCandidates,
    MemoryOfferings,
    MemoryApplications,
    MemoryNotifications,
    MemoryEmails,
>;
pub(super) type TestState = AdmissionState<
    MemoryCandidates,
    MemoryOfferings,
    MemoryApplications,
    MemoryBatches,
    MemoryNotifications,
    MemoryEmails,
>;

/// One bundle of in-memory collaborators shared by every service under test.
pub(super) struct World {
    pub(super) candidates: Arc<MemoryCandidates>,
    pub(super) offerings: Arc<MemoryOfferings>,
    pub(super) applications: Arc<MemoryApplications>,
    pub(super) batches: Arc<MemoryBatches>,
    pub(super) notifier: Arc<MemoryNotifications>,
    pub(super) email: Arc<MemoryEmails>,
}

impl World {
    pub(super) fn new() -> Self {
        Self {
            candidates: Arc::new(MemoryCandidates::default()),
            offerings: Arc::new(MemoryOfferings::default()),
            applications: Arc::new(MemoryApplications::default()),
            batches: Arc::new(MemoryBatches::default()),
            notifier: Arc::new(MemoryNotifications::default()),
            email: Arc::new(MemoryEmails::default()),
        }
    }

    pub(super) fn workflow(&self) -> TestWorkflow {
        ApplicationWorkflow::new(
            self.candidates.clone(),
            self.offerings.clone(),
            self.applications.clone(),
            self.notifier.clone(),
        )
    }

    pub(super) fn allocator(&self) -> TestAllocator {
        AdmissionAllocator::new(self.workflow(), self.batches.clone(), self.email.clone())
    }

    pub(super) fn orchestrator(&self) -> TestOrchestrator {
        self.orchestrator_with_policy(MatchPolicy::default())
    }

    pub(super) fn orchestrator_with_policy(&self, policy: MatchPolicy) -> TestOrchestrator {
        AutoApplyOrchestrator::new(self.workflow(), MatchEngine::new(policy), self.email.clone())
    }

    pub(super) fn state(&self) -> TestState {
        AdmissionState {
            workflow: Arc::new(self.workflow()),
            allocator: Arc::new(self.allocator()),
            orchestrator: Arc::new(self.orchestrator()),
        }
    }

    pub(super) fn add_candidate(&self, profile: CandidateProfile) -> CandidateId {
        let id = profile.candidate_id.clone();
        self.candidates.put(profile);
        id
    }

    pub(super) fn add_offering(&self, offering: Offering) -> OfferingId {
        let id = offering.offering_id.clone();
        self.offerings.put(offering);
        id
    }
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

pub(super) fn course_offering(suffix: &str, org: &str, name: &str) -> Offering {
    Offering {
        offering_id: OfferingId(format!("course-{suffix}")),
        org_id: OrganizationId(org.to_string()),
        name: name.to_string(),
        kind: OfferingKind::Course,
        requirement: OfferingRequirement {
            requires_transcript: true,
            min_grade: Some(LetterGrade::B),
            required_subjects: vec!["Mathematics".to_string(), "Physics".to_string()],
            ..OfferingRequirement::default()
        },
        open: true,
        created_at: Utc
            .with_ymd_and_hms(2025, 6, 1, 8, 0, 0)
            .single()
            .expect("valid"),
    }
}

pub(super) fn job_offering(suffix: &str, org: &str, name: &str) -> Offering {
    Offering {
        offering_id: OfferingId(format!("job-{suffix}")),
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
        created_at: Utc
            .with_ymd_and_hms(2025, 6, 2, 8, 0, 0)
            .single()
            .expect("valid"),
    }
}

/// Offering whose required subjects the standard candidate cannot cover.
pub(super) fn unreachable_offering(suffix: &str, org: &str) -> Offering {
    let mut offering = course_offering(suffix, org, "Classics Programme");
    offering.requirement.required_subjects = vec![
        "Latin".to_string(),
        "Greek".to_string(),
        "Ancient History".to_string(),
    ];
    offering
}

#[derive(Default)]
pub(super) struct MemoryCandidates {
    records: Mutex<HashMap<CandidateId, CandidateProfile>>,
}

impl MemoryCandidates {
    pub(super) fn put(&self, profile: CandidateProfile) {
        self.records
            .lock()
            .expect("candidate mutex poisoned")
            .insert(profile.candidate_id.clone(), profile);
    }

    pub(super) fn get(&self, id: &CandidateId) -> Option<CandidateProfile> {
        self.records
            .lock()
            .expect("candidate mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl CandidateStore for MemoryCandidates {
    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, StoreError> {
        Ok(self.get(id))
    }

    fn update(&self, profile: CandidateProfile) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("candidate mutex poisoned");
        if !guard.contains_key(&profile.candidate_id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(profile.candidate_id.clone(), profile);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryOfferings {
    records: Mutex<Vec<Offering>>,
}

impl MemoryOfferings {
    pub(super) fn put(&self, offering: Offering) {
        self.records
            .lock()
            .expect("offering mutex poisoned")
            .push(offering);
    }
}

impl OfferingStore for MemoryOfferings {
    fn fetch(&self, id: &OfferingId) -> Result<Option<Offering>, StoreError> {
        let guard = self.records.lock().expect("offering mutex poisoned");
        Ok(guard
            .iter()
            .find(|offering| offering.offering_id == *id)
            .cloned())
    }

    fn open_offerings(&self) -> Result<Vec<Offering>, StoreError> {
        let guard = self.records.lock().expect("offering mutex poisoned");
        Ok(guard
            .iter()
            .filter(|offering| offering.open)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryApplications {
    records: Mutex<Vec<Application>>,
}

impl MemoryApplications {
    pub(super) fn all(&self) -> Vec<Application> {
        self.records
            .lock()
            .expect("application mutex poisoned")
            .clone()
    }
}

impl ApplicationStore for MemoryApplications {
    fn insert(&self, application: Application) -> Result<Application, StoreError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.application_id == application.application_id)
        {
            return Err(StoreError::Conflict);
        }
        guard.push(application.clone());
        Ok(application)
    }

    fn update(&self, mut application: Application) -> Result<Application, StoreError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        let stored = guard
            .iter_mut()
            .find(|existing| existing.application_id == application.application_id)
            .ok_or(StoreError::NotFound)?;
        if stored.version != application.version {
            return Err(StoreError::Version);
        }
        application.version += 1;
        *stored = application.clone();
        Ok(application)
    }

    fn update_all(&self, applications: Vec<Application>) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        // Verify every version before touching anything.
        for application in &applications {
            let stored = guard
                .iter()
                .find(|existing| existing.application_id == application.application_id)
                .ok_or(StoreError::NotFound)?;
            if stored.version != application.version {
                return Err(StoreError::Version);
            }
        }
        for mut application in applications {
            application.version += 1;
            if let Some(stored) = guard
                .iter_mut()
                .find(|existing| existing.application_id == application.application_id)
            {
                *stored = application;
            }
        }
        Ok(())
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        let before = guard.len();
        guard.retain(|existing| existing.application_id != *id);
        if guard.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .iter()
            .find(|existing| existing.application_id == *id)
            .cloned())
    }

    fn for_candidate(&self, id: &CandidateId) -> Result<Vec<Application>, StoreError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .iter()
            .filter(|existing| existing.candidate_id == *id)
            .cloned()
            .collect())
    }

    fn for_offering(&self, id: &OfferingId) -> Result<Vec<Application>, StoreError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .iter()
            .filter(|existing| existing.offering_id == *id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryBatches {
    records: Mutex<Vec<AdmissionBatch>>,
}

impl MemoryBatches {
    pub(super) fn all(&self) -> Vec<AdmissionBatch> {
        self.records.lock().expect("batch mutex poisoned").clone()
    }
}

impl BatchStore for MemoryBatches {
    fn insert(&self, batch: AdmissionBatch) -> Result<AdmissionBatch, StoreError> {
        self.records
            .lock()
            .expect("batch mutex poisoned")
            .push(batch.clone());
        Ok(batch)
    }

    fn for_offering(&self, id: &OfferingId) -> Result<Vec<AdmissionBatch>, StoreError> {
        let guard = self.records.lock().expect("batch mutex poisoned");
        Ok(guard
            .iter()
            .filter(|batch| batch.offering_id == *id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifications {
    events: Mutex<Vec<Notification>>,
    fail: AtomicBool,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }

    pub(super) fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl NotificationDispatcher for MemoryNotifications {
    fn notify(&self, notification: Notification) -> Result<(), DispatchError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(DispatchError::Transport("gateway offline".to_string()));
        }
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryEmails {
    admission: Mutex<Vec<AdmissionEmail>>,
    job: Mutex<Vec<JobMatchEmail>>,
}

impl MemoryEmails {
    pub(super) fn admission_emails(&self) -> Vec<AdmissionEmail> {
        self.admission.lock().expect("email mutex poisoned").clone()
    }

    pub(super) fn job_emails(&self) -> Vec<JobMatchEmail> {
        self.job.lock().expect("email mutex poisoned").clone()
    }
}

impl EmailService for MemoryEmails {
    fn send_admission_email(&self, email: AdmissionEmail) -> Result<(), DispatchError> {
        self.admission
            .lock()
            .expect("email mutex poisoned")
            .push(email);
        Ok(())
    }

    fn send_job_email(&self, email: JobMatchEmail) -> Result<(), DispatchError> {
        self.job.lock().expect("email mutex poisoned").push(email);
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
