use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use placement_ai::workflows::admission::{
    AdmissionAllocator, AdmissionBatch, AdmissionEmail, AdmissionState, Application, ApplicationId,
    ApplicationStore, ApplicationWorkflow, AutoApplyOrchestrator, BatchStore, CandidateStore,
    DispatchError, EmailService, JobMatchEmail, Notification, NotificationDispatcher,
    OfferingStore, StoreError,
};
use placement_ai::workflows::matching::{
    CandidateId, CandidateProfile, MatchEngine, MatchPolicy, Offering, OfferingId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ServiceWorkflow = ApplicationWorkflow<
    InMemoryCandidateStore,
    InMemoryOfferingStore,
    InMemoryApplicationStore,
    LoggingNotifier,
>;
pub(crate) type ServiceState = AdmissionState<
    InMemoryCandidateStore,
    InMemoryOfferingStore,
    InMemoryApplicationStore,
    InMemoryBatchStore,
    LoggingNotifier,
    LoggingEmailService,
>;

/// In-memory collaborators wired into one admission surface. The candidate
/// and offering stores are returned separately so callers can seed them.
pub(crate) struct ServiceHandles {
    pub(crate) state: ServiceState,
    pub(crate) candidates: Arc<InMemoryCandidateStore>,
    pub(crate) offerings: Arc<InMemoryOfferingStore>,
}

pub(crate) fn build_service(policy: MatchPolicy) -> ServiceHandles {
    let candidates = Arc::new(InMemoryCandidateStore::default());
    let offerings = Arc::new(InMemoryOfferingStore::default());
    let applications = Arc::new(InMemoryApplicationStore::default());
    let batches = Arc::new(InMemoryBatchStore::default());
    let notifier = Arc::new(LoggingNotifier);
    let email = Arc::new(LoggingEmailService);

    let workflow: ServiceWorkflow = ApplicationWorkflow::new(
        candidates.clone(),
        offerings.clone(),
        applications,
        notifier,
    );
    let allocator = AdmissionAllocator::new(workflow.clone(), batches, email.clone());
    let orchestrator =
        AutoApplyOrchestrator::new(workflow.clone(), MatchEngine::new(policy), email);

    ServiceHandles {
        state: AdmissionState {
            workflow: Arc::new(workflow),
            allocator: Arc::new(allocator),
            orchestrator: Arc::new(orchestrator),
        },
        candidates,
        offerings,
    }
}

#[derive(Default)]
pub(crate) struct InMemoryCandidateStore {
    records: Mutex<HashMap<CandidateId, CandidateProfile>>,
}

impl InMemoryCandidateStore {
    pub(crate) fn put(&self, profile: CandidateProfile) {
        self.records
            .lock()
            .expect("candidate mutex poisoned")
            .insert(profile.candidate_id.clone(), profile);
    }
}

impl CandidateStore for InMemoryCandidateStore {
    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, StoreError> {
        let guard = self.records.lock().expect("candidate mutex poisoned");
        Ok(guard.get(id).cloned())
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
pub(crate) struct InMemoryOfferingStore {
    records: Mutex<Vec<Offering>>,
}

impl InMemoryOfferingStore {
    pub(crate) fn put(&self, offering: Offering) {
        self.records
            .lock()
            .expect("offering mutex poisoned")
            .push(offering);
    }
}

impl OfferingStore for InMemoryOfferingStore {
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
pub(crate) struct InMemoryApplicationStore {
    records: Mutex<Vec<Application>>,
}

impl ApplicationStore for InMemoryApplicationStore {
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
pub(crate) struct InMemoryBatchStore {
    records: Mutex<Vec<AdmissionBatch>>,
}

impl BatchStore for InMemoryBatchStore {
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

/// Stand-in transport until the real notification gateway is wired up; the
/// events land in the service log.
pub(crate) struct LoggingNotifier;

impl NotificationDispatcher for LoggingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), DispatchError> {
        tracing::info!(
            user = %notification.user_id.0,
            kind = ?notification.kind,
            title = %notification.title,
            "notification dispatched"
        );
        Ok(())
    }
}

pub(crate) struct LoggingEmailService;

impl EmailService for LoggingEmailService {
    fn send_admission_email(&self, email: AdmissionEmail) -> Result<(), DispatchError> {
        tracing::info!(
            candidate = %email.candidate_id.0,
            offering = %email.offering_name,
            decision = ?email.decision,
            "admission email dispatched"
        );
        Ok(())
    }

    fn send_job_email(&self, email: JobMatchEmail) -> Result<(), DispatchError> {
        tracing::info!(
            candidate = %email.candidate_id.0,
            offering = %email.offering_name,
            score = email.score,
            "job match email dispatched"
        );
        Ok(())
    }
}
