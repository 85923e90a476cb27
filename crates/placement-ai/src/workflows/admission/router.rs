use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::allocator::{AdmissionAllocator, DecisionLists};
use super::autoapply::{AutoApplyOptions, AutoApplyOrchestrator};
use super::domain::{AdmissionDecision, ApplicationId};
use super::service::{ApplicationWorkflow, WorkflowError};
use super::store::{
    ApplicationStore, BatchStore, CandidateStore, EmailService, NotificationDispatcher,
    OfferingStore,
};
use crate::error::workflow_status;
use crate::workflows::matching::{CandidateId, OfferingId, OrganizationId};

/// Shared state for the admission HTTP surface.
pub struct AdmissionState<C, O, A, B, N, E> {
    pub workflow: Arc<ApplicationWorkflow<C, O, A, N>>,
    pub allocator: Arc<AdmissionAllocator<C, O, A, B, N, E>>,
    pub orchestrator: Arc<AutoApplyOrchestrator<C, O, A, N, E>>,
}

impl<C, O, A, B, N, E> Clone for AdmissionState<C, O, A, B, N, E> {
    fn clone(&self) -> Self {
        Self {
            workflow: Arc::clone(&self.workflow),
            allocator: Arc::clone(&self.allocator),
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

/// Router builder exposing the application lifecycle, admission publishing,
/// and auto-application endpoints.
pub fn admission_router<C, O, A, B, N, E>(state: AdmissionState<C, O, A, B, N, E>) -> Router
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<C, O, A, B, N, E>))
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<C, O, A, B, N, E>)
                .delete(delete_draft_handler::<C, O, A, B, N, E>),
        )
        .route(
            "/api/v1/applications/:application_id/decision",
            post(decision_handler::<C, O, A, B, N, E>),
        )
        .route(
            "/api/v1/applications/:application_id/promote",
            post(promote_handler::<C, O, A, B, N, E>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/selection",
            post(select_handler::<C, O, A, B, N, E>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/suggestions",
            get(suggestions_handler::<C, O, A, B, N, E>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/auto-apply",
            post(auto_apply_handler::<C, O, A, B, N, E>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/analytics",
            get(analytics_handler::<C, O, A, B, N, E>),
        )
        .route(
            "/api/v1/auto-apply/batch",
            post(batch_auto_apply_handler::<C, O, A, B, N, E>),
        )
        .route(
            "/api/v1/offerings/:offering_id/admissions",
            post(publish_handler::<C, O, A, B, N, E>)
                .get(history_handler::<C, O, A, B, N, E>),
        )
        .with_state(state)
}

fn error_response(err: WorkflowError) -> Response {
    let status = workflow_status(&err);
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    candidate_id: CandidateId,
    offering_id: OfferingId,
}

pub(crate) async fn submit_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    match state
        .workflow
        .submit(&request.candidate_id, &request.offering_id, None, false)
    {
        Ok(application) => {
            (StatusCode::CREATED, axum::Json(application.status_view())).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    Path(application_id): Path<String>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    let id = ApplicationId(application_id);
    match state.workflow.applications().fetch(&id) {
        Ok(Some(application)) => {
            (StatusCode::OK, axum::Json(application.status_view())).into_response()
        }
        Ok(None) => error_response(WorkflowError::NotFound(format!("application {}", id.0))),
        Err(err) => error_response(WorkflowError::Store(err)),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionRequest {
    decision: AdmissionDecision,
}

pub(crate) async fn decision_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    match state
        .workflow
        .decide(&ApplicationId(application_id), request.decision)
    {
        Ok(application) => {
            (StatusCode::OK, axum::Json(application.status_view())).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn promote_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    Path(application_id): Path<String>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    match state.workflow.promote_draft(&ApplicationId(application_id)) {
        Ok(application) => {
            (StatusCode::OK, axum::Json(application.status_view())).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_draft_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    Path(application_id): Path<String>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    match state.workflow.delete_draft(&ApplicationId(application_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectRequest {
    application_id: ApplicationId,
}

pub(crate) async fn select_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    Path(candidate_id): Path<String>,
    axum::Json(request): axum::Json<SelectRequest>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    match state
        .workflow
        .select(&CandidateId(candidate_id), &request.application_id)
    {
        Ok(application) => {
            (StatusCode::OK, axum::Json(application.status_view())).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn suggestions_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    match state.orchestrator.suggest(&CandidateId(candidate_id)) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn auto_apply_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    Path(candidate_id): Path<String>,
    axum::Json(options): axum::Json<AutoApplyOptions>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    match state
        .orchestrator
        .auto_apply(&CandidateId(candidate_id), &options)
    {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchAutoApplyRequest {
    candidate_ids: Vec<CandidateId>,
    #[serde(flatten)]
    options: AutoApplyOptions,
}

pub(crate) async fn batch_auto_apply_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    axum::Json(request): axum::Json<BatchAutoApplyRequest>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    let outcomes = state
        .orchestrator
        .batch_auto_apply(&request.candidate_ids, &request.options);
    (StatusCode::OK, axum::Json(outcomes)).into_response()
}

pub(crate) async fn analytics_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    match state.orchestrator.analytics(&CandidateId(candidate_id)) {
        Ok(analytics) => (StatusCode::OK, axum::Json(analytics)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublishRequest {
    org_id: OrganizationId,
    #[serde(default)]
    admitted: Vec<CandidateId>,
    #[serde(default)]
    rejected: Vec<CandidateId>,
    #[serde(default)]
    waitlisted: Vec<CandidateId>,
}

pub(crate) async fn publish_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    Path(offering_id): Path<String>,
    axum::Json(request): axum::Json<PublishRequest>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    let lists = DecisionLists {
        admitted: request.admitted,
        rejected: request.rejected,
        waitlisted: request.waitlisted,
    };
    match state
        .allocator
        .publish(&request.org_id, &OfferingId(offering_id), lists)
    {
        Ok(outcome) => (StatusCode::CREATED, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<C, O, A, B, N, E>(
    State(state): State<AdmissionState<C, O, A, B, N, E>>,
    Path(offering_id): Path<String>,
) -> Response
where
    C: CandidateStore + 'static,
    O: OfferingStore + 'static,
    A: ApplicationStore + 'static,
    B: BatchStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EmailService + 'static,
{
    match state.allocator.history(&OfferingId(offering_id)) {
        Ok(batches) => (StatusCode::OK, axum::Json(batches)).into_response(),
        Err(err) => error_response(err),
    }
}
