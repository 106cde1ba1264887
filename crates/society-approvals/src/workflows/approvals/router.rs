use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::json;

use super::audit::{AuditFilter, AuditLog};
use super::domain::{
    Application, ApplicationId, ApplicationKind, ApplicationRef, Approver, ApproverRole, Decision,
    EventPermissionSubmission, RegistrationSubmission, RenewalSubmission, SocietyFilter,
    SocietyId,
};
use super::error::WorkflowError;
use super::notifier::Notifier;
use super::registry::{Registry, RegistryError};
use super::service::ApprovalWorkflowService;

type SharedService<R, N, A> = Arc<ApprovalWorkflowService<R, N, A>>;

/// Router builder exposing submission, decision, and query endpoints.
pub fn approval_router<R, N, A>(service: SharedService<R, N, A>) -> Router
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    Router::new()
        .route("/api/v1/registrations", post(submit_registration::<R, N, A>))
        .route("/api/v1/renewals", post(submit_renewal::<R, N, A>))
        .route(
            "/api/v1/event-permissions",
            post(submit_event_permission::<R, N, A>),
        )
        .route(
            "/api/v1/applications/:kind/:id",
            get(application_handler::<R, N, A>),
        )
        .route(
            "/api/v1/applications/:kind/:id/decision",
            post(decision_handler::<R, N, A>),
        )
        .route("/api/v1/approvals/pending", get(pending_handler::<R, N, A>))
        .route("/api/v1/dashboard", get(dashboard_handler::<R, N, A>))
        .route("/api/v1/societies", get(societies_handler::<R, N, A>))
        .route("/api/v1/societies/:id", get(society_handler::<R, N, A>))
        .route("/api/v1/activity", get(activity_handler::<R, N, A>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub approver: Approver,
    pub decision: Decision,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub role: ApproverRole,
    #[serde(default)]
    pub faculty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub role: ApproverRole,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

fn accepted(application: Application) -> Response {
    (StatusCode::ACCEPTED, axum::Json(application.summary())).into_response()
}

pub(crate) async fn submit_registration<R, N, A>(
    State(service): State<SharedService<R, N, A>>,
    axum::Json(submission): axum::Json<RegistrationSubmission>,
) -> Response
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    match service.submit_registration(submission) {
        Ok(application) => accepted(application),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn submit_renewal<R, N, A>(
    State(service): State<SharedService<R, N, A>>,
    axum::Json(submission): axum::Json<RenewalSubmission>,
) -> Response
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    match service.submit_renewal(submission) {
        Ok(application) => accepted(application),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn submit_event_permission<R, N, A>(
    State(service): State<SharedService<R, N, A>>,
    axum::Json(submission): axum::Json<EventPermissionSubmission>,
) -> Response
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    match service.submit_event_permission(submission) {
        Ok(application) => accepted(application),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn application_handler<R, N, A>(
    State(service): State<SharedService<R, N, A>>,
    Path((kind, id)): Path<(ApplicationKind, u64)>,
) -> Response
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    match service.get(ApplicationRef::new(kind, ApplicationId(id))) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn decision_handler<R, N, A>(
    State(service): State<SharedService<R, N, A>>,
    Path((kind, id)): Path<(ApplicationKind, u64)>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    let target = ApplicationRef::new(kind, ApplicationId(id));
    match service.decide(
        target,
        &request.approver,
        request.decision,
        request.rejection_reason.as_deref(),
    ) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn pending_handler<R, N, A>(
    State(service): State<SharedService<R, N, A>>,
    Query(query): Query<PendingQuery>,
) -> Response
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    match service.pending_for(query.role, query.faculty.as_deref()) {
        Ok(pending) => (StatusCode::OK, axum::Json(pending)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn dashboard_handler<R, N, A>(
    State(service): State<SharedService<R, N, A>>,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    match service.dashboard(query.role, query.faculty.as_deref(), year) {
        Ok(stats) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn societies_handler<R, N, A>(
    State(service): State<SharedService<R, N, A>>,
    Query(filter): Query<SocietyFilter>,
) -> Response
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    match service.societies(&filter) {
        Ok(societies) => (StatusCode::OK, axum::Json(societies)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn society_handler<R, N, A>(
    State(service): State<SharedService<R, N, A>>,
    Path(id): Path<u64>,
) -> Response
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    match service.society(SocietyId(id)) {
        Ok(society) => (StatusCode::OK, axum::Json(society)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn activity_handler<R, N, A>(
    State(service): State<SharedService<R, N, A>>,
    Query(filter): Query<AuditFilter>,
) -> Response
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    let entries: Vec<_> = service
        .activity(&filter)
        .into_iter()
        .map(|entry| {
            json!({
                "actor_id": entry.actor_id,
                "actor_name": entry.actor_name,
                "action": entry.action_label(),
                "kind": entry.kind,
                "application_id": entry.application_id,
                "target": entry.target,
                "recorded_at": entry.recorded_at,
            })
        })
        .collect();
    (StatusCode::OK, axum::Json(entries)).into_response()
}

impl WorkflowError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::UnknownSociety(_) => StatusCode::NOT_FOUND,
            Self::AlreadyFinalized { .. }
            | Self::StageMismatch { .. }
            | Self::DuplicateSociety(_)
            | Self::DuplicateRenewal { .. }
            | Self::Registry(RegistryError::Conflict) => StatusCode::CONFLICT,
            Self::UnauthorizedRole { .. } | Self::ScopeMismatch { .. } => StatusCode::FORBIDDEN,
            Self::MissingScope { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidDecision(_) | Self::InvalidSubmission(_) | Self::SocietyNotFound(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        let payload = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (self.status_code(), axum::Json(payload)).into_response()
    }
}
