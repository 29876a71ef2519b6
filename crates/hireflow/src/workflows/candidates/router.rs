use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    ActorRole, CandidateId, CandidateProfile, CandidateStatus, HistoryEntry, UnknownStatus,
};
use super::engine::{TransitionCommand, TransitionError};
use super::listing::CandidateQuery;
use super::repository::{
    CandidateRepository, CandidateView, NotificationDispatcher, RepositoryError,
};
use super::service::{CandidateWorkflowService, WorkflowServiceError};
use super::transitions::available_transitions;

/// Router builder exposing the candidate pipeline endpoints.
pub fn candidate_router<R, N>(service: Arc<CandidateWorkflowService<R, N>>) -> Router
where
    R: CandidateRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    Router::new()
        .route(
            "/api/v1/candidates",
            post(create_handler::<R, N>).get(list_handler::<R, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id",
            get(detail_handler::<R, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/transition",
            post(transition_handler::<R, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/history",
            get(history_handler::<R, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/actions",
            get(actions_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    #[serde(default)]
    q: Option<String>,
    /// Comma separated status names.
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    page_size: Option<usize>,
}

impl ListParams {
    fn into_query(self) -> Result<CandidateQuery, UnknownStatus> {
        let statuses = match self.status.as_deref() {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::parse::<CandidateStatus>)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(CandidateQuery {
            search: self.q,
            statuses,
            page: self.page,
            page_size: self.page_size,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionsParams {
    role: String,
}

#[derive(Debug, Serialize)]
struct CandidateDetail {
    candidate: CandidateView,
    profile: CandidateProfile,
}

#[derive(Debug, Serialize)]
struct HistoryView {
    candidate_id: CandidateId,
    status: CandidateStatus,
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
struct ActionsView {
    candidate_id: CandidateId,
    role: ActorRole,
    status: CandidateStatus,
    actions: Vec<CandidateStatus>,
}

pub(crate) async fn create_handler<R, N>(
    State(service): State<Arc<CandidateWorkflowService<R, N>>>,
    axum::Json(profile): axum::Json<CandidateProfile>,
) -> Response
where
    R: CandidateRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.create(profile) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R, N>(
    State(service): State<Arc<CandidateWorkflowService<R, N>>>,
    Query(params): Query<ListParams>,
) -> Response
where
    R: CandidateRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let query = match params.into_query() {
        Ok(query) => query,
        Err(err) => return error_response(TransitionError::from(err).into()),
    };

    match service.list(&query) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn detail_handler<R, N>(
    State(service): State<Arc<CandidateWorkflowService<R, N>>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    R: CandidateRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.get(&CandidateId(candidate_id)) {
        Ok(record) => {
            let detail = CandidateDetail {
                candidate: record.view(),
                profile: record.profile,
            };
            (StatusCode::OK, axum::Json(detail)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn transition_handler<R, N>(
    State(service): State<Arc<CandidateWorkflowService<R, N>>>,
    Path(candidate_id): Path<String>,
    axum::Json(command): axum::Json<TransitionCommand>,
) -> Response
where
    R: CandidateRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.transition(&CandidateId(candidate_id), &command) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<R, N>(
    State(service): State<Arc<CandidateWorkflowService<R, N>>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    R: CandidateRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.get(&CandidateId(candidate_id)) {
        Ok(record) => {
            let view = HistoryView {
                candidate_id: record.id().clone(),
                status: record.state.status(),
                history: record.state.history().to_vec(),
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn actions_handler<R, N>(
    State(service): State<Arc<CandidateWorkflowService<R, N>>>,
    Path(candidate_id): Path<String>,
    Query(params): Query<ActionsParams>,
) -> Response
where
    R: CandidateRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let role = match params.role.parse::<ActorRole>() {
        Ok(role) => role,
        Err(err) => return error_response(TransitionError::from(err).into()),
    };

    match service.get(&CandidateId(candidate_id)) {
        Ok(record) => {
            let status = record.state.status();
            let view = ActionsView {
                candidate_id: record.id().clone(),
                role,
                status,
                actions: available_transitions(status, role),
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) fn status_for(err: &WorkflowServiceError) -> StatusCode {
    match err {
        WorkflowServiceError::Transition(TransitionError::Forbidden { .. }) => {
            StatusCode::FORBIDDEN
        }
        WorkflowServiceError::Transition(
            TransitionError::StaleState { .. }
            | TransitionError::NoOpTransition { .. }
            | TransitionError::TerminalStateViolation { .. },
        ) => StatusCode::CONFLICT,
        WorkflowServiceError::Transition(
            TransitionError::InvalidStatus(_) | TransitionError::InvalidRole(_),
        )
        | WorkflowServiceError::InvalidProfile(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WorkflowServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        WorkflowServiceError::Repository(
            RepositoryError::Conflict | RepositoryError::VersionMismatch { .. },
        ) => StatusCode::CONFLICT,
        WorkflowServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_kind(err: &WorkflowServiceError) -> &'static str {
    match err {
        WorkflowServiceError::Transition(inner) => inner.kind(),
        WorkflowServiceError::Repository(RepositoryError::NotFound) => "not_found",
        WorkflowServiceError::Repository(RepositoryError::Conflict) => "conflict",
        WorkflowServiceError::Repository(RepositoryError::VersionMismatch { .. }) => "stale_state",
        WorkflowServiceError::Repository(RepositoryError::Unavailable(_)) => "unavailable",
        WorkflowServiceError::InvalidProfile(_) => "invalid_profile",
    }
}

pub(crate) fn error_response(err: WorkflowServiceError) -> Response {
    let payload = json!({
        "error": error_kind(&err),
        "message": err.to_string(),
    });
    (status_for(&err), axum::Json(payload)).into_response()
}
