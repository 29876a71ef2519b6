use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    ActorRole, CandidateId, CandidateProfile, CandidateStatus, CandidateWorkflowState,
    HistoryEntry,
};
use super::effects::{CandidateEmail, Notification, SideEffect};
use super::engine::{attempt_transition, TransitionCommand, TransitionError};
use super::listing::{filter_candidates, CandidatePage, CandidateQuery};
use super::repository::{
    CandidateRecord, CandidateRepository, CandidateView, DispatchError, NotificationDispatcher,
    RepositoryError,
};
use super::transitions::available_transitions;
use crate::config::PipelineConfig;

/// Service composing the repository, the transition engine and the notification dispatcher.
pub struct CandidateWorkflowService<R, N> {
    repository: Arc<R>,
    dispatcher: Arc<N>,
    limits: PipelineConfig,
}

static CANDIDATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_candidate_id() -> CandidateId {
    let id = CANDIDATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CandidateId(format!("cand-{id:06}"))
}

/// What a committed transition produced, including effects that failed to dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionReceipt {
    pub candidate: CandidateView,
    pub entry: HistoryEntry,
    pub effects: Vec<SideEffect>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub undelivered: Vec<SideEffect>,
}

impl<R, N> CandidateWorkflowService<R, N>
where
    R: CandidateRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(repository: Arc<R>, dispatcher: Arc<N>, limits: PipelineConfig) -> Self {
        Self {
            repository,
            dispatcher,
            limits,
        }
    }

    /// Register a candidate; the workflow state starts at `new`.
    pub fn create(
        &self,
        profile: CandidateProfile,
    ) -> Result<CandidateRecord, WorkflowServiceError> {
        let profile = sanitize_profile(profile)?;
        let record = CandidateRecord {
            profile,
            state: CandidateWorkflowState::new(next_candidate_id()),
        };

        let stored = self.repository.insert(record)?;
        info!(candidate_id = %stored.id(), "candidate registered");
        Ok(stored)
    }

    pub fn get(&self, candidate_id: &CandidateId) -> Result<CandidateRecord, WorkflowServiceError> {
        let record = self
            .repository
            .fetch(candidate_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn history(
        &self,
        candidate_id: &CandidateId,
    ) -> Result<Vec<HistoryEntry>, WorkflowServiceError> {
        Ok(self.get(candidate_id)?.state.history().to_vec())
    }

    pub fn list(
        &self,
        query: &CandidateQuery,
    ) -> Result<CandidatePage<CandidateView>, WorkflowServiceError> {
        let records = self.repository.list()?;
        let page = filter_candidates(&records, query, &self.limits).map(CandidateRecord::view);
        Ok(page)
    }

    /// Target statuses `role` may choose for the candidate right now.
    pub fn available_actions(
        &self,
        candidate_id: &CandidateId,
        role: ActorRole,
    ) -> Result<Vec<CandidateStatus>, WorkflowServiceError> {
        let record = self.get(candidate_id)?;
        Ok(available_transitions(record.state.status(), role))
    }

    pub fn transition(
        &self,
        candidate_id: &CandidateId,
        command: &TransitionCommand,
    ) -> Result<TransitionReceipt, WorkflowServiceError> {
        self.transition_at(candidate_id, command, Utc::now())
    }

    /// Apply a transition with an explicit clock reading.
    pub fn transition_at(
        &self,
        candidate_id: &CandidateId,
        command: &TransitionCommand,
        now: DateTime<Utc>,
    ) -> Result<TransitionReceipt, WorkflowServiceError> {
        let request = command.parse()?;
        let record = self.get(candidate_id)?;

        let outcome = match attempt_transition(&record.state, &request, now) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    candidate_id = %candidate_id,
                    from = %request.current_status,
                    to = %request.target_status,
                    role = %request.actor_role,
                    reason = err.kind(),
                    "transition rejected"
                );
                return Err(err.into());
            }
        };

        let updated = CandidateRecord {
            profile: record.profile,
            state: outcome.state,
        };

        match self.repository.compare_and_swap(
            record.state.status(),
            record.state.revision(),
            updated.clone(),
        ) {
            Ok(()) => {}
            Err(RepositoryError::VersionMismatch { actual, .. }) => {
                warn!(candidate_id = %candidate_id, "transition lost a concurrent write race");
                return Err(TransitionError::StaleState {
                    observed: request.current_status,
                    actual,
                }
                .into());
            }
            Err(other) => return Err(other.into()),
        }

        info!(
            candidate_id = %candidate_id,
            from = %outcome.entry.from_status,
            to = %outcome.entry.to_status,
            role = %outcome.entry.actor_role,
            "transition committed"
        );

        let undelivered = self.dispatch(&updated, &outcome.effects);

        Ok(TransitionReceipt {
            candidate: updated.view(),
            entry: outcome.entry,
            effects: outcome.effects,
            undelivered,
        })
    }

    fn dispatch(&self, record: &CandidateRecord, effects: &[SideEffect]) -> Vec<SideEffect> {
        let mut undelivered = Vec::new();
        for &effect in effects {
            let result = if effect.is_email() {
                self.email(record)
            } else {
                self.dispatcher.notify(Notification {
                    candidate_id: record.id().clone(),
                    kind: effect,
                    recipient_role: effect.recipient_role(),
                    status: record.state.status(),
                })
            };

            if let Err(err) = result {
                warn!(
                    candidate_id = %record.id(),
                    effect = effect.label(),
                    error = %err,
                    "side effect not delivered"
                );
                undelivered.push(effect);
            }
        }
        undelivered
    }

    fn email(&self, record: &CandidateRecord) -> Result<(), DispatchError> {
        if record.profile.email.is_empty() {
            return Err(DispatchError::MissingRecipient);
        }
        self.dispatcher.send_email(CandidateEmail::for_status(
            record.id().clone(),
            record.profile.email.clone(),
            &record.profile.name,
            record.state.status(),
        ))
    }
}

fn sanitize_profile(
    mut profile: CandidateProfile,
) -> Result<CandidateProfile, WorkflowServiceError> {
    profile.name = profile.name.trim().to_string();
    profile.email = profile.email.trim().to_string();
    if profile.name.is_empty() {
        return Err(WorkflowServiceError::InvalidProfile(
            "candidate name is required".to_string(),
        ));
    }
    if !is_plausible_email(&profile.email) {
        return Err(WorkflowServiceError::InvalidProfile(format!(
            "'{}' is not a valid email address",
            profile.email
        )));
    }
    profile.skills = profile
        .skills
        .into_iter()
        .map(|skill| skill.trim().to_string())
        .filter(|skill| !skill.is_empty())
        .collect();
    Ok(profile)
}

/// Exactly one `@` with a non-empty local part and a dotted, non-empty domain.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split('.')
                    .all(|label| !label.is_empty() && !label.contains(char::is_whitespace))
                && domain.contains('.')
        }
        None => false,
    }
}

/// Error raised by the candidate workflow service.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowServiceError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("invalid candidate profile: {0}")]
    InvalidProfile(String),
}
