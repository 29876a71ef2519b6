use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::config::PipelineConfig;
use crate::workflows::candidates::domain::{
    ActorRole, CandidateId, CandidateProfile, CandidateStatus, CandidateWorkflowState,
    HistoryEntry,
};
use crate::workflows::candidates::effects::{CandidateEmail, Notification};
use crate::workflows::candidates::engine::{TransitionCommand, TransitionRequest};
use crate::workflows::candidates::repository::{
    CandidateRecord, CandidateRepository, DispatchError, NotificationDispatcher, RepositoryError,
};
use crate::workflows::candidates::{candidate_router, CandidateWorkflowService};

pub(super) fn profile(name: &str, email: &str, skills: &[&str]) -> CandidateProfile {
    CandidateProfile {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        source: Some("referral".to_string()),
        job_title: Some("Backend Engineer".to_string()),
    }
}

pub(super) fn ada() -> CandidateProfile {
    profile("Ada Lovelace", "ada@example.com", &["Rust", "Analytics"])
}

pub(super) fn clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Status path from `new` to `joined` with the role that takes each step.
pub(super) fn happy_path() -> Vec<(CandidateStatus, ActorRole)> {
    use ActorRole::*;
    use CandidateStatus::*;

    vec![
        (Applied, Candidate),
        (Called, Recruiter),
        (FeedbackAdded, Recruiter),
        (SentToAm, Recruiter),
        (AmViewed, AccountManager),
        (AmShortlisted, AccountManager),
        (SentToClient, AccountManager),
        (ClientViewed, Client),
        (ClientShortlisted, Client),
        (InterviewScheduled, Recruiter),
        (InterviewCompleted, System),
        (Selected, Client),
        (Negotiation, Recruiter),
        (OfferExtended, Recruiter),
        (OfferAccepted, Candidate),
        (Hired, Recruiter),
        (Joined, System),
    ]
}

/// State sitting at `status` with a single synthetic history entry.
pub(super) fn state_at(status: CandidateStatus) -> CandidateWorkflowState {
    let fresh = CandidateWorkflowState::new(CandidateId("cand-test".to_string()));
    if status == CandidateStatus::New {
        return fresh;
    }
    fresh.advance(HistoryEntry {
        from_status: CandidateStatus::New,
        to_status: status,
        actor_role: ActorRole::System,
        timestamp: clock(),
        notes: "fixture".to_string(),
    })
}

pub(super) fn request(
    from: CandidateStatus,
    to: CandidateStatus,
    role: ActorRole,
    notes: &str,
) -> TransitionRequest {
    TransitionRequest {
        current_status: from,
        target_status: to,
        actor_role: role,
        notes: notes.to_string(),
    }
}

pub(super) fn command(from: &str, to: &str, role: &str) -> TransitionCommand {
    TransitionCommand {
        current_status: from.to_string(),
        target_status: to.to_string(),
        actor_role: role.to_string(),
        notes: None,
    }
}

pub(super) fn build_service() -> (
    CandidateWorkflowService<MemoryRepository, MemoryDispatcher>,
    Arc<MemoryRepository>,
    Arc<MemoryDispatcher>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let dispatcher = Arc::new(MemoryDispatcher::default());
    let service = CandidateWorkflowService::new(
        repository.clone(),
        dispatcher.clone(),
        PipelineConfig::default(),
    );
    (service, repository, dispatcher)
}

/// Walk a registered candidate along the happy path until it reaches `target`.
pub(super) fn advance_to(
    service: &CandidateWorkflowService<MemoryRepository, MemoryDispatcher>,
    candidate_id: &CandidateId,
    target: CandidateStatus,
) {
    let mut current = CandidateStatus::New;
    let mut at = clock();
    for (status, role) in happy_path() {
        if current == target {
            return;
        }
        let command = TransitionCommand {
            current_status: current.as_str().to_string(),
            target_status: status.as_str().to_string(),
            actor_role: role.as_str().to_string(),
            notes: None,
        };
        service
            .transition_at(candidate_id, &command, at)
            .expect("happy path step succeeds");
        current = status;
        at += Duration::minutes(5);
    }
    assert_eq!(current, target, "target not on the happy path");
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<CandidateRecord>>>,
}

impl CandidateRepository for MemoryRepository {
    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|stored| stored.id() == record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|stored| stored.id() == id).cloned())
    }

    fn list(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn compare_and_swap(
        &self,
        expected_status: CandidateStatus,
        expected_revision: usize,
        record: CandidateRecord,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard
            .iter_mut()
            .find(|stored| stored.id() == record.id())
            .ok_or(RepositoryError::NotFound)?;
        if stored.state.status() != expected_status || stored.state.revision() != expected_revision
        {
            return Err(RepositoryError::VersionMismatch {
                actual: stored.state.status(),
                revision: stored.state.revision(),
            });
        }
        *stored = record;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDispatcher {
    notifications: Arc<Mutex<Vec<Notification>>>,
    emails: Arc<Mutex<Vec<CandidateEmail>>>,
}

impl MemoryDispatcher {
    pub(super) fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .expect("dispatch mutex poisoned")
            .clone()
    }

    pub(super) fn emails(&self) -> Vec<CandidateEmail> {
        self.emails.lock().expect("dispatch mutex poisoned").clone()
    }
}

impl NotificationDispatcher for MemoryDispatcher {
    fn notify(&self, notification: Notification) -> Result<(), DispatchError> {
        self.notifications
            .lock()
            .expect("dispatch mutex poisoned")
            .push(notification);
        Ok(())
    }

    fn send_email(&self, email: CandidateEmail) -> Result<(), DispatchError> {
        self.emails
            .lock()
            .expect("dispatch mutex poisoned")
            .push(email);
        Ok(())
    }
}

pub(super) struct OfflineDispatcher;

impl NotificationDispatcher for OfflineDispatcher {
    fn notify(&self, _notification: Notification) -> Result<(), DispatchError> {
        Err(DispatchError::Transport("smtp relay down".to_string()))
    }

    fn send_email(&self, _email: CandidateEmail) -> Result<(), DispatchError> {
        Err(DispatchError::Transport("smtp relay down".to_string()))
    }
}

/// Repository whose writes always lose to a concurrent writer.
#[derive(Default)]
pub(super) struct RacingRepository {
    pub(super) inner: MemoryRepository,
}

impl CandidateRepository for RacingRepository {
    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        self.inner.list()
    }

    fn compare_and_swap(
        &self,
        _expected_status: CandidateStatus,
        expected_revision: usize,
        _record: CandidateRecord,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::VersionMismatch {
            actual: CandidateStatus::Called,
            revision: expected_revision + 1,
        })
    }
}

pub(super) struct UnavailableRepository;

impl CandidateRepository for UnavailableRepository {
    fn insert(&self, _record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn compare_and_swap(
        &self,
        _expected_status: CandidateStatus,
        _expected_revision: usize,
        _record: CandidateRecord,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: CandidateWorkflowService<MemoryRepository, MemoryDispatcher>,
) -> axum::Router {
    candidate_router(Arc::new(service))
}
