use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    ActorRole, CandidateId, CandidateProfile, CandidateStatus, CandidateWorkflowState,
};
use super::effects::{CandidateEmail, Notification};

/// Repository record pairing the profile with its workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRecord {
    pub profile: CandidateProfile,
    pub state: CandidateWorkflowState,
}

impl CandidateRecord {
    pub fn id(&self) -> &CandidateId {
        self.state.candidate_id()
    }

    pub fn view(&self) -> CandidateView {
        CandidateView {
            candidate_id: self.id().clone(),
            name: self.profile.name.clone(),
            email: self.profile.email.clone(),
            skills: self.profile.skills.clone(),
            job_title: self.profile.job_title.clone(),
            status: self.state.status(),
            status_label: self.state.status().label(),
            last_actor: self.state.actor_role(),
            revision: self.state.revision(),
            updated_at: self.state.last_changed_at(),
        }
    }
}

/// Sanitized representation used by listing and detail endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub candidate_id: CandidateId,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub status: CandidateStatus,
    pub status_label: &'static str,
    pub last_actor: ActorRole,
    pub revision: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Storage abstraction; writes after creation go through `compare_and_swap` only.
pub trait CandidateRepository: Send + Sync {
    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError>;
    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError>;
    /// All records in insertion order.
    fn list(&self) -> Result<Vec<CandidateRecord>, RepositoryError>;
    /// Replace the stored record only if it still has `expected_status` at `expected_revision`.
    fn compare_and_swap(
        &self,
        expected_status: CandidateStatus,
        expected_revision: usize,
        record: CandidateRecord,
    ) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("stored record moved to {actual} at revision {revision}")]
    VersionMismatch {
        actual: CandidateStatus,
        revision: usize,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hooks for in-app notifications and candidate email.
pub trait NotificationDispatcher: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), DispatchError>;
    fn send_email(&self, email: CandidateEmail) -> Result<(), DispatchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("candidate has no email address on file")]
    MissingRecipient,
}
