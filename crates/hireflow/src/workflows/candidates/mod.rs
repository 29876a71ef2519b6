//! Candidate pipeline: status machine, listing, persistence seams and HTTP surface.
//!
//! The engine decides, the service commits through the repository's compare-and-swap and only
//! then hands side-effect intents to the notification dispatcher.

pub mod domain;
pub mod effects;
pub mod engine;
pub mod listing;
pub mod repository;
pub mod router;
pub mod service;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use domain::{
    ActorRole, CandidateId, CandidateProfile, CandidateStatus, CandidateWorkflowState,
    HistoryEntry, UnknownRole, UnknownStatus,
};
pub use effects::{effects_for, CandidateEmail, Notification, SideEffect};
pub use engine::{
    attempt_transition, replay, TransitionCommand, TransitionError, TransitionOutcome,
    TransitionRequest,
};
pub use listing::{filter_candidates, CandidatePage, CandidateQuery};
pub use repository::{
    CandidateRecord, CandidateRepository, CandidateView, DispatchError, NotificationDispatcher,
    RepositoryError,
};
pub use router::candidate_router;
pub use service::{CandidateWorkflowService, TransitionReceipt, WorkflowServiceError};
pub use transitions::{available_transitions, EdgeKind, TransitionEdge, TransitionTable};
