//! Pure decision function for candidate status changes.
//!
//! `attempt_transition` never touches persistence or notification transports: it returns the
//! next state and the side-effect intents, and callers decide how to commit and dispatch them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ActorRole, CandidateId, CandidateStatus, CandidateWorkflowState, HistoryEntry, UnknownRole,
    UnknownStatus,
};
use super::effects::{effects_for, SideEffect};
use super::transitions::TransitionTable;

/// Typed transition request; `current_status` is the status the caller last observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    pub current_status: CandidateStatus,
    pub target_status: CandidateStatus,
    pub actor_role: ActorRole,
    pub notes: String,
}

/// Untyped request as it arrives over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCommand {
    pub current_status: String,
    pub target_status: String,
    pub actor_role: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TransitionCommand {
    pub fn parse(&self) -> Result<TransitionRequest, TransitionError> {
        Ok(TransitionRequest {
            current_status: self.current_status.parse()?,
            target_status: self.target_status.parse()?,
            actor_role: self.actor_role.parse()?,
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// Committed-ready result of a legal transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub state: CandidateWorkflowState,
    pub entry: HistoryEntry,
    pub effects: Vec<SideEffect>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("{role} may not move a candidate from {from} to {to}")]
    Forbidden {
        from: CandidateStatus,
        to: CandidateStatus,
        role: ActorRole,
    },
    #[error(transparent)]
    InvalidStatus(#[from] UnknownStatus),
    #[error(transparent)]
    InvalidRole(#[from] UnknownRole),
    #[error("candidate is already {status}")]
    NoOpTransition { status: CandidateStatus },
    #[error("{from} is terminal; {to} is not a permitted exit")]
    TerminalStateViolation {
        from: CandidateStatus,
        to: CandidateStatus,
    },
    #[error("candidate status changed: request observed {observed}, current status is {actual}")]
    StaleState {
        observed: CandidateStatus,
        actual: CandidateStatus,
    },
}

impl TransitionError {
    /// Stable machine-readable code used in API error bodies.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidStatus(_) => "invalid_status",
            Self::InvalidRole(_) => "invalid_role",
            Self::NoOpTransition { .. } => "no_op_transition",
            Self::TerminalStateViolation { .. } => "terminal_state_violation",
            Self::StaleState { .. } => "stale_state",
        }
    }
}

/// Decide whether `request` may be applied to `state`.
pub fn attempt_transition(
    state: &CandidateWorkflowState,
    request: &TransitionRequest,
    now: DateTime<Utc>,
) -> Result<TransitionOutcome, TransitionError> {
    let TransitionRequest {
        current_status,
        target_status,
        actor_role,
        notes,
    } = request;
    let (from, to, role) = (*current_status, *target_status, *actor_role);

    if from != state.status() {
        return Err(TransitionError::StaleState {
            observed: from,
            actual: state.status(),
        });
    }

    if from == to {
        return Err(TransitionError::NoOpTransition { status: from });
    }

    let table = TransitionTable::standard();
    let edge = table.edge(from, to);

    if from.is_terminal() && !edge.is_some_and(|edge| edge.exits_terminal()) {
        return Err(TransitionError::TerminalStateViolation { from, to });
    }

    match edge {
        Some(edge) if edge.permits(role) => {}
        _ => return Err(TransitionError::Forbidden { from, to, role }),
    }

    let entry = HistoryEntry {
        from_status: from,
        to_status: to,
        actor_role: role,
        timestamp: now,
        notes: notes.clone(),
    };

    Ok(TransitionOutcome {
        state: state.advance(entry.clone()),
        entry,
        effects: effects_for(to),
    })
}

/// Rebuild a state by re-applying `history` from a fresh candidate.
pub fn replay(
    candidate_id: CandidateId,
    history: &[HistoryEntry],
) -> Result<CandidateWorkflowState, TransitionError> {
    history
        .iter()
        .try_fold(CandidateWorkflowState::new(candidate_id), |state, entry| {
            let request = TransitionRequest {
                current_status: entry.from_status,
                target_status: entry.to_status,
                actor_role: entry.actor_role,
                notes: entry.notes.clone(),
            };
            attempt_transition(&state, &request, entry.timestamp).map(|outcome| outcome.state)
        })
}
