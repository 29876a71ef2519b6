use std::sync::OnceLock;

use serde::Serialize;

use super::domain::{ActorRole, CandidateStatus};

use ActorRole::{AccountManager, Candidate, Client, Recruiter, System};
use CandidateStatus::*;

/// How an edge relates to the terminal-status rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Standard,
    /// Leaves a terminal status after the offer closes (`hired -> joined`).
    Completion,
    /// Re-opens a closed candidate for a later requisition.
    Reactivation,
}

struct TransitionRule {
    from: &'static [CandidateStatus],
    to: &'static [CandidateStatus],
    actors: &'static [ActorRole],
    kind: EdgeKind,
}

const fn rule(
    from: &'static [CandidateStatus],
    to: &'static [CandidateStatus],
    actors: &'static [ActorRole],
) -> TransitionRule {
    TransitionRule {
        from,
        to,
        actors,
        kind: EdgeKind::Standard,
    }
}

const RULES: &[TransitionRule] = &[
    rule(&[New], &[Applied], &[Candidate, System]),
    rule(&[New], &[Sourced], &[Recruiter]),
    rule(
        &[New, Applied, Sourced],
        &[Called, FeedbackAdded, HoldRevisit, RejectedByRecruiter],
        &[Recruiter],
    ),
    rule(
        &[Called],
        &[FeedbackAdded, HoldRevisit, RejectedByRecruiter],
        &[Recruiter],
    ),
    rule(
        &[FeedbackAdded],
        &[HoldRevisit, RejectedByRecruiter],
        &[Recruiter],
    ),
    rule(&[Called, FeedbackAdded], &[SentToAm], &[Recruiter]),
    rule(
        &[HoldRevisit],
        &[Called, FeedbackAdded, SentToAm, RejectedByRecruiter],
        &[Recruiter],
    ),
    rule(&[RejectedByRecruiter], &[HoldRevisit], &[Recruiter]),
    rule(
        &[SentToAm],
        &[AmViewed, AmShortlisted, AmHold, AmRejected],
        &[AccountManager],
    ),
    rule(
        &[AmViewed],
        &[AmShortlisted, AmHold, AmRejected],
        &[AccountManager],
    ),
    rule(&[AmHold], &[AmShortlisted, AmRejected], &[AccountManager]),
    rule(&[AmRejected], &[HoldRevisit], &[Recruiter]),
    rule(&[AmShortlisted], &[SentToClient], &[AccountManager]),
    rule(
        &[SentToClient],
        &[ClientViewed, ClientShortlisted, ClientHold, ClientRejected],
        &[Client],
    ),
    rule(
        &[ClientViewed],
        &[ClientShortlisted, ClientHold, ClientRejected],
        &[Client],
    ),
    rule(
        &[ClientHold],
        &[ClientShortlisted, ClientRejected],
        &[Client],
    ),
    rule(&[ClientRejected], &[HoldRevisit], &[Recruiter]),
    rule(
        &[ClientShortlisted],
        &[InterviewScheduled],
        &[Recruiter, AccountManager],
    ),
    rule(&[InterviewScheduled], &[InterviewCompleted], &[System]),
    rule(&[InterviewCompleted], &[Selected, Rejected], &[Client]),
    rule(&[Selected], &[Negotiation, OfferExtended], &[Recruiter]),
    rule(&[Negotiation], &[OfferExtended], &[Recruiter]),
    rule(
        &[OfferExtended],
        &[OfferAccepted, OfferDeclined],
        &[Candidate, System],
    ),
    rule(&[OfferAccepted], &[Hired], &[Recruiter]),
    TransitionRule {
        from: &[Hired],
        to: &[Joined],
        actors: &[System],
        kind: EdgeKind::Completion,
    },
    TransitionRule {
        from: &[Rejected, OfferDeclined],
        to: &[HoldRevisit],
        actors: &[Recruiter],
        kind: EdgeKind::Reactivation,
    },
];

/// One `(from, to)` pair and the roles allowed to take it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionEdge {
    pub from: CandidateStatus,
    pub to: CandidateStatus,
    pub actors: Vec<ActorRole>,
    pub kind: EdgeKind,
}

impl TransitionEdge {
    pub fn permits(&self, role: ActorRole) -> bool {
        self.actors.contains(&role)
    }

    /// Edges allowed to leave a terminal status.
    pub fn exits_terminal(&self) -> bool {
        !matches!(self.kind, EdgeKind::Standard)
    }
}

/// Authorization table for candidate status changes.
#[derive(Debug)]
pub struct TransitionTable {
    edges: Vec<TransitionEdge>,
}

impl TransitionTable {
    /// Shared table used by the engine.
    pub fn standard() -> &'static Self {
        static TABLE: OnceLock<TransitionTable> = OnceLock::new();
        TABLE.get_or_init(Self::build)
    }

    fn build() -> Self {
        let mut edges: Vec<TransitionEdge> = Vec::new();
        for rule in RULES {
            for &from in rule.from {
                for &to in rule.to {
                    match edges
                        .iter_mut()
                        .find(|edge| edge.from == from && edge.to == to)
                    {
                        Some(existing) => {
                            for actor in rule.actors {
                                if !existing.actors.contains(actor) {
                                    existing.actors.push(*actor);
                                }
                            }
                        }
                        None => edges.push(TransitionEdge {
                            from,
                            to,
                            actors: rule.actors.to_vec(),
                            kind: rule.kind,
                        }),
                    }
                }
            }
        }
        edges.sort_by_key(|edge| (edge.from, edge.to));
        Self { edges }
    }

    pub fn edges(&self) -> &[TransitionEdge] {
        &self.edges
    }

    pub fn edge(&self, from: CandidateStatus, to: CandidateStatus) -> Option<&TransitionEdge> {
        self.edges
            .iter()
            .find(|edge| edge.from == from && edge.to == to)
    }

    pub fn permits(&self, from: CandidateStatus, to: CandidateStatus, role: ActorRole) -> bool {
        self.edge(from, to).is_some_and(|edge| edge.permits(role))
    }

    /// Edges leaving `from` that `role` may take, in status order.
    pub fn available(&self, from: CandidateStatus, role: ActorRole) -> Vec<&TransitionEdge> {
        self.edges
            .iter()
            .filter(|edge| edge.from == from && edge.permits(role))
            .collect()
    }

    pub fn outgoing(&self, from: CandidateStatus) -> impl Iterator<Item = &TransitionEdge> {
        self.edges.iter().filter(move |edge| edge.from == from)
    }
}

/// The "workflow observer" view: target statuses a viewer may pick from `status`.
pub fn available_transitions(status: CandidateStatus, role: ActorRole) -> Vec<CandidateStatus> {
    TransitionTable::standard()
        .available(status, role)
        .into_iter()
        .map(|edge| edge.to)
        .collect()
}
