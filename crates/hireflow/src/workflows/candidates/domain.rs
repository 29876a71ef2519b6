use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for candidates tracked by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of pipeline stages a candidate moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    New,
    Applied,
    Sourced,
    Called,
    FeedbackAdded,
    HoldRevisit,
    RejectedByRecruiter,
    SentToAm,
    AmViewed,
    AmShortlisted,
    AmHold,
    AmRejected,
    SentToClient,
    ClientViewed,
    ClientShortlisted,
    ClientHold,
    ClientRejected,
    InterviewScheduled,
    InterviewCompleted,
    Selected,
    Negotiation,
    OfferExtended,
    OfferAccepted,
    OfferDeclined,
    Hired,
    Joined,
    Rejected,
}

impl CandidateStatus {
    pub const ALL: [Self; 27] = [
        Self::New,
        Self::Applied,
        Self::Sourced,
        Self::Called,
        Self::FeedbackAdded,
        Self::HoldRevisit,
        Self::RejectedByRecruiter,
        Self::SentToAm,
        Self::AmViewed,
        Self::AmShortlisted,
        Self::AmHold,
        Self::AmRejected,
        Self::SentToClient,
        Self::ClientViewed,
        Self::ClientShortlisted,
        Self::ClientHold,
        Self::ClientRejected,
        Self::InterviewScheduled,
        Self::InterviewCompleted,
        Self::Selected,
        Self::Negotiation,
        Self::OfferExtended,
        Self::OfferAccepted,
        Self::OfferDeclined,
        Self::Hired,
        Self::Joined,
        Self::Rejected,
    ];

    /// Wire name, identical to the serde representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Applied => "applied",
            Self::Sourced => "sourced",
            Self::Called => "called",
            Self::FeedbackAdded => "feedback_added",
            Self::HoldRevisit => "hold_revisit",
            Self::RejectedByRecruiter => "rejected_by_recruiter",
            Self::SentToAm => "sent_to_am",
            Self::AmViewed => "am_viewed",
            Self::AmShortlisted => "am_shortlisted",
            Self::AmHold => "am_hold",
            Self::AmRejected => "am_rejected",
            Self::SentToClient => "sent_to_client",
            Self::ClientViewed => "client_viewed",
            Self::ClientShortlisted => "client_shortlisted",
            Self::ClientHold => "client_hold",
            Self::ClientRejected => "client_rejected",
            Self::InterviewScheduled => "interview_scheduled",
            Self::InterviewCompleted => "interview_completed",
            Self::Selected => "selected",
            Self::Negotiation => "negotiation",
            Self::OfferExtended => "offer_extended",
            Self::OfferAccepted => "offer_accepted",
            Self::OfferDeclined => "offer_declined",
            Self::Hired => "hired",
            Self::Joined => "joined",
            Self::Rejected => "rejected",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Applied => "Applied",
            Self::Sourced => "Sourced",
            Self::Called => "Called",
            Self::FeedbackAdded => "Feedback Added",
            Self::HoldRevisit => "On Hold (Revisit)",
            Self::RejectedByRecruiter => "Rejected by Recruiter",
            Self::SentToAm => "Sent to Account Manager",
            Self::AmViewed => "Viewed by Account Manager",
            Self::AmShortlisted => "Shortlisted by Account Manager",
            Self::AmHold => "On Hold (Account Manager)",
            Self::AmRejected => "Rejected by Account Manager",
            Self::SentToClient => "Sent to Client",
            Self::ClientViewed => "Viewed by Client",
            Self::ClientShortlisted => "Shortlisted by Client",
            Self::ClientHold => "On Hold (Client)",
            Self::ClientRejected => "Rejected by Client",
            Self::InterviewScheduled => "Interview Scheduled",
            Self::InterviewCompleted => "Interview Completed",
            Self::Selected => "Selected",
            Self::Negotiation => "Negotiation",
            Self::OfferExtended => "Offer Extended",
            Self::OfferAccepted => "Offer Accepted",
            Self::OfferDeclined => "Offer Declined",
            Self::Hired => "Hired",
            Self::Joined => "Joined",
            Self::Rejected => "Rejected",
        }
    }

    /// Terminal statuses only leave through the exit edges in the transition table.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Hired | Self::Joined | Self::Rejected | Self::OfferDeclined
        )
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a recognised candidate status")]
pub struct UnknownStatus(pub String);

/// Permission class of whoever requests a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Recruiter,
    AccountManager,
    Client,
    Candidate,
    System,
}

impl ActorRole {
    pub const ALL: [Self; 5] = [
        Self::Recruiter,
        Self::AccountManager,
        Self::Client,
        Self::Candidate,
        Self::System,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recruiter => "recruiter",
            Self::AccountManager => "account_manager",
            Self::Client => "client",
            Self::Candidate => "candidate",
            Self::System => "system",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Recruiter => "Recruiter",
            Self::AccountManager => "Account Manager",
            Self::Client => "Client",
            Self::Candidate => "Candidate",
            Self::System => "System",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| UnknownRole(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a recognised actor role")]
pub struct UnknownRole(pub String);

/// Audit entry recorded for every committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub from_status: CandidateStatus,
    pub to_status: CandidateStatus,
    pub actor_role: ActorRole,
    pub timestamp: DateTime<Utc>,
    pub notes: String,
}

/// Authoritative workflow state for one candidate.
///
/// Fields are read-only from outside the crate; the engine is the only writer so the history
/// stays append-only. Persisted states are rebuilt with [`replay`](super::engine::replay)
/// rather than deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateWorkflowState {
    candidate_id: CandidateId,
    status: CandidateStatus,
    actor_role: ActorRole,
    history: Vec<HistoryEntry>,
}

impl CandidateWorkflowState {
    pub fn new(candidate_id: CandidateId) -> Self {
        Self {
            candidate_id,
            status: CandidateStatus::New,
            actor_role: ActorRole::System,
            history: Vec::new(),
        }
    }

    pub fn candidate_id(&self) -> &CandidateId {
        &self.candidate_id
    }

    pub fn status(&self) -> CandidateStatus {
        self.status
    }

    pub fn actor_role(&self) -> ActorRole {
        self.actor_role
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Number of committed transitions, used as the optimistic-concurrency version.
    pub fn revision(&self) -> usize {
        self.history.len()
    }

    pub fn last_changed_at(&self) -> Option<DateTime<Utc>> {
        self.history.last().map(|entry| entry.timestamp)
    }

    pub(crate) fn advance(&self, entry: HistoryEntry) -> Self {
        let mut next = self.clone();
        next.status = entry.to_status;
        next.actor_role = entry.actor_role;
        next.history.push(entry);
        next
    }
}

/// Profile data shown on listing and detail screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
}
