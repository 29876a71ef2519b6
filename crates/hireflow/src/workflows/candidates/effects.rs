use serde::{Deserialize, Serialize};

use super::domain::{ActorRole, CandidateId, CandidateStatus};

/// Action the caller must perform once a transition commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    NotifyRecruiter,
    NotifyAccountManager,
    NotifyClient,
    NotifyCandidateEmail,
    ScheduleInterviewPrompt,
}

impl SideEffect {
    pub const fn recipient_role(self) -> ActorRole {
        match self {
            Self::NotifyRecruiter | Self::ScheduleInterviewPrompt => ActorRole::Recruiter,
            Self::NotifyAccountManager => ActorRole::AccountManager,
            Self::NotifyClient => ActorRole::Client,
            Self::NotifyCandidateEmail => ActorRole::Candidate,
        }
    }

    /// Candidate-facing effects go out as email rather than in-app notifications.
    pub const fn is_email(self) -> bool {
        matches!(self, Self::NotifyCandidateEmail)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotifyRecruiter => "notify_recruiter",
            Self::NotifyAccountManager => "notify_account_manager",
            Self::NotifyClient => "notify_client",
            Self::NotifyCandidateEmail => "notify_candidate_email",
            Self::ScheduleInterviewPrompt => "schedule_interview_prompt",
        }
    }
}

/// Ordered intents emitted when a candidate lands on `to`.
pub fn effects_for(to: CandidateStatus) -> Vec<SideEffect> {
    use CandidateStatus::*;
    use SideEffect::*;

    match to {
        SentToAm => vec![NotifyAccountManager],
        AmShortlisted | AmHold | AmRejected => vec![NotifyRecruiter],
        SentToClient => vec![NotifyClient],
        ClientShortlisted => vec![
            NotifyRecruiter,
            NotifyAccountManager,
            ScheduleInterviewPrompt,
        ],
        ClientHold | ClientRejected => vec![NotifyRecruiter, NotifyAccountManager],
        InterviewScheduled => vec![NotifyCandidateEmail, NotifyClient],
        InterviewCompleted => vec![NotifyClient],
        Selected => vec![NotifyRecruiter, NotifyCandidateEmail],
        OfferExtended => vec![NotifyCandidateEmail],
        OfferAccepted | OfferDeclined => vec![NotifyRecruiter, NotifyAccountManager],
        Hired => vec![NotifyCandidateEmail, NotifyAccountManager],
        Joined => vec![NotifyAccountManager],
        Rejected => vec![NotifyCandidateEmail],
        New | Applied | Sourced | Called | FeedbackAdded | HoldRevisit | RejectedByRecruiter
        | AmViewed | ClientViewed | Negotiation => Vec::new(),
    }
}

/// Payload handed to the notification dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub candidate_id: CandidateId,
    pub kind: SideEffect,
    pub recipient_role: ActorRole,
    pub status: CandidateStatus,
}

/// Payload handed to the email sender for candidate-facing effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEmail {
    pub candidate_id: CandidateId,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl CandidateEmail {
    pub(crate) fn for_status(
        candidate_id: CandidateId,
        to: String,
        name: &str,
        status: CandidateStatus,
    ) -> Self {
        let subject = format!("Application update: {}", status.label());
        let body = match status {
            CandidateStatus::InterviewScheduled => format!(
                "Hi {name}, your interview has been scheduled. Your recruiter will share the details shortly."
            ),
            CandidateStatus::Selected => {
                format!("Hi {name}, congratulations! The client has selected you for the role.")
            }
            CandidateStatus::OfferExtended => {
                format!("Hi {name}, an offer has been extended to you. Please review and respond.")
            }
            CandidateStatus::Hired => {
                format!("Hi {name}, welcome aboard! Onboarding information will follow.")
            }
            CandidateStatus::Rejected => format!(
                "Hi {name}, thank you for your time. The client has decided not to move forward."
            ),
            other => format!("Hi {name}, your application status is now {}.", other.label()),
        };

        Self {
            candidate_id,
            to,
            subject,
            body,
        }
    }
}
