use crate::infra::{InMemoryCandidateRepository, LoggingDispatcher};
use clap::Args;
use hireflow::config::PipelineConfig;
use hireflow::error::AppError;
use hireflow::workflows::candidates::{
    ActorRole, CandidateProfile, CandidateRepository, CandidateStatus, CandidateWorkflowService,
    NotificationDispatcher, TransitionCommand, TransitionError, TransitionReceipt, TransitionTable,
    WorkflowServiceError,
};
use hireflow::workflows::roster::CandidateRosterImporter;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct TransitionsArgs {
    /// Only list edges this role may take (recruiter, account_manager, client, candidate, system)
    #[arg(long)]
    pub(crate) role: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional CSV roster; the first candidate is walked through the pipeline.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

const DEMO_PIPELINE: [(CandidateStatus, ActorRole, &str); 17] = [
    (CandidateStatus::Applied, ActorRole::Candidate, "applied via careers page"),
    (CandidateStatus::Called, ActorRole::Recruiter, "intro call booked"),
    (CandidateStatus::FeedbackAdded, ActorRole::Recruiter, "strong systems background"),
    (CandidateStatus::SentToAm, ActorRole::Recruiter, ""),
    (CandidateStatus::AmViewed, ActorRole::AccountManager, ""),
    (CandidateStatus::AmShortlisted, ActorRole::AccountManager, "good fit"),
    (CandidateStatus::SentToClient, ActorRole::AccountManager, ""),
    (CandidateStatus::ClientViewed, ActorRole::Client, ""),
    (CandidateStatus::ClientShortlisted, ActorRole::Client, "wants to meet"),
    (CandidateStatus::InterviewScheduled, ActorRole::Recruiter, "panel on Tuesday"),
    (CandidateStatus::InterviewCompleted, ActorRole::System, ""),
    (CandidateStatus::Selected, ActorRole::Client, ""),
    (CandidateStatus::Negotiation, ActorRole::Recruiter, "discussing start date"),
    (CandidateStatus::OfferExtended, ActorRole::Recruiter, ""),
    (CandidateStatus::OfferAccepted, ActorRole::Candidate, ""),
    (CandidateStatus::Hired, ActorRole::Recruiter, ""),
    (CandidateStatus::Joined, ActorRole::System, "first day complete"),
];

pub(crate) fn print_transition_table(args: TransitionsArgs) -> Result<(), AppError> {
    let role = args
        .role
        .as_deref()
        .map(str::parse::<ActorRole>)
        .transpose()
        .map_err(TransitionError::from)
        .map_err(WorkflowServiceError::from)?;

    let table = TransitionTable::standard();
    match role {
        Some(role) => println!("Transitions available to {}", role.label()),
        None => println!("Candidate status transitions"),
    }

    for edge in table
        .edges()
        .iter()
        .filter(|edge| role.map_or(true, |role| edge.permits(role)))
    {
        let actors: Vec<&str> = edge.actors.iter().map(|actor| actor.as_str()).collect();
        let marker = if edge.exits_terminal() { " (exit)" } else { "" };
        println!(
            "- {:<22} -> {:<22} [{}]{}",
            edge.from.as_str(),
            edge.to.as_str(),
            actors.join(", "),
            marker
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let profile = match args.roster {
        Some(path) => CandidateRosterImporter::from_path(path)?
            .into_iter()
            .next()
            .unwrap_or_else(demo_profile),
        None => demo_profile(),
    };

    let service = CandidateWorkflowService::new(
        Arc::new(InMemoryCandidateRepository::default()),
        Arc::new(LoggingDispatcher::default()),
        PipelineConfig::default(),
    );

    println!("Candidate pipeline demo for {} <{}>", profile.name, profile.email);
    let receipts = walk_pipeline(&service, profile)?;

    for receipt in &receipts {
        let effects: Vec<&str> = receipt.effects.iter().map(|effect| effect.label()).collect();
        println!(
            "- {} -> {} by {}{}",
            receipt.entry.from_status.label(),
            receipt.entry.to_status.label(),
            receipt.entry.actor_role.label(),
            if effects.is_empty() {
                String::new()
            } else {
                format!(" | effects: {}", effects.join(", "))
            }
        );
        if !receipt.entry.notes.is_empty() {
            println!("  notes: {}", receipt.entry.notes);
        }
    }

    if let Some(last) = receipts.last() {
        let candidate_id = &last.candidate.candidate_id;
        let reopen = TransitionCommand {
            current_status: CandidateStatus::Joined.as_str().to_string(),
            target_status: CandidateStatus::Rejected.as_str().to_string(),
            actor_role: ActorRole::Recruiter.as_str().to_string(),
            notes: None,
        };
        match service.transition(candidate_id, &reopen) {
            Ok(_) => println!("\nUnexpected: joined candidate was rejected"),
            Err(err) => println!("\nGuard check: {err}"),
        }
        println!(
            "Audit trail holds {} entries for {}",
            service.history(candidate_id)?.len(),
            candidate_id
        );
    }

    Ok(())
}

/// Register `profile` and move it from `new` to `joined`.
pub(crate) fn walk_pipeline<R, N>(
    service: &CandidateWorkflowService<R, N>,
    profile: CandidateProfile,
) -> Result<Vec<TransitionReceipt>, AppError>
where
    R: CandidateRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let record = service.create(profile)?;
    let mut current = record.state.status();
    let mut receipts = Vec::with_capacity(DEMO_PIPELINE.len());

    for (target, role, notes) in DEMO_PIPELINE {
        let command = TransitionCommand {
            current_status: current.as_str().to_string(),
            target_status: target.as_str().to_string(),
            actor_role: role.as_str().to_string(),
            notes: Some(notes.to_string()),
        };
        receipts.push(service.transition(record.id(), &command)?);
        current = target;
    }

    Ok(receipts)
}

fn demo_profile() -> CandidateProfile {
    CandidateProfile {
        name: "Jordan Rivera".to_string(),
        email: "jordan.rivera@example.com".to_string(),
        phone: Some("555-0142".to_string()),
        skills: vec![
            "Rust".to_string(),
            "PostgreSQL".to_string(),
            "Distributed systems".to_string(),
        ],
        source: Some("referral".to_string()),
        job_title: Some("Senior Backend Engineer".to_string()),
    }
}
