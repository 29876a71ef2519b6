use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use chrono::{Duration, TimeZone, Utc};
use hireflow::config::PipelineConfig;
use hireflow::workflows::roster::{CandidateRosterImporter, RosterImportError};
use hireflow::workflows::candidates::{
    attempt_transition, candidate_router, replay, ActorRole, CandidateEmail, CandidateId,
    CandidateProfile, CandidateRecord, CandidateRepository, CandidateStatus,
    CandidateWorkflowService, CandidateWorkflowState, DispatchError, Notification,
    NotificationDispatcher, RepositoryError, SideEffect, TransitionCommand, TransitionError,
    TransitionRequest, WorkflowServiceError,
};
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Default)]
struct SharedRepository {
    records: Mutex<HashMap<String, CandidateRecord>>,
}

impl CandidateRepository for SharedRepository {
    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        let mut records = self.records.lock().expect("repository lock");
        if records.contains_key(&record.id().0) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(record.id().0.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        Ok(self.records.lock().expect("repository lock").get(&id.0).cloned())
    }

    fn list(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        let mut records: Vec<_> = self
            .records
            .lock()
            .expect("repository lock")
            .values()
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id().0.cmp(&b.id().0));
        Ok(records)
    }

    fn compare_and_swap(
        &self,
        expected_status: CandidateStatus,
        expected_revision: usize,
        record: CandidateRecord,
    ) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().expect("repository lock");
        let stored = records
            .get_mut(&record.id().0)
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

#[derive(Default)]
struct Outbox {
    notifications: Mutex<Vec<Notification>>,
    emails: Mutex<Vec<CandidateEmail>>,
}

impl NotificationDispatcher for Outbox {
    fn notify(&self, notification: Notification) -> Result<(), DispatchError> {
        self.notifications
            .lock()
            .expect("outbox lock")
            .push(notification);
        Ok(())
    }

    fn send_email(&self, email: CandidateEmail) -> Result<(), DispatchError> {
        self.emails.lock().expect("outbox lock").push(email);
        Ok(())
    }
}

fn grace() -> CandidateProfile {
    CandidateProfile {
        name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        phone: Some("555-0100".to_string()),
        skills: vec!["COBOL".to_string(), "Compilers".to_string()],
        source: Some("conference".to_string()),
        job_title: Some("Staff Engineer".to_string()),
    }
}

fn service() -> (
    Arc<CandidateWorkflowService<SharedRepository, Outbox>>,
    Arc<Outbox>,
) {
    let outbox = Arc::new(Outbox::default());
    let service = CandidateWorkflowService::new(
        Arc::new(SharedRepository::default()),
        outbox.clone(),
        PipelineConfig::default(),
    );
    (Arc::new(service), outbox)
}

fn step(from: CandidateStatus, to: CandidateStatus, role: ActorRole) -> TransitionCommand {
    TransitionCommand {
        current_status: from.as_str().to_string(),
        target_status: to.as_str().to_string(),
        actor_role: role.as_str().to_string(),
        notes: None,
    }
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[test]
fn recruiter_cannot_shortlist_for_the_client() {
    let (service, outbox) = service();
    let record = service.create(grace()).expect("candidate registered");
    let id = record.id().clone();

    use ActorRole::*;
    use CandidateStatus::*;
    for (from, to, role) in [
        (New, Applied, Candidate),
        (Applied, Called, Recruiter),
        (Called, FeedbackAdded, Recruiter),
        (FeedbackAdded, SentToAm, Recruiter),
        (SentToAm, AmShortlisted, AccountManager),
        (AmShortlisted, SentToClient, AccountManager),
    ] {
        service
            .transition(&id, &step(from, to, role))
            .expect("pipeline step succeeds");
    }

    let err = service
        .transition(&id, &step(SentToClient, ClientShortlisted, Recruiter))
        .expect_err("recruiter may not shortlist on behalf of the client");
    assert!(matches!(
        err,
        WorkflowServiceError::Transition(TransitionError::Forbidden { .. })
    ));

    let stored = service.get(&id).expect("candidate stored");
    assert_eq!(stored.state.status(), SentToClient);
    assert_eq!(stored.state.revision(), 6);

    let receipt = service
        .transition(&id, &step(SentToClient, ClientShortlisted, Client))
        .expect("client shortlists");
    assert_eq!(
        receipt.effects,
        vec![
            SideEffect::NotifyRecruiter,
            SideEffect::NotifyAccountManager,
            SideEffect::ScheduleInterviewPrompt,
        ]
    );
    let notified: Vec<ActorRole> = outbox
        .notifications
        .lock()
        .expect("outbox lock")
        .iter()
        .filter(|notification| notification.status == ClientShortlisted)
        .map(|notification| notification.recipient_role)
        .collect();
    assert_eq!(notified, vec![Recruiter, AccountManager, Recruiter]);
}

#[test]
fn roster_seed_registers_new_candidates_and_stops_on_bad_rows() {
    let (service, _) = service();
    let roster = "Name,Email,Skills\n\
                  Ada Lovelace,ada@example.com,Rust;Analytics\n\
                  Alan Turing,alan@example.com,Cryptography\n";
    let profiles =
        CandidateRosterImporter::from_reader(roster.as_bytes()).expect("roster parses");

    let records =
        CandidateRosterImporter::seed(service.as_ref(), profiles).expect("roster seeds");
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|record| record.state.status() == CandidateStatus::New));

    let mut invalid = grace();
    invalid.email = "not-an-email".to_string();
    let err = CandidateRosterImporter::seed(service.as_ref(), vec![invalid])
        .expect_err("invalid email rejected");
    assert!(matches!(
        err,
        RosterImportError::Registration(WorkflowServiceError::InvalidProfile(_))
    ));
}

#[test]
fn history_replays_to_the_stored_state() {
    let (service, _) = service();
    let record = service.create(grace()).expect("candidate registered");
    let id = record.id().clone();
    let start = Utc
        .with_ymd_and_hms(2025, 11, 3, 8, 30, 0)
        .single()
        .expect("valid timestamp");

    use ActorRole::*;
    use CandidateStatus::*;
    let steps = [
        (New, Sourced, Recruiter),
        (Sourced, Called, Recruiter),
        (Called, HoldRevisit, Recruiter),
        (HoldRevisit, Called, Recruiter),
        (Called, RejectedByRecruiter, Recruiter),
    ];
    for (index, (from, to, role)) in steps.into_iter().enumerate() {
        let at = start + Duration::hours(index as i64);
        service
            .transition_at(&id, &step(from, to, role), at)
            .expect("step succeeds");
    }

    let stored = service.get(&id).expect("candidate stored");
    let rebuilt = replay(id.clone(), stored.state.history()).expect("history replays");
    assert_eq!(rebuilt, stored.state);
    assert_eq!(rebuilt.status(), RejectedByRecruiter);
    assert_eq!(rebuilt.last_changed_at(), Some(start + Duration::hours(4)));
}

#[test]
fn engine_is_pure_over_the_input_state() {
    let state = CandidateWorkflowState::new(CandidateId("cand-pure".to_string()));
    let request = TransitionRequest {
        current_status: CandidateStatus::New,
        target_status: CandidateStatus::Applied,
        actor_role: ActorRole::Candidate,
        notes: "self-applied".to_string(),
    };
    let now = Utc::now();

    let first = attempt_transition(&state, &request, now).expect("legal transition");
    let second = attempt_transition(&state, &request, now).expect("legal transition");

    assert_eq!(first, second);
    assert_eq!(state.status(), CandidateStatus::New);
    assert!(state.history().is_empty());
    assert_eq!(first.state.history().len(), 1);
}

#[tokio::test]
async fn http_pipeline_round_trip() {
    let (service, outbox) = service();
    let router = candidate_router(service);

    let (status, created) = send(
        &router,
        post_json(
            "/api/v1/candidates",
            json!({
                "name": "Grace Hopper",
                "email": "grace@example.com",
                "skills": ["COBOL", "Compilers"],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "new");
    let id = created["candidate_id"]
        .as_str()
        .expect("candidate id present")
        .to_string();

    let (status, actions) = send(
        &router,
        get(&format!("/api/v1/candidates/{id}/actions?role=candidate")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(actions["actions"], json!(["applied"]));

    let transition_uri = format!("/api/v1/candidates/{id}/transition");
    let (status, receipt) = send(
        &router,
        post_json(
            &transition_uri,
            json!({
                "current_status": "new",
                "target_status": "applied",
                "actor_role": "candidate",
                "notes": "via careers page",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["candidate"]["status"], "applied");
    assert_eq!(receipt["entry"]["notes"], "via careers page");

    let (status, stale) = send(
        &router,
        post_json(
            &transition_uri,
            json!({
                "current_status": "new",
                "target_status": "sourced",
                "actor_role": "recruiter",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(stale["error"], "stale_state");

    let (status, history) = send(&router, get(&format!("/api/v1/candidates/{id}/history"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["history"].as_array().map(Vec::len), Some(1));

    let (status, listing) = send(&router, get("/api/v1/candidates?status=applied&q=cobol")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["items"][0]["candidate_id"], id.as_str());

    let (status, missing) = send(&router, get("/api/v1/candidates/cand-missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["error"], "not_found");

    assert!(outbox.emails.lock().expect("outbox lock").is_empty());
}
