use hireflow::workflows::candidates::{
    CandidateEmail, CandidateId, CandidateRecord, CandidateRepository, CandidateStatus,
    DispatchError, Notification, NotificationDispatcher, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct CandidateStore {
    order: Vec<CandidateId>,
    records: HashMap<CandidateId, CandidateRecord>,
}

/// Process-local stand-in for the candidate datastore.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCandidateRepository {
    store: Arc<Mutex<CandidateStore>>,
}

impl InMemoryCandidateRepository {
    fn lock(&self) -> Result<MutexGuard<'_, CandidateStore>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("candidate store poisoned".to_string()))
    }
}

impl CandidateRepository for InMemoryCandidateRepository {
    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.records.contains_key(record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.order.push(record.id().clone());
        guard.records.insert(record.id().clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.records.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .order
            .iter()
            .filter_map(|id| guard.records.get(id).cloned())
            .collect())
    }

    fn compare_and_swap(
        &self,
        expected_status: CandidateStatus,
        expected_revision: usize,
        record: CandidateRecord,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let stored = guard
            .records
            .get_mut(record.id())
            .ok_or(RepositoryError::NotFound)?;
        let (actual, revision) = (stored.state.status(), stored.state.revision());
        if actual != expected_status || revision != expected_revision {
            return Err(RepositoryError::VersionMismatch { actual, revision });
        }
        *stored = record;
        Ok(())
    }
}

/// Logs outbound notifications and keeps them for inspection.
#[derive(Default, Clone)]
pub(crate) struct LoggingDispatcher {
    notifications: Arc<Mutex<Vec<Notification>>>,
    emails: Arc<Mutex<Vec<CandidateEmail>>>,
}

impl LoggingDispatcher {
    #[cfg(test)]
    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn emails(&self) -> Vec<CandidateEmail> {
        self.emails
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationDispatcher for LoggingDispatcher {
    fn notify(&self, notification: Notification) -> Result<(), DispatchError> {
        info!(
            candidate_id = %notification.candidate_id,
            kind = notification.kind.label(),
            recipient = %notification.recipient_role,
            "notification queued"
        );
        self.notifications
            .lock()
            .map_err(|_| DispatchError::Transport("notification log poisoned".to_string()))?
            .push(notification);
        Ok(())
    }

    fn send_email(&self, email: CandidateEmail) -> Result<(), DispatchError> {
        info!(
            candidate_id = %email.candidate_id,
            to = %email.to,
            subject = %email.subject,
            "candidate email queued"
        );
        self.emails
            .lock()
            .map_err(|_| DispatchError::Transport("email log poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}
