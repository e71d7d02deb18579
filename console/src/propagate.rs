//! Status change propagation.
//!
//! Persist-then-update: the server accepts a status change first, and only
//! then does local state move. There is no optimistic update to roll back.
//! Outcomes surface as notices; a background refresh follows every
//! successful change to pick up whatever else moved server-side.

use std::sync::Arc;

use tracing::{info, warn};
use tutorlink_model::{ApplicationStatus, TeacherStatus, VacancyStatus};

use crate::client::ApiClient;
use crate::notify::Notifier;
use crate::session::SessionStore;
use crate::state::StateStore;
use crate::sync::Synchronizer;

pub struct StatusPropagator {
    client: Arc<ApiClient>,
    store: Arc<StateStore>,
    session: SessionStore,
    notifier: Notifier,
    sync: Arc<Synchronizer>,
}

impl StatusPropagator {
    pub fn new(
        client: Arc<ApiClient>,
        store: Arc<StateStore>,
        session: SessionStore,
        notifier: Notifier,
        sync: Arc<Synchronizer>,
    ) -> Self {
        Self {
            client,
            store,
            session,
            notifier,
            sync,
        }
    }

    /// Change a teacher's review status everywhere it is displayed.
    pub async fn apply_teacher_status(&self, teacher_id: &str, status: TeacherStatus) {
        if teacher_id.trim().is_empty() {
            self.notifier.error("Invalid teacher id");
            return;
        }

        if let Err(e) = self.client.update_teacher_status(teacher_id, status).await {
            warn!(teacher_id = %teacher_id, error = %e, "Teacher status update rejected");
            self.notifier.failure("Failed to update status", &e);
            return;
        }

        self.store.apply_teacher_status(teacher_id, status).await;
        self.persist_overrides().await;

        info!(teacher_id = %teacher_id, status = %status, "Teacher status updated");
        self.notifier
            .success(format!("Teacher {} successfully", status));
        self.spawn_refresh();
    }

    /// Change one application's status without touching the rest of the
    /// teacher's applications. Accepting also closes the owning vacancy.
    pub async fn apply_application_status(&self, application_id: &str, status: ApplicationStatus) {
        let Some(vacancy_id) = self.store.find_vacancy_for_application(application_id).await
        else {
            self.notifier.error("Application not found");
            return;
        };

        if let Err(e) = self
            .client
            .update_application_status(&vacancy_id, application_id, status)
            .await
        {
            warn!(
                application_id = %application_id,
                vacancy_id = %vacancy_id,
                error = %e,
                "Application status update rejected"
            );
            self.notifier.failure("Failed to update application", &e);
            return;
        }

        self.store
            .apply_application_status(application_id, status)
            .await;

        info!(
            application_id = %application_id,
            vacancy_id = %vacancy_id,
            status = %status,
            "Application status updated"
        );
        self.notifier
            .success(format!("Application {} successfully", status));

        if status == ApplicationStatus::Accepted {
            self.close_vacancy_after_accept(&vacancy_id).await;
        }

        self.spawn_refresh();
    }

    /// Follow-up to an accepted application. The acceptance already stands,
    /// so a failure here only leaves the vacancy open and warns.
    async fn close_vacancy_after_accept(&self, vacancy_id: &str) {
        match self
            .client
            .update_vacancy_status(vacancy_id, VacancyStatus::Closed)
            .await
        {
            Ok(()) => {
                self.store
                    .set_vacancy_status(vacancy_id, VacancyStatus::Closed)
                    .await;
                info!(vacancy_id = %vacancy_id, "Vacancy closed after acceptance");
                self.notifier.info("Vacancy closed");
            }
            Err(e) => {
                warn!(vacancy_id = %vacancy_id, error = %e, "Vacancy close failed after acceptance");
                self.notifier
                    .warning("Application accepted, but the vacancy could not be closed");
            }
        }
    }

    async fn persist_overrides(&self) {
        let overrides = self.store.teacher_overrides().await;
        if let Err(e) = self.session.save_overrides(&overrides) {
            warn!(error = %e, "Failed to persist status overrides");
        }
    }

    fn spawn_refresh(&self) {
        let sync = Arc::clone(&self.sync);
        tokio::spawn(async move { sync.refresh_reporting().await });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::notify::{self, NoticeLevel, Notifier};
    use tempfile::TempDir;

    fn make_propagator(notifier: Notifier) -> (StatusPropagator, TempDir) {
        let config = Config::default();
        let client = Arc::new(ApiClient::new(&config, None).unwrap());
        let store = Arc::new(StateStore::new());
        let dir = tempfile::tempdir().unwrap();
        let session = SessionStore::at(dir.path().join("session.json"));
        let sync = Arc::new(Synchronizer::new(
            Arc::clone(&client),
            Arc::clone(&store),
            notifier.clone(),
            config.refresh_interval,
        ));
        (
            StatusPropagator::new(client, store, session, notifier, sync),
            dir,
        )
    }

    #[tokio::test]
    async fn test_blank_teacher_id_is_rejected_before_any_request() {
        let (notifier, mut notices) = notify::channel();
        let (propagator, _dir) = make_propagator(notifier);

        propagator
            .apply_teacher_status("  ", TeacherStatus::Approved)
            .await;

        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Invalid teacher id");
    }

    #[tokio::test]
    async fn test_unknown_application_is_rejected_before_any_request() {
        let (notifier, mut notices) = notify::channel();
        let (propagator, _dir) = make_propagator(notifier);

        propagator
            .apply_application_status("a404", ApplicationStatus::Accepted)
            .await;

        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Application not found");
    }
}
