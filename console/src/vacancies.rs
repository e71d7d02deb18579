//! Vacancy management actions.
//!
//! All staff actions over postings follow the same persist-then-update
//! shape as status changes: the server call first, local state and a
//! notice after. Submitting a posting has one extra wrinkle, the draft
//! stash: a rejected form is written to the session file so the staff
//! member can resume it after fixing whatever failed, typically a
//! re-login.

use std::sync::Arc;

use tracing::{info, warn};
use tutorlink_model::VacancyForm;

use crate::client::ApiClient;
use crate::notify::Notifier;
use crate::session::SessionStore;
use crate::state::StateStore;
use crate::sync::Synchronizer;

pub struct VacancyManager {
    client: Arc<ApiClient>,
    store: Arc<StateStore>,
    session: SessionStore,
    notifier: Notifier,
    sync: Arc<Synchronizer>,
}

impl VacancyManager {
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

    /// Create or update a posting. On failure the form is stashed in the
    /// session file for later resumption.
    pub async fn submit(&self, form: VacancyForm, existing_id: Option<&str>) {
        let outcome = match existing_id {
            Some(id) => self.client.update_vacancy(id, &form).await,
            None => self.client.create_vacancy(&form).await,
        };

        if let Err(e) = outcome {
            warn!(title = %form.title, error = %e, "Vacancy submit rejected");
            if let Err(stash) = self.session.stash_draft(&form) {
                warn!(error = %stash, "Failed to stash vacancy draft");
            }
            self.notifier.failure("Failed to save vacancy", &e);
            return;
        }

        if let Err(e) = self.session.clear_draft() {
            warn!(error = %e, "Failed to clear vacancy draft");
        }

        let verb = if existing_id.is_some() {
            "updated"
        } else {
            "created"
        };
        info!(title = %form.title, action = verb, "Vacancy saved");
        self.notifier
            .success(format!("Vacancy {} successfully", verb));
        self.reload().await;
    }

    pub async fn delete(&self, vacancy_id: &str) {
        if let Err(e) = self.client.delete_vacancy(vacancy_id).await {
            self.notifier.failure("Failed to delete vacancy", &e);
            return;
        }
        info!(vacancy_id = %vacancy_id, "Vacancy deleted");
        self.notifier.success("Vacancy deleted successfully");
        self.reload().await;
    }

    /// Flag or unflag a posting for the public landing page.
    pub async fn set_featured(&self, vacancy_id: &str, featured: bool) {
        if let Err(e) = self.client.set_vacancy_featured(vacancy_id, featured).await {
            self.notifier.failure("Failed to update vacancy", &e);
            return;
        }
        self.store.set_vacancy_featured(vacancy_id, featured).await;
        info!(vacancy_id = %vacancy_id, featured, "Vacancy featured flag changed");
        self.notifier.success(if featured {
            "Vacancy featured"
        } else {
            "Vacancy unfeatured"
        });
        self.spawn_refresh();
    }

    /// Flip a posting between open and closed.
    pub async fn toggle_status(&self, vacancy_id: &str) {
        let Some(current) = self.store.vacancy_status(vacancy_id).await else {
            self.notifier.error("Vacancy not found");
            return;
        };
        let next = current.toggled();

        if let Err(e) = self.client.update_vacancy_status(vacancy_id, next).await {
            self.notifier.failure("Failed to update vacancy status", &e);
            return;
        }
        self.store.set_vacancy_status(vacancy_id, next).await;
        info!(vacancy_id = %vacancy_id, status = %next, "Vacancy status toggled");
        self.notifier.success(format!("Vacancy is now {}", next));
    }

    /// Load the applicants roster for one vacancy into the store.
    pub async fn open_applicants(&self, vacancy_id: &str) {
        match self.client.vacancy_applicants(vacancy_id).await {
            Ok(entries) => {
                info!(vacancy_id = %vacancy_id, count = entries.len(), "Applicants loaded");
                self.store.set_roster(vacancy_id, entries).await;
            }
            Err(e) => self.notifier.failure("Failed to fetch applicants", &e),
        }
    }

    pub async fn close_applicants(&self) {
        self.store.clear_roster().await;
    }

    /// Awaited reload with the loading flag, after a change to the posting
    /// collection itself.
    async fn reload(&self) {
        if let Err(e) = self.sync.refresh(true).await {
            warn!(error = %e, "Reload after vacancy change failed");
            self.notifier.failure("Failed to fetch data", &e);
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
    use crate::notify::{self, NoticeLevel};
    use tempfile::TempDir;

    // Port 1 refuses connections, so every request fails fast.
    fn unreachable_manager() -> (VacancyManager, SessionStore, TempDir) {
        let config = Config {
            api_url: "http://127.0.0.1:1/api".to_string(),
            ..Config::default()
        };
        let client = Arc::new(ApiClient::new(&config, None).unwrap());
        let store = Arc::new(StateStore::new());
        let dir = tempfile::tempdir().unwrap();
        let session = SessionStore::at(dir.path().join("session.json"));
        let (notifier, _notices) = notify::channel();
        let sync = Arc::new(Synchronizer::new(
            Arc::clone(&client),
            Arc::clone(&store),
            notifier.clone(),
            config.refresh_interval,
        ));
        let manager = VacancyManager::new(client, store, session.clone(), notifier, sync);
        (manager, session, dir)
    }

    fn form(title: &str) -> VacancyForm {
        VacancyForm {
            title: title.to_string(),
            subject: "Mathematics".to_string(),
            description: "Weekday evenings".to_string(),
            requirements: vec!["Degree".to_string()],
            salary: "Rs. 30,000".to_string(),
            featured: false,
        }
    }

    #[tokio::test]
    async fn test_failed_submit_stashes_draft() {
        let (manager, session, _dir) = unreachable_manager();

        manager.submit(form("Grade 10 Maths"), None).await;

        let draft = session.take_draft().unwrap();
        assert_eq!(draft.unwrap().title, "Grade 10 Maths");
    }

    #[tokio::test]
    async fn test_toggle_unknown_vacancy_is_a_validation_error() {
        let config = Config::default();
        let client = Arc::new(ApiClient::new(&config, None).unwrap());
        let store = Arc::new(StateStore::new());
        let dir = tempfile::tempdir().unwrap();
        let session = SessionStore::at(dir.path().join("session.json"));
        let (notifier, mut notices) = notify::channel();
        let sync = Arc::new(Synchronizer::new(
            Arc::clone(&client),
            Arc::clone(&store),
            notifier.clone(),
            config.refresh_interval,
        ));
        let manager = VacancyManager::new(client, store, session, notifier, sync);

        manager.toggle_status("v404").await;

        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Vacancy not found");
    }
}
