//! Periodic data refresh.
//!
//! One loop owns all polling. Each cycle fetches the vacancy board and the
//! direct teacher signups concurrently, folds applicants without a signup
//! into the teacher roster, and commits both collections to the store in a
//! single step. A failed cycle leaves the previous data in place.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tutorlink_model::{Teacher, Vacancy};

use crate::client::ApiClient;
use crate::error::ConsoleError;
use crate::notify::Notifier;
use crate::state::StateStore;

/// Combine direct signups with teachers derived from vacancy applications.
///
/// Direct entries win over derived ones; each teacher appears once, in
/// first-seen order.
pub fn merge_teachers(direct: Vec<Teacher>, vacancies: &[Vacancy]) -> Vec<Teacher> {
    let mut seen: HashSet<String> = direct.iter().map(|t| t.id.clone()).collect();
    let mut merged = direct;
    for vacancy in vacancies {
        for application in &vacancy.applications {
            if seen.insert(application.teacher.id.clone()) {
                merged.push(Teacher::from_application(application));
            }
        }
    }
    merged
}

/// Fetches dashboard data on an interval and commits it to the store.
pub struct Synchronizer {
    client: Arc<ApiClient>,
    store: Arc<StateStore>,
    notifier: Notifier,
    interval: Duration,
}

impl Synchronizer {
    pub fn new(
        client: Arc<ApiClient>,
        store: Arc<StateStore>,
        notifier: Notifier,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            store,
            notifier,
            interval,
        }
    }

    /// Run the refresh loop until shutdown. The interval's first tick
    /// fires immediately, so startup gets its initial load from the same
    /// path as every later cycle.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Starting refresh loop"
        );

        let mut consecutive_failures = 0u32;
        let mut interval_timer = tokio::time::interval(self.interval);
        let mut first_cycle = true;

        loop {
            tokio::select! {
                _ = interval_timer.tick() => {
                    match self.refresh(first_cycle).await {
                        Ok(()) => {
                            consecutive_failures = 0;
                        }
                        Err(e) => {
                            consecutive_failures += 1;
                            if consecutive_failures <= 3 {
                                warn!(error = %e, consecutive_failures, "Refresh failed");
                            } else {
                                error!(error = %e, consecutive_failures, "Refresh failed repeatedly");
                            }
                            self.notifier.failure("Failed to fetch data", &e);
                        }
                    }
                    first_cycle = false;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Refresh loop shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One refresh cycle. `show_loading` drives the loading flag so only
    /// the initial load blanks the dashboard; background cycles swap data
    /// in silently.
    pub async fn refresh(&self, show_loading: bool) -> Result<(), ConsoleError> {
        if show_loading {
            self.store.set_loading(true).await;
        }
        let outcome = self.fetch_and_commit().await;
        if show_loading {
            self.store.set_loading(false).await;
        }
        outcome
    }

    /// Refresh and surface any failure as a notice. For fire-and-forget
    /// refreshes spawned after a status change.
    pub async fn refresh_reporting(&self) {
        if let Err(e) = self.refresh(false).await {
            warn!(error = %e, "Follow-up refresh failed");
            self.notifier.failure("Failed to fetch data", &e);
        }
    }

    async fn fetch_and_commit(&self) -> Result<(), ConsoleError> {
        let (vacancies, direct) = tokio::try_join!(
            self.client.list_vacancies(),
            self.client.list_teacher_signups(),
        )?;

        let teachers = merge_teachers(direct, &vacancies);
        debug!(
            vacancies = vacancies.len(),
            teachers = teachers.len(),
            "Refresh committed"
        );
        self.store.commit_refresh(vacancies, teachers).await;
        Ok(())
    }
}
