//! Dashboard state store.
//!
//! The single merge point for everything the console displays. All
//! mutations go through methods that hold the write lock for their whole
//! read-modify-write, which serializes writers the way the original
//! browser console's event loop serialized its state updates.
//!
//! The store also owns the pin set: statuses the staff confirmed locally
//! that must survive refreshes returning stale data. Pin rules are
//! explicit. Only affirmative statuses pin (approved for teachers,
//! approved/accepted for applications). A pin clears when the server
//! starts reporting the pinned value, or when a local operation assigns a
//! non-affirmative status to the same id. Rejections never pin and may
//! flicker back to an older value until the server catches up.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;
use tutorlink_model::{
    Applicant, ApplicationStatus, NewApplicationEvent, Teacher, TeacherStatus, Vacancy,
    VacancyStatus,
};

use crate::search;

/// Locally confirmed statuses awaiting server acknowledgement.
#[derive(Debug, Clone, Default)]
pub struct PinSet {
    teachers: HashMap<String, TeacherStatus>,
    applications: HashMap<String, ApplicationStatus>,
}

impl PinSet {
    /// Seed from persisted overrides. Only affirmative entries survive the
    /// round trip; anything else has no business being pinned.
    pub fn from_overrides(overrides: HashMap<String, TeacherStatus>) -> Self {
        Self {
            teachers: overrides
                .into_iter()
                .filter(|(_, status)| status.is_positive())
                .collect(),
            applications: HashMap::new(),
        }
    }

    /// Record a teacher decision. Affirmative statuses pin; anything else
    /// clears an existing pin.
    fn note_teacher(&mut self, id: &str, status: TeacherStatus) {
        if status.is_positive() {
            self.teachers.insert(id.to_string(), status);
        } else {
            self.teachers.remove(id);
        }
    }

    /// Record an application decision, same rules as [`Self::note_teacher`].
    fn note_application(&mut self, id: &str, status: ApplicationStatus) {
        if status.is_positive() {
            self.applications.insert(id.to_string(), status);
        } else {
            self.applications.remove(id);
        }
    }

    /// The status to force onto a freshly fetched teacher. Clears the pin
    /// when the server already reports the pinned value.
    fn overlay_teacher(&mut self, id: &str, fetched: TeacherStatus) -> Option<TeacherStatus> {
        match self.teachers.get(id) {
            Some(&pinned) if pinned == fetched => {
                self.teachers.remove(id);
                None
            }
            Some(&pinned) => Some(pinned),
            None => None,
        }
    }

    /// Application-side counterpart of [`Self::overlay_teacher`].
    fn overlay_application(
        &mut self,
        id: &str,
        fetched: ApplicationStatus,
    ) -> Option<ApplicationStatus> {
        match self.applications.get(id) {
            Some(&pinned) if pinned == fetched => {
                self.applications.remove(id);
                None
            }
            Some(&pinned) => Some(pinned),
            None => None,
        }
    }
}

/// The applicants view for one vacancy.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRoster {
    pub vacancy_id: String,
    pub entries: Vec<Applicant>,
}

/// A point-in-time copy of everything the dashboard renders.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub vacancies: Vec<Vacancy>,
    pub teachers: Vec<Teacher>,
    pub roster: Option<ApplicantRoster>,
    /// Id of the vacancy highlighted by the last search, if any.
    pub highlighted: Option<String>,
    pub loading: bool,
}

#[derive(Debug, Default)]
struct Inner {
    vacancies: Vec<Vacancy>,
    teachers: Vec<Teacher>,
    roster: Option<ApplicantRoster>,
    highlighted: Option<String>,
    loading: bool,
    pins: PinSet,
}

/// Dashboard state store.
pub struct StateStore {
    inner: RwLock<Inner>,
}

impl StateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_pins(PinSet::default())
    }

    /// Create a store seeded with pins recovered from the session file.
    pub fn with_pins(pins: PinSet) -> Self {
        Self {
            inner: RwLock::new(Inner {
                pins,
                ..Inner::default()
            }),
        }
    }

    /// A copy of the current dashboard state.
    pub async fn snapshot(&self) -> DashboardState {
        let inner = self.inner.read().await;
        DashboardState {
            vacancies: inner.vacancies.clone(),
            teachers: inner.teachers.clone(),
            roster: inner.roster.clone(),
            highlighted: inner.highlighted.clone(),
            loading: inner.loading,
        }
    }

    pub async fn set_loading(&self, loading: bool) {
        self.inner.write().await.loading = loading;
    }

    /// Commit a completed refresh.
    ///
    /// Overlays the pin set onto the fetched collections, then replaces
    /// both in the same critical section so no reader can observe one
    /// collection updated and the other not.
    pub async fn commit_refresh(&self, mut vacancies: Vec<Vacancy>, mut teachers: Vec<Teacher>) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        for teacher in &mut teachers {
            if let Some(pinned) = inner.pins.overlay_teacher(&teacher.id, teacher.status) {
                debug!(teacher_id = %teacher.id, status = %pinned, "Keeping locally pinned status");
                teacher.status = pinned;
            }
        }
        for vacancy in &mut vacancies {
            for application in &mut vacancy.applications {
                if let Some(pinned) = inner
                    .pins
                    .overlay_application(&application.id, application.status)
                {
                    debug!(
                        application_id = %application.id,
                        status = %pinned,
                        "Keeping locally pinned status"
                    );
                    application.status = pinned;
                }
            }
        }

        inner.vacancies = vacancies;
        inner.teachers = teachers;

        // The highlighted vacancy may be gone after a refresh.
        if let Some(id) = &inner.highlighted {
            if !inner.vacancies.iter().any(|v| &v.id == id) {
                inner.highlighted = None;
            }
        }
    }

    /// Teacher-scope status change: the roster entry, every embedded
    /// application referencing the teacher, and any displayed roster row.
    pub async fn apply_teacher_status(&self, teacher_id: &str, status: TeacherStatus) {
        let mut guard = self.inner.write().await;
        let Inner {
            vacancies,
            teachers,
            roster,
            pins,
            ..
        } = &mut *guard;

        pins.note_teacher(teacher_id, status);
        for teacher in teachers.iter_mut().filter(|t| t.id == teacher_id) {
            teacher.status = status;
        }

        let embedded = ApplicationStatus::from(status);
        for vacancy in vacancies.iter_mut() {
            for application in vacancy.applications.iter_mut() {
                if application.teacher.id == teacher_id {
                    application.status = embedded;
                    pins.note_application(&application.id, embedded);
                }
            }
        }

        if let Some(roster) = roster {
            for entry in roster.entries.iter_mut() {
                if entry.teacher_id.as_deref() == Some(teacher_id) {
                    entry.status = embedded;
                }
            }
        }
    }

    /// Application-scope status change: the embedded application and any
    /// displayed roster row for it. Other applications by the same teacher
    /// are deliberately untouched.
    pub async fn apply_application_status(&self, application_id: &str, status: ApplicationStatus) {
        let mut guard = self.inner.write().await;
        let Inner {
            vacancies,
            roster,
            pins,
            ..
        } = &mut *guard;

        pins.note_application(application_id, status);
        for vacancy in vacancies.iter_mut() {
            for application in vacancy.applications.iter_mut() {
                if application.id == application_id {
                    application.status = status;
                }
            }
        }

        if let Some(roster) = roster {
            for entry in roster.entries.iter_mut() {
                if entry.id == application_id {
                    entry.status = status;
                }
            }
        }
    }

    /// Merge a pushed application. The teacher upserts into the roster by
    /// id and the application into its vacancy by id, so a redelivered
    /// message is a no-op.
    pub async fn apply_new_application(&self, event: NewApplicationEvent) {
        let mut guard = self.inner.write().await;
        let Inner {
            vacancies, teachers, ..
        } = &mut *guard;

        if !teachers.iter().any(|t| t.id == event.teacher.id) {
            teachers.push(event.teacher);
        }

        match vacancies.iter_mut().find(|v| v.id == event.vacancy.id) {
            Some(vacancy) => {
                if vacancy
                    .applications
                    .iter()
                    .any(|a| a.id == event.application.id)
                {
                    debug!(
                        application_id = %event.application.id,
                        "Application already known, skipping"
                    );
                } else {
                    vacancy.applications.push(event.application);
                }
            }
            None => {
                debug!(
                    vacancy_id = %event.vacancy.id,
                    "Vacancy not present locally, skipping application"
                );
            }
        }
    }

    /// The first vacancy whose embedded applications contain the id.
    pub async fn find_vacancy_for_application(&self, application_id: &str) -> Option<String> {
        let inner = self.inner.read().await;
        inner
            .vacancies
            .iter()
            .find(|v| v.application(application_id).is_some())
            .map(|v| v.id.clone())
    }

    pub async fn vacancy_status(&self, vacancy_id: &str) -> Option<VacancyStatus> {
        let inner = self.inner.read().await;
        inner
            .vacancies
            .iter()
            .find(|v| v.id == vacancy_id)
            .map(|v| v.status)
    }

    pub async fn set_vacancy_status(&self, vacancy_id: &str, status: VacancyStatus) {
        let mut inner = self.inner.write().await;
        for vacancy in inner.vacancies.iter_mut().filter(|v| v.id == vacancy_id) {
            vacancy.status = status;
        }
    }

    pub async fn set_vacancy_featured(&self, vacancy_id: &str, featured: bool) {
        let mut inner = self.inner.write().await;
        for vacancy in inner.vacancies.iter_mut().filter(|v| v.id == vacancy_id) {
            vacancy.featured = featured;
        }
    }

    /// Show the applicants roster for one vacancy.
    pub async fn set_roster(&self, vacancy_id: impl Into<String>, entries: Vec<Applicant>) {
        let mut inner = self.inner.write().await;
        inner.roster = Some(ApplicantRoster {
            vacancy_id: vacancy_id.into(),
            entries,
        });
    }

    pub async fn clear_roster(&self) {
        self.inner.write().await.roster = None;
    }

    /// Recompute the highlight for a query. An empty query or no match
    /// clears it. Returns the highlighted vacancy id.
    pub async fn apply_search(&self, query: &str) -> Option<String> {
        let mut guard = self.inner.write().await;
        let Inner {
            vacancies,
            highlighted,
            ..
        } = &mut *guard;

        *highlighted =
            search::find_match(vacancies, query).map(|index| vacancies[index].id.clone());
        highlighted.clone()
    }

    /// Snapshot of the teacher overrides for session persistence.
    pub async fn teacher_overrides(&self) -> HashMap<String, TeacherStatus> {
        self.inner.read().await.pins.teachers.clone()
    }

    /// Current pin for a teacher, if any.
    pub async fn pinned_teacher(&self, teacher_id: &str) -> Option<TeacherStatus> {
        self.inner.read().await.pins.teachers.get(teacher_id).copied()
    }

    /// Current pin for an application, if any.
    pub async fn pinned_application(&self, application_id: &str) -> Option<ApplicationStatus> {
        self.inner
            .read()
            .await
            .pins
            .applications
            .get(application_id)
            .copied()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
