//! Entity definitions for the placement API.
//!
//! Each struct mirrors the JSON the server serves. Records are frequently
//! partial (older rows predate some fields), so everything the console can
//! tolerate missing is defaulted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{ApplicationStatus, TeacherOrigin, TeacherStatus, VacancyStatus};

/// A teacher on the review roster.
///
/// Entries come from two places: direct signups served by the teacher
/// collection, and entries synthesized from applications embedded in
/// vacancies. The `origin` field records which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Document reference for the uploaded CV, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
    #[serde(default)]
    pub status: TeacherStatus,
    #[serde(default)]
    pub origin: TeacherOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

impl Teacher {
    /// Synthesizes a roster entry from an application's embedded teacher
    /// snapshot. `accepted` folds to `approved` since the teacher status
    /// space has no hire state.
    pub fn from_application(application: &Application) -> Self {
        let snapshot = &application.teacher;
        Teacher {
            id: snapshot.id.clone(),
            full_name: snapshot.full_name.clone(),
            email: snapshot.email.clone(),
            phone: snapshot.phone.clone(),
            subjects: snapshot.subjects.clone(),
            cv: snapshot.cv.clone(),
            status: application.status.as_teacher_status(),
            origin: TeacherOrigin::VacancyApplication,
            applied_at: application.applied_at,
        }
    }
}

/// The teacher snapshot embedded in an application.
///
/// The id is what propagation matches on; the profile fields are a
/// denormalized copy used when the roster entry has to be synthesized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRef {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
}

/// An application embedded in a vacancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub teacher: TeacherRef,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

/// A tutoring vacancy with its embedded applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vacancy {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Free-text salary range, e.g. "Rs. 30,000 - 40,000".
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub status: VacancyStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub applications: Vec<Application>,
}

impl Vacancy {
    /// Looks up an embedded application by id.
    pub fn application(&self, application_id: &str) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == application_id)
    }
}

/// A row of the per-vacancy applicants roster.
///
/// Served flattened by the applicants endpoint: the id is the application
/// id, the profile fields belong to the applying teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

/// A student tuition request. Listed and deleted only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentApplication {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// A parent tuition request. Listed and deleted only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentApplication {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Payload for creating or editing a vacancy, and the shape persisted as a
/// draft when a submission cannot complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacancyForm {
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub featured: bool,
}
