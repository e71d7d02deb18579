//! Status enums shared across the console.
//!
//! The placement API stores statuses as lowercase strings; a record with no
//! status field is treated as pending.

use serde::{Deserialize, Serialize};

/// Review status of a teacher signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TeacherStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for TeacherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeacherStatus::Pending => write!(f, "pending"),
            TeacherStatus::Approved => write!(f, "approved"),
            TeacherStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl TeacherStatus {
    /// Whether this status is an affirmative decision that must survive a
    /// stale server read. Rejections deliberately are not protected.
    pub fn is_positive(self) -> bool {
        matches!(self, TeacherStatus::Approved)
    }
}

impl std::str::FromStr for TeacherStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TeacherStatus::Pending),
            "approved" => Ok(TeacherStatus::Approved),
            "rejected" => Ok(TeacherStatus::Rejected),
            other => Err(format!("unknown teacher status: {}", other)),
        }
    }
}

/// Review status of a vacancy application.
///
/// A superset of [`TeacherStatus`]: an application can additionally be
/// `accepted`, which is the terminal hire decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Accepted,
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "pending"),
            ApplicationStatus::Approved => write!(f, "approved"),
            ApplicationStatus::Accepted => write!(f, "accepted"),
            ApplicationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl ApplicationStatus {
    /// Whether this status is an affirmative decision that must survive a
    /// stale server read.
    pub fn is_positive(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Approved | ApplicationStatus::Accepted
        )
    }

    /// Folds into the teacher-level status space, which has no `accepted`.
    pub fn as_teacher_status(self) -> TeacherStatus {
        match self {
            ApplicationStatus::Pending => TeacherStatus::Pending,
            ApplicationStatus::Approved | ApplicationStatus::Accepted => TeacherStatus::Approved,
            ApplicationStatus::Rejected => TeacherStatus::Rejected,
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status: {}", other)),
        }
    }
}

impl From<TeacherStatus> for ApplicationStatus {
    fn from(status: TeacherStatus) -> Self {
        match status {
            TeacherStatus::Pending => ApplicationStatus::Pending,
            TeacherStatus::Approved => ApplicationStatus::Approved,
            TeacherStatus::Rejected => ApplicationStatus::Rejected,
        }
    }
}

/// Publication status of a vacancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VacancyStatus {
    #[default]
    Open,
    Closed,
}

impl std::fmt::Display for VacancyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VacancyStatus::Open => write!(f, "open"),
            VacancyStatus::Closed => write!(f, "closed"),
        }
    }
}

impl VacancyStatus {
    /// The opposite publication state.
    pub fn toggled(self) -> Self {
        match self {
            VacancyStatus::Open => VacancyStatus::Closed,
            VacancyStatus::Closed => VacancyStatus::Open,
        }
    }
}

/// How a teacher entered the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TeacherOrigin {
    /// Signed up through the teacher application form.
    #[default]
    DirectSignup,
    /// Synthesized from an application embedded in a vacancy.
    VacancyApplication,
}

impl std::fmt::Display for TeacherOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeacherOrigin::DirectSignup => write!(f, "direct-signup"),
            TeacherOrigin::VacancyApplication => write!(f, "vacancy-application"),
        }
    }
}
