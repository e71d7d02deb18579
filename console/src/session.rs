//! Persisted session state.
//!
//! The console keeps a single JSON file in the platform config directory:
//! the auth token, the teacher status overrides that re-seed the pin set on
//! startup, and a pending vacancy form draft from a submission that could
//! not complete. Written with restrictive permissions on unix.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tutorlink_model::{TeacherStatus, VacancyForm};

/// Session file name.
const SESSION_FILE: &str = "session.json";

/// Everything the console persists between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSession {
    /// Access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Locally confirmed teacher statuses, reapplied as pins on startup.
    #[serde(default)]
    pub status_overrides: HashMap<String, TeacherStatus>,

    /// A vacancy submission that did not complete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacancy_draft: Option<VacancyForm>,
}

/// File-backed session storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at the platform config directory.
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "tutorlink", "console")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(Self {
            path: dirs.config_dir().join(SESSION_FILE),
        })
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the session from disk, or an empty one if none exists.
    pub fn load(&self) -> Result<StoredSession> {
        if !self.path.exists() {
            return Ok(StoredSession::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {:?}", self.path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {:?}", self.path))
    }

    /// Save the session to disk.
    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = serde_json::to_string_pretty(session)?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)?;
            file.write_all(contents.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write session to {:?}", self.path))?;
        }

        Ok(())
    }

    /// Delete the session file.
    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to delete session at {:?}", self.path))?;
        }
        Ok(())
    }

    /// Store a fresh token, keeping overrides and draft intact.
    pub fn save_token(&self, token: &str) -> Result<()> {
        let mut session = self.load()?;
        session.token = Some(token.to_string());
        self.save(&session)
    }

    /// Drop the token, keeping overrides and draft intact.
    pub fn clear_token(&self) -> Result<()> {
        let mut session = self.load()?;
        session.token = None;
        self.save(&session)
    }

    /// Persist the teacher status overrides, leaving other fields alone.
    pub fn save_overrides(&self, overrides: &HashMap<String, TeacherStatus>) -> Result<()> {
        let mut session = self.load()?;
        session.status_overrides = overrides.clone();
        self.save(&session)
    }

    /// Stash a vacancy form so the submission can resume next run.
    pub fn stash_draft(&self, form: &VacancyForm) -> Result<()> {
        let mut session = self.load()?;
        session.vacancy_draft = Some(form.clone());
        self.save(&session)
    }

    /// Remove and return the pending draft, if any.
    pub fn take_draft(&self) -> Result<Option<VacancyForm>> {
        let mut session = self.load()?;
        let draft = session.vacancy_draft.take();
        if draft.is_some() {
            self.save(&session)?;
        }
        Ok(draft)
    }

    /// Clear the pending draft.
    pub fn clear_draft(&self) -> Result<()> {
        let mut session = self.load()?;
        if session.vacancy_draft.take().is_some() {
            self.save(&session)?;
        }
        Ok(())
    }
}
