//! CLI commands.

mod applications;
mod auth;
mod requests;
mod stats;
mod teachers;
mod vacancies;
mod watch;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::ConsoleError;
use crate::notify::{self, Notifier};
use crate::output::{self, OutputFormat};
use crate::propagate::StatusPropagator;
use crate::session::{SessionStore, StoredSession};
use crate::state::{PinSet, StateStore};
use crate::sync::Synchronizer;
use crate::vacancies::VacancyManager;

/// TutorLink staff console.
#[derive(Debug, Parser)]
#[command(name = "tutorlink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (table or json).
    #[arg(long, global = true, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in to the console.
    Login(auth::LoginCommand),

    /// Log out, keeping local overrides and drafts.
    Logout(auth::LogoutCommand),

    /// Live dashboard: periodic refresh plus push updates.
    Watch(watch::WatchCommand),

    /// Signup counts at a glance.
    Stats(stats::StatsCommand),

    /// Manage vacancy postings.
    Vacancies(vacancies::VacanciesCommand),

    /// Review teacher signups.
    Teachers(teachers::TeachersCommand),

    /// Review applications to a vacancy.
    Applications(applications::ApplicationsCommand),

    /// Student and parent tutoring requests.
    Requests(requests::RequestsCommand),
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self, config: Config) -> Result<()> {
        let format = match self.format.as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Table,
        };

        let session = SessionStore::default_location()?;
        let stored = session.load()?;

        let ctx = CommandContext {
            config,
            session,
            stored,
            format,
        };

        match self.command {
            Commands::Login(cmd) => cmd.run(ctx).await,
            Commands::Logout(cmd) => cmd.run(ctx).await,
            Commands::Watch(cmd) => cmd.run(ctx).await,
            Commands::Stats(cmd) => cmd.run(ctx).await,
            Commands::Vacancies(cmd) => cmd.run(ctx).await,
            Commands::Teachers(cmd) => cmd.run(ctx).await,
            Commands::Applications(cmd) => cmd.run(ctx).await,
            Commands::Requests(cmd) => cmd.run(ctx).await,
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub session: SessionStore,
    pub stored: StoredSession,
    pub format: OutputFormat,
}

impl CommandContext {
    /// An API client without credentials, for login.
    pub fn anonymous_client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.config, None)
    }

    /// An API client carrying the stored token.
    pub fn client(&self) -> Result<ApiClient> {
        let token = self
            .stored
            .token
            .as_deref()
            .ok_or(ConsoleError::NotAuthenticated)?;
        ApiClient::new(&self.config, Some(token))
    }

    /// Wire up everything a store-backed action needs. Persisted status
    /// overrides seed the pin set, and a background task prints notices
    /// as operations emit them.
    pub fn stack(&self) -> Result<ActionStack> {
        let client = Arc::new(self.client()?);
        let store = Arc::new(StateStore::with_pins(PinSet::from_overrides(
            self.stored.status_overrides.clone(),
        )));
        let (notifier, mut notices) = notify::channel();
        let printer = tokio::spawn(async move {
            while let Some(notice) = notices.recv().await {
                output::print_notice(&notice);
            }
        });
        let sync = Arc::new(Synchronizer::new(
            Arc::clone(&client),
            Arc::clone(&store),
            notifier.clone(),
            self.config.refresh_interval,
        ));
        Ok(ActionStack {
            client,
            store,
            sync,
            notifier,
            printer,
        })
    }
}

/// The wired components behind store-backed commands.
pub struct ActionStack {
    pub client: Arc<ApiClient>,
    pub store: Arc<StateStore>,
    pub sync: Arc<Synchronizer>,
    pub notifier: Notifier,
    printer: tokio::task::JoinHandle<()>,
}

impl ActionStack {
    pub fn propagator(&self, session: SessionStore) -> StatusPropagator {
        StatusPropagator::new(
            Arc::clone(&self.client),
            Arc::clone(&self.store),
            session,
            self.notifier.clone(),
            Arc::clone(&self.sync),
        )
    }

    pub fn manager(&self, session: SessionStore) -> VacancyManager {
        VacancyManager::new(
            Arc::clone(&self.client),
            Arc::clone(&self.store),
            session,
            self.notifier.clone(),
            Arc::clone(&self.sync),
        )
    }

    /// Drain remaining notices and wait for spawned follow-ups. Callers
    /// must drop any propagator or manager built from this stack first,
    /// or the printer never sees the channel close.
    pub async fn finish(self) {
        let ActionStack {
            client,
            store,
            sync,
            notifier,
            printer,
        } = self;
        drop((client, store, sync, notifier));
        let _ = printer.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_tree_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_stats_parses_with_no_arguments() {
        let cli = Cli::try_parse_from(["tutorlink", "stats"]).unwrap();
        assert!(matches!(cli.command, Commands::Stats(_)));
        assert_eq!(cli.format, "table");
    }
}
