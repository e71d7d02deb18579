//! Vacancy application commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tutorlink_model::{Applicant, ApplicationStatus};

use crate::output::print_output;

use super::CommandContext;

/// Vacancy application commands.
#[derive(Debug, Args)]
pub struct ApplicationsCommand {
    #[command(subcommand)]
    command: ApplicationsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ApplicationsSubcommand {
    /// List applicants for a vacancy.
    List(ListApplicantsArgs),

    /// Approve an application.
    Approve(ApplicationIdArgs),

    /// Accept an application and close its vacancy.
    Accept(ApplicationIdArgs),

    /// Reject an application.
    Reject(ApplicationIdArgs),
}

#[derive(Debug, Args)]
struct ListApplicantsArgs {
    /// Vacancy ID.
    vacancy_id: String,
}

#[derive(Debug, Args)]
struct ApplicationIdArgs {
    /// Application ID.
    id: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct ApplicantRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Email")]
    email: String,

    #[tabled(rename = "Phone")]
    phone: String,

    #[tabled(rename = "Address")]
    address: String,

    #[tabled(rename = "Subjects")]
    subjects: String,

    #[tabled(rename = "Status")]
    status: String,

    #[tabled(rename = "Applied")]
    applied_at: String,
}

impl From<&Applicant> for ApplicantRow {
    fn from(applicant: &Applicant) -> Self {
        Self {
            id: applicant.id.clone(),
            name: applicant.full_name.clone(),
            email: applicant.email.clone(),
            phone: applicant.phone.clone(),
            address: applicant.address.clone(),
            subjects: applicant.subjects.join(", "),
            status: applicant.status.to_string(),
            applied_at: applicant
                .applied_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

impl ApplicationsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ApplicationsSubcommand::List(args) => list_applicants(ctx, args).await,
            ApplicationsSubcommand::Approve(args) => {
                set_status(ctx, &args.id, ApplicationStatus::Approved).await
            }
            ApplicationsSubcommand::Accept(args) => {
                set_status(ctx, &args.id, ApplicationStatus::Accepted).await
            }
            ApplicationsSubcommand::Reject(args) => {
                set_status(ctx, &args.id, ApplicationStatus::Rejected).await
            }
        }
    }
}

/// Show the applicants roster for one vacancy.
async fn list_applicants(ctx: CommandContext, args: ListApplicantsArgs) -> Result<()> {
    let stack = ctx.stack()?;
    let manager = stack.manager(ctx.session.clone());
    manager.open_applicants(&args.vacancy_id).await;
    drop(manager);

    let roster = stack.store.snapshot().await.roster;
    if let Some(roster) = roster {
        let rows: Vec<ApplicantRow> = roster.entries.iter().map(ApplicantRow::from).collect();
        print_output(&rows, ctx.format);
    }
    stack.finish().await;
    Ok(())
}

/// Persist an application decision. The owning vacancy is resolved from
/// the local collection, so a fresh load comes first.
async fn set_status(ctx: CommandContext, application_id: &str, status: ApplicationStatus) -> Result<()> {
    let stack = ctx.stack()?;
    stack.sync.refresh(true).await?;

    let propagator = stack.propagator(ctx.session.clone());
    propagator
        .apply_application_status(application_id, status)
        .await;
    drop(propagator);

    stack.finish().await;
    Ok(())
}
