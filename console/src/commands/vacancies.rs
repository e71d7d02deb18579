//! Vacancy posting commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tutorlink_model::{Vacancy, VacancyForm};

use crate::error::ConsoleError;
use crate::output::{print_info, print_output};

use super::CommandContext;

/// Vacancy posting commands.
#[derive(Debug, Args)]
pub struct VacanciesCommand {
    #[command(subcommand)]
    command: VacanciesSubcommand,
}

#[derive(Debug, Subcommand)]
enum VacanciesSubcommand {
    /// List postings.
    List(ListVacanciesArgs),

    /// Create a posting.
    Create(FormArgs),

    /// Replace a posting.
    Update(UpdateArgs),

    /// Delete a posting.
    Delete(VacancyIdArgs),

    /// Feature or unfeature a posting on the landing page.
    Feature(FeatureArgs),

    /// Flip a posting between open and closed.
    Toggle(VacancyIdArgs),

    /// Find the first posting matching a query.
    Search(SearchArgs),
}

#[derive(Debug, Args)]
struct ListVacanciesArgs {
    /// Only featured postings.
    #[arg(long)]
    featured: bool,
}

#[derive(Debug, Args)]
struct VacancyIdArgs {
    /// Vacancy ID.
    id: String,
}

#[derive(Debug, Args)]
struct FeatureArgs {
    /// Vacancy ID.
    id: String,

    /// Remove the featured flag instead of setting it.
    #[arg(long)]
    off: bool,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Case-insensitive query over title, subject and salary.
    query: String,
}

#[derive(Debug, Args)]
struct FormArgs {
    /// Posting title.
    #[arg(long)]
    title: Option<String>,

    /// Subject taught.
    #[arg(long)]
    subject: Option<String>,

    /// Free-text description.
    #[arg(long, default_value = "")]
    description: String,

    /// Requirement line; may repeat.
    #[arg(long = "requirement")]
    requirements: Vec<String>,

    /// Salary text shown to applicants.
    #[arg(long)]
    salary: Option<String>,

    /// Feature the posting immediately.
    #[arg(long)]
    featured: bool,

    /// Resume the draft stashed by a failed submit.
    #[arg(long)]
    resume: bool,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Vacancy ID.
    id: String,

    #[command(flatten)]
    form: FormArgs,
}

impl FormArgs {
    /// Build the form, falling back to the stashed draft with `--resume`.
    fn into_form(self, ctx: &CommandContext) -> Result<VacancyForm> {
        if self.resume {
            return ctx
                .session
                .take_draft()?
                .ok_or_else(|| ConsoleError::Validation("No stashed draft to resume".into()).into());
        }

        let title = require(self.title, "--title")?;
        let subject = require(self.subject, "--subject")?;
        let salary = require(self.salary, "--salary")?;
        Ok(VacancyForm {
            title,
            subject,
            description: self.description,
            requirements: self.requirements,
            salary,
            featured: self.featured,
        })
    }
}

fn require(value: Option<String>, flag: &str) -> Result<String, ConsoleError> {
    value.ok_or_else(|| ConsoleError::Validation(format!("{} is required", flag)))
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct VacancyRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Title")]
    title: String,

    #[tabled(rename = "Subject")]
    subject: String,

    #[tabled(rename = "Salary")]
    salary: String,

    #[tabled(rename = "Status")]
    status: String,

    #[tabled(rename = "Featured")]
    featured: bool,

    #[tabled(rename = "Applications")]
    applications: usize,
}

impl From<&Vacancy> for VacancyRow {
    fn from(vacancy: &Vacancy) -> Self {
        Self {
            id: vacancy.id.clone(),
            title: vacancy.title.clone(),
            subject: vacancy.subject.clone(),
            salary: vacancy.salary.clone(),
            status: vacancy.status.to_string(),
            featured: vacancy.featured,
            applications: vacancy.applications.len(),
        }
    }
}

impl VacanciesCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            VacanciesSubcommand::List(args) => list_vacancies(ctx, args).await,
            VacanciesSubcommand::Create(args) => submit(ctx, args, None).await,
            VacanciesSubcommand::Update(args) => {
                let UpdateArgs { id, form } = args;
                submit(ctx, form, Some(id)).await
            }
            VacanciesSubcommand::Delete(args) => delete(ctx, args).await,
            VacanciesSubcommand::Feature(args) => feature(ctx, args).await,
            VacanciesSubcommand::Toggle(args) => toggle(ctx, args).await,
            VacanciesSubcommand::Search(args) => search(ctx, args).await,
        }
    }
}

async fn list_vacancies(ctx: CommandContext, args: ListVacanciesArgs) -> Result<()> {
    let vacancies = if args.featured {
        ctx.client()?.featured_vacancies().await?
    } else {
        ctx.client()?.list_vacancies().await?
    };

    let rows: Vec<VacancyRow> = vacancies.iter().map(VacancyRow::from).collect();
    print_output(&rows, ctx.format);
    Ok(())
}

async fn submit(ctx: CommandContext, args: FormArgs, existing_id: Option<String>) -> Result<()> {
    let form = args.into_form(&ctx)?;

    let stack = ctx.stack()?;
    let manager = stack.manager(ctx.session.clone());
    manager.submit(form, existing_id.as_deref()).await;
    drop(manager);

    stack.finish().await;
    Ok(())
}

async fn delete(ctx: CommandContext, args: VacancyIdArgs) -> Result<()> {
    let stack = ctx.stack()?;
    let manager = stack.manager(ctx.session.clone());
    manager.delete(&args.id).await;
    drop(manager);

    stack.finish().await;
    Ok(())
}

async fn feature(ctx: CommandContext, args: FeatureArgs) -> Result<()> {
    let stack = ctx.stack()?;
    let manager = stack.manager(ctx.session.clone());
    manager.set_featured(&args.id, !args.off).await;
    drop(manager);

    stack.finish().await;
    Ok(())
}

/// Toggling needs the current status, so a fresh load comes first.
async fn toggle(ctx: CommandContext, args: VacancyIdArgs) -> Result<()> {
    let stack = ctx.stack()?;
    stack.sync.refresh(true).await?;

    let manager = stack.manager(ctx.session.clone());
    manager.toggle_status(&args.id).await;
    drop(manager);

    stack.finish().await;
    Ok(())
}

async fn search(ctx: CommandContext, args: SearchArgs) -> Result<()> {
    let stack = ctx.stack()?;
    stack.sync.refresh(true).await?;

    let highlighted = stack.store.apply_search(&args.query).await;
    let state = stack.store.snapshot().await;
    match highlighted {
        Some(id) => {
            let rows: Vec<VacancyRow> = state
                .vacancies
                .iter()
                .filter(|v| v.id == id)
                .map(VacancyRow::from)
                .collect();
            print_output(&rows, ctx.format);
        }
        None => print_info("No matching vacancy."),
    }
    stack.finish().await;
    Ok(())
}
