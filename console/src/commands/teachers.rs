//! Teacher signup commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tutorlink_model::{Teacher, TeacherStatus};

use crate::output::print_output;

use super::CommandContext;

/// Teacher signup commands.
#[derive(Debug, Args)]
pub struct TeachersCommand {
    #[command(subcommand)]
    command: TeachersSubcommand,
}

#[derive(Debug, Subcommand)]
enum TeachersSubcommand {
    /// List teachers, including vacancy applicants without a signup.
    List(ListTeachersArgs),

    /// Approve a teacher signup.
    Approve(TeacherIdArgs),

    /// Reject a teacher signup.
    Reject(TeacherIdArgs),

    /// Print a teacher's CV link.
    Cv(TeacherIdArgs),
}

#[derive(Debug, Args)]
struct ListTeachersArgs {
    /// Only teachers with this review status (server-side filter).
    #[arg(long)]
    status: Option<TeacherStatus>,
}

#[derive(Debug, Args)]
struct TeacherIdArgs {
    /// Teacher ID.
    id: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct TeacherRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Email")]
    email: String,

    #[tabled(rename = "Subjects")]
    subjects: String,

    #[tabled(rename = "Status")]
    status: String,

    #[tabled(rename = "Origin")]
    origin: String,
}

impl From<&Teacher> for TeacherRow {
    fn from(teacher: &Teacher) -> Self {
        Self {
            id: teacher.id.clone(),
            name: teacher.full_name.clone(),
            email: teacher.email.clone(),
            subjects: teacher.subjects.join(", "),
            status: teacher.status.to_string(),
            origin: teacher.origin.to_string(),
        }
    }
}

impl TeachersCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            TeachersSubcommand::List(args) => list_teachers(ctx, args).await,
            TeachersSubcommand::Approve(args) => {
                set_status(ctx, &args.id, TeacherStatus::Approved).await
            }
            TeachersSubcommand::Reject(args) => {
                set_status(ctx, &args.id, TeacherStatus::Rejected).await
            }
            TeachersSubcommand::Cv(args) => show_cv(ctx, args).await,
        }
    }
}

/// List teachers, merged from signups and vacancy applications.
async fn list_teachers(ctx: CommandContext, args: ListTeachersArgs) -> Result<()> {
    let teachers = match args.status {
        Some(status) => ctx.client()?.teachers_by_status(status).await?,
        None => {
            let stack = ctx.stack()?;
            stack.sync.refresh(true).await?;
            let teachers = stack.store.snapshot().await.teachers;
            stack.finish().await;
            teachers
        }
    };

    let rows: Vec<TeacherRow> = teachers.iter().map(TeacherRow::from).collect();
    print_output(&rows, ctx.format);
    Ok(())
}

/// Persist a review decision and propagate it locally.
async fn set_status(ctx: CommandContext, teacher_id: &str, status: TeacherStatus) -> Result<()> {
    let stack = ctx.stack()?;
    stack.sync.refresh(true).await?;

    let propagator = stack.propagator(ctx.session.clone());
    propagator.apply_teacher_status(teacher_id, status).await;
    drop(propagator);

    stack.finish().await;
    Ok(())
}

async fn show_cv(ctx: CommandContext, args: TeacherIdArgs) -> Result<()> {
    let cv = ctx.client()?.teacher_cv(&args.id).await?;
    println!("{}", cv);
    Ok(())
}
