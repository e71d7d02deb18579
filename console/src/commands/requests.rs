//! Student and parent tutoring request commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tutorlink_model::{ParentApplication, StudentApplication};

use crate::output::{print_output, print_success};

use super::CommandContext;

/// Tutoring request commands.
#[derive(Debug, Args)]
pub struct RequestsCommand {
    #[command(subcommand)]
    command: RequestsSubcommand,
}

#[derive(Debug, Subcommand)]
enum RequestsSubcommand {
    /// List student tutoring requests.
    Students,

    /// List parent tutoring requests.
    Parents,

    /// Delete a student request.
    DeleteStudent(RequestIdArgs),

    /// Delete a parent request.
    DeleteParent(RequestIdArgs),
}

#[derive(Debug, Args)]
struct RequestIdArgs {
    /// Request ID.
    id: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct RequestRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Email")]
    email: String,

    #[tabled(rename = "Phone")]
    phone: String,
}

impl From<&StudentApplication> for RequestRow {
    fn from(request: &StudentApplication) -> Self {
        Self {
            id: request.id.clone(),
            name: request.full_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
        }
    }
}

impl From<&ParentApplication> for RequestRow {
    fn from(request: &ParentApplication) -> Self {
        Self {
            id: request.id.clone(),
            name: request.full_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
        }
    }
}

impl RequestsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            RequestsSubcommand::Students => {
                let requests = ctx.client()?.list_student_requests().await?;
                let rows: Vec<RequestRow> = requests.iter().map(RequestRow::from).collect();
                print_output(&rows, ctx.format);
                Ok(())
            }
            RequestsSubcommand::Parents => {
                let requests = ctx.client()?.list_parent_requests().await?;
                let rows: Vec<RequestRow> = requests.iter().map(RequestRow::from).collect();
                print_output(&rows, ctx.format);
                Ok(())
            }
            RequestsSubcommand::DeleteStudent(args) => {
                ctx.client()?.delete_student_request(&args.id).await?;
                print_success("Student request deleted.");
                Ok(())
            }
            RequestsSubcommand::DeleteParent(args) => {
                ctx.client()?.delete_parent_request(&args.id).await?;
                print_success("Parent request deleted.");
                Ok(())
            }
        }
    }
}
