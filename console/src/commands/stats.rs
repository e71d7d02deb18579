//! Dashboard statistics command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::output::{print_single, OutputFormat};

use super::CommandContext;

/// Stats command - signup counts across the placement pipeline.
#[derive(Debug, Args)]
pub struct StatsCommand {}

impl StatsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        show_stats(ctx).await
    }
}

async fn show_stats(ctx: CommandContext) -> Result<()> {
    let stats = ctx.client()?.dashboard_stats().await?;

    match ctx.format {
        OutputFormat::Json => print_single(&stats),
        OutputFormat::Table => {
            println!("{} {}", "Students:".bold(), stats.total_students);
            println!("{} {}", "Parents: ".bold(), stats.total_parents);
            println!(
                "{} {} ({} pending, {} approved, {} rejected)",
                "Teachers:".bold(),
                stats.total_teachers,
                stats.pending_teachers,
                stats.approved_teachers,
                stats.rejected_teachers
            );
        }
    }
    Ok(())
}
