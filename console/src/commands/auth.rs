//! Authentication commands.

use anyhow::Result;
use clap::Args;

use crate::output::{print_info, print_success};

use super::CommandContext;

/// Log in to the console.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Admin username.
    #[arg(long, env = "TUTORLINK_USERNAME")]
    username: Option<String>,

    /// Admin password.
    #[arg(long, env = "TUTORLINK_PASSWORD")]
    password: Option<String>,
}

impl LoginCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let (Some(username), Some(password)) = (self.username, self.password) else {
            print_info("Pass --username and --password, or set TUTORLINK_USERNAME and TUTORLINK_PASSWORD.");
            return Ok(());
        };

        let client = ctx.anonymous_client()?;
        let login = client.login(&username, &password).await?;
        ctx.session.save_token(&login.token)?;

        match login.admin {
            Some(admin) => print_success(&format!("Logged in as {}.", admin.username)),
            None => print_success("Logged in successfully."),
        }
        Ok(())
    }
}

/// Log out of the console.
#[derive(Debug, Args)]
pub struct LogoutCommand {
    /// Also delete local status overrides and any stashed vacancy draft.
    #[arg(long)]
    purge: bool,
}

impl LogoutCommand {
    /// Discard the stored token. Status overrides and any stashed draft
    /// stay behind for the next session unless `--purge` is given.
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        if self.purge {
            ctx.session.delete()?;
        } else {
            ctx.session.clear_token()?;
        }
        print_success("Logged out.");
        Ok(())
    }
}
