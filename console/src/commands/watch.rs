//! Live dashboard command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tokio::sync::watch;
use tracing::info;

use crate::live::{LiveListener, WsTransport};
use crate::output::print_info;

use super::CommandContext;

/// Run the dashboard loops until interrupted.
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Skip the push channel and rely on polling only.
    #[arg(long)]
    no_live: bool,
}

impl WatchCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let stack = ctx.stack()?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let sync = Arc::clone(&stack.sync);
        let sync_rx = shutdown_rx.clone();
        let sync_task = tokio::spawn(async move { sync.run(sync_rx).await });

        let live_task = if self.no_live {
            None
        } else {
            let (listener, _state_rx) = LiveListener::new(
                Arc::clone(&stack.store),
                Arc::new(WsTransport),
                ctx.config.push_url.clone(),
                ctx.config.reconnect_delay,
            );
            let live_rx = shutdown_rx.clone();
            Some(tokio::spawn(async move { listener.run(live_rx).await }))
        };

        // Give the initial refresh a moment, then show where things stand.
        tokio::time::sleep(Duration::from_millis(500)).await;
        let state = stack.store.snapshot().await;
        print_info(&format!(
            "Watching {} vacancies and {} teachers. Press Ctrl-C to stop.",
            state.vacancies.len(),
            state.teachers.len()
        ));

        tokio::signal::ctrl_c().await?;
        info!("Interrupt received, shutting down");
        let _ = shutdown_tx.send(true);

        sync_task.await?;
        if let Some(task) = live_task {
            task.await?;
        }
        stack.finish().await;
        Ok(())
    }
}
