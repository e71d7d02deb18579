//! TutorLink staff console binary.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tutorlink_console::commands::Cli;
use tutorlink_console::config::Config;
use tutorlink_console::error;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr so table output stays clean.
    let filter = EnvFilter::try_from_env("TUTORLINK_LOG")
        .unwrap_or_else(|_| config.log_level.clone().into());
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("TUTORLINK_LOG_JSON").is_ok() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    let cli = Cli::parse();
    if let Err(e) = cli.run(config).await {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
