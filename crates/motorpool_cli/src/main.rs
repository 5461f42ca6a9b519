//! Motorpool server CLI.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use motorpool_app::{MotorpoolApp, MotorpoolConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs the motorpool server
    Run,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// The level of logging to use for the server
    #[clap(long, global = true, default_value = tracing::Level::INFO.as_str())]
    log_level: tracing::Level,

    /// Directory for daily-rotated log files; defaults to the platform
    /// data directory
    #[clap(long, global = true)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let file_layer = file_log_dir(self.log_dir.clone()).map(|dir| {
            let appender = tracing_appender::rolling::daily(dir, "motorpool.log");
            tracing_subscriber::fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
        });

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    // axum logs rejections from built-in extractors with the `axum::rejection`
                    // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                    format!(
                        "motorpool_cli={0},motorpool_app={0},motorpool_server={0},motorpool_service={0},motorpool_store={0},axum::rejection=trace",
                        self.log_level
                    )
                    .into()
                }),
            )
            .with(tracing_subscriber::fmt::layer())
            .with(file_layer)
            .init();

        info!("started with {:?}", self);

        match &self.command {
            Command::Run => Ok(MotorpoolApp::new(MotorpoolConfig::new()?).run().await?),
        }
    }
}

fn file_log_dir(flag: Option<PathBuf>) -> Option<PathBuf> {
    let dir = flag.or_else(|| {
        directories::ProjectDirs::from("", "", "motorpool")
            .map(|dirs| dirs.data_local_dir().join("logs"))
    })?;
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup human panic
    human_panic::setup_panic!();

    Cli::parse().execute().await
}
