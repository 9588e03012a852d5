mod cli;
mod config;
mod error;
mod executor;
mod installer;
mod platform;
mod report;
mod utils;

use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "stackup=debug"
    } else {
        "stackup=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = cli.execute().await {
        let label = if e.is_resolution_error() {
            "Dependency resolution failed:"
        } else {
            "Installation failed:"
        };
        eprintln!("{} {}", style(label).red().bold(), e);
        std::process::exit(1);
    }
}
