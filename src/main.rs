mod agents;
mod cli;
mod config;
mod error;
mod modules;
mod workflow;

#[cfg(test)]
mod test_support;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use config::ReportConfig;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "depreport=debug"
    } else {
        "depreport=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = ReportConfig::from_cli(&cli).and_then(|config| workflow::execute_report(&config));

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
