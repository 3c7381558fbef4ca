// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticketflow - IT ticket workflow orchestration server.
//!
//! This is the binary entry point for the Ticketflow server.

use clap::{Parser, Subcommand};

mod serve;
mod watch;

/// Ticketflow - IT ticket workflow orchestration server.
#[derive(Parser, Debug)]
#[command(name = "ticketflow", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Ticketflow server.
    Serve,
    /// Follow a running server's event stream and log mirrored state.
    Watch,
    /// Load and validate configuration, then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match ticketflow_config::load_and_validate() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ticketflow: configuration error: {err}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(err) = serve::run_serve(config).await {
                eprintln!("ticketflow: {err}");
                std::process::exit(1);
            }
        }
        Some(Commands::Watch) => {
            if let Err(err) = watch::run_watch(config).await {
                eprintln!("ticketflow: {err}");
                std::process::exit(1);
            }
        }
        Some(Commands::CheckConfig) => {
            println!(
                "ticketflow: config ok (bind {}:{}, max_retries {})",
                config.server.host, config.server.port, config.workflow.max_retries
            );
        }
        None => {
            println!("ticketflow: use --help for available commands");
        }
    }
}
