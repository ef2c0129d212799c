// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Courier - a durable outbound message delivery queue.
//!
//! This is the binary entry point for the courier daemon and CLI.

use clap::{Parser, Subcommand};

mod commands;
mod dispatch;
mod serve;
mod shutdown;
mod status;

/// Courier - a durable outbound message delivery queue.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the delivery daemon until interrupted.
    Serve,
    /// Queue a message and attempt delivery right away.
    Send {
        /// Message body to deliver.
        content: String,
        /// Conversation the message belongs to.
        #[arg(long)]
        conversation: String,
        /// Optional assistant correlation id, passed through unchanged.
        #[arg(long)]
        assistant: Option<String>,
    },
    /// Show queued messages and recent delivery failures.
    Status {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Put a queued message back at the start of its retry schedule.
    Retry {
        /// Id of the message to retry.
        id: String,
    },
    /// Drop a queued message without sending it.
    Cancel {
        /// Id of the message to drop.
        id: String,
    },
    /// Drop every queued message.
    Clear,
    /// Show the persisted error report log.
    Errors {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
        /// Empty the log instead of printing it.
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match courier_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            courier_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Send {
            content,
            conversation,
            assistant,
        }) => commands::run_send(&config, content, conversation, assistant).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Retry { id }) => commands::run_retry(&config, &id).await,
        Some(Commands::Cancel { id }) => commands::run_cancel(&config, &id).await,
        Some(Commands::Clear) => commands::run_clear(&config).await,
        Some(Commands::Errors { json, clear }) => status::run_errors(&config, json, clear).await,
        None => {
            println!("courier: use --help for available commands");
            return;
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
