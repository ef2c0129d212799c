// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier status` and `courier errors` command implementations.
//!
//! Both read the persisted snapshots directly instead of going through
//! the queue, so they never claim messages or trigger delivery.

use std::io::IsTerminal;
use std::sync::Arc;

use courier_config::CourierConfig;
use courier_core::{CourierError, ErrorReport, KvStore, MessageStatus, QueuedMessage, SystemClock};
use courier_queue::{ERROR_LOG_KEY, ErrorLog, QUEUE_KEY};
use courier_storage::SqliteStore;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// How many error reports the status view shows. `courier errors`
/// prints the full log.
const STATUS_ERROR_LIMIT: usize = 5;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub queue_depth: usize,
    pub pending: usize,
    pub sending: usize,
    pub failed: usize,
    pub messages: Vec<QueuedMessage>,
    pub recent_errors: Vec<ErrorReport>,
}

#[derive(Debug, Default, PartialEq)]
struct QueueCounts {
    pending: usize,
    sending: usize,
    failed: usize,
}

fn summarize(messages: &[QueuedMessage]) -> QueueCounts {
    let mut counts = QueueCounts::default();
    for message in messages {
        match message.status {
            MessageStatus::Pending => counts.pending += 1,
            MessageStatus::Sending => counts.sending += 1,
            MessageStatus::Failed => counts.failed += 1,
            MessageStatus::Sent => {}
        }
    }
    counts
}

fn status_label(status: MessageStatus) -> &'static str {
    match status {
        MessageStatus::Pending => "pending",
        MessageStatus::Sending => "sending",
        MessageStatus::Failed => "failed",
        MessageStatus::Sent => "sent",
    }
}

/// Format the one-line queue summary shown at the top of the status view.
fn format_queue_summary(messages: &[QueuedMessage]) -> String {
    if messages.is_empty() {
        return "empty".to_string();
    }
    let counts = summarize(messages);
    format!(
        "{} queued ({} pending, {} sending, {} failed)",
        messages.len(),
        counts.pending,
        counts.sending,
        counts.failed
    )
}

/// Format one queued message as a status line.
fn format_message_line(message: &QueuedMessage) -> String {
    let mut line = format!(
        "{}  {}  retries: {}",
        message.id,
        status_label(message.status),
        message.retry_count
    );
    if let Some(error) = &message.error {
        line.push_str(&format!("  error: {error}"));
    }
    line
}

/// Format one error report as a log line.
fn format_report_line(report: &ErrorReport) -> String {
    let mut line = format!(
        "{}  {}",
        report.timestamp.format("%Y-%m-%d %H:%M:%S"),
        report.message
    );
    if let Some(context) = &report.context {
        line.push_str(&format!("  (message {context})"));
    }
    line
}

/// Reads one persisted JSON list, treating missing or corrupt data as empty.
async fn read_list<T: DeserializeOwned>(
    store: &SqliteStore,
    key: &str,
) -> Result<Vec<T>, CourierError> {
    let Some(json) = store.get(key).await? else {
        return Ok(Vec::new());
    };
    Ok(serde_json::from_str(&json).unwrap_or_default())
}

/// Run the `courier status` command.
///
/// Reads the queue and error log snapshots and displays queue depth,
/// per-message state, and recent failures. If `--json` is passed,
/// outputs structured JSON for scripting. If `--plain` is passed or
/// stdout is not a TTY, disables colors.
pub async fn run_status(
    config: &CourierConfig,
    json: bool,
    plain: bool,
) -> Result<(), CourierError> {
    let store = SqliteStore::open(&config.storage.database_path).await?;
    let messages: Vec<QueuedMessage> = read_list(&store, QUEUE_KEY).await?;
    let reports: Vec<ErrorReport> = read_list(&store, ERROR_LOG_KEY).await?;
    store.close().await?;

    if json {
        let counts = summarize(&messages);
        let report = StatusReport {
            queue_depth: messages.len(),
            pending: counts.pending,
            sending: counts.sending,
            failed: counts.failed,
            messages,
            recent_errors: reports,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&messages, &reports, use_color);
    }

    Ok(())
}

/// Print the human-readable status view with optional colors.
fn print_status(messages: &[QueuedMessage], reports: &[ErrorReport], use_color: bool) {
    println!();
    println!("  courier status");
    println!("  {}", "-".repeat(35));
    println!("    Queue:    {}", format_queue_summary(messages));

    if !messages.is_empty() {
        println!();
        for message in messages {
            if use_color {
                use colored::Colorize;
                let label = status_label(message.status);
                let label = match message.status {
                    MessageStatus::Pending => label.yellow(),
                    MessageStatus::Sending => label.cyan(),
                    MessageStatus::Failed => label.red(),
                    MessageStatus::Sent => label.green(),
                };
                let mut rest = format!("retries: {}", message.retry_count);
                if let Some(error) = &message.error {
                    rest.push_str(&format!("  error: {error}"));
                }
                println!("    {}  {}  {}", message.id, label, rest);
            } else {
                println!("    {}", format_message_line(message));
            }
        }
    }

    if !reports.is_empty() {
        println!();
        println!("  Recent errors");
        println!("  {}", "-".repeat(35));
        for report in reports.iter().take(STATUS_ERROR_LIMIT) {
            println!("    {}", format_report_line(report));
        }
    }

    if !messages.is_empty() {
        println!();
        println!("  Deliver with: courier serve");
    }
    println!();
}

/// Run the `courier errors` command.
///
/// Prints the persisted error log, newest first. `--clear` empties it
/// instead, and `--json` outputs the raw reports for scripting.
pub async fn run_errors(
    config: &CourierConfig,
    json: bool,
    clear: bool,
) -> Result<(), CourierError> {
    let store = SqliteStore::open(&config.storage.database_path).await?;

    if clear {
        let error_log = ErrorLog::new(
            Arc::new(store.clone()),
            Arc::new(SystemClock),
            config.queue.error_log_capacity,
        );
        error_log.clear().await?;
        store.close().await?;
        println!("error log cleared");
        return Ok(());
    }

    let reports: Vec<ErrorReport> = read_list(&store, ERROR_LOG_KEY).await?;
    store.close().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).unwrap_or_else(|_| "[]".to_string())
        );
    } else if reports.is_empty() {
        println!("no errors recorded");
    } else {
        for report in &reports {
            println!("{}", format_report_line(report));
        }
    }

    Ok(())
}
