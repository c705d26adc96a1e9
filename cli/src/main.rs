//! Logscope CLI
//!
//! Command-line interface for the Logscope log retrieval API.
//!
//! # Usage
//!
//! ```bash
//! logscope --help
//! logscope health
//! logscope search shop-api --term timeout --level Error --from 2024-01-01
//! logscope histogram shop-api --errors
//! ```

#![deny(unsafe_code)]

mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::{ApiClient, SearchFilters};
use shared::chrono::{NaiveDate, NaiveDateTime};
use shared::models::{AlertRecipient, LogView};
use std::collections::BTreeMap;

/// Widest histogram bar, in characters.
const BAR_WIDTH: u64 = 40;

/// Logscope CLI - log retrieval command-line interface
#[derive(Parser)]
#[command(name = "logscope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API server URL
    #[arg(
        short,
        long,
        env = "LOGSCOPE_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    /// Print the raw JSON response
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API server health
    Health,
    /// Check whether a tenant index exists
    Check {
        /// Tenant unique id
        unique_id: String,
    },
    /// Search a tenant's logs
    Search {
        /// Tenant unique id
        unique_id: String,
        /// Free-text term
        #[arg(short, long)]
        term: Option<String>,
        /// Severity label, or "All"
        #[arg(short, long)]
        level: Option<String>,
        /// Earliest timestamp (inclusive)
        #[arg(long)]
        from: Option<String>,
        /// Latest timestamp (inclusive)
        #[arg(long)]
        to: Option<String>,
    },
    /// Count records per severity
    Levels {
        /// Tenant unique id
        unique_id: String,
    },
    /// Show the daily histogram, or the 3-hour error histogram with --errors
    Histogram {
        /// Tenant unique id
        unique_id: String,
        /// Count error records in 3-hour buckets
        #[arg(long)]
        errors: bool,
    },
    /// List alert e-mails registered for a tenant
    Alerts {
        /// Tenant unique id
        unique_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Logscope CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("Use --help for usage information");
        return Ok(());
    };

    let client = ApiClient::new(&cli.api_url)?;
    let output = run(&client, command, cli.json).await?;
    print!("{output}");

    Ok(())
}

async fn run(client: &ApiClient, command: Commands, json: bool) -> Result<String> {
    let output = match command {
        Commands::Health => {
            let (raw, body) = client.health().await?;
            pick(json, raw, || {
                format!(
                    "{} {} ({})\n",
                    body["service"].as_str().unwrap_or("unknown"),
                    body["version"].as_str().unwrap_or("?"),
                    body["status"].as_str().unwrap_or("?")
                )
            })
        }
        Commands::Check { unique_id } => {
            let (raw, exists) = client.check(&unique_id).await?;
            pick(json, raw, || {
                if exists {
                    format!("{unique_id}: exists\n")
                } else {
                    format!("{unique_id}: not found\n")
                }
            })
        }
        Commands::Search {
            unique_id,
            term,
            level,
            from,
            to,
        } => {
            let filters = SearchFilters {
                term,
                level,
                from,
                to,
            };
            let (raw, records) = client.search(&unique_id, &filters).await?;
            pick(json, raw, || render_records(&records))
        }
        Commands::Levels { unique_id } => {
            let (raw, counts) = client.levels(&unique_id).await?;
            pick(json, raw, || render_levels(&counts))
        }
        Commands::Histogram { unique_id, errors } => {
            let (raw, buckets) = client.histogram(&unique_id, errors).await?;
            pick(json, raw, || render_histogram(&buckets))
        }
        Commands::Alerts { unique_id } => {
            let (raw, recipients) = client.alerts(&unique_id).await?;
            pick(json, raw, || render_alerts(&recipients))
        }
    };

    Ok(output)
}

fn pick(json: bool, raw: String, text: impl FnOnce() -> String) -> String {
    if json {
        format!("{raw}\n")
    } else {
        text()
    }
}

fn render_records(records: &[LogView]) -> String {
    let mut out: String = records
        .iter()
        .map(|record| {
            let mut line = format!(
                "{} {:<7} {}",
                record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                record.level.to_string().to_uppercase(),
                record.message
            );
            if let Some(method) = &record.calling_method {
                let file = record.calling_file.as_deref().unwrap_or("?");
                line.push_str(&format!("  [{file}::{method}]"));
            }
            line.push('\n');
            line
        })
        .collect();
    out.push_str(&format!("{} record(s)\n", records.len()));
    out
}

fn render_levels(counts: &BTreeMap<String, u64>) -> String {
    ["info", "success", "warning", "error"]
        .iter()
        .map(|level| format!("{level:<8} {}\n", counts.get(*level).copied().unwrap_or(0)))
        .collect()
}

/// Renders histogram buckets as a bar chart in chronological order.
fn render_histogram(buckets: &BTreeMap<String, u64>) -> String {
    if buckets.is_empty() {
        return "no records\n".to_string();
    }

    let mut rows: Vec<(&String, u64)> = buckets.iter().map(|(k, v)| (k, *v)).collect();
    rows.sort_by_key(|(label, _)| bucket_start(label));

    let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1);
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    rows.into_iter()
        .map(|(label, count)| {
            let bar = "#".repeat(usize::try_from(count * BAR_WIDTH / max).unwrap_or(0));
            format!("{label:<width$} {count:>6} {bar}\n")
        })
        .collect()
}

/// Start of a bucket parsed from its label (`dd-MM-yyyy` or
/// `dd-MM-yyyy HH:mm - ...`).
fn bucket_start(label: &str) -> Option<NaiveDateTime> {
    let start = label.split(" - ").next().unwrap_or(label);
    NaiveDateTime::parse_from_str(start, "%d-%m-%Y %H:%M")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(start, "%d-%m-%Y")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn render_alerts(recipients: &[AlertRecipient]) -> String {
    if recipients.is_empty() {
        return "no alerts registered\n".to_string();
    }

    recipients
        .iter()
        .map(|r| format!("{} -> {}  {}\n", r.from, r.to, r.subject))
        .collect()
}
