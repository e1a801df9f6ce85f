//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use intake_config::IntakeConfig;
use intake_core::{CandidateFile, LedgerEntry, Rejection, UploadLedger, UploadOutcome};
use intake_http::{FileListing, HealthStatus};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// One path submitted by `intake upload` and how it settled.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SubmissionReport {
    pub(crate) path: String,
    pub(crate) outcome: UploadOutcome,
}

#[derive(Serialize)]
struct UploadSummary<'a> {
    submissions: &'a [SubmissionReport],
    ledger: &'a [LedgerEntry],
    total_bytes: u64,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    file: &'a CandidateFile,
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection: Option<&'a Rejection>,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

/// Print a notification the moment it is raised.
pub(crate) fn render_notification(kind: &str, message: &str) {
    println!("[{kind}] {message}");
}

pub(crate) fn render_upload_summary(
    reports: &[SubmissionReport],
    ledger: &UploadLedger,
    format: OutputFormat,
) -> CliResult<()> {
    let total_bytes = ledger.total_bytes();
    let entries = ledger.entries();
    match format {
        OutputFormat::Json => print_json(&UploadSummary {
            submissions: reports,
            ledger: &entries,
            total_bytes,
        })?,
        OutputFormat::Table => {
            println!();
            println!("{:<40} {:>12} TYPE", "FILENAME", "SIZE");
            for entry in &entries {
                println!(
                    "{:<40} {:>12} {}",
                    entry.filename,
                    format_bytes(entry.byte_size),
                    entry.content_type
                );
            }
            let rejected = reports
                .iter()
                .filter(|report| !report.outcome.is_accepted())
                .count();
            println!(
                "{} uploaded ({}), {} rejected",
                entries.len(),
                format_bytes(total_bytes),
                rejected
            );
        }
    }
    Ok(())
}

pub(crate) fn render_check(
    candidate: &CandidateFile,
    rejection: Option<&Rejection>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&CheckReport {
            file: candidate,
            accepted: rejection.is_none(),
            rejection,
        })?,
        OutputFormat::Table => {
            println!("file: {}", candidate.name);
            println!("type: {}", candidate.declared_media_type);
            println!("size: {}", format_bytes(candidate.byte_size));
            match rejection {
                None => println!("result: pass"),
                Some(rejection) => {
                    println!("result: {}", rejection.kind.as_str());
                    println!("reason: {}", rejection.reason);
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn render_health(health: &HealthStatus, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(health)?,
        OutputFormat::Table => {
            println!("status: {}", health.status);
            println!("service: {}", health.service);
        }
    }
    Ok(())
}

pub(crate) fn render_listing(listing: &FileListing, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(listing)?,
        OutputFormat::Table => {
            println!("{:<40} {:>12} MODIFIED", "FILENAME", "SIZE");
            for file in &listing.files {
                println!(
                    "{:<40} {:>12} {:.0}",
                    file.filename,
                    format_bytes(file.size),
                    file.modified
                );
            }
            println!("count: {}", listing.count);
        }
    }
    Ok(())
}

pub(crate) fn render_policy(config: &IntakeConfig, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(config)?,
        OutputFormat::Table => {
            println!("endpoint: {}", config.endpoint);
            println!("transport: {}", config.transport);
            println!("timeout: {}s", config.request_timeout_secs);
            println!("simulated delay: {}ms", config.simulated_delay_ms);
            println!(
                "allowed types: {}",
                config.policy.allowed_media_types.join(", ")
            );
            println!("max size: {}", format_bytes(config.policy.max_byte_size));
            println!(
                "notifications: success {}ms / error {}ms",
                config.notifications.success_ms, config.notifications.error_ms
            );
        }
    }
    Ok(())
}

#[must_use]
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;
    let value = bytes_to_f64(bytes);
    if value >= GIB {
        format!("{:.2} GiB", value / GIB)
    } else if value >= MIB {
        format!("{:.2} MiB", value / MIB)
    } else if value >= KIB {
        format!("{:.2} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

fn bytes_to_f64(value: u64) -> f64 {
    let high = u32::try_from(value >> 32).unwrap_or(u32::MAX);
    let low = u32::try_from(value & 0xFFFF_FFFF).unwrap_or(u32::MAX);
    f64::from(high) * 4_294_967_296.0 + f64::from(low)
}
