//! `intake upload`: one single-file selection per path, submitted in order.

use anyhow::anyhow;
use intake_config::TransportMode;
use intake_core::{IntakeDesk, Rejection, SelectedFile, messages};
use intake_events::{EventId, IntakeEvent};
use tracing::{debug, warn};

use crate::cli::{OutputFormat, UploadArgs};
use crate::client::{AppContext, CliError, CliResult, classify_rejection};
use crate::output::{SubmissionReport, render_notification, render_upload_summary};

pub(crate) async fn handle_upload(ctx: &AppContext, args: UploadArgs) -> CliResult<()> {
    let mode = if args.simulate {
        TransportMode::Simulated
    } else {
        ctx.config.transport
    };
    let desk = ctx.desk(mode)?;
    debug!(
        transport = desk.transport_name(),
        paths = args.paths.len(),
        "starting upload run"
    );
    let mut cursor: EventId = 0;
    let mut reports = Vec::with_capacity(args.paths.len());

    for path in &args.paths {
        let outcome = match SelectedFile::from_path(path, args.content_type.as_deref()).await {
            Ok(file) => desk
                .submit_file(file)
                .await
                .map_err(|err| CliError::failure(anyhow::Error::new(err)))?,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot open selected file");
                let reason = format!("{} ({})", messages::FILE_UNREADABLE, path.display());
                let filename = path
                    .file_name()
                    .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
                desk.reject_unreadable(filename, reason)
            }
        };
        cursor = drain_events(ctx, &desk, cursor);
        reports.push(SubmissionReport {
            path: path.display().to_string(),
            outcome,
        });
    }

    if args.wait_notifications {
        let mut notices = desk.notifications().subscribe();
        let _ = notices.wait_for(Option::is_none).await;
    }

    render_upload_summary(&reports, desk.ledger(), ctx.output)?;
    if args.metrics {
        ctx.metrics.set_uploads_in_flight(desk.in_flight());
        let text = ctx
            .metrics
            .render()
            .map_err(|err| CliError::failure(anyhow!("failed to render metrics: {err}")))?;
        print!("{text}");
    }

    summarize(&reports)
}

/// Forward newly published events to metrics and print raised notifications.
fn drain_events(ctx: &AppContext, desk: &IntakeDesk, cursor: EventId) -> EventId {
    let mut last = cursor;
    for envelope in desk.events().backlog_since(cursor) {
        last = envelope.id;
        ctx.metrics.record_event(envelope.event.kind());
        match &envelope.event {
            IntakeEvent::UploadAccepted { .. } => ctx.metrics.record_accepted(),
            IntakeEvent::UploadRejected { kind, .. } => ctx.metrics.record_rejected(kind),
            IntakeEvent::NotificationRaised { kind, message } => {
                ctx.metrics.record_notification(kind);
                announce(ctx, kind, message);
            }
            IntakeEvent::SubmissionStarted { .. } | IntakeEvent::UploadStarted { .. } => {}
        }
    }
    last
}

fn announce(ctx: &AppContext, kind: &str, message: &str) {
    if ctx.output == OutputFormat::Table {
        render_notification(kind, message);
    }
}

/// Exit status for the whole run: any local or connectivity failure wins over
/// policy and endpoint rejections.
fn summarize(reports: &[SubmissionReport]) -> CliResult<()> {
    let rejections: Vec<&Rejection> = reports
        .iter()
        .filter_map(|report| report.outcome.rejection())
        .collect();
    let Some(first) = rejections.first() else {
        return Ok(());
    };
    if rejections.len() == 1 && reports.len() == 1 {
        return Err(classify_rejection(first));
    }

    let message = format!(
        "{} of {} submissions rejected",
        rejections.len(),
        reports.len()
    );
    let any_failure = rejections
        .iter()
        .any(|rejection| classify_rejection(rejection).exit_code() == 3);
    if any_failure {
        Err(CliError::failure(anyhow!(message)))
    } else {
        Err(CliError::validation(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{test_context, test_context_with};
    use httpmock::prelude::*;
    use intake_config::IntakeConfig;
    use intake_test_support::fixtures::unreachable_endpoint;
    use serde_json::json;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_file(
        dir: &tempfile::TempDir,
        name: &str,
        bytes: usize,
    ) -> anyhow::Result<PathBuf> {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path)?;
        file.write_all(&vec![0_u8; bytes])?;
        Ok(path)
    }

    fn args(paths: Vec<PathBuf>) -> UploadArgs {
        UploadArgs {
            paths,
            ..UploadArgs::default()
        }
    }

    #[tokio::test]
    async fn network_upload_posts_each_allowed_file() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/upload");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "filename": "plan.png",
                        "file_size": 32,
                        "content_type": "image/png"
                    }));
            })
            .await;
        let dir = tempfile::tempdir()?;
        let path = temp_file(&dir, "plan.png", 32)?;
        let ctx = test_context(&server.base_url())?;

        handle_upload(&ctx, args(vec![path]))
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        mock.assert_async().await;
        assert_eq!(ctx.metrics.snapshot().accepted_total, 1);
        Ok(())
    }

    #[tokio::test]
    async fn unsupported_file_is_rejected_locally() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = temp_file(&dir, "archive.zip", 10)?;
        let ctx = test_context(unreachable_endpoint()?.as_str())?;

        let err = handle_upload(&ctx, args(vec![path]))
            .await
            .expect_err("rejection expected");

        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("지원하지 않는 파일 형식"));
        assert_eq!(ctx.metrics.snapshot().rejected_total, 1);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_endpoint_exits_as_failure() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = temp_file(&dir, "plan.pdf", 10)?;
        let ctx = test_context(unreachable_endpoint()?.as_str())?;

        let err = handle_upload(&ctx, args(vec![path]))
            .await
            .expect_err("failure expected");

        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.display_message(), messages::SERVER_UNREACHABLE);
        Ok(())
    }

    #[tokio::test]
    async fn mixed_run_reports_counts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let good = temp_file(&dir, "a.png", 4)?;
        let bad = temp_file(&dir, "b.zip", 4)?;
        let ctx = test_context_with(IntakeConfig {
            simulated_delay_ms: 1,
            ..IntakeConfig::default()
        })?;
        let upload = UploadArgs {
            simulate: true,
            ..args(vec![good, bad])
        };

        let err = handle_upload(&ctx, upload).await.expect_err("one rejection");

        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "1 of 2 submissions rejected");
        assert_eq!(ctx.metrics.snapshot().accepted_total, 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_path_counts_as_failure() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let good = temp_file(&dir, "a.png", 4)?;
        let ctx = test_context_with(IntakeConfig {
            simulated_delay_ms: 1,
            ..IntakeConfig::default()
        })?;
        let upload = UploadArgs {
            simulate: true,
            ..args(vec![good, dir.path().join("gone.png")])
        };

        let err = handle_upload(&ctx, upload).await.expect_err("one failure");

        assert_eq!(err.exit_code(), 3);
        let snapshot = ctx.metrics.snapshot();
        assert_eq!(snapshot.accepted_total, 1);
        assert_eq!(snapshot.rejected_total, 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn missing_path_error_notice_is_waited_out() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let ctx = test_context_with(IntakeConfig::default())?;
        let started = tokio::time::Instant::now();
        let upload = UploadArgs {
            simulate: true,
            wait_notifications: true,
            ..args(vec![dir.path().join("gone.png")])
        };

        let err = handle_upload(&ctx, upload).await.expect_err("unreadable");

        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains(messages::FILE_UNREADABLE));
        assert!(started.elapsed() >= std::time::Duration::from_millis(5_000));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn wait_notifications_returns_after_the_window() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let good = temp_file(&dir, "a.png", 4)?;
        let ctx = test_context_with(IntakeConfig {
            simulated_delay_ms: 10,
            ..IntakeConfig::default()
        })?;
        let started = tokio::time::Instant::now();
        let upload = UploadArgs {
            simulate: true,
            wait_notifications: true,
            metrics: true,
            ..args(vec![good])
        };

        handle_upload(&ctx, upload)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        assert!(started.elapsed() >= std::time::Duration::from_millis(3_010));
        Ok(())
    }
}
