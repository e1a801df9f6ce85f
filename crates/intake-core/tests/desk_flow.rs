use std::sync::Arc;
use std::time::Duration;

use intake_core::{
    IntakeDesk, NotificationKind, RejectionKind, Selection, SimulatedTransport, UploadOutcome,
    ValidationPolicy, messages,
};
use intake_events::IntakeEvent;
use intake_test_support::fixtures::{MIB, pdf, png, zip};
use intake_test_support::mocks::ScriptedTransport;
use tokio::time::{Instant, sleep};

fn scripted_desk(transport: &Arc<ScriptedTransport>) -> IntakeDesk {
    IntakeDesk::new(ValidationPolicy::default(), transport.clone())
}

#[tokio::test(start_paused = true)]
async fn simulated_png_is_accepted_after_the_delay() -> anyhow::Result<()> {
    let desk = IntakeDesk::new(
        ValidationPolicy::default(),
        Arc::new(SimulatedTransport::default()),
    );
    let started = Instant::now();

    let outcome = desk.submit_file(png("x.png", 1_024)).await?;

    assert!(started.elapsed() >= Duration::from_millis(2_000));
    match outcome {
        UploadOutcome::Accepted(entry) => {
            assert_eq!(entry.filename, "x.png");
            assert_eq!(entry.byte_size, 1_024);
            assert_eq!(entry.content_type, "image/png");
        }
        UploadOutcome::Rejected(rejection) => panic!("unexpected rejection: {rejection:?}"),
    }
    assert_eq!(desk.ledger().len(), 1);
    assert_eq!(
        desk.notifications().current().map(|n| n.kind),
        Some(NotificationKind::Success)
    );

    sleep(Duration::from_millis(2_999)).await;
    assert!(desk.notifications().current().is_some());
    sleep(Duration::from_millis(2)).await;
    assert!(desk.notifications().current().is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unsupported_type_never_reaches_the_transport() -> anyhow::Result<()> {
    let transport = Arc::new(ScriptedTransport::new());
    let desk = scripted_desk(&transport);

    let outcome = desk.submit_file(zip("x.zip", 10)).await?;

    let rejection = outcome.rejection().expect("rejected");
    assert_eq!(rejection.kind, RejectionKind::UnsupportedFormat);
    assert!(rejection.reason.contains("지원하지 않는 파일 형식"));
    assert_eq!(transport.calls(), 0);
    assert!(desk.ledger().is_empty());

    let notice = desk.notifications().current().expect("error notice");
    assert_eq!(notice.kind, NotificationKind::Error);
    sleep(Duration::from_millis(4_999)).await;
    assert!(desk.notifications().current().is_some());
    sleep(Duration::from_millis(2)).await;
    assert!(desk.notifications().current().is_none());
    Ok(())
}

#[tokio::test]
async fn oversized_pdf_is_rejected_before_upload() -> anyhow::Result<()> {
    let transport = Arc::new(ScriptedTransport::new());
    let desk = scripted_desk(&transport);

    let outcome = desk.submit_file(pdf("big.pdf", 60 * MIB)).await?;

    let rejection = outcome.rejection().expect("rejected");
    assert_eq!(rejection.kind, RejectionKind::SizeExceeded);
    assert!(rejection.reason.contains("크기가 50MB를 초과"));
    assert_eq!(transport.calls(), 0);
    assert!(desk.ledger().is_empty());
    Ok(())
}

#[tokio::test]
async fn endpoint_rejection_keeps_the_ledger_unchanged() -> anyhow::Result<()> {
    let transport = Arc::new(ScriptedTransport::with_outcomes([UploadOutcome::rejected(
        RejectionKind::Endpoint { status: Some(500) },
        "storage full",
    )]));
    let desk = scripted_desk(&transport);

    let outcome = desk.submit_file(png("a.png", 5)).await?;

    assert_eq!(outcome.rejection().map(|r| r.reason.as_str()), Some("storage full"));
    assert_eq!(transport.calls(), 1);
    assert!(desk.ledger().is_empty());
    assert_eq!(
        desk.notifications().current().map(|n| n.message),
        Some("storage full".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn ledger_keeps_settle_order_and_skips_rejections() -> anyhow::Result<()> {
    let transport = Arc::new(ScriptedTransport::with_outcomes([
        UploadOutcome::Accepted(intake_core::LedgerEntry {
            filename: "one.png".into(),
            byte_size: 1,
            content_type: "image/png".into(),
        }),
        UploadOutcome::rejected(RejectionKind::Unreachable, messages::SERVER_UNREACHABLE),
        UploadOutcome::Accepted(intake_core::LedgerEntry {
            filename: "three.pdf".into(),
            byte_size: 3,
            content_type: "application/pdf".into(),
        }),
    ]));
    let desk = scripted_desk(&transport);

    for file in [png("one.png", 1), png("two.png", 2), pdf("three.pdf", 3)] {
        let _ = desk.submit_file(file).await?;
    }

    let names: Vec<_> = desk
        .ledger()
        .entries()
        .into_iter()
        .map(|entry| entry.filename)
        .collect();
    assert_eq!(names, vec!["one.png", "three.pdf"]);
    assert_eq!(desk.ledger().total_bytes(), 4);
    assert_eq!(transport.submitted(), vec!["one.png", "two.png", "three.pdf"]);
    Ok(())
}

#[tokio::test]
async fn only_the_first_file_of_a_selection_is_submitted() -> anyhow::Result<()> {
    let transport = Arc::new(ScriptedTransport::new());
    let desk = scripted_desk(&transport);

    let selection = Selection::new(vec![png("first.png", 1), png("second.png", 1)]);
    let outcome = desk.submit(selection).await?;

    assert!(outcome.is_some_and(|outcome| outcome.is_accepted()));
    assert_eq!(transport.submitted(), vec!["first.png"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn overlapping_submissions_settle_independently() -> anyhow::Result<()> {
    let transport = Arc::new(ScriptedTransport::new().with_delay(Duration::from_millis(500)));
    let desk = scripted_desk(&transport);

    let (first, second) = tokio::join!(
        desk.submit_file(png("a.png", 1)),
        desk.submit_file(pdf("b.pdf", 1)),
    );

    assert!(first?.is_accepted());
    assert!(second?.is_accepted());
    assert_eq!(desk.ledger().len(), 2);
    assert!(!desk.is_uploading());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn ledger_follows_settle_order_not_selection_order() -> anyhow::Result<()> {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_delay_for("a.png", Duration::from_millis(800))
            .with_delay_for("b.pdf", Duration::from_millis(200)),
    );
    let desk = scripted_desk(&transport);

    let slow = tokio::spawn({
        let desk = desk.clone();
        async move { desk.submit_file(png("a.png", 1)).await }
    });
    tokio::task::yield_now().await;
    let fast = tokio::spawn({
        let desk = desk.clone();
        async move { desk.submit_file(pdf("b.pdf", 1)).await }
    });

    sleep(Duration::from_millis(300)).await;
    assert!(fast.is_finished());
    assert_eq!(desk.ledger().len(), 1);
    assert!(desk.is_uploading());

    assert!(slow.await??.is_accepted());
    assert!(fast.await??.is_accepted());
    assert!(!desk.is_uploading());

    let ledger: Vec<_> = desk
        .ledger()
        .entries()
        .into_iter()
        .map(|entry| entry.filename)
        .collect();
    assert_eq!(ledger, vec!["b.pdf", "a.png"]);

    let accepted: Vec<_> = desk
        .events()
        .backlog_since(0)
        .into_iter()
        .filter_map(|env| match env.event {
            IntakeEvent::UploadAccepted { filename, .. } => Some(filename),
            _ => None,
        })
        .collect();
    assert_eq!(accepted, ledger);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn later_notice_supersedes_the_earlier_one() -> anyhow::Result<()> {
    let transport = Arc::new(ScriptedTransport::new());
    let desk = scripted_desk(&transport);

    let _ = desk.submit_file(png("ok.png", 1)).await?;
    sleep(Duration::from_millis(1_000)).await;
    let _ = desk.submit_file(zip("no.zip", 1)).await?;

    // The success window would have ended here; the error notice must survive it.
    sleep(Duration::from_millis(2_500)).await;
    assert_eq!(
        desk.notifications().current().map(|n| n.kind),
        Some(NotificationKind::Error)
    );
    sleep(Duration::from_millis(2_501)).await;
    assert!(desk.notifications().current().is_none());
    Ok(())
}
