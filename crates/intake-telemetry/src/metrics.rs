//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Labels are the stable identifiers used elsewhere (`accepted`/`rejected`,
//!   rejection kinds, notification kinds, event types).

use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry for the intake.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    submissions_total: IntCounterVec,
    rejections_total: IntCounterVec,
    notifications_total: IntCounterVec,
    events_emitted_total: IntCounterVec,
    uploads_in_flight: IntGauge,
}

/// Snapshot of the headline counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Submissions settled as accepted.
    pub accepted_total: u64,
    /// Submissions settled as rejected.
    pub rejected_total: u64,
    /// Uploads currently in their transport call.
    pub uploads_in_flight: i64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let submissions_total = counter_vec(
            "intake_submissions_total",
            "Settled submissions by outcome",
            &["outcome"],
        )?;
        let rejections_total = counter_vec(
            "intake_rejections_total",
            "Rejected submissions by kind",
            &["kind"],
        )?;
        let notifications_total = counter_vec(
            "intake_notifications_total",
            "Notifications raised by kind",
            &["kind"],
        )?;
        let events_emitted_total = counter_vec(
            "intake_events_emitted_total",
            "Lifecycle events emitted by type",
            &["type"],
        )?;
        let uploads_in_flight = IntGauge::with_opts(Opts::new(
            "intake_uploads_in_flight",
            "Uploads currently in their transport call",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "intake_uploads_in_flight",
            source,
        })?;

        register(&registry, "intake_submissions_total", &submissions_total)?;
        register(&registry, "intake_rejections_total", &rejections_total)?;
        register(&registry, "intake_notifications_total", &notifications_total)?;
        register(&registry, "intake_events_emitted_total", &events_emitted_total)?;
        register(&registry, "intake_uploads_in_flight", &uploads_in_flight)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                submissions_total,
                rejections_total,
                notifications_total,
                events_emitted_total,
                uploads_in_flight,
            }),
        })
    }

    /// Count a settled submission.
    pub fn record_accepted(&self) {
        self.inner
            .submissions_total
            .with_label_values(&["accepted"])
            .inc();
    }

    /// Count a rejected submission under its kind.
    pub fn record_rejected(&self, kind: &str) {
        self.inner
            .submissions_total
            .with_label_values(&["rejected"])
            .inc();
        self.inner.rejections_total.with_label_values(&[kind]).inc();
    }

    /// Count a raised notification.
    pub fn record_notification(&self, kind: &str) {
        self.inner
            .notifications_total
            .with_label_values(&[kind])
            .inc();
    }

    /// Count an emitted lifecycle event.
    pub fn record_event(&self, event_type: &str) {
        self.inner
            .events_emitted_total
            .with_label_values(&[event_type])
            .inc();
    }

    /// Update the in-flight gauge.
    pub fn set_uploads_in_flight(&self, value: usize) {
        self.inner
            .uploads_in_flight
            .set(i64::try_from(value).unwrap_or(i64::MAX));
    }

    /// Headline counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            accepted_total: self
                .inner
                .submissions_total
                .with_label_values(&["accepted"])
                .get(),
            rejected_total: self
                .inner
                .submissions_total
                .with_label_values(&["rejected"])
                .get(),
            uploads_in_flight: self.inner.uploads_in_flight.get(),
        }
    }

    /// Render the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.inner.registry.gather(), &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}
