//! Prometheus metrics for rounds and verifications

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

const PLAY_BUCKETS: [f64; 10] = [
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 1.0,
];

/// Verification result label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationLabel {
    Valid,
    Invalid,
    Error,
}

impl VerificationLabel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            VerificationLabel::Valid => "valid",
            VerificationLabel::Invalid => "invalid",
            VerificationLabel::Error => "error",
        }
    }
}

/// Service-wide metric set on its own registry
#[derive(Clone)]
pub struct FairDiceMetrics {
    registry: Registry,
    rounds_total: IntCounterVec,
    verifications_total: IntCounterVec,
    play_duration: Histogram,
}

impl FairDiceMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let rounds_total = IntCounterVec::new(
            Opts::new("fairdice_rounds_total", "Rounds played"),
            &["generator", "result"],
        )?;
        let verifications_total = IntCounterVec::new(
            Opts::new("fairdice_verifications_total", "Verification requests"),
            &["outcome"],
        )?;
        let play_duration = Histogram::with_opts(
            HistogramOpts::new("fairdice_play_duration_seconds", "Time to play and store a round")
                .buckets(PLAY_BUCKETS.to_vec()),
        )?;

        registry.register(Box::new(rounds_total.clone()))?;
        registry.register(Box::new(verifications_total.clone()))?;
        registry.register(Box::new(play_duration.clone()))?;

        Ok(Self {
            registry,
            rounds_total,
            verifications_total,
            play_duration,
        })
    }

    pub fn record_round(&self, generator: &str, result: &str, elapsed: Duration) {
        self.rounds_total.with_label_values(&[generator, result]).inc();
        self.play_duration.observe(elapsed.as_secs_f64());
    }

    pub fn record_verification(&self, label: VerificationLabel) {
        self.verifications_total
            .with_label_values(&[label.as_str()])
            .inc();
    }

    pub fn rounds(&self, generator: &str, result: &str) -> u64 {
        self.rounds_total.with_label_values(&[generator, result]).get()
    }

    pub fn verifications(&self, label: VerificationLabel) -> u64 {
        self.verifications_total
            .with_label_values(&[label.as_str()])
            .get()
    }

    /// Text exposition format
    pub fn render(&self) -> String {
        let families = self.registry.gather();
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&families, &mut buf) {
            tracing::warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
