// Check aggregation and end-of-run summary

use crate::application::worker::constants::LATENCY_HISTOGRAM_SIGFIGS;
use crate::domain::{CheckOutcome, IterationContext, ScenarioKind};
use crate::port::CheckRecorder;
use hdrhistogram::Histogram;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::warn;

/// Pass/fail counters and latency histogram for one check name
struct CheckStats {
    passes: u64,
    fails: u64,
    /// Microseconds; None if the histogram could not be allocated
    latency_us: Option<Histogram<u64>>,
}

impl CheckStats {
    fn new() -> Self {
        let latency_us = match Histogram::new(LATENCY_HISTOGRAM_SIGFIGS) {
            Ok(hist) => Some(hist),
            Err(e) => {
                warn!(error = %e, "Latency histogram unavailable");
                None
            }
        };
        Self {
            passes: 0,
            fails: 0,
            latency_us,
        }
    }
}

/// Thread-safe aggregation of check outcomes across all virtual users
#[derive(Default)]
pub struct CheckAggregator {
    checks: Mutex<BTreeMap<String, CheckStats>>,
}

impl CheckAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every check seen so far, sorted by name
    pub fn summaries(&self) -> Vec<CheckSummary> {
        let checks = match self.checks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        checks
            .iter()
            .map(|(name, stats)| CheckSummary::from_stats(name, stats))
            .collect()
    }
}

impl CheckRecorder for CheckAggregator {
    fn record(&self, _ctx: IterationContext, outcome: &CheckOutcome) {
        let mut checks = match self.checks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let stats = checks
            .entry(outcome.check.clone())
            .or_insert_with(CheckStats::new);

        if outcome.passed {
            stats.passes += 1;
        } else {
            stats.fails += 1;
        }
        if let Some(hist) = stats.latency_us.as_mut() {
            hist.saturating_record(outcome.latency.as_micros() as u64);
        }
    }
}

/// Request latency percentiles in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    pub min_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

impl LatencySummary {
    fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.is_empty() {
            return Self::default();
        }
        let ms = |us: u64| us as f64 / 1000.0;
        Self {
            min_ms: ms(hist.min()),
            mean_ms: hist.mean() / 1000.0,
            p50_ms: ms(hist.value_at_quantile(0.50)),
            p95_ms: ms(hist.value_at_quantile(0.95)),
            p99_ms: ms(hist.value_at_quantile(0.99)),
            max_ms: ms(hist.max()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckSummary {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
    pub pass_rate: f64,
    pub latency: LatencySummary,
}

impl CheckSummary {
    fn from_stats(name: &str, stats: &CheckStats) -> Self {
        let total = stats.passes + stats.fails;
        Self {
            name: name.to_string(),
            passes: stats.passes,
            fails: stats.fails,
            pass_rate: if total == 0 {
                0.0
            } else {
                stats.passes as f64 / total as f64
            },
            latency: stats
                .latency_us
                .as_ref()
                .map(LatencySummary::from_histogram)
                .unwrap_or_default(),
        }
    }

    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }
}

/// What a load test run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scenario: ScenarioKind,
    pub vus: u64,
    /// Milliseconds since epoch
    pub started_at: i64,
    pub finished_at: i64,
    /// Iterations that ran to completion, across all users
    pub iterations: u64,
    pub checks: Vec<CheckSummary>,
}

impl RunSummary {
    pub fn elapsed_ms(&self) -> i64 {
        self.finished_at - self.started_at
    }

    pub fn total_passes(&self) -> u64 {
        self.checks.iter().map(|c| c.passes).sum()
    }

    pub fn total_fails(&self) -> u64 {
        self.checks.iter().map(|c| c.fails).sum()
    }

    pub fn total_checks(&self) -> u64 {
        self.total_passes() + self.total_fails()
    }

    /// Pass rate over every check; 0.0 when nothing was checked
    pub fn pass_rate(&self) -> f64 {
        let total = self.total_checks();
        if total == 0 {
            0.0
        } else {
            self.total_passes() as f64 / total as f64
        }
    }

    /// A run with no checks only meets a threshold of 0
    pub fn meets_threshold(&self, min_pass_rate: f64) -> bool {
        if min_pass_rate <= 0.0 {
            return true;
        }
        self.total_checks() > 0 && self.pass_rate() >= min_pass_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn outcome(check: &str, status: u16, latency_ms: u64) -> CheckOutcome {
        CheckOutcome::from_status(check, "t", 201, status, Duration::from_millis(latency_ms))
    }

    #[test]
    fn test_aggregates_per_check_name() {
        let agg = CheckAggregator::new();
        let ctx = IterationContext::new(1, 0);
        agg.record(ctx, &outcome("gateway status is 201", 500, 40));
        agg.record(ctx, &outcome("gateway status is 201", 201, 20));
        agg.record(ctx, &outcome("direct status is 201", 201, 10));
        agg.record(
            ctx,
            &CheckOutcome::from_error("direct status is 201", "direct", "refused", Duration::ZERO),
        );

        let summaries = agg.summaries();
        assert_eq!(summaries.len(), 2);
        // BTreeMap order
        assert_eq!(summaries[0].name, "direct status is 201");
        assert_eq!(summaries[0].passes, 1);
        assert_eq!(summaries[0].fails, 1);
        assert_eq!(summaries[1].name, "gateway status is 201");
        assert_eq!(summaries[1].pass_rate, 0.5);
        assert!(summaries[1].latency.max_ms >= 39.9);
        assert!(summaries[1].latency.min_ms <= 20.1);
    }

    #[test]
    fn test_concurrent_recording() {
        let agg = std::sync::Arc::new(CheckAggregator::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let agg = agg.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let status = if i % 10 == 0 { 500 } else { 201 };
                        agg.record(IterationContext::new(worker, i), &outcome("status is 201", status, 5));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let summary = &agg.summaries()[0];
        assert_eq!(summary.total(), 4000);
        assert_eq!(summary.fails, 400);
    }

    #[test]
    fn test_run_summary_threshold() {
        let mut summary = RunSummary {
            scenario: ScenarioKind::Single,
            vus: 1,
            started_at: 1_000,
            finished_at: 4_000,
            iterations: 0,
            checks: vec![],
        };
        assert_eq!(summary.pass_rate(), 0.0);
        assert!(summary.meets_threshold(0.0));
        assert!(!summary.meets_threshold(0.5));

        summary.checks.push(CheckSummary {
            name: "status is 201".to_string(),
            passes: 9,
            fails: 1,
            pass_rate: 0.9,
            latency: LatencySummary::default(),
        });
        assert_eq!(summary.elapsed_ms(), 3_000);
        assert!(summary.meets_threshold(0.9));
        assert!(!summary.meets_threshold(0.95));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["scenario"], "single");
        assert_eq!(json["checks"][0]["passes"], 9);
    }
}
