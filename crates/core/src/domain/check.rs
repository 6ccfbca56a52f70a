// Check Domain Model

use serde::Serialize;
use std::time::Duration;

/// Identity of one invocation: which virtual user, which of its iterations.
///
/// Worker ids start at 1, iterations at 0 for every worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IterationContext {
    pub worker_id: u64,
    pub iteration: u64,
}

impl IterationContext {
    pub fn new(worker_id: u64, iteration: u64) -> Self {
        Self {
            worker_id,
            iteration,
        }
    }
}

/// Result of the status assertion for one response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// Check name, e.g. "status is 201" or "gateway status is 201"
    pub check: String,
    /// Target name the request went to
    pub target: String,
    pub passed: bool,
    /// Response status, None when no response arrived
    pub status: Option<u16>,
    #[serde(with = "duration_ms")]
    pub latency: Duration,
    /// Transport error text (timeout, refused, ...)
    pub error: Option<String>,
}

impl CheckOutcome {
    /// Outcome for a response that arrived
    pub fn from_status(
        check: impl Into<String>,
        target: impl Into<String>,
        expected: u16,
        status: u16,
        latency: Duration,
    ) -> Self {
        Self {
            check: check.into(),
            target: target.into(),
            passed: status == expected,
            status: Some(status),
            latency,
            error: None,
        }
    }

    /// Outcome for a request that produced no response; always a failure
    pub fn from_error(
        check: impl Into<String>,
        target: impl Into<String>,
        error: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            check: check.into(),
            target: target.into(),
            passed: false,
            status: None,
            latency,
            error: Some(error.into()),
        }
    }
}

/// Everything one invocation produced
#[derive(Debug, Clone, Serialize)]
pub struct IterationReport {
    pub context: IterationContext,
    pub checks: Vec<CheckOutcome>,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

impl IterationReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
