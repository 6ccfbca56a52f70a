// Scenario Domain Model
// A scenario = payload template + ordered list of targets + assertion + pause

use super::error::{DomainError, Result};
use super::payload::PayloadTemplate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SINGLE_TARGET_URL: &str = "http://localhost:8080/api/inventory/items/";
pub const GATEWAY_URL: &str = "http://localhost:31051/api/inventory/items/";
pub const DIRECT_URL: &str = "http://localhost:8001/inventoryitems/";

pub const INVENTORY_TARGET: &str = "inventory";
pub const GATEWAY_TARGET: &str = "gateway";
pub const DIRECT_TARGET: &str = "direct";

/// Per-request timeout of the dual-target variant (30s)
pub const DUAL_TARGET_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause at the end of every iteration (1s)
pub const ITERATION_PAUSE: Duration = Duration::from_secs(1);

/// 201 Created
pub const EXPECTED_STATUS: u16 = 201;

/// Which of the two request shapes to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Single,
    Dual,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Single => "single",
            ScenarioKind::Dual => "dual",
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScenarioKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "single-target" => Ok(ScenarioKind::Single),
            "dual" | "dual-target" => Ok(ScenarioKind::Dual),
            other => Err(DomainError::ValidationError(format!(
                "unknown scenario '{}', expected 'single' or 'dual'",
                other
            ))),
        }
    }
}

/// One endpoint an iteration posts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub url: String,
    /// None = HTTP client default
    pub timeout: Option<Duration>,
}

impl Target {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub kind: ScenarioKind,
    /// Requests are issued sequentially in this order
    pub targets: Vec<Target>,
    pub template: PayloadTemplate,
    pub expected_status: u16,
    pub pause: Duration,
}

impl Scenario {
    /// One POST per iteration, fixed item name, client-default timeout
    pub fn single_target() -> Self {
        Self {
            kind: ScenarioKind::Single,
            targets: vec![Target::new(INVENTORY_TARGET, SINGLE_TARGET_URL)],
            template: PayloadTemplate::fixed_name(),
            expected_status: EXPECTED_STATUS,
            pause: ITERATION_PAUSE,
        }
    }

    /// Gateway then direct service, per-iteration item name, 30s timeouts
    pub fn dual_target() -> Self {
        Self {
            kind: ScenarioKind::Dual,
            targets: vec![
                Target::new(GATEWAY_TARGET, GATEWAY_URL).with_timeout(DUAL_TARGET_TIMEOUT),
                Target::new(DIRECT_TARGET, DIRECT_URL).with_timeout(DUAL_TARGET_TIMEOUT),
            ],
            template: PayloadTemplate::per_iteration_name(),
            expected_status: EXPECTED_STATUS,
            pause: ITERATION_PAUSE,
        }
    }

    pub fn for_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::Single => Self::single_target(),
            ScenarioKind::Dual => Self::dual_target(),
        }
    }

    /// Check name for a target.
    ///
    /// A single-target scenario keeps the bare "status is 201"; with several
    /// targets each check is prefixed by the target name so they aggregate
    /// separately.
    pub fn check_name(&self, target: &Target) -> String {
        if self.targets.len() == 1 {
            format!("status is {}", self.expected_status)
        } else {
            format!("{} status is {}", target.name, self.expected_status)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(DomainError::ValidationError(
                "scenario has no targets".to_string(),
            ));
        }
        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(DomainError::ValidationError(format!(
                    "target for '{}' has no name",
                    target.url
                )));
            }
            if !(target.url.starts_with("http://") || target.url.starts_with("https://")) {
                return Err(DomainError::ValidationError(format!(
                    "target '{}' has non-http url '{}'",
                    target.name, target.url
                )));
            }
            if target.timeout == Some(Duration::ZERO) {
                return Err(DomainError::ValidationError(format!(
                    "target '{}' has a zero timeout",
                    target.name
                )));
            }
        }
        if !(100..=599).contains(&self.expected_status) {
            return Err(DomainError::ValidationError(format!(
                "expected status {} is not an HTTP status",
                self.expected_status
            )));
        }
        self.template.validate()
    }
}
