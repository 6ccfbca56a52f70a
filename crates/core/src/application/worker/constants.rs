// Harness constants (No magic values)
use std::time::Duration;

/// Sleep after an iteration that errored or panicked (1s)
/// Keeps a broken template from spinning a virtual user
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);

/// Default number of virtual users
pub const DEFAULT_VUS: u64 = 100;

/// Default test duration (10 minutes)
pub const DEFAULT_TEST_DURATION: Duration = Duration::from_secs(10 * 60);

/// How long users get to finish in-flight iterations after the duration ends (30s)
pub const DEFAULT_GRACEFUL_STOP: Duration = Duration::from_secs(30);

/// Significant figures kept by latency histograms
pub const LATENCY_HISTOGRAM_SIGFIGS: u8 = 3;
