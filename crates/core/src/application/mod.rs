// Application Layer - Iteration function and the harness around it

pub mod iteration;
pub mod summary;
pub mod worker;

// Re-exports
pub use iteration::IterationRunner;
pub use load_test::{LoadProfile, LoadTest};
pub use summary::{CheckAggregator, CheckSummary, LatencySummary, RunSummary};
pub use worker::{shutdown_channel, ShutdownSender, ShutdownToken, VirtualUser};
