// Worker - Virtual user iteration loop

pub mod constants;
mod shutdown;

use constants::*;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::iteration::IterationRunner;
use crate::domain::IterationContext;
use crate::error::Result;
use tokio::task::AbortHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Aborts the spawned iteration when the user future is dropped mid-await
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// One virtual user: runs iterations back to back until shutdown
pub struct VirtualUser {
    id: u64,
    runner: IterationRunner,
}

impl VirtualUser {
    pub fn new(id: u64, runner: IterationRunner) -> Self {
        Self { id, runner }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Run the iteration loop with graceful shutdown support.
    ///
    /// Returns the number of iterations that ran to completion. Shutdown
    /// stops new iterations from starting; one already in flight runs to the
    /// end (pause included) and is counted. Dropping this future aborts the
    /// in-flight iteration, which is how a caller enforces a stop deadline.
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<u64> {
        info!(worker_id = self.id, "Virtual user started");
        let mut next_iteration = 0u64;
        let mut completed = 0u64;

        loop {
            // Check for shutdown signal
            if shutdown.is_shutdown() {
                break;
            }

            let ctx = IterationContext::new(self.id, next_iteration);
            next_iteration += 1;

            // Each iteration runs in its own task so a panic stays inside it
            let runner = self.runner.clone();
            let handle = tokio::task::spawn(async move { runner.run_once(ctx).await });
            let _abort_on_drop = AbortOnDrop(handle.abort_handle());

            let failed = match handle.await {
                Ok(Ok(report)) => {
                    completed += 1;
                    debug!(
                        worker_id = self.id,
                        iteration = ctx.iteration,
                        passed = report.all_passed(),
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "Iteration finished"
                    );
                    false
                }
                Ok(Err(e)) => {
                    error!(worker_id = self.id, iteration = ctx.iteration, "Iteration error: {}", e);
                    true
                }
                Err(join_err) => {
                    if join_err.is_panic() {
                        error!(worker_id = self.id, iteration = ctx.iteration, "Iteration panicked: {:?}", join_err);
                    } else {
                        error!(worker_id = self.id, iteration = ctx.iteration, "Iteration cancelled: {:?}", join_err);
                    }
                    true
                }
            };

            // Errored iterations skip the scenario pause; back off instead
            if failed {
                tokio::select! {
                    _ = sleep(ERROR_RECOVERY_SLEEP_DURATION) => {},
                    _ = shutdown.wait() => break,
                }
            }
        }

        info!(
            worker_id = self.id,
            iterations = completed,
            "Virtual user stopped"
        );
        Ok(completed)
    }
}
