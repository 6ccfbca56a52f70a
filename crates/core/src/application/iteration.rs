// Request Iteration Function
// build payload -> encode -> POST each target -> check status -> pause

use crate::domain::{CheckOutcome, IterationContext, IterationReport, Scenario, Target};
use crate::error::Result;
use crate::port::{CheckRecorder, FormRequest, RequestSender};
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// Runs one invocation of a scenario.
///
/// Stateless: everything an invocation touches is either immutable and
/// shared through `Arc` (scenario, sender) or built fresh per call (payload,
/// body). Cloning is cheap and every virtual user holds its own clone.
#[derive(Clone)]
pub struct IterationRunner {
    scenario: Arc<Scenario>,
    sender: Arc<dyn RequestSender>,
    recorder: Arc<dyn CheckRecorder>,
}

impl IterationRunner {
    pub fn new(
        scenario: Arc<Scenario>,
        sender: Arc<dyn RequestSender>,
        recorder: Arc<dyn CheckRecorder>,
    ) -> Self {
        Self {
            scenario,
            sender,
            recorder,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Execute one iteration.
    ///
    /// A failed check (wrong status, timeout, connection error) never ends
    /// the invocation early: remaining targets are still requested and the
    /// pause still happens.
    ///
    /// # Errors
    /// Only when the payload cannot be built or encoded; nothing is sent in
    /// that case.
    pub async fn run_once(&self, ctx: IterationContext) -> Result<IterationReport> {
        let started = Instant::now();

        let payload = self.scenario.template.build(ctx);
        let body = payload.to_form()?;

        let mut checks = Vec::with_capacity(self.scenario.targets.len());
        for target in &self.scenario.targets {
            let outcome = self.send_and_check(target, &body).await;
            if outcome.passed {
                debug!(
                    worker_id = ctx.worker_id,
                    iteration = ctx.iteration,
                    target = %target.name,
                    latency_ms = outcome.latency.as_millis() as u64,
                    "Check passed"
                );
            } else {
                warn!(
                    worker_id = ctx.worker_id,
                    iteration = ctx.iteration,
                    target = %target.name,
                    status = ?outcome.status,
                    error = ?outcome.error,
                    "Check failed: {}",
                    outcome.check
                );
            }
            self.recorder.record(ctx, &outcome);
            checks.push(outcome);
        }

        sleep(self.scenario.pause).await;

        Ok(IterationReport {
            context: ctx,
            checks,
            elapsed: started.elapsed(),
        })
    }

    async fn send_and_check(&self, target: &Target, body: &str) -> CheckOutcome {
        let check = self.scenario.check_name(target);
        let request = FormRequest {
            url: target.url.clone(),
            body: body.to_string(),
            timeout: target.timeout,
        };

        let started = Instant::now();
        let result = self.sender.post_form(&request).await;
        let latency = started.elapsed();

        match result {
            Ok(response) => CheckOutcome::from_status(
                check,
                &target.name,
                self.scenario.expected_status,
                response.status,
                latency,
            ),
            Err(e) => CheckOutcome::from_error(check, &target.name, e.to_string(), latency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::{DIRECT_URL, GATEWAY_URL, SINGLE_TARGET_URL};
    use crate::domain::ItemPayload;
    use crate::port::check_recorder::mocks::RecordingCheckRecorder;
    use crate::port::request_sender::mocks::{MockBehavior, MockRequestSender};
    use std::time::Duration;

    fn runner(
        scenario: Scenario,
        sender: MockRequestSender,
    ) -> (IterationRunner, Arc<RecordingCheckRecorder>) {
        let recorder = Arc::new(RecordingCheckRecorder::new());
        let runner = IterationRunner::new(Arc::new(scenario), Arc::new(sender), recorder.clone());
        (runner, recorder)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_target_posts_fixed_payload() {
        let sender = MockRequestSender::new_created();
        let (runner, recorder) = runner(Scenario::single_target(), sender.clone());

        let report = runner.run_once(IterationContext::new(1, 0)).await.unwrap();

        assert!(report.all_passed());
        assert_eq!(report.checks[0].check, "status is 201");

        let requests = sender.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, SINGLE_TARGET_URL);
        assert_eq!(requests[0].timeout, None);
        let payload = ItemPayload::from_form(&requests[0].body).unwrap();
        assert_eq!(payload.name, "Test Bouquet");

        assert_eq!(recorder.passed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dual_target_all_created() {
        let sender = MockRequestSender::new_created();
        let (runner, recorder) = runner(Scenario::dual_target(), sender.clone());

        let report = runner.run_once(IterationContext::new(4, 2)).await.unwrap();

        assert!(report.all_passed());
        assert!(report.elapsed >= Duration::from_secs(1));
        assert_eq!(recorder.passed(), 2);

        let requests = sender.requests();
        let urls: Vec<&str> = requests.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec![GATEWAY_URL, DIRECT_URL]);
        for request in &requests {
            assert_eq!(request.timeout, Some(Duration::from_secs(30)));
            assert_eq!(
                ItemPayload::from_form(&request.body).unwrap().name,
                "Bouquet 4-2"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_gateway_failure_does_not_abort() {
        let sender =
            MockRequestSender::new_created().on(GATEWAY_URL, MockBehavior::Status(500));
        let (runner, recorder) = runner(Scenario::dual_target(), sender.clone());

        let report = runner.run_once(IterationContext::new(1, 0)).await.unwrap();

        assert_eq!(sender.call_count(), 2);
        assert!(!report.checks[0].passed);
        assert_eq!(report.checks[0].status, Some(500));
        assert!(report.checks[1].passed);
        assert!(report.elapsed >= Duration::from_secs(1));
        assert_eq!(recorder.failed(), 1);
        assert_eq!(recorder.passed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_target_fails_after_timeout() {
        let sender = MockRequestSender::new_created().on(GATEWAY_URL, MockBehavior::Hang);
        let (runner, _recorder) = runner(Scenario::dual_target(), sender);

        let report = runner.run_once(IterationContext::new(1, 0)).await.unwrap();

        let gateway = &report.checks[0];
        assert!(!gateway.passed);
        assert!(gateway.status.is_none());
        assert!(gateway.latency >= Duration::from_secs(30));
        assert!(gateway.error.as_deref().unwrap().contains("timed out"));
        assert!(report.checks[1].passed);
        assert!(report.elapsed >= Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_connection_is_a_failed_check() {
        let sender = MockRequestSender::new(MockBehavior::Refuse);
        let (runner, recorder) = runner(Scenario::single_target(), sender);

        let report = runner.run_once(IterationContext::new(1, 0)).await.unwrap();

        assert!(!report.all_passed());
        assert_eq!(recorder.failed(), 1);
        assert!(report.elapsed >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_payload_sends_nothing() {
        let mut scenario = Scenario::single_target();
        scenario.template.price.clear();
        let sender = MockRequestSender::new_created();
        let (runner, recorder) = runner(scenario, sender.clone());

        assert!(runner.run_once(IterationContext::new(1, 0)).await.is_err());
        assert_eq!(sender.call_count(), 0);
        assert!(recorder.records().is_empty());
    }
}
