// Check Recorder Port
// Where per-response pass/fail results go (aggregated by the harness)

use crate::domain::{CheckOutcome, IterationContext};

pub trait CheckRecorder: Send + Sync {
    /// Record one evaluated check. Must not block for long: it is called
    /// on the request path of every virtual user.
    fn record(&self, ctx: IterationContext, outcome: &CheckOutcome);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every recorded check in order
    #[derive(Default)]
    pub struct RecordingCheckRecorder {
        records: Mutex<Vec<(IterationContext, CheckOutcome)>>,
    }

    impl RecordingCheckRecorder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn records(&self) -> Vec<(IterationContext, CheckOutcome)> {
            self.records.lock().unwrap().clone()
        }

        pub fn passed(&self) -> usize {
            self.records
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, o)| o.passed)
                .count()
        }

        pub fn failed(&self) -> usize {
            self.records
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, o)| !o.passed)
                .count()
        }
    }

    impl CheckRecorder for RecordingCheckRecorder {
        fn record(&self, ctx: IterationContext, outcome: &CheckOutcome) {
            self.records.lock().unwrap().push((ctx, outcome.clone()));
        }
    }
}
