// Request Sender Port
// Abstraction over the HTTP client that posts form bodies

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Content type of every request body
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// One form-encoded POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub url: String,
    /// Already form-urlencoded
    pub body: String,
    /// None = client default
    pub timeout: Option<Duration>,
}

/// What came back (only the status matters)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOutcome {
    pub status: u16,
}

/// Request produced no response
///
/// The variants only enrich log lines; every one of them is a failed check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Request Sender trait
///
/// Implementations:
/// - ReqwestSender (infra-http): real HTTP
/// - MockRequestSender: scripted responses for tests
#[async_trait]
pub trait RequestSender: Send + Sync {
    /// POST `request.body` to `request.url` with the form content type
    ///
    /// # Errors
    /// - SendError::Timeout if no response within the timeout
    /// - SendError::Connect if the target is unreachable
    /// - SendError::Transport for anything else below HTTP
    async fn post_form(&self, request: &FormRequest) -> Result<SendOutcome, SendError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Mock sender behavior for one URL
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Answer immediately with this status
        Status(u16),
        /// Answer with this status after a delay
        Delayed(Duration, u16),
        /// Never answer; fail once the request timeout (or 60s) elapses
        Hang,
        /// Connection refused
        Refuse,
        /// Panic inside the sender (for panic isolation testing)
        Panic(String),
    }

    /// Mock Request Sender for testing
    #[derive(Clone)]
    pub struct MockRequestSender {
        default: MockBehavior,
        per_url: Arc<Mutex<HashMap<String, MockBehavior>>>,
        requests: Arc<Mutex<Vec<FormRequest>>>,
    }

    impl MockRequestSender {
        pub fn new(default: MockBehavior) -> Self {
            Self {
                default,
                per_url: Arc::new(Mutex::new(HashMap::new())),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_created() -> Self {
            Self::new(MockBehavior::Status(201))
        }

        /// Override behavior for one URL
        pub fn on(self, url: impl Into<String>, behavior: MockBehavior) -> Self {
            self.per_url.lock().unwrap().insert(url.into(), behavior);
            self
        }

        pub fn requests(&self) -> Vec<FormRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RequestSender for MockRequestSender {
        async fn post_form(&self, request: &FormRequest) -> Result<SendOutcome, SendError> {
            self.requests.lock().unwrap().push(request.clone());

            let behavior = self
                .per_url
                .lock()
                .unwrap()
                .get(&request.url)
                .cloned()
                .unwrap_or_else(|| self.default.clone());

            match behavior {
                MockBehavior::Status(status) => Ok(SendOutcome { status }),
                MockBehavior::Delayed(delay, status) => {
                    let limit = request.timeout.unwrap_or(Duration::from_secs(60));
                    if delay >= limit {
                        tokio::time::sleep(limit).await;
                        return Err(SendError::Timeout(limit));
                    }
                    tokio::time::sleep(delay).await;
                    Ok(SendOutcome { status })
                }
                MockBehavior::Hang => {
                    let limit = request.timeout.unwrap_or(Duration::from_secs(60));
                    tokio::time::sleep(limit).await;
                    Err(SendError::Timeout(limit))
                }
                MockBehavior::Refuse => Err(SendError::Connect(format!(
                    "connection refused: {}",
                    request.url
                ))),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg);
                }
            }
        }
    }
}
