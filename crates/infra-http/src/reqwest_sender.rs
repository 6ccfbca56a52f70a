// reqwest-backed RequestSender
// One client (and connection pool) shared by every virtual user
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, trace};

use bloomload_core::port::request_sender::{
    FormRequest, RequestSender, SendError, SendOutcome, FORM_CONTENT_TYPE,
};

/// Request timeout when a target sets none (60s)
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client-wide HTTP settings
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Applies to targets without their own timeout
    pub default_timeout: Duration,
    pub connect_timeout: Option<Duration>,
    pub user_agent: String,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: None,
            user_agent: format!("bloomload/{}", bloomload_core::VERSION),
            pool_max_idle_per_host: usize::MAX,
        }
    }
}

pub struct ReqwestSender {
    client: Client,
    config: HttpClientConfig,
}

impl ReqwestSender {
    /// Build the shared client
    ///
    /// # Example
    /// ```ignore
    /// let sender = ReqwestSender::new(HttpClientConfig::default())?;
    /// ```
    pub fn new(config: HttpClientConfig) -> Result<Self, SendError> {
        let mut builder = Client::builder()
            .timeout(config.default_timeout)
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(config.pool_max_idle_per_host);
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SendError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn map_error(&self, err: reqwest::Error, timeout: Duration) -> SendError {
        if err.is_timeout() {
            SendError::Timeout(timeout)
        } else if err.is_connect() {
            SendError::Connect(err.to_string())
        } else {
            SendError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl RequestSender for ReqwestSender {
    async fn post_form(&self, request: &FormRequest) -> Result<SendOutcome, SendError> {
        let timeout = request.timeout.unwrap_or(self.config.default_timeout);

        let response = self
            .client
            .post(&request.url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .timeout(timeout)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| self.map_error(e, timeout))?;

        let status = response.status().as_u16();

        // Read the body so the connection goes back to the pool; the status
        // is already decided, so a broken body only shows up in traces
        match response.bytes().await {
            Ok(body) => trace!(url = %request.url, status, bytes = body.len(), "Response drained"),
            Err(e) => debug!(url = %request.url, status, error = %e, "Failed to drain response body"),
        }

        Ok(SendOutcome { status })
    }
}
