//! In-process inventory service used by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Router;
use bloomload_core::application::IterationRunner;
use bloomload_core::domain::Scenario;
use bloomload_core::port::CheckRecorder;
use bloomload_infra_http::{HttpClientConfig, ReqwestSender};
use tokio::net::TcpListener;

pub const ITEMS_PATH: &str = "/api/inventory/items/";

/// How the mock answers every POST
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Status(u16),
    /// Accept the request and never answer
    Hang,
}

/// One request as the service saw it
#[derive(Debug, Clone)]
pub struct Received {
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

struct InventoryState {
    reply: Reply,
    received: Mutex<Vec<Received>>,
}

pub struct MockInventory {
    base_url: String,
    state: Arc<InventoryState>,
}

impl MockInventory {
    /// Bind an ephemeral port and serve until the test runtime shuts down
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(InventoryState {
            reply,
            received: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn items_url(&self) -> String {
        format!("{}{}", self.base_url, ITEMS_PATH)
    }

    pub fn received(&self) -> Vec<Received> {
        self.state.received.lock().unwrap().clone()
    }
}

async fn handle(
    State(state): State<Arc<InventoryState>>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.received.lock().unwrap().push(Received {
        path: uri.path().to_string(),
        content_type,
        body,
    });

    match state.reply {
        Reply::Status(code) => StatusCode::from_u16(code).unwrap(),
        Reply::Hang => std::future::pending::<StatusCode>().await,
    }
}

/// Real HTTP sender with default client settings
pub fn http_sender() -> Arc<ReqwestSender> {
    Arc::new(ReqwestSender::new(HttpClientConfig::default()).unwrap())
}

/// Dual-target scenario aimed at the two mocks
pub fn dual_scenario(gateway: &MockInventory, direct: &MockInventory) -> Scenario {
    let mut scenario = Scenario::dual_target();
    scenario.targets[0].url = gateway.items_url();
    scenario.targets[1].url = direct.items_url();
    scenario
}

pub fn runner(scenario: Scenario, recorder: Arc<dyn CheckRecorder>) -> IterationRunner {
    IterationRunner::new(Arc::new(scenario), http_sender(), recorder)
}
