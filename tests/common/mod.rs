//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_sed_aggregator::config::ServiceConfig;
use api_sed_aggregator::http::{AppState, DrainOutcome};
use api_sed_aggregator::lifecycle::{Lifecycle, ProcessState, Service, Shutdown, StartupError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TEST_URL: &str = "https://example.supabase.co";
pub const TEST_KEY: &str = "test-key";

/// Environment lookup with both credentials set.
pub fn valid_env(name: &str) -> Option<String> {
    match name {
        "SUPABASE_URL" => Some(TEST_URL.to_string()),
        "SUPABASE_KEY" => Some(TEST_KEY.to_string()),
        _ => None,
    }
}

/// Environment lookup with nothing set.
pub fn empty_env(_name: &str) -> Option<String> {
    None
}

/// Config for tests: no global metrics recorder, short drain.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.observability.metrics_enabled = false;
    config.timeouts.drain_secs = 1;
    config.timeouts.request_secs = 60;
    config
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// A running service on an ephemeral loopback port.
pub struct RunningService {
    pub addr: SocketAddr,
    pub lifecycle: Lifecycle,
    pub state: AppState,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<DrainOutcome, StartupError>>,
}

impl RunningService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Launch the service with extra routes and start serving it.
pub async fn start_service(config: ServiceConfig, extra: Router<AppState>) -> RunningService {
    let service = Service::launch(config, "127.0.0.1:0".parse().unwrap(), valid_env)
        .await
        .expect("service should launch")
        .merge(extra);

    let addr = service.local_addr().unwrap();
    let lifecycle = service.lifecycle().clone();
    let state = service.state().clone();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let mut states = lifecycle.subscribe();
    let handle = tokio::spawn(service.run(server_shutdown));
    states
        .wait_for(|s| *s == ProcessState::Ready)
        .await
        .expect("service should become ready");

    RunningService {
        addr,
        lifecycle,
        state,
        shutdown,
        handle,
    }
}

/// A free loopback port (bound then released).
pub async fn free_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// One multipart upload as seen by the mock endpoint.
#[derive(Debug, Clone, Default)]
pub struct ReceivedUpload {
    pub device_id: String,
    pub date: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub content: String,
}

#[derive(Clone)]
struct SinkState {
    status: StatusCode,
    received: Arc<Mutex<Vec<ReceivedUpload>>>,
}

/// Start a mock upload endpoint that records each multipart request and
/// answers with `status`.
pub async fn start_upload_sink(status: StatusCode) -> (SocketAddr, Arc<Mutex<Vec<ReceivedUpload>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = SinkState {
        status,
        received: received.clone(),
    };

    let app = Router::new()
        .route("/upload/analysis/sed-summary", post(receive_upload))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, received)
}

async fn receive_upload(State(state): State<SinkState>, mut multipart: Multipart) -> (StatusCode, &'static str) {
    let mut upload = ReceivedUpload::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.file_name = field.file_name().map(str::to_owned);
                upload.content_type = field.content_type().map(str::to_owned);
                upload.content = field.text().await.unwrap();
            }
            "device_id" => upload.device_id = field.text().await.unwrap(),
            "date" => upload.date = field.text().await.unwrap(),
            _ => {}
        }
    }
    state.received.lock().unwrap().push(upload);

    if state.status.is_success() {
        (state.status, "stored")
    } else {
        (state.status, "rejected")
    }
}
