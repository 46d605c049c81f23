//! Shared utilities for gateway integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use polads_gateway::config::GatewayConfig;
use polads_gateway::upstream::UpstreamCredential;
use polads_gateway::{HttpServer, Shutdown};
use tokio::net::TcpListener;

pub const TEST_TOKEN: &str = "Token test-token";

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

impl Recorded {
    /// Query parameters decoded in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default()
    }
}

/// Canned upstream reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: body.as_bytes().to_vec(),
            delay: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain"),
            body: body.as_bytes().to_vec(),
            delay: None,
        }
    }

    pub fn bytes(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            content_type: Some("text/plain; charset=iso-8859-1"),
            body: body.to_vec(),
            delay: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
            delay: None,
        }
    }

    /// Hold the reply back for `delay` before answering.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Responder = Arc<dyn Fn(&str) -> Reply + Send + Sync>;

#[derive(Clone)]
struct MockState {
    hits: Arc<Mutex<Vec<Recorded>>>,
    respond: Responder,
}

/// Handle on a running mock upstream.
pub struct MockUpstream {
    pub addr: SocketAddr,
    hits: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> Vec<Recorded> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.lock().unwrap().len()
    }
}

async fn record_and_reply(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let path = uri.path().to_string();
    state.hits.lock().unwrap().push(Recorded {
        method,
        path: path.clone(),
        query: uri.query().map(str::to_owned),
        headers,
    });

    let reply = (state.respond)(&path);
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }
    let status = StatusCode::from_u16(reply.status).unwrap();
    let mut response = (status, reply.body).into_response();
    response.headers_mut().remove(header::CONTENT_TYPE);
    if let Some(ct) = reply.content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(ct));
    }
    response
}

/// Start a mock upstream that records every request and answers via `respond(path)`.
pub async fn start_mock_upstream<F>(respond: F) -> MockUpstream
where
    F: Fn(&str) -> Reply + Send + Sync + 'static,
{
    let hits = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        hits: hits.clone(),
        respond: Arc::new(respond),
    };
    let app = Router::new().fallback(record_and_reply).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, hits }
}

/// A running gateway; dropping it shuts the server down.
pub struct TestGateway {
    pub addr: SocketAddr,
    _shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Configuration pointing at `base_url` with the built-in routes.
pub fn test_config(base_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = base_url.to_string();
    config.upstream.token = UpstreamCredential::new(TEST_TOKEN);
    config.upstream.system_proxy = false;
    config
}

/// Start a gateway for `config` on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let server = HttpServer::new(config).expect("valid test config");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGateway {
        addr,
        _shutdown: shutdown,
    }
}

/// Gateway with the built-in routes in front of `upstream`.
pub async fn gateway_for(upstream: &MockUpstream) -> TestGateway {
    start_gateway(test_config(&upstream.base_url())).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
