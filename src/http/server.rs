//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Build the route table, path mapper and upstream client from config
//! - Mount one GET-only catch-all under the mount prefix
//! - Wire up middleware (request ID, tracing)
//! - Per request: map path → forward upstream → normalise → respond
//!
//! # Design Decisions
//! - Non-GET methods are answered 405 by axum before the handler runs
//! - The handler only reads the URI; local headers are never forwarded
//! - No state is shared between requests besides the immutable config

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::loader::join_errors;
use crate::config::{GatewayConfig, ValidationError};
use crate::error::GatewayError;
use crate::http::request::{self, ProxyRequest};
use crate::http::response::relay;
use crate::lifecycle::notified;
use crate::observability::metrics;
use crate::routing::{PathMapper, RouteTable};
use crate::upstream::{ClientBuildError, UpstreamClient};

/// Error building the server from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid route configuration: {}", join_errors(.0))]
    Routes(Vec<ValidationError>),

    #[error(transparent)]
    Client(#[from] ClientBuildError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub mapper: Arc<PathMapper>,
    pub upstream: UpstreamClient,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails on any route or mount prefix problem, so a misconfigured gateway never serves.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let mapper = PathMapper::new(config.gateway.mount_prefix.clone()).map_err(|reason| {
            ServerError::Routes(vec![ValidationError::InvalidMountPrefix(reason)])
        })?;
        let routes =
            RouteTable::from_config(&config.effective_routes()).map_err(ServerError::Routes)?;
        let upstream = UpstreamClient::new(&config.upstream)?;

        tracing::info!(
            mount_prefix = %mapper.prefix(),
            routes = routes.len(),
            upstream = %upstream.base_url(),
            "Route table compiled"
        );
        for route in routes.routes() {
            tracing::debug!(
                route = %route.name(),
                pattern = %route.pattern(),
                upstream = %route.upstream().pattern(),
                "Route registered"
            );
        }

        let state = AppState {
            routes: Arc::new(routes),
            mapper: Arc::new(mapper),
            upstream,
        };

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config: Arc::new(config),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let mount = format!("{}/{{*path}}", state.mapper.prefix());
        Router::new()
            .route(&mount, get(proxy_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled router, for serving on a custom transport or in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(notified(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Looks up the route, forwards upstream and relays the normalised response.
async fn proxy_handler(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let start_time = Instant::now();
    let request_id = request::request_id(&headers);
    let local = ProxyRequest::from_uri(&uri);

    let matched = state
        .mapper
        .strip(&local.path)
        .and_then(|path| state.routes.resolve(path));
    let Some(matched) = matched else {
        tracing::debug!(request_id = %request_id, path = %local.path, "No route matched");
        metrics::record_request("none", 404, start_time);
        return GatewayError::RouteNotFound(local.path).into_response();
    };
    let route = matched.route.name();

    tracing::debug!(
        request_id = %request_id,
        route = %route,
        upstream_path = %matched.upstream_path,
        captures = ?matched.captures.iter().collect::<Vec<_>>(),
        params = local.query.len(),
        "Proxying request"
    );

    let outcome = state
        .upstream
        .forward(&matched.upstream_path, &local.query)
        .await;

    let response = match relay(outcome) {
        Ok(proxied) => {
            let status = proxied.status();
            if status.is_client_error() || status.is_server_error() {
                tracing::debug!(
                    request_id = %request_id,
                    route = %route,
                    status = status.as_u16(),
                    "Relaying upstream error"
                );
                metrics::record_relayed_error(route, status.as_u16());
            }
            proxied.into_response()
        }
        Err(err) => {
            match &err {
                GatewayError::UpstreamContractViolation { status, content_type, source } => {
                    tracing::error!(
                        request_id = %request_id,
                        route = %route,
                        upstream_path = %matched.upstream_path,
                        status = status.as_u16(),
                        content_type = ?content_type,
                        error = %source,
                        "Upstream contract violation: success body is not JSON"
                    );
                }
                other => {
                    tracing::error!(
                        request_id = %request_id,
                        route = %route,
                        error = %other,
                        "Upstream request failed"
                    );
                }
            }
            metrics::record_upstream_error(err.kind());
            err.into_response()
        }
    };

    metrics::record_request(route, response.status().as_u16(), start_time);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;
    use crate::upstream::UpstreamCredential;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.base_url = "http://127.0.0.1:1".to_string();
        config.upstream.token = UpstreamCredential::new("Token abc");
        config.upstream.system_proxy = false;
        config
    }

    #[test]
    fn test_invalid_routes_prevent_startup() {
        let mut config = config();
        config.routes = vec![
            RouteConfig::new("ok", "/ok"),
            RouteConfig::new("bad", "no-slash"),
        ];
        assert!(matches!(HttpServer::new(config), Err(ServerError::Routes(_))));
    }

    #[test]
    fn test_invalid_mount_prefix_prevents_startup() {
        let mut config = config();
        config.gateway.mount_prefix = "/api/v1/".to_string();
        match HttpServer::new(config) {
            Err(ServerError::Routes(errors)) => {
                assert!(matches!(errors.as_slice(), [ValidationError::InvalidMountPrefix(_)]))
            }
            _ => panic!("expected a mount prefix error"),
        }
    }

    #[tokio::test]
    async fn test_post_is_method_not_allowed() {
        let app = HttpServer::new(config()).unwrap().router();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/getads")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_custom_mount_prefix() {
        let mut config = config();
        config.gateway.mount_prefix = "/polads".to_string();
        let app = HttpServer::new(config).unwrap().router();

        let response = app
            .clone()
            .oneshot(Request::get("/api/v1/getads").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(Request::get("/polads/nothing-here").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get("x-request-id").is_some());
    }
}
