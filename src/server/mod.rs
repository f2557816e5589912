//! HTTP surface of the gateway

mod error;
mod handlers;

pub use error::{ApiError, ApiResult};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Request},
    http::{header, request::Parts, HeaderName, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::Config;
use crate::ethereum::provider::{ClientFactory, ProviderManager};

/// Header selecting the JSON-RPC node a request is served from.
pub const NODE_ADDRESS_HEADER: &str = "x-node-address";

/// Shared by every handler.
pub struct ServerState {
    pub clients: Arc<dyn ClientFactory>,
    pub config: Config,
}

impl ServerState {
    pub fn new(clients: Arc<dyn ClientFactory>, config: Config) -> Self {
        Self { clients, config }
    }
}

/// The node address for this request: the `X-Node-Address` header when
/// present, otherwise the configured default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddress(pub String);

#[async_trait]
impl FromRequestParts<Arc<ServerState>> for NodeAddress {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServerState>,
    ) -> Result<Self, Self::Rejection> {
        let address = match parts.headers.get(NODE_ADDRESS_HEADER) {
            Some(value) => value
                .to_str()
                .map_err(|_| {
                    ApiError::BadRequest("X-Node-Address header is not valid text".into())
                })?
                .trim()
                .to_string(),
            None => String::new(),
        };

        let address = if address.is_empty() {
            state.config.node.default_rpc_url.clone()
        } else {
            address
        };

        info!("Using Ethereum node address {}", address);
        Ok(NodeAddress(address))
    }
}

pub struct GatewayServer {
    state: Arc<ServerState>,
}

impl GatewayServer {
    pub fn new(config: Config) -> Self {
        let clients = Arc::new(ProviderManager::new(
            config.node.request_timeout(),
            config.node.max_cached_providers,
        ));
        Self {
            state: Arc::new(ServerState::new(clients, config)),
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn run(self) -> Result<()> {
        let listen_addr = self.state.config.server.listen_addr;
        let app = self.router();

        let listener = TcpListener::bind(listen_addr)
            .await
            .map_err(|e| anyhow!("Failed to bind {}: {}", listen_addr, e))?;
        info!("Gateway listening on {}", listen_addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

pub fn build_router(state: Arc<ServerState>) -> Router {
    let server = &state.config.server;

    let mut router = Router::new()
        .route("/blocks", get(handlers::get_blocks))
        .route("/transaction/:hash", get(handlers::get_transaction))
        .route(
            "/decode-contract-call-data",
            post(handlers::decode_contract_call_data),
        )
        .route("/parse-contract-abi", post(handlers::parse_contract_abi))
        .route("/eth-call", post(handlers::eth_call))
        .route("/send-transaction", post(handlers::send_transaction))
        .fallback(handler_404)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(log_request))
                .layer(RequestBodyLimitLayer::new(server.max_body_size)),
        );

    if server.enable_cors {
        router = router.layer(cors_layer());
    }

    router.with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static(NODE_ADDRESS_HEADER),
        ])
        .expose_headers([header::LINK])
        .max_age(Duration::from_secs(300))
}

async fn log_request(request: Request, next: Next) -> Response {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    info!(
        method = %request.method(),
        uri = %request.uri(),
        remote_addr = %remote,
        "Request received"
    );

    next.run(request).await
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "The requested resource was not found")
}
