//! HTTP JSON-RPC server: configuration, builder, accept loop and routing.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use http::{Method, StatusCode};
use http_body::Body;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::{Map, Value};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use jsonrpc_server_core::{
    JsonRpcDispatcher, JsonRpcTransportError, MethodResolver, ServerEvents,
};

use crate::{CorsLayer, HttpExchange, HttpServerError, Result};

/// Configuration for the HTTP JSON-RPC server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Path of the JSON-RPC endpoint
    pub path: String,
    /// Enable CORS
    pub enable_cors: bool,
    /// Single origin allowed with credentials; `None` allows any origin
    pub allowed_origin: Option<String>,
    /// Maximum request body size
    pub max_body_size: usize,
    /// When set, the peer address is passed to every call under this name
    pub peer_addr_param: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8007)),
            path: "/jsonrpc".to_string(),
            enable_cors: true,
            allowed_origin: None,
            max_body_size: 1024 * 1024, // 1MB
            peer_addr_param: None,
        }
    }
}

/// Builder for [`HttpJsonRpcServer`]
pub struct HttpJsonRpcServerBuilder {
    config: ServerConfig,
    dispatcher: JsonRpcDispatcher,
}

impl HttpJsonRpcServerBuilder {
    pub fn new(dispatcher: JsonRpcDispatcher) -> Self {
        Self {
            config: ServerConfig::default(),
            dispatcher,
        }
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the endpoint path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    /// Restrict CORS to one origin instead of `*`
    pub fn allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.allowed_origin = Some(origin.into());
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Pass the peer address to every call as the named argument `name`
    pub fn peer_addr_param(mut self, name: impl Into<String>) -> Self {
        self.config.peer_addr_param = Some(name.into());
        self
    }

    /// Install embedder hooks on the dispatcher
    pub fn events<E>(mut self, events: E) -> Self
    where
        E: ServerEvents + 'static,
    {
        self.dispatcher = self.dispatcher.with_events(events);
        self
    }

    pub fn build(self) -> Result<HttpJsonRpcServer> {
        if !self.config.path.starts_with('/') {
            return Err(HttpServerError::InvalidConfig(format!(
                "endpoint path must start with '/': {}",
                self.config.path
            )));
        }
        if let Some(origin) = &self.config.allowed_origin {
            if HeaderValue::from_str(origin).is_err() {
                return Err(HttpServerError::InvalidConfig(format!(
                    "allowed origin is not a valid header value: {:?}",
                    origin
                )));
            }
        }
        if self.config.max_body_size == 0 {
            return Err(HttpServerError::InvalidConfig(
                "max_body_size must be greater than zero".to_string(),
            ));
        }

        Ok(HttpJsonRpcServer {
            config: Arc::new(self.config),
            dispatcher: Arc::new(self.dispatcher),
        })
    }
}

/// HTTP JSON-RPC server
#[derive(Clone)]
pub struct HttpJsonRpcServer {
    config: Arc<ServerConfig>,
    dispatcher: Arc<JsonRpcDispatcher>,
}

impl HttpJsonRpcServer {
    /// Builder for a server dispatching to `resolver`
    pub fn builder<R>(resolver: R) -> HttpJsonRpcServerBuilder
    where
        R: MethodResolver + 'static,
    {
        HttpJsonRpcServerBuilder::new(JsonRpcDispatcher::new(resolver))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &JsonRpcDispatcher {
        &self.dispatcher
    }

    /// Bind the configured address and serve until the process ends
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_address).await?;
        self.serve(listener, std::future::pending()).await
    }

    /// Serve connections from `listener` until `shutdown` resolves. Connections
    /// already accepted run to completion on their own tasks.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        info!("HTTP JSON-RPC server listening on {}", local_addr);
        info!("JSON-RPC endpoint available at: {}", self.config.path);

        tokio::pin!(shutdown);
        loop {
            let (stream, peer_addr) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("HTTP JSON-RPC server on {} shutting down", local_addr);
                    return Ok(());
                }
            };
            debug!("New connection from {}", peer_addr);

            let server = self.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let server = server.clone();
                    async move {
                        handle_request(req, &server.dispatcher, &server.config, Some(peer_addr))
                            .await
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    if err.is_incomplete_message() {
                        debug!("Client disconnected (normal): {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }
}

/// Route one HTTP request. Only POST to the configured path reaches the
/// dispatcher.
pub async fn handle_request<B>(
    req: Request<B>,
    dispatcher: &JsonRpcDispatcher,
    config: &ServerConfig,
    peer_addr: Option<SocketAddr>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("Handling {} {}", method, path);

    let mut response = if path != config.path {
        plain_response(StatusCode::NOT_FOUND, "Not Found")
    } else if method == Method::POST {
        handle_post(req, dispatcher, config, peer_addr).await
    } else if method == Method::OPTIONS && config.enable_cors {
        plain_response(StatusCode::NO_CONTENT, "")
    } else {
        let mut response = plain_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        let allow = if config.enable_cors {
            "POST, OPTIONS"
        } else {
            "POST"
        };
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static(allow));
        response
    };

    if config.enable_cors {
        match &config.allowed_origin {
            Some(origin) => {
                CorsLayer::apply_cors_headers_for_origin(response.headers_mut(), origin)
            }
            None => CorsLayer::apply_cors_headers(response.headers_mut()),
        }
    }
    Ok(response)
}

async fn handle_post<B>(
    req: Request<B>,
    dispatcher: &JsonRpcDispatcher,
    config: &ServerConfig,
    peer_addr: Option<SocketAddr>,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let description = format!(
        "<{} {} {:?}>",
        req.method(),
        req.uri().path(),
        req.version()
    );

    let mut context = Map::new();
    if let (Some(name), Some(addr)) = (&config.peer_addr_param, peer_addr) {
        context.insert(name.clone(), Value::String(addr.to_string()));
    }

    let mut exchange = HttpExchange::new(req.into_body(), config.max_body_size, description)
        .with_context(context);

    match dispatcher.serve(&mut exchange).await {
        Ok(_) => match exchange.into_response() {
            Some((code, body)) => json_response(code, body),
            None => {
                error!("Dispatcher finished without writing a response");
                plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        },
        Err(JsonRpcTransportError::PayloadTooLarge(limit)) => {
            warn!("Rejected request body larger than {} bytes", limit);
            plain_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
        }
        Err(err) => {
            warn!("Failed to serve JSON-RPC exchange: {}", err);
            plain_response(StatusCode::BAD_REQUEST, "Bad Request")
        }
    }
}

fn json_response(code: u16, body: Vec<u8>) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(code).unwrap_or_else(|_| {
        error!("Invalid response code {}, answering 500", code);
        StatusCode::INTERNAL_SERVER_ERROR
    });

    let has_body = !body.is_empty();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    if has_body {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    response
}

fn plain_response(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(text.as_bytes())));
    *response.status_mut() = status;
    response
}
