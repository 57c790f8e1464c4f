//! Example Server
//!
//! JSON-RPC server over HTTP exposing `add`, `subtract` and `echo`, and
//! logging every response it sends.
//!
//! Usage:
//! ```bash
//! # Default (0.0.0.0:8007, endpoint /jsonrpc)
//! RUST_LOG=info cargo run --package example-server
//!
//! # Custom port and path
//! RUST_LOG=info cargo run --package example-server -- --port 9000 --path /rpc
//!
//! curl -s localhost:8007/jsonrpc \
//!   -d '{"jsonrpc":"2.0","method":"add","params":[1,2],"id":1}'
//! ```

use std::net::{IpAddr, SocketAddr};

use anyhow::Result;
use clap::Parser;
use serde_json::{Value, json};
use tracing::info;

use jsonrpc_http_server::HttpJsonRpcServer;
use jsonrpc_server_core::prelude::*;

/// Command-line arguments for the example server
#[derive(Parser, Debug)]
#[command(name = "example-server")]
#[command(about = "Example JSON-RPC 2.0 server with add, subtract and echo")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to bind the server to
    #[arg(short, long, default_value = "8007")]
    port: u16,

    /// Path of the JSON-RPC endpoint
    #[arg(long, default_value = "/jsonrpc")]
    path: String,

    /// Only allow cross-origin calls from this origin
    #[arg(long)]
    allowed_origin: Option<String>,

    /// Maximum request body size in bytes
    #[arg(long, default_value = "1048576")]
    max_body_size: usize,
}

/// Logs one line per response: the request description, the id and the
/// result or error.
struct ExampleEvents;

impl ServerEvents for ExampleEvents {
    fn log(&self, envelope: &ResponseEnvelope, request: &str, had_error: bool) {
        if envelope.is_empty() {
            info!("{} (no response, error: {})", request, had_error);
            return;
        }
        for response in envelope.responses() {
            let id = response
                .id
                .as_ref()
                .map_or_else(|| "null".to_string(), ToString::to_string);
            match &response.outcome {
                ResponseOutcome::Result(value) => info!("{} {} {}", request, id, describe(value)),
                ResponseOutcome::Error(error) => info!("{} {} {}", request, id, error),
            }
        }
    }
}

fn describe(value: &RpcValue) -> String {
    match value.to_json() {
        Ok(json) => json.to_string(),
        Err(e) => format!("<unencodable: {}>", e),
    }
}

/// Integer arithmetic when both operands are integers and the result fits,
/// floating point otherwise.
fn arithmetic(
    params: &Params,
    checked: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> MethodResult {
    let a: Value = params.arg("a")?;
    let b: Value = params.arg("b")?;

    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(result) = checked(x, y) {
            return Ok(json!(result).into());
        }
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => Ok(json!(float(x, y)).into()),
        _ => Err(MethodError::invalid_params(format!(
            "operands must be numbers, got {} and {}",
            a, b
        ))),
    }
}

async fn add(params: Params) -> MethodResult {
    arithmetic(&params, i64::checked_add, |x, y| x + y)
}

async fn subtract(params: Params) -> MethodResult {
    arithmetic(&params, i64::checked_sub, |x, y| x - y)
}

async fn echo(params: Params) -> MethodResult {
    Ok(params.arg::<Value>("v")?.into())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let registry = MethodRegistry::new()
        .register("add", ParamShape::named(["a", "b"]), handler_fn(add))
        .register("subtract", ParamShape::named(["a", "b"]), handler_fn(subtract))
        .register("echo", ParamShape::named(["v"]), handler_fn(echo));
    info!("Methods: {}", registry.method_names().join(", "));

    let mut builder = HttpJsonRpcServer::builder(registry)
        .bind_address(SocketAddr::new(args.host, args.port))
        .path(args.path)
        .max_body_size(args.max_body_size)
        .events(ExampleEvents);
    if let Some(origin) = args.allowed_origin {
        builder = builder.allowed_origin(origin);
    }
    let server = builder.build()?;

    let listener = tokio::net::TcpListener::bind(server.config().bind_address).await?;
    server
        .serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    Ok(())
}
