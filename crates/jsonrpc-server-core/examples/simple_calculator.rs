//! Simple Calculator JSON-RPC Example
//!
//! Runs a few transmissions through the dispatcher in memory: a named call,
//! a positional call, a notification and a batch with one bad item.

use jsonrpc_server_core::prelude::*;
use serde_json::json;

async fn add(params: Params) -> MethodResult {
    let a: f64 = params.arg("a")?;
    let b: f64 = params.arg("b")?;
    Ok(json!(a + b).into())
}

async fn subtract(params: Params) -> MethodResult {
    let a: f64 = params.arg("a")?;
    let b: f64 = params.arg("b")?;
    Ok(json!(a - b).into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = MethodRegistry::new()
        .register("add", ParamShape::named(["a", "b"]), handler_fn(add))
        .register("subtract", ParamShape::named(["a", "b"]), handler_fn(subtract));
    let dispatcher = JsonRpcDispatcher::new(registry);

    let transmissions = [
        r#"{"jsonrpc":"2.0","method":"add","params":{"a":5,"b":3},"id":1}"#,
        r#"{"jsonrpc":"2.0","method":"subtract","params":[10,4],"id":2}"#,
        r#"{"jsonrpc":"2.0","method":"add","params":[1,1]}"#,
        r#"[
            {"jsonrpc":"2.0","method":"add","params":[1,2],"id":"a"},
            {"jsonrpc":"2.0","method":"multiply","params":[1,2],"id":"b"},
            {"jsonrpc":"2.0","method":"add","params":{"a":"x","b":2},"id":"c"}
        ]"#,
    ];

    for body in transmissions {
        let mut exchange = MemoryExchange::new(body);
        dispatcher.serve(&mut exchange).await?;

        let response = exchange.body().unwrap_or_default();
        println!("--> {}", body.split_whitespace().collect::<Vec<_>>().join(" "));
        if response.is_empty() {
            println!("<-- (no response)");
        } else {
            println!("<-- {}", String::from_utf8_lossy(response));
        }
    }

    Ok(())
}
