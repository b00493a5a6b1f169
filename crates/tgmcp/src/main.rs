//! Telegram history MCP server.
//!
//! - JSON-RPC over stdio (newline-delimited)
//! - Exposes a single tool: `tg_history`
//! - Backed by a user-session MTProto client behind the core ports

use std::{io::Write, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use tgmcp_core::{
    config::Config,
    ports::{HistoryFetcher, PeerDirectory},
    tool::{get_history, HistoryArgs},
};
use tgmcp_telegram::TelegramGateway;

const SERVER_NAME: &str = "tgmcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    id: Option<serde_json::Value>,
    method: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct RpcResponse<'a> {
    jsonrpc: &'a str,
    id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<serde_json::Value>,
}

fn respond_ok(id: serde_json::Value, result: serde_json::Value) -> RpcResponse<'static> {
    RpcResponse {
        jsonrpc: "2.0",
        id,
        result: Some(result),
        error: None,
    }
}

fn respond_err(id: serde_json::Value, code: i64, message: &str) -> RpcResponse<'static> {
    RpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(json!({ "code": code, "message": message })),
    }
}

/// Everything one `tools/call` needs; ports are trait objects so tests can
/// swap in stubs.
struct ToolContext {
    directory: Arc<dyn PeerDirectory>,
    fetcher: Arc<dyn HistoryFetcher>,
    fetch_timeout: Duration,
}

fn tool_schema() -> serde_json::Value {
    json!({
      "tools": [
        {
          "name": "tg_history",
          "description": "Fetch one page of message history for a Telegram dialog. Address the dialog by display name/@handle, or by a typed id from a previous response: chn[<id>:<hash>], cht[<id>], user[<id>]. Pass the returned offset back to continue with older messages.",
          "inputSchema": {
            "type": "object",
            "properties": {
              "name": { "type": "string", "description": "Name of the dialog" },
              "offset": { "type": "integer", "description": "Offset for continuation" }
            },
            "required": ["name"]
          }
        }
      ]
    })
}

async fn handle_rpc(req: RpcRequest, ctx: &ToolContext) -> Option<RpcResponse<'static>> {
    let id = req.id?;

    match req.method.as_str() {
        "initialize" => {
            let proto = req
                .params
                .as_ref()
                .and_then(|p| p.get("protocolVersion"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");

            Some(respond_ok(
                id,
                json!({
                  "protocolVersion": proto,
                  "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
                  "capabilities": { "tools": {} }
                }),
            ))
        }

        "tools/list" => Some(respond_ok(id, tool_schema())),

        "tools/call" => {
            let Some(params) = req.params.as_ref() else {
                return Some(respond_err(id, -32602, "Missing params"));
            };

            let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
            if name != "tg_history" {
                return Some(respond_err(id, -32602, "Unknown tool"));
            }

            let args = params
                .get("arguments")
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            let args = match serde_json::from_value::<HistoryArgs>(args) {
                Ok(v) => v,
                Err(_) => {
                    return Some(respond_err(id, -32602, "name argument is required"));
                }
            };

            match get_history(args, &*ctx.directory, &*ctx.fetcher, ctx.fetch_timeout).await {
                Ok(rsp) => {
                    let text = match serde_json::to_string(&rsp) {
                        Ok(t) => t,
                        Err(e) => {
                            return Some(respond_err(
                                id,
                                -32000,
                                &format!("response encoding failed: {e}"),
                            ));
                        }
                    };
                    Some(respond_ok(
                        id,
                        json!({ "content": [ { "type": "text", "text": text } ] }),
                    ))
                }
                Err(e) => Some(respond_err(id, -32000, &e.to_string())),
            }
        }

        _ => Some(respond_err(id, -32601, "Method not found")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tgmcp_core::logging::init(SERVER_NAME)?;

    let cfg = Config::load()?;
    let gateway = Arc::new(TelegramGateway::connect(&cfg).await?);
    let ctx = ToolContext {
        directory: gateway.clone(),
        fetcher: gateway,
        fetch_timeout: cfg.fetch_timeout,
    };

    eprintln!("{SERVER_NAME} MCP server running on stdio");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    let mut stdout = std::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let req = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(v) => v,
            Err(_) => continue,
        };

        // Notifications have no id => no response.
        let Some(resp) = handle_rpc(req, &ctx).await else {
            continue;
        };

        let out = serde_json::to_string(&resp)?;
        stdout.write_all(out.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    }

    Ok(())
}
