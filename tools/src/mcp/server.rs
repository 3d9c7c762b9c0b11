//! MCP session — lifecycle, tools/list and tools/call
//!
//! The session owns the server registry, so the default-server selection
//! lives and dies with it.

use serde_json::{json, Value};
use std::io;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::framing::{read_message, write_message};
use super::jsonrpc::{RpcRequest, RpcResponse};
use crate::catalog::Catalog;
use crate::handlers::Glances;
use crate::registry::Registry;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "glances";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct McpServer {
    registry: RwLock<Registry>,
    glances: Glances,
    catalog: Catalog,
}

impl McpServer {
    pub fn new(registry: Registry, glances: Glances) -> Self {
        Self {
            registry: RwLock::new(registry),
            glances,
            catalog: Catalog::builtin(),
        }
    }

    /// Serve framed requests until EOF on `reader`
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            let (msg, wire_format) = match read_message(&mut reader).await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("EOF on input, shutting down");
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    error!("Failed to read message: {e}");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let req: RpcRequest = match serde_json::from_slice(&msg) {
                Ok(req) => req,
                Err(e) => {
                    error!("Invalid JSON-RPC: {e}");
                    write_message(&mut writer, &RpcResponse::parse_error(), wire_format).await?;
                    continue;
                }
            };

            let resp = self.dispatch(&req).await;
            if !req.is_notification() {
                write_message(&mut writer, &resp, wire_format).await?;
            }
        }
    }

    /// Dispatch a JSON-RPC request to the appropriate handler
    pub async fn dispatch(&self, req: &RpcRequest) -> RpcResponse {
        debug!("Dispatching method: {}", req.method);

        if req.jsonrpc != "2.0" {
            return RpcResponse::invalid_request(req.id.clone());
        }

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req),
            "notifications/initialized" | "initialized" => {
                info!("Client initialized");
                RpcResponse::success(req.id.clone(), json!({}))
            }
            "ping" => RpcResponse::success(req.id.clone(), json!({})),
            "tools/list" => self.handle_tools_list(req),
            "tools/call" => self.handle_tools_call(req).await,
            _ => {
                warn!("Unknown method: {}", req.method);
                RpcResponse::method_not_found(req.id.clone(), &req.method)
            }
        }
    }

    fn handle_initialize(&self, req: &RpcRequest) -> RpcResponse {
        if let Some(client) = req.params.get("clientInfo") {
            info!("MCP initialize from client: {client}");
        }

        RpcResponse::success(
            req.id.clone(),
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {"listChanged": false}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION
                }
            }),
        )
    }

    fn handle_tools_list(&self, req: &RpcRequest) -> RpcResponse {
        match serde_json::to_value(self.catalog.list_tools()) {
            Ok(tools) => RpcResponse::success(req.id.clone(), json!({"tools": tools})),
            Err(e) => RpcResponse::internal_error(req.id.clone(), e.to_string()),
        }
    }

    async fn handle_tools_call(&self, req: &RpcRequest) -> RpcResponse {
        let Some(name) = req.params.get("name").and_then(Value::as_str) else {
            return RpcResponse::invalid_params(req.id.clone(), "Missing 'name' parameter");
        };
        if self.catalog.get_tool(name).is_none() {
            return RpcResponse::invalid_params(req.id.clone(), format!("Unknown tool: {name}"));
        }

        let args = req.params.get("arguments").cloned().unwrap_or_else(|| json!({}));
        info!("Calling tool: {name}");

        match self.call_tool(name, &args).await {
            Ok(text) => RpcResponse::success(
                req.id.clone(),
                json!({
                    "content": [{"type": "text", "text": text}],
                    "isError": false
                }),
            ),
            Err(message) => RpcResponse::invalid_params(req.id.clone(), message),
        }
    }

    /// Run one catalog tool. `Err` only for missing required arguments.
    pub async fn call_tool(&self, name: &str, args: &Value) -> Result<String, String> {
        let server_id = optional_str(args, "server_id");
        let g = &self.glances;

        let text = match name {
            "set_default_server" => {
                let id = required_str(args, "server_id")?;
                g.set_default_server(&mut *self.registry.write().await, id)
            }
            "get_default_server" => g.get_default_server(&*self.registry.read().await),
            "list_servers" => g.list_servers(&*self.registry.read().await),
            "add_server" => {
                let id = required_str(args, "server_id")?;
                let server_name = required_str(args, "name")?;
                let url = required_str(args, "url")?;
                let description = optional_str(args, "description").unwrap_or("");
                g.add_server(&mut *self.registry.write().await, id, server_name, url, description)
            }
            "remove_server" => {
                let id = required_str(args, "server_id")?;
                g.remove_server(&mut *self.registry.write().await, id)
            }
            _ => {
                // Snapshot so no lock is held across agent requests
                let registry = self.registry.read().await.clone();
                let reg = &registry;
                match name {
                    "get_system_info" => g.system_info(reg, server_id).await,
                    "get_process_info" => g.process_info(reg, server_id).await,
                    "get_process_list" => g.process_list(reg, server_id).await,
                    "get_network_info" => g.network_info(reg, server_id).await,
                    "get_alert_info" => g.alert_info(reg, server_id).await,
                    "clear_all_alerts" => g.clear_all_alerts(reg, server_id).await,
                    "get_cpu_info" => g.cpu_info(reg, server_id).await,
                    "get_memory_info" => g.memory_info(reg, server_id).await,
                    "get_disk_io_info" => g.disk_io_info(reg, server_id).await,
                    "get_plugins_list" => g.plugins_list(reg, server_id).await,
                    "get_sensors_info" => g.sensors_info(reg, server_id).await,
                    "get_docker_info" => g.docker_info(reg, server_id).await,
                    "get_gpu_info" => g.gpu_info(reg, server_id).await,
                    "get_quicklook" => g.quicklook(reg, server_id).await,
                    "get_fs_info" => g.fs_info(reg, server_id).await,
                    "get_uptime" => g.uptime(reg, server_id).await,
                    "get_all_stats" => g.all_stats(reg, server_id).await,
                    "get_process_count" => g.process_count(reg, server_id).await,
                    "get_connections_stats" => g.connections_stats(reg, server_id).await,
                    "get_ip_addresses" => g.ip_addresses(reg, server_id).await,
                    "get_load_average" => g.load_average(reg, server_id).await,
                    "get_swap_info" => g.swap_info(reg, server_id).await,
                    "get_version_info" => g.version_info(reg, server_id).await,
                    _ => return Err(format!("Unknown tool: {name}")),
                }
            }
        };

        Ok(text)
    }
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    optional_str(args, key).ok_or_else(|| format!("Missing '{key}' argument"))
}
