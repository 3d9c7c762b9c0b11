//! Tool catalog — stores and retrieves tool definitions

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// One callable tool as advertised over MCP
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// In-memory tool catalog
#[derive(Default)]
pub struct Catalog {
    tools: HashMap<String, ToolDefinition>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in tool registered
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        register_tools(&mut catalog);
        catalog
    }

    /// Register a tool definition
    pub fn register_tool(&mut self, tool: ToolDefinition) {
        debug!("Registered tool: {}", tool.name);
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// List tools sorted by name
    pub fn list_tools(&self) -> Vec<&ToolDefinition> {
        let mut tools: Vec<_> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Get total tool count
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

/// Helper to create a ToolDefinition
pub fn make_tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Telemetry tool taking only an optional `server_id`
fn server_tool(name: &str, description: &str) -> ToolDefinition {
    make_tool(
        name,
        description,
        json!({
            "type": "object",
            "properties": {
                "server_id": {
                    "type": "string",
                    "description": "服务器ID (省略时使用默认服务器)"
                }
            }
        }),
    )
}

const MONITOR_TOOLS: &[(&str, &str)] = &[
    ("get_system_info", "获取Linux服务器的系统信息，包含CPU、内存、磁盘等"),
    ("get_process_info", "获取Linux服务器上运行的进程信息 (前5个)"),
    ("get_process_list", "获取指定服务器的完整进程列表信息"),
    ("get_network_info", "获取网络接口和流量信息"),
    ("get_alert_info", "获取当前系统告警信息"),
    ("clear_all_alerts", "清除所有系统告警"),
    ("get_cpu_info", "获取详细的CPU使用情况"),
    ("get_memory_info", "获取详细的内存使用情况"),
    ("get_disk_io_info", "获取磁盘读写情况"),
    ("get_plugins_list", "获取已启用的插件列表"),
    ("get_sensors_info", "获取温度、风扇等传感器信息"),
    ("get_docker_info", "获取Docker容器状态"),
    ("get_gpu_info", "获取GPU使用情况"),
    ("get_quicklook", "获取系统关键指标概览"),
    ("get_fs_info", "获取文件系统使用情况"),
    ("get_uptime", "获取系统运行时间"),
    ("get_all_stats", "获取所有系统统计信息汇总"),
    ("get_process_count", "获取进程数量统计"),
    ("get_connections_stats", "获取网络连接统计信息"),
    ("get_ip_addresses", "获取IP地址信息"),
    ("get_load_average", "获取系统负载信息"),
    ("get_swap_info", "获取交换分区使用情况"),
    ("get_version_info", "获取Glances版本信息"),
];

/// Register every built-in tool with the catalog
pub fn register_tools(catalog: &mut Catalog) {
    catalog.register_tool(make_tool(
        "set_default_server",
        "设置默认服务器",
        json!({
            "type": "object",
            "properties": {
                "server_id": {"type": "string", "description": "服务器唯一标识"}
            },
            "required": ["server_id"]
        }),
    ));

    catalog.register_tool(make_tool(
        "get_default_server",
        "获取当前默认服务器信息",
        json!({"type": "object", "properties": {}}),
    ));

    catalog.register_tool(make_tool(
        "list_servers",
        "获取所有配置的服务器列表",
        json!({"type": "object", "properties": {}}),
    ));

    catalog.register_tool(make_tool(
        "add_server",
        "添加新的服务器配置",
        json!({
            "type": "object",
            "properties": {
                "server_id": {"type": "string", "description": "服务器唯一标识"},
                "name": {"type": "string", "description": "服务器名称"},
                "url": {"type": "string", "description": "服务器API地址"},
                "description": {"type": "string", "description": "服务器描述", "default": ""}
            },
            "required": ["server_id", "name", "url"]
        }),
    ));

    catalog.register_tool(make_tool(
        "remove_server",
        "删除服务器配置",
        json!({
            "type": "object",
            "properties": {
                "server_id": {"type": "string", "description": "服务器唯一标识"}
            },
            "required": ["server_id"]
        }),
    ));

    for (name, description) in MONITOR_TOOLS {
        catalog.register_tool(server_tool(name, description));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tool(name: &str) -> ToolDefinition {
        make_tool(name, "A test tool", json!({"type": "object"}))
    }

    #[test]
    fn test_register_and_get_tool() {
        let mut catalog = Catalog::new();
        catalog.register_tool(sample_tool("get_cpu_info"));

        let tool = catalog.get_tool("get_cpu_info").unwrap();
        assert_eq!(tool.name, "get_cpu_info");
    }

    #[test]
    fn test_get_nonexistent_tool() {
        let catalog = Catalog::new();
        assert!(catalog.get_tool("nonexistent").is_none());
    }

    #[test]
    fn test_list_tools_sorted() {
        let mut catalog = Catalog::new();
        catalog.register_tool(sample_tool("b"));
        catalog.register_tool(sample_tool("a"));
        catalog.register_tool(sample_tool("c"));

        let names: Vec<_> = catalog.list_tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_register_overwrites_existing() {
        let mut catalog = Catalog::new();
        catalog.register_tool(sample_tool("get_uptime"));
        catalog.register_tool(make_tool("get_uptime", "Updated", json!({})));

        assert_eq!(catalog.tool_count(), 1);
        assert_eq!(catalog.get_tool("get_uptime").unwrap().description, "Updated");
    }

    #[test]
    fn test_builtin_tools() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.tool_count(), 28);
        assert_eq!(catalog.list_tools().len(), 28);
        for (name, _) in MONITOR_TOOLS {
            let tool = catalog.get_tool(name).unwrap();
            assert!(tool.input_schema.get("required").is_none());
        }

        let add = catalog.get_tool("add_server").unwrap();
        assert_eq!(add.input_schema["required"], json!(["server_id", "name", "url"]));
    }

    #[test]
    fn test_serializes_as_mcp_tool() {
        let catalog = Catalog::builtin();
        let value = serde_json::to_value(catalog.get_tool("get_cpu_info").unwrap()).unwrap();
        assert_eq!(value["name"], "get_cpu_info");
        assert_eq!(value["inputSchema"]["properties"]["server_id"]["type"], "string");
    }
}
