//! Operation handlers — the callable tool surface
//!
//! Each telemetry handler resolves the target server, performs one request
//! and renders the payload. Failures never escape as errors: they become the
//! category's fixed "unavailable" text.

use serde_json::Value;

use crate::client::{ClientError, Endpoint, GlancesClient};
use crate::format;
use crate::registry::Registry;

/// Handlers over one HTTP client; the registry is passed in per call
pub struct Glances {
    client: GlancesClient,
}

impl Glances {
    pub fn new(client: GlancesClient) -> Self {
        Self { client }
    }

    /// Fetch an endpoint, treating empty payloads as absent
    async fn snapshot(
        &self,
        registry: &Registry,
        endpoint: Endpoint,
        server_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let data = self.client.fetch(registry, endpoint, server_id).await?;
        if format::is_empty_payload(&data) {
            return Err(ClientError::Unavailable);
        }
        Ok(data)
    }

    /// Shared shape of the plain telemetry handlers
    async fn report(
        &self,
        registry: &Registry,
        server_id: Option<&str>,
        endpoint: Endpoint,
        unavailable: &str,
        render: fn(&Value) -> String,
    ) -> String {
        match self.snapshot(registry, endpoint, server_id).await {
            Ok(data) => render(&data),
            Err(ClientError::Registry(e)) => e.to_string(),
            Err(ClientError::Unavailable) => unavailable.to_string(),
        }
    }

    /// Like `report`, but the header and the unavailable text name the server
    async fn named_report(
        &self,
        registry: &Registry,
        server_id: Option<&str>,
        endpoint: Endpoint,
        label: &str,
        render: fn(&Value) -> String,
    ) -> String {
        let server = match registry.resolve(server_id) {
            Ok(server) => server,
            Err(e) => return e.to_string(),
        };

        match self.snapshot(registry, endpoint, Some(&server.id)).await {
            Ok(data) => format!("服务器 '{}' 的{label}:\n{}", server.name, render(&data)),
            Err(ClientError::Registry(e)) => e.to_string(),
            Err(ClientError::Unavailable) => format!("无法获取服务器 '{}' 的{label}。", server.id),
        }
    }

    // =========================================================================
    // Server management
    // =========================================================================

    pub fn set_default_server(&self, registry: &mut Registry, server_id: &str) -> String {
        if let Err(e) = registry.set_default(server_id) {
            return e.to_string();
        }
        match registry.get(server_id) {
            Some(server) => format!(
                "已将默认服务器设置为: {} ({})",
                server.name, server.description
            ),
            None => format!("未找到服务器配置: {server_id}"),
        }
    }

    pub fn get_default_server(&self, registry: &Registry) -> String {
        match registry.resolve(None) {
            Ok(server) => format!(
                "\n当前默认服务器:\nID: {}\n名称: {}\n环境: {}\n描述: {}\n地址: {}\n",
                server.id,
                server.name,
                registry.environment().label(),
                server.description,
                server.url,
            ),
            Err(e) => e.to_string(),
        }
    }

    pub fn list_servers(&self, registry: &Registry) -> String {
        let mut out = String::from("配置的服务器列表:\n");
        for server in registry.list() {
            out.push_str(&format!(
                "\nID: {}\n名称: {}\n地址: {}\n描述: {}\n",
                server.id, server.name, server.url, server.description
            ));
        }
        out
    }

    pub fn add_server(
        &self,
        registry: &mut Registry,
        server_id: &str,
        name: &str,
        url: &str,
        description: &str,
    ) -> String {
        match registry.add(server_id, name, url, description) {
            Ok(()) => format!("成功添加服务器 '{name}'"),
            Err(e) => e.to_string(),
        }
    }

    pub fn remove_server(&self, registry: &mut Registry, server_id: &str) -> String {
        match registry.remove(server_id) {
            Ok(_) => format!("成功删除服务器 '{server_id}'"),
            Err(_) => format!("错误：未找到服务器ID '{server_id}'"),
        }
    }

    // =========================================================================
    // Telemetry
    // =========================================================================

    pub async fn system_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.named_report(registry, server_id, Endpoint::System, "系统信息", format::format_system)
            .await
    }

    pub async fn process_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.named_report(
            registry,
            server_id,
            Endpoint::ProcessList,
            "进程信息",
            format::format_process_preview,
        )
        .await
    }

    pub async fn process_list(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.named_report(
            registry,
            server_id,
            Endpoint::ProcessList,
            "进程列表信息",
            format::format_process_list,
        )
        .await
    }

    pub async fn network_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::Network, "无法获取网络信息。", format::format_network)
            .await
    }

    /// An empty alert list is data, not absence
    pub async fn alert_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        match self.client.fetch(registry, Endpoint::Alert, server_id).await {
            Ok(Value::Null) | Err(ClientError::Unavailable) => "无法获取告警信息。".to_string(),
            Ok(data) => format::format_alerts(&data),
            Err(ClientError::Registry(e)) => e.to_string(),
        }
    }

    pub async fn clear_all_alerts(&self, registry: &Registry, server_id: Option<&str>) -> String {
        match self.client.submit(registry, Endpoint::ClearAllEvents, server_id).await {
            Ok(true) => "已成功清除所有告警。".to_string(),
            Ok(false) => "清除告警失败。".to_string(),
            Err(e) => e.to_string(),
        }
    }

    pub async fn cpu_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::Cpu, "无法获取CPU信息。", format::format_cpu)
            .await
    }

    pub async fn memory_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::Mem, "无法获取内存信息。", format::format_memory)
            .await
    }

    pub async fn disk_io_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::DiskIo, "无法获取磁盘I/O信息。", format::format_disk_io)
            .await
    }

    pub async fn plugins_list(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::PluginsList, "无法获取插件列表。", format::format_plugins)
            .await
    }

    pub async fn sensors_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::Sensors, "无法获取传感器信息。", format::format_sensors)
            .await
    }

    pub async fn docker_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(
            registry,
            server_id,
            Endpoint::Containers,
            "无法获取Docker容器信息。",
            format::format_containers,
        )
        .await
    }

    pub async fn gpu_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::Gpu, "无法获取GPU信息。", format::format_gpu)
            .await
    }

    pub async fn quicklook(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(
            registry,
            server_id,
            Endpoint::QuickLook,
            "无法获取系统概览信息。",
            format::format_quicklook,
        )
        .await
    }

    pub async fn fs_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::Fs, "无法获取文件系统信息。", format::format_fs)
            .await
    }

    pub async fn uptime(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(
            registry,
            server_id,
            Endpoint::Uptime,
            "无法获取系统运行时间。",
            format::format_uptime_report,
        )
        .await
    }

    pub async fn process_count(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(
            registry,
            server_id,
            Endpoint::ProcessCount,
            "无法获取进程统计信息。",
            format::format_process_count,
        )
        .await
    }

    pub async fn connections_stats(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(
            registry,
            server_id,
            Endpoint::Connections,
            "无法获取网络连接统计信息。",
            format::format_connections,
        )
        .await
    }

    pub async fn ip_addresses(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::Ip, "无法获取IP地址信息。", format::format_ip)
            .await
    }

    pub async fn load_average(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::Load, "无法获取系统负载信息。", format::format_load)
            .await
    }

    pub async fn swap_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::MemSwap, "无法获取交换分区信息。", format::format_swap)
            .await
    }

    pub async fn version_info(&self, registry: &Registry, server_id: Option<&str>) -> String {
        self.report(registry, server_id, Endpoint::Version, "无法获取版本信息。", format::format_version)
            .await
    }

    /// Probe `all`, then concatenate system, CPU, memory, disk I/O, network
    /// and uptime; each section re-resolves the server on its own.
    pub async fn all_stats(&self, registry: &Registry, server_id: Option<&str>) -> String {
        let server = match registry.resolve(server_id) {
            Ok(server) => server,
            Err(e) => return e.to_string(),
        };
        let id = Some(server.id.as_str());

        if let Err(e) = self.snapshot(registry, Endpoint::All, id).await {
            return match e {
                ClientError::Registry(e) => e.to_string(),
                ClientError::Unavailable => {
                    format!("无法获取服务器 '{}' 的系统统计信息。", server.id)
                }
            };
        }

        let sections = [
            self.system_info(registry, id).await,
            self.cpu_info(registry, id).await,
            self.memory_info(registry, id).await,
            self.disk_io_info(registry, id).await,
            self.network_info(registry, id).await,
            self.uptime(registry, id).await,
        ];

        format!("服务器 '{}' 的统计信息汇总:\n{}", server.name, sections.join("\n"))
    }
}
