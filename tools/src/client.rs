//! Glances REST client
//!
//! Every request-level failure (transport, non-2xx status, undecodable body)
//! collapses into [`ClientError::Unavailable`]; only server resolution errors
//! are reported as such.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::registry::{Registry, RegistryError};

/// Relative API paths on a Glances agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    System,
    ProcessList,
    Network,
    Alert,
    Cpu,
    Mem,
    DiskIo,
    PluginsList,
    Sensors,
    Containers,
    Gpu,
    QuickLook,
    Fs,
    Uptime,
    All,
    ProcessCount,
    Connections,
    Ip,
    Load,
    MemSwap,
    Version,
    ClearAllEvents,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::System => "system",
            Endpoint::ProcessList => "processlist",
            Endpoint::Network => "network",
            Endpoint::Alert => "alert",
            Endpoint::Cpu => "cpu",
            Endpoint::Mem => "mem",
            Endpoint::DiskIo => "diskio",
            Endpoint::PluginsList => "pluginslist",
            Endpoint::Sensors => "sensors",
            Endpoint::Containers => "containers",
            Endpoint::Gpu => "gpu",
            Endpoint::QuickLook => "quicklook",
            Endpoint::Fs => "fs",
            Endpoint::Uptime => "uptime",
            Endpoint::All => "all",
            Endpoint::ProcessCount => "processcount",
            Endpoint::Connections => "connections",
            Endpoint::Ip => "ip",
            Endpoint::Load => "load",
            Endpoint::MemSwap => "memswap",
            Endpoint::Version => "version",
            Endpoint::ClearAllEvents => "events/clear/all",
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("no data")]
    Unavailable,
}

/// HTTP adapter over one pooled `reqwest::Client`
pub struct GlancesClient {
    http: reqwest::Client,
    user_agent: String,
}

impl GlancesClient {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            user_agent: user_agent.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.timeout, settings.user_agent.clone())
    }

    /// GET `{url}/{endpoint}` and decode the JSON body
    pub async fn fetch(
        &self,
        registry: &Registry,
        endpoint: Endpoint,
        server_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let url = endpoint_url(registry, server_id, endpoint)?;
        debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!("GET {url} failed: {e}");
                ClientError::Unavailable
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("GET {url} returned {status}");
            return Err(ClientError::Unavailable);
        }

        response.json::<Value>().await.map_err(|e| {
            warn!("GET {url} returned an undecodable body: {e}");
            ClientError::Unavailable
        })
    }

    /// POST to `{url}/{endpoint}`; `true` only on a 2xx response
    pub async fn submit(
        &self,
        registry: &Registry,
        endpoint: Endpoint,
        server_id: Option<&str>,
    ) -> Result<bool, RegistryError> {
        let url = endpoint_url(registry, server_id, endpoint)?;
        debug!("POST {url}");

        let result = self
            .http
            .post(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => Ok(true),
            Ok(response) => {
                warn!("POST {url} returned {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("POST {url} failed: {e}");
                Ok(false)
            }
        }
    }
}

/// `{url}/{path}`; a trailing `/` on the configured URL is not doubled
fn endpoint_url(
    registry: &Registry,
    server_id: Option<&str>,
    endpoint: Endpoint,
) -> Result<String, RegistryError> {
    let base = registry.resolve_url(server_id)?;
    Ok(format!("{}/{}", base.trim_end_matches('/'), endpoint.path()))
}
