//! Server Registry — named Glances agents and the default selection
//!
//! The registry is owned by a session and passed into every handler call;
//! mutations are in-memory only and are lost on restart.

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::config;

/// Marker in a server description that tags it as production
pub const PRODUCTION_MARKER: &str = "生产";

/// Connection descriptor for one remote agent
#[derive(Debug, Clone, PartialEq)]
pub struct ServerDescriptor {
    pub id: String,
    pub name: String,
    pub url: String,
    pub description: String,
}

/// Environment tag derived from the default server's description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Test,
    Prod,
}

impl Environment {
    fn from_description(description: &str) -> Self {
        if description.contains(PRODUCTION_MARKER) {
            Environment::Prod
        } else {
            Environment::Test
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Environment::Test => "测试环境",
            Environment::Prod => "生产环境",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Test => f.write_str("test"),
            Environment::Prod => f.write_str("prod"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("错误：服务器ID '{0}' 已存在")]
    DuplicateId(String),
    #[error("未找到服务器配置: {0}")]
    UnknownId(String),
    #[error("未设置默认服务器")]
    NoDefault,
}

/// In-memory server registry
#[derive(Debug, Clone, Default)]
pub struct Registry {
    servers: BTreeMap<String, ServerDescriptor>,
    default: Option<String>,
    env: Environment,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the servers file and select `default_id` if it is present.
    ///
    /// Read and parse failures are returned to the caller; they are fatal at startup.
    pub fn load(path: &Path, default_id: &str) -> Result<Self> {
        let entries = config::load_servers(path)?;

        let mut registry = Self::new();
        for (id, entry) in entries {
            registry.insert(id, entry.name, entry.url, entry.description);
        }
        info!("Loaded {} servers from {}", registry.len(), path.display());

        if let Err(e) = registry.set_default(default_id) {
            warn!("Default server not selected: {e}");
        }

        Ok(registry)
    }

    fn insert(&mut self, id: String, name: String, url: String, description: String) {
        self.servers.insert(
            id.clone(),
            ServerDescriptor {
                id,
                name,
                url,
                description,
            },
        );
    }

    /// Register a new server; an existing id is left untouched
    pub fn add(
        &mut self,
        id: &str,
        name: &str,
        url: &str,
        description: &str,
    ) -> Result<(), RegistryError> {
        if self.servers.contains_key(id) {
            return Err(RegistryError::DuplicateId(id.to_string()));
        }

        self.insert(id.into(), name.into(), url.into(), description.into());
        info!("Server added: {id} ({name}) at {url}");
        Ok(())
    }

    /// Remove a server. Removing the current default clears the selection.
    pub fn remove(&mut self, id: &str) -> Result<ServerDescriptor, RegistryError> {
        let removed = self
            .servers
            .remove(id)
            .ok_or_else(|| RegistryError::UnknownId(id.to_string()))?;

        if self.default.as_deref() == Some(id) {
            warn!("Removed server {id} was the default; no default selected");
            self.default = None;
            self.env = Environment::Test;
        }

        info!("Server removed: {id}");
        Ok(removed)
    }

    /// All servers ordered by id
    pub fn list(&self) -> Vec<&ServerDescriptor> {
        self.servers.values().collect()
    }

    pub fn get(&self, id: &str) -> Option<&ServerDescriptor> {
        self.servers.get(id)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn set_default(&mut self, id: &str) -> Result<(), RegistryError> {
        let server = self
            .servers
            .get(id)
            .ok_or_else(|| RegistryError::UnknownId(id.to_string()))?;

        self.env = Environment::from_description(&server.description);
        self.default = Some(id.to_string());
        info!("Default server set to {id} (env: {})", self.env);
        Ok(())
    }

    pub fn default_id(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn environment(&self) -> Environment {
        self.env
    }

    /// Look up a descriptor, substituting the default when `id` is omitted
    pub fn resolve(&self, id: Option<&str>) -> Result<&ServerDescriptor, RegistryError> {
        let id = match id {
            Some(id) => id,
            None => self.default.as_deref().ok_or(RegistryError::NoDefault)?,
        };

        self.servers
            .get(id)
            .ok_or_else(|| RegistryError::UnknownId(id.to_string()))
    }

    pub fn resolve_url(&self, id: Option<&str>) -> Result<&str, RegistryError> {
        self.resolve(id).map(|s| s.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> Registry {
        let mut reg = Registry::new();
        reg.add("server1", "web-01", "http://10.0.0.1:61208/api/4", "测试服务器")
            .unwrap();
        reg.add("server2", "db-01", "http://10.0.0.2:61208/api/4", "生产数据库")
            .unwrap();
        reg
    }

    #[test]
    fn test_add_and_resolve() {
        let reg = sample_registry();
        assert_eq!(
            reg.resolve_url(Some("server1")).unwrap(),
            "http://10.0.0.1:61208/api/4"
        );
        let ids: Vec<_> = reg.list().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["server1", "server2"]);
    }

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut reg = sample_registry();
        let err = reg
            .add("server1", "other", "http://10.9.9.9", "")
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId("server1".into()));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get("server1").unwrap().name, "web-01");
    }

    #[test]
    fn test_add_keeps_url_verbatim() {
        let mut reg = Registry::new();
        reg.add("s", "s", "http://host:61208/api/4/", "").unwrap();
        assert_eq!(reg.resolve_url(Some("s")).unwrap(), "http://host:61208/api/4/");
        assert_eq!(reg.get("s").unwrap().url, "http://host:61208/api/4/");
    }

    #[test]
    fn test_remove_then_resolve_fails() {
        let mut reg = sample_registry();
        let removed = reg.remove("server2").unwrap();
        assert_eq!(removed.name, "db-01");
        assert_eq!(
            reg.resolve_url(Some("server2")),
            Err(RegistryError::UnknownId("server2".into()))
        );
        assert_eq!(reg.list().len(), 1);
    }

    #[test]
    fn test_remove_unknown() {
        let mut reg = sample_registry();
        assert_eq!(
            reg.remove("nope"),
            Err(RegistryError::UnknownId("nope".into()))
        );
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_set_default_unknown_keeps_previous() {
        let mut reg = sample_registry();
        reg.set_default("server2").unwrap();
        assert!(reg.set_default("missing").is_err());
        assert_eq!(reg.default_id(), Some("server2"));
        assert_eq!(reg.environment(), Environment::Prod);
    }

    #[test]
    fn test_set_default_resolves_none() {
        let mut reg = sample_registry();
        reg.set_default("server1").unwrap();
        assert_eq!(reg.default_id(), Some("server1"));
        assert_eq!(reg.resolve_url(None), reg.resolve_url(Some("server1")));
        assert_eq!(reg.environment(), Environment::Test);
    }

    #[test]
    fn test_environment_marker_is_substring() {
        let mut reg = Registry::new();
        reg.add("a", "a", "http://a", "非生产镜像").unwrap();
        reg.set_default("a").unwrap();
        assert_eq!(reg.environment(), Environment::Prod);
    }

    #[test]
    fn test_remove_default_clears_selection() {
        let mut reg = sample_registry();
        reg.set_default("server2").unwrap();
        reg.remove("server2").unwrap();
        assert_eq!(reg.default_id(), None);
        assert_eq!(reg.environment(), Environment::Test);
        assert_eq!(reg.resolve_url(None), Err(RegistryError::NoDefault));
    }

    #[test]
    fn test_resolve_without_default() {
        let reg = sample_registry();
        assert_eq!(reg.resolve(None), Err(RegistryError::NoDefault));
    }

    #[test]
    fn test_load_selects_default() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(
            r#"{"server1": {"name": "web-01", "url": "http://10.0.0.1:61208/api/4", "description": "生产"}}"#
                .as_bytes(),
        )
        .unwrap();

        let reg = Registry::load(file.path(), "server1").unwrap();
        assert_eq!(reg.default_id(), Some("server1"));
        assert_eq!(reg.environment(), Environment::Prod);

        let reg = Registry::load(file.path(), "server9").unwrap();
        assert_eq!(reg.default_id(), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RegistryError::UnknownId("x".into()).to_string(),
            "未找到服务器配置: x"
        );
        assert_eq!(
            RegistryError::DuplicateId("x".into()).to_string(),
            "错误：服务器ID 'x' 已存在"
        );
    }
}
