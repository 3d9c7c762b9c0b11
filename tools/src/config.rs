//! Process settings and server file loading

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SERVERS_PATH: &str = "servers_config.json";

/// Runtime settings, read from the environment with fallbacks
#[derive(Debug, Clone)]
pub struct Settings {
    pub servers_path: PathBuf,
    pub default_server: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            servers_path: PathBuf::from(DEFAULT_SERVERS_PATH),
            default_server: default_server(),
            timeout: Duration::from_secs(default_timeout_secs()),
            user_agent: default_user_agent(),
        }
    }
}

impl Settings {
    /// Build settings from `GLANCES_*` variables.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(path) = std::env::var("GLANCES_SERVERS_CONFIG") {
            settings.servers_path = PathBuf::from(path);
        }
        if let Ok(id) = std::env::var("GLANCES_DEFAULT_SERVER") {
            settings.default_server = id;
        }
        if let Some(secs) = std::env::var("GLANCES_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Ok(agent) = std::env::var("GLANCES_USER_AGENT") {
            settings.user_agent = agent;
        }

        settings
    }

    /// Override the servers file path (first CLI argument)
    pub fn with_servers_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.servers_path = path.into();
        self
    }
}

fn default_server() -> String { "server1".into() }
fn default_timeout_secs() -> u64 { 30 }
fn default_user_agent() -> String { "glances-app/1.0".into() }

/// One entry of the servers file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// Parse a servers file keyed by server id.
///
/// `.toml` files are read as TOML tables, anything else as JSON.
pub fn load_servers(path: &Path) -> Result<BTreeMap<String, ServerEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read servers config from {}", path.display()))?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse servers config from {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse servers config from {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.servers_path, PathBuf::from("servers_config.json"));
        assert_eq!(settings.default_server, "server1");
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.user_agent, "glances-app/1.0");
    }

    #[test]
    fn test_with_servers_path() {
        let settings = Settings::default().with_servers_path("/etc/glances/servers.toml");
        assert_eq!(settings.servers_path, PathBuf::from("/etc/glances/servers.toml"));
    }

    #[test]
    fn test_load_json_servers() {
        let file = write_file(
            ".json",
            r#"{
                "server1": {"name": "web-01", "url": "http://10.0.0.1:61208/api/4", "description": "测试服务器"},
                "server2": {"name": "db-01", "url": "http://10.0.0.2:61208/api/4"}
            }"#,
        );

        let servers = load_servers(file.path()).unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers["server1"].name, "web-01");
        assert_eq!(servers["server1"].description, "测试服务器");
        assert_eq!(servers["server2"].description, "");
    }

    #[test]
    fn test_load_toml_matches_json() {
        let json = write_file(
            ".json",
            r#"{"prod1": {"name": "api", "url": "http://10.0.0.9:61208/api/4", "description": "生产环境"}}"#,
        );
        let toml = write_file(
            ".toml",
            r#"
[prod1]
name = "api"
url = "http://10.0.0.9:61208/api/4"
description = "生产环境"
"#,
        );

        assert_eq!(load_servers(json.path()).unwrap(), load_servers(toml.path()).unwrap());
    }

    #[test]
    fn test_load_malformed_fails() {
        let file = write_file(".json", "{ not json");
        assert!(load_servers(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_field_fails() {
        let file = write_file(".json", r#"{"server1": {"name": "no-url"}}"#);
        assert!(load_servers(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = load_servers(Path::new("/nonexistent/servers_config.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read servers config"));
    }
}
