//! Integration tests for a full MCP stdio session
//!
//! A servers file on disk points at a mock Glances agent; requests go in
//! as Content-Length frames and the framed responses are read back.

use std::io::Write;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use glances_tools::client::GlancesClient;
use glances_tools::handlers::Glances;
use glances_tools::mcp::framing::{read_message, write_message, WireFormat};
use glances_tools::mcp::McpServer;
use glances_tools::registry::Registry;

fn servers_file(agent_url: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    let config = json!({
        "server1": {"name": "web-01", "url": format!("{agent_url}/api/4/"), "description": "测试服务器"},
        "prod1": {"name": "api", "url": "http://127.0.0.1:9/api/4", "description": "生产"}
    });
    write!(file, "{config}").unwrap();
    file
}

async fn agent() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/4/cpu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 42, "user": 30, "system": 10, "idle": 58, "iowait": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4/uptime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(90061)))
        .mount(&server)
        .await;
    server
}

/// Frame every request, run a session to EOF and collect the responses
async fn run_session(server: &McpServer, requests: &[Value]) -> Vec<Value> {
    let mut input = Vec::new();
    for req in requests {
        write_message(&mut input, req, WireFormat::ContentLength).await.unwrap();
    }

    let mut output = Vec::new();
    server.serve(input.as_slice(), &mut output).await.unwrap();

    let mut reader = output.as_slice();
    let mut responses = Vec::new();
    while let Some((body, format)) = read_message(&mut reader).await.unwrap() {
        assert_eq!(format, WireFormat::ContentLength);
        responses.push(serde_json::from_slice(&body).unwrap());
    }
    responses
}

fn call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

fn text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn test_session_against_mock_agent() {
    let agent = agent().await;
    let file = servers_file(&agent.uri());

    let registry = Registry::load(file.path(), "server1").unwrap();
    assert_eq!(registry.len(), 2);
    let glances = Glances::new(GlancesClient::new(Duration::from_secs(5), "glances-app/1.0"));
    let server = McpServer::new(registry, glances);

    let responses = run_session(
        &server,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"clientInfo": {"name": "test"}}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            call(2, "get_cpu_info", json!({})),
            call(3, "get_uptime", json!({"server_id": "server1"})),
            call(4, "get_memory_info", json!({})),
            call(5, "get_cpu_info", json!({"server_id": "missing"})),
        ],
    )
    .await;

    // The notification gets no response
    assert_eq!(responses.len(), 5);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "glances");

    assert_eq!(
        text(&responses[1]),
        "\nCPU信息:\n总使用率: 42%\n用户空间: 30%\n系统空间: 10%\n空闲: 58%\nI/O等待: 2%\n"
    );
    assert!(text(&responses[2]).contains("1天"));
    assert_eq!(text(&responses[3]), "无法获取内存信息。");
    assert_eq!(text(&responses[4]), "未找到服务器配置: missing");
}

#[tokio::test]
async fn test_default_server_changes_within_session() {
    let agent = agent().await;
    let file = servers_file(&agent.uri());

    let registry = Registry::load(file.path(), "server1").unwrap();
    let glances = Glances::new(GlancesClient::new(Duration::from_secs(2), "glances-app/1.0"));
    let server = McpServer::new(registry, glances);

    let responses = run_session(
        &server,
        &[
            call(1, "set_default_server", json!({"server_id": "prod1"})),
            call(2, "get_default_server", json!({})),
            call(3, "remove_server", json!({"server_id": "prod1"})),
            call(4, "get_cpu_info", json!({})),
            call(5, "list_servers", json!({})),
        ],
    )
    .await;

    assert_eq!(responses.len(), 5);
    let current = text(&responses[1]);
    assert!(current.contains("ID: prod1\n"));
    assert!(current.contains("环境: 生产环境\n"));
    assert_eq!(text(&responses[2]), "成功删除服务器 'prod1'");
    assert_eq!(text(&responses[3]), "未设置默认服务器");
    assert!(!text(&responses[4]).contains("prod1"));
    assert!(text(&responses[4]).contains("ID: server1\n"));
    // The configured trailing slash is shown as given
    let listed_url = format!("地址: {}/api/4/\n", agent.uri());
    assert!(text(&responses[4]).contains(&listed_url));
}

#[test]
fn test_missing_servers_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = Registry::load(&dir.path().join("servers_config.json"), "server1");
    assert!(result.is_err());
}
