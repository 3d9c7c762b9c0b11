//! Text report formatters — one per telemetry category
//!
//! Every function here is pure and total: fields are read defensively and
//! absent or wrong-shaped values degrade to `0` (numeric) or `Unknown`
//! (textual) instead of failing the report.

use serde_json::Value;

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const PROCESS_PREVIEW: usize = 5;

/// Render a field in its native JSON representation, or `default` when absent
fn show(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn num(data: &Value, key: &str) -> String {
    show(data.get(key), "0")
}

fn text(data: &Value, key: &str) -> String {
    show(data.get(key), "Unknown")
}

fn float(data: &Value, key: &str) -> f64 {
    data.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn mb(data: &Value, key: &str) -> String {
    format!("{:.2} MB", float(data, key) / 1024.0 / 1024.0)
}

fn gb(data: &Value, key: &str) -> String {
    format!("{:.2} GB", float(data, key) / 1024.0 / 1024.0 / 1024.0)
}

fn entries(data: &Value) -> &[Value] {
    data.as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// Whether a payload counts as "no data" (null, false, zero, or empty)
pub fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Human-readable byte count: 1024-based steps, two decimals
pub fn format_bytes(bytes: f64) -> String {
    let mut value = bytes;
    for unit in BYTE_UNITS {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} PB")
}

pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{}/s", format_bytes(bytes_per_sec))
}

/// Days, hours and minutes of an uptime in seconds, truncated
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{days}天 {hours}小时 {minutes}分钟")
}

fn uptime_seconds(data: &Value) -> Option<u64> {
    let secs = match data {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (secs >= 0.0).then_some(secs as u64)
}

pub fn format_uptime_report(data: &Value) -> String {
    match uptime_seconds(data) {
        Some(secs) => format!("系统已运行: {}", format_uptime(secs)),
        None => format!("系统已运行: {}", show(Some(data), "Unknown")),
    }
}

pub fn format_system(data: &Value) -> String {
    let cpu = data.get("cpu").unwrap_or(&Value::Null);
    let mem = data.get("mem").unwrap_or(&Value::Null);
    let diskio = data.get("diskio").unwrap_or(&Value::Null);
    format!(
        "\n系统信息:\n主机名: {}\n操作系统: {} {}\nCPU使用率: {}%\n内存使用率: {}%\n磁盘使用率: {}%\n",
        text(data, "hostname"),
        text(data, "os_name"),
        show(data.get("os_version"), ""),
        num(cpu, "total"),
        num(mem, "percent"),
        num(diskio, "percent"),
    )
}

/// First five processes only
pub fn format_process_preview(data: &Value) -> String {
    let mut out = String::from("进程信息 (前5个):\n");
    for (i, proc) in entries(data).iter().take(PROCESS_PREVIEW).enumerate() {
        out.push_str(&format!(
            "\n{}. {} (PID: {})\n   CPU: {}%\n   内存: {}%\n",
            i + 1,
            text(proc, "name"),
            text(proc, "pid"),
            num(proc, "cpu_percent"),
            num(proc, "memory_percent"),
        ));
    }
    out
}

fn cmdline(proc: &Value) -> String {
    match proc.get("cmdline") {
        Some(Value::Array(parts)) => parts
            .iter()
            .map(|p| show(Some(p), ""))
            .collect::<Vec<_>>()
            .join(" "),
        other => show(other, "Unknown"),
    }
}

pub fn format_process_list(data: &Value) -> String {
    let mut out = String::from("进程信息:\n");
    for proc in entries(data) {
        out.push_str(&format!(
            "\nPID: {}\n名称: {}\n命令行: {}\n用户名: {}\n线程数: {}\nCPU使用率: {}%\n内存使用率: {}%\n",
            text(proc, "pid"),
            text(proc, "name"),
            cmdline(proc),
            text(proc, "username"),
            num(proc, "num_threads"),
            num(proc, "cpu_percent"),
            num(proc, "memory_percent"),
        ));
    }
    out
}

pub fn format_network(data: &Value) -> String {
    let mut out = String::from("网络信息:\n");
    for iface in entries(data) {
        let speed_gbps = float(iface, "speed") / (1024.0 * 1024.0 * 1024.0);
        out.push_str(&format!(
            "\n接口: {}\n  链接速度: {:.2} Gbps\n  当前速率:\n    接收: {}\n    发送: {}\n  总流量:\n    接收: {}\n    发送: {}\n",
            show(iface.get("interface_name"), "unknown"),
            speed_gbps,
            format_rate(float(iface, "bytes_recv_rate_per_sec")),
            format_rate(float(iface, "bytes_sent_rate_per_sec")),
            format_bytes(float(iface, "bytes_recv_gauge")),
            format_bytes(float(iface, "bytes_sent_gauge")),
        ));
    }
    out
}

pub fn format_alerts(data: &Value) -> String {
    let alerts = entries(data);
    if alerts.is_empty() {
        return "当前没有告警信息".to_string();
    }

    let mut out = String::from("告警信息:\n");
    for alert in alerts {
        out.push_str(&format!(
            "\n类型: {}\n状态: {}\n开始时间: {}\n结束时间: {}\n描述: {}\n",
            text(alert, "type"),
            text(alert, "state"),
            text(alert, "begin"),
            text(alert, "end"),
            show(alert.get("desc"), "No description"),
        ));
    }
    out
}

pub fn format_cpu(data: &Value) -> String {
    format!(
        "\nCPU信息:\n总使用率: {}%\n用户空间: {}%\n系统空间: {}%\n空闲: {}%\nI/O等待: {}%\n",
        num(data, "total"),
        num(data, "user"),
        num(data, "system"),
        num(data, "idle"),
        num(data, "iowait"),
    )
}

pub fn format_memory(data: &Value) -> String {
    format!(
        "\n内存信息:\n总内存: {}\n已使用: {}\n空闲: {}\n使用率: {}%\n",
        mb(data, "total"),
        mb(data, "used"),
        mb(data, "free"),
        num(data, "percent"),
    )
}

/// Disk I/O keyed by device, or a list of entries carrying `disk_name`
pub fn format_disk_io(data: &Value) -> String {
    let mut out = String::from("磁盘I/O信息:\n");
    let mut push = |disk: String, info: &Value| {
        out.push_str(&format!(
            "\n设备: {}\n  读取: {}\n  写入: {}\n",
            disk,
            mb(info, "read_bytes"),
            mb(info, "write_bytes"),
        ));
    };

    match data {
        Value::Object(disks) => {
            for (disk, info) in disks {
                push(disk.clone(), info);
            }
        }
        Value::Array(disks) => {
            for info in disks {
                push(text(info, "disk_name"), info);
            }
        }
        _ => {}
    }
    out
}

fn sensor_line(sensor: &Value) -> String {
    format!(
        "  {}: {} {}\n",
        text(sensor, "label"),
        num(sensor, "value"),
        show(sensor.get("unit"), ""),
    )
}

/// Sensors grouped by type; a flat list is grouped by each entry's `type`
pub fn format_sensors(data: &Value) -> String {
    let mut out = String::from("传感器信息:\n");
    match data {
        Value::Object(groups) => {
            for (sensor_type, sensors) in groups {
                out.push_str(&format!("\n{sensor_type}:\n"));
                match sensors {
                    Value::Array(list) => {
                        for sensor in list {
                            out.push_str(&sensor_line(sensor));
                        }
                    }
                    Value::Object(_) => out.push_str(&format!(
                        "  值: {} {}\n",
                        num(sensors, "value"),
                        show(sensors.get("unit"), ""),
                    )),
                    _ => {}
                }
            }
        }
        Value::Array(list) => {
            let mut groups: Vec<(String, Vec<&Value>)> = Vec::new();
            for sensor in list {
                let sensor_type = text(sensor, "type");
                match groups.iter_mut().find(|(t, _)| *t == sensor_type) {
                    Some((_, members)) => members.push(sensor),
                    None => groups.push((sensor_type, vec![sensor])),
                }
            }
            for (sensor_type, members) in groups {
                out.push_str(&format!("\n{sensor_type}:\n"));
                for sensor in members {
                    out.push_str(&sensor_line(sensor));
                }
            }
        }
        _ => {}
    }
    out
}

fn container_image(container: &Value) -> String {
    match container.get("image") {
        Some(Value::Array(tags)) => show(tags.first(), "Unknown"),
        other => show(other, "Unknown"),
    }
}

pub fn format_containers(data: &Value) -> String {
    let containers = entries(data);
    if containers.is_empty() {
        return "没有运行中的Docker容器".to_string();
    }

    let mut out = String::from("Docker容器信息:\n");
    for container in containers {
        let id: String = text(container, "id").chars().take(12).collect();
        out.push_str(&format!(
            "\n容器ID: {}\n名称: {}\n镜像: {}\n状态: {}\nCPU使用率: {}%\n内存使用率: {}%\n",
            id,
            text(container, "name"),
            container_image(container),
            text(container, "status"),
            num(container, "cpu_percent"),
            num(container, "memory_percent"),
        ));
    }
    out
}

pub fn format_gpu(data: &Value) -> String {
    let gpus = entries(data);
    if gpus.is_empty() {
        return "没有检测到GPU或GPU信息不可用".to_string();
    }

    let mut out = String::from("GPU信息:\n");
    for gpu in gpus {
        out.push_str(&format!(
            "\nGPU ID: {}\n名称: {}\n温度: {}°C\n处理器使用率: {}%\n内存使用率: {}%\n风扇转速: {} RPM\n",
            text(gpu, "gpu_id"),
            text(gpu, "name"),
            num(gpu, "temperature"),
            num(gpu, "proc"),
            num(gpu, "mem"),
            num(gpu, "fan_speed"),
        ));
    }
    out
}

pub fn format_process_count(data: &Value) -> String {
    format!(
        "\n进程统计:\n总数: {}\n运行中: {}\n休眠: {}\n其他: {}\n线程: {}\n",
        num(data, "total"),
        num(data, "running"),
        num(data, "sleeping"),
        num(data, "other"),
        num(data, "thread"),
    )
}

pub fn format_connections(data: &Value) -> String {
    format!(
        "\n网络连接统计:\n已建立连接: {}\n监听端口: {}\n等待连接: {}\n接收连接: {}\n已发起连接: {}\n已终止连接: {}\n",
        num(data, "ESTABLISHED"),
        num(data, "LISTEN"),
        num(data, "SYN_SENT"),
        num(data, "SYN_RECV"),
        num(data, "initiated"),
        num(data, "terminated"),
    )
}

pub fn format_ip(data: &Value) -> String {
    let mut out = String::from("IP地址信息:\n");
    if let Value::Object(interfaces) = data {
        for (interface, addresses) in interfaces {
            out.push_str(&format!("\n{interface}:\n"));
            match addresses {
                Value::Array(list) => {
                    for addr in list {
                        out.push_str(&format!(
                            "  {} ({})\n",
                            text(addr, "address"),
                            text(addr, "family"),
                        ));
                    }
                }
                scalar => out.push_str(&format!("  {}\n", show(Some(scalar), "Unknown"))),
            }
        }
    }
    out
}

pub fn format_fs(data: &Value) -> String {
    let mut out = String::from("文件系统信息:\n");
    for fs in entries(data) {
        out.push_str(&format!(
            "\n挂载点: {}\n设备: {}\n总空间: {}\n已用: {}\n可用: {}\n使用率: {}%\n",
            text(fs, "mnt_point"),
            text(fs, "device_name"),
            gb(fs, "size"),
            gb(fs, "used"),
            gb(fs, "free"),
            num(fs, "percent"),
        ));
    }
    out
}

pub fn format_quicklook(data: &Value) -> String {
    format!(
        "\n系统概览:\nCPU: {}%\n内存: {}%\n交换分区: {}%\n系统负载: {}\n",
        num(data, "cpu"),
        num(data, "mem"),
        num(data, "swap"),
        show(data.get("load"), "0 0 0"),
    )
}

pub fn format_load(data: &Value) -> String {
    format!(
        "\n系统负载:\n1分钟: {:.2}\n5分钟: {:.2}\n15分钟: {:.2}\nCPU核心数: {}\n",
        float(data, "min1"),
        float(data, "min5"),
        float(data, "min15"),
        num(data, "cpucore"),
    )
}

pub fn format_swap(data: &Value) -> String {
    format!(
        "\n交换分区信息:\n总大小: {}\n已使用: {}\n空闲: {}\n使用率: {}%\n",
        mb(data, "total"),
        mb(data, "used"),
        mb(data, "free"),
        num(data, "percent"),
    )
}

/// Accepts the version object or a bare version string
pub fn format_version(data: &Value) -> String {
    let version = match data {
        Value::String(s) => s.clone(),
        _ => text(data, "version"),
    };
    format!(
        "\nGlances版本信息:\n版本号: {}\n系统: {}\nPython版本: {}\n",
        version,
        text(data, "system"),
        text(data, "python_version"),
    )
}

pub fn format_plugins(data: &Value) -> String {
    let names: Vec<String> = entries(data).iter().map(|p| show(Some(p), "Unknown")).collect();
    format!("已启用的插件:\n{}", names.join(", "))
}
