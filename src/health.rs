//! Health report.
//!
//! Pure data gathering for `GET /health-check`. Host figures come from `/proc`
//! and are `null` where it is unavailable (non-Linux hosts, restricted
//! containers).

use std::fs;

use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::AppState;

const BYTES_PER_KB: u64 = 1024;

/// report
///
/// The full health document: `app`, `process` and `system` sections.
pub fn report(state: &AppState) -> Value {
    let config = &state.config;
    let load = read_proc("/proc/loadavg").and_then(|raw| parse_loadavg(&raw));

    json!({
        "app": {
            "environment": config.env.as_str(),
            "logLevel": config.log_level,
            "name": config.name,
            "port": config.port,
            "themePath": config.theme_path.display().to_string(),
            "themeConfig": state.theme.as_ref(),
        },
        "process": {
            "pid": std::process::id(),
            "memory": read_proc("/proc/self/status")
                .map(|raw| process_memory_mb(&raw))
                .unwrap_or_default(),
            "uptimeSeconds": state.started_at.elapsed().as_secs_f64(),
            "version": env!("CARGO_PKG_VERSION"),
        },
        "system": {
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "freemem": read_proc("/proc/meminfo")
                .and_then(|raw| meminfo_kb(&raw, "MemAvailable"))
                .map(|kb| kb * BYTES_PER_KB),
            "loadavg": load.map(|[one, five, fifteen]| json!({ "1": one, "5": five, "15": fifteen })),
            "timestamp": Utc::now().to_rfc3339(),
            "uptime": read_proc("/proc/uptime").and_then(|raw| parse_uptime(&raw)),
        },
    })
}

fn read_proc(path: &str) -> Option<String> {
    fs::read_to_string(path).ok()
}

/// The 1, 5 and 15 minute load averages from `/proc/loadavg`.
pub fn parse_loadavg(raw: &str) -> Option<[f64; 3]> {
    let mut fields = raw.split_whitespace().map(|field| field.parse::<f64>().ok());
    Some([fields.next()??, fields.next()??, fields.next()??])
}

/// Seconds since boot, the first field of `/proc/uptime`.
pub fn parse_uptime(raw: &str) -> Option<f64> {
    raw.split_whitespace().next()?.parse().ok()
}

/// A `Key:   1234 kB` entry of `/proc/meminfo` or `/proc/self/status`.
pub fn meminfo_kb(raw: &str, key: &str) -> Option<u64> {
    raw.lines().find_map(|line| {
        let (name, rest) = line.split_once(':')?;
        if name.trim() != key {
            return None;
        }
        rest.split_whitespace().next()?.parse().ok()
    })
}

/// Resident and virtual size of this process, formatted like `"12.34 MB"`.
pub fn process_memory_mb(status: &str) -> Map<String, Value> {
    [("rss", "VmRSS"), ("virtual", "VmSize"), ("peakRss", "VmHWM")]
        .into_iter()
        .filter_map(|(label, key)| {
            let kb = meminfo_kb(status, key)?;
            let mb = (kb as f64 / BYTES_PER_KB as f64 * 100.0).round() / 100.0;
            Some((label.to_string(), Value::String(format!("{mb} MB"))))
        })
        .collect()
}
