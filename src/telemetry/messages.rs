//! Dashboard telemetry payloads and event names

use serde::{Deserialize, Serialize};

/// Request for a fresh CPU snapshot
pub const GET_CPU_INFO: &str = "dashboard:get-cpu-info";
/// Push carrying a `CpuInfo`
pub const CPU_INFO: &str = "dashboard:cpu-info";
/// Request for a fresh system log snippet
pub const GET_SYSTEM_LOG: &str = "dashboard:get-system-log";
/// Push carrying a `SystemLog`
pub const SYSTEM_LOG: &str = "dashboard:system-log";

/// CPU model and recent utilisation samples
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    pub model: String,
    pub count: String,
    pub usage_percentage_history: Vec<f64>,
}

impl CpuInfo {
    /// Most recent utilisation sample
    pub fn latest_usage(&self) -> Option<f64> {
        self.usage_percentage_history.last().copied()
    }
}

/// Tail of the host system log
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemLog {
    pub system: String,
}
