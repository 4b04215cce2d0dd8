/// 共享数据模型
///
/// 定义计数器快照与统计响应

use serde::{Deserialize, Serialize};

use crate::utils::{bytes_to_mb, round2};

/// 磁盘累计计数器（自系统启动以来）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiskCounters {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl DiskCounters {
    pub fn new(bytes_read: u64, bytes_written: u64) -> Self {
        Self {
            bytes_read,
            bytes_written,
        }
    }
}

/// 网络累计计数器（所有网卡之和）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NetworkCounters {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl NetworkCounters {
    pub fn new(bytes_sent: u64, bytes_received: u64) -> Self {
        Self {
            bytes_sent,
            bytes_received,
        }
    }
}

/// `/api/stats` 响应
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    /// CPU 使用率（百分比）
    pub cpu: f64,
    /// 内存使用率（百分比）
    pub ram: f64,
    /// 磁盘吞吐量（读 + 写，MB/s）
    pub disk: f64,
    /// 累计发送量（MB）
    pub network_sent: f64,
    /// 累计接收量（MB）
    pub network_received: f64,
}

impl StatsResponse {
    /// 由原始读数构建响应，所有字段保留两位小数
    ///
    /// 百分比按数据源原样转发，不做二次截断。
    pub fn from_readings(
        cpu_percent: f64,
        memory_percent: f64,
        disk_mb_per_sec: f64,
        network: NetworkCounters,
    ) -> Self {
        Self {
            cpu: round2(cpu_percent),
            ram: round2(memory_percent),
            disk: round2(disk_mb_per_sec),
            network_sent: round2(bytes_to_mb(network.bytes_sent)),
            network_received: round2(bytes_to_mb(network.bytes_received)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cpu_rounding() {
        let resp = StatsResponse::from_readings(42.567, 0.0, 0.0, NetworkCounters::default());
        assert_eq!(resp.cpu, 42.57);
    }

    #[test]
    fn test_network_converted_to_binary_mb() {
        let network = NetworkCounters::new(3 * 1024 * 1024, 1024 * 1024 + 512 * 1024);
        let resp = StatsResponse::from_readings(0.0, 0.0, 0.0, network);
        assert_eq!(resp.network_sent, 3.0);
        assert_eq!(resp.network_received, 1.5);
    }

    #[test]
    fn test_percent_not_reclamped() {
        let resp = StatsResponse::from_readings(100.004, 0.0, 0.0, NetworkCounters::default());
        assert_eq!(resp.cpu, 100.0);

        let resp = StatsResponse::from_readings(101.5, 0.0, 0.0, NetworkCounters::default());
        assert_eq!(resp.cpu, 101.5);
    }

    #[test]
    fn test_json_field_names() {
        let resp = StatsResponse::from_readings(12.346, 67.891, 0.004, NetworkCounters::default());
        let value = serde_json::to_value(resp).unwrap();
        assert_eq!(
            value,
            json!({
                "cpu": 12.35,
                "ram": 67.89,
                "disk": 0.0,
                "network_sent": 0.0,
                "network_received": 0.0,
            })
        );
    }
}
