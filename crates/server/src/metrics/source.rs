/// 指标数据源
///
/// 使用 sysinfo 读取 CPU、内存、网络，Linux 下磁盘计数器来自 `/proc/diskstats`，
/// 其他平台来自 sysinfo 的磁盘累计 I/O

use std::collections::HashSet;
use std::time::Duration;

use common::{DiskCounters, NetworkCounters};
use sysinfo::{Networks, System};
use tracing::debug;

/// 系统指标来源
///
/// 所有方法都可能阻塞，应在阻塞线程池中调用。
pub trait MetricsSource: Send + Sync {
    /// 在 `interval` 时间窗口内采样的全局 CPU 使用率
    fn cpu_percent(&self, interval: Duration) -> common::Result<f64>;

    /// 内存使用率
    fn memory_percent(&self) -> common::Result<f64>;

    /// 磁盘累计读写字节数
    fn disk_counters(&self) -> common::Result<DiskCounters>;

    /// 网络累计收发字节数
    fn network_counters(&self) -> common::Result<NetworkCounters>;
}

/// 基于 sysinfo 的指标来源
///
/// 每次调用使用独立的 `System`，并发请求之间不共享刷新状态。
#[derive(Debug, Default)]
pub struct SysinfoSource;

impl SysinfoSource {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSource for SysinfoSource {
    fn cpu_percent(&self, interval: Duration) -> common::Result<f64> {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        std::thread::sleep(interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
        sys.refresh_cpu_usage();

        let usage = sys.global_cpu_usage() as f64;
        debug!("CPU 使用率: {:.2}%", usage);
        Ok(usage)
    }

    fn memory_percent(&self) -> common::Result<f64> {
        let mut sys = System::new();
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            return Err(common::Error::Metrics("无法读取内存总量".to_string()));
        }
        let used = total.saturating_sub(sys.available_memory());
        Ok(used as f64 / total as f64 * 100.0)
    }

    fn disk_counters(&self) -> common::Result<DiskCounters> {
        read_disk_counters()
    }

    fn network_counters(&self) -> common::Result<NetworkCounters> {
        let networks = Networks::new_with_refreshed_list();
        let counters = networks
            .list()
            .values()
            .fold(NetworkCounters::default(), |acc, data| {
                NetworkCounters::new(
                    acc.bytes_sent.saturating_add(data.total_transmitted()),
                    acc.bytes_received.saturating_add(data.total_received()),
                )
            });
        Ok(counters)
    }
}

#[cfg(target_os = "linux")]
fn read_disk_counters() -> common::Result<DiskCounters> {
    super::diskstats::read_disk_counters()
}

/// 非 Linux 平台：汇总各磁盘自开机以来的累计读写量
#[cfg(not(target_os = "linux"))]
fn read_disk_counters() -> common::Result<DiskCounters> {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    let counters = sum_device_usage(disks.list().iter().map(|disk| {
        let usage = disk.usage();
        (
            disk.name().to_string_lossy().into_owned(),
            usage.total_read_bytes,
            usage.total_written_bytes,
        )
    }));
    Ok(counters)
}

/// 按设备名去重后累加读写字节数
///
/// 同一设备挂载多次时只计一次。
#[cfg_attr(target_os = "linux", allow(dead_code))]
fn sum_device_usage<I>(devices: I) -> DiskCounters
where
    I: IntoIterator<Item = (String, u64, u64)>,
{
    let mut seen = HashSet::new();
    devices
        .into_iter()
        .filter(|(name, _, _)| seen.insert(name.clone()))
        .fold(DiskCounters::default(), |acc, (_, read, written)| {
            DiskCounters::new(
                acc.bytes_read.wrapping_add(read),
                acc.bytes_written.wrapping_add(written),
            )
        })
}
