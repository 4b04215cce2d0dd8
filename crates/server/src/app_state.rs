/// 应用全局状态

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::utils::format_bytes;
use tracing::info;

use crate::{
    lifecycle::Shutdown,
    metrics::{MetricsSource, RateSampler},
};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 系统指标来源
    pub source: Arc<dyn MetricsSource>,
    /// 磁盘速率采样器
    pub sampler: Arc<RateSampler>,
    /// 关闭信号
    pub shutdown: Shutdown,
    /// CPU 采样窗口
    pub cpu_sample_interval: Duration,
}

impl AppState {
    /// 读取一次磁盘计数器作为采样器初始状态
    pub fn new(
        source: Arc<dyn MetricsSource>,
        shutdown: Shutdown,
        cpu_sample_interval: Duration,
    ) -> common::Result<Self> {
        let initial = source.disk_counters()?;
        info!(
            "💾 初始磁盘计数: 读 {}，写 {}",
            format_bytes(initial.bytes_read),
            format_bytes(initial.bytes_written)
        );
        let sampler = Arc::new(RateSampler::new(initial, Instant::now()));

        Ok(Self {
            source,
            sampler,
            shutdown,
            cpu_sample_interval,
        })
    }

    /// 获取指标来源
    pub fn source(&self) -> Arc<dyn MetricsSource> {
        self.source.clone()
    }

    /// 获取磁盘速率采样器
    pub fn sampler(&self) -> Arc<RateSampler> {
        self.sampler.clone()
    }
}
