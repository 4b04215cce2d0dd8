/// 统计服务
///
/// 汇总 CPU、内存、磁盘速率、网络累计量，生成一次 `StatsResponse`

use common::StatsResponse;
use tracing::debug;

use crate::app_state::AppState;

pub struct StatsService {
    state: AppState,
}

impl StatsService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// 采集一次统计数据
    ///
    /// CPU 采样会阻塞一个采样窗口，整个采集过程放在阻塞线程池中执行。
    pub async fn collect(&self) -> common::Result<StatsResponse> {
        let source = self.state.source();
        let sampler = self.state.sampler();
        let interval = self.state.cpu_sample_interval;

        let stats = tokio::task::spawn_blocking(move || -> common::Result<StatsResponse> {
            let cpu = source.cpu_percent(interval)?;
            let ram = source.memory_percent()?;
            let disk = sampler.sample(|| source.disk_counters())?;
            let network = source.network_counters()?;
            Ok(StatsResponse::from_readings(cpu, ram, disk, network))
        })
        .await
        .map_err(|e| common::Error::Internal(format!("采集任务异常退出: {}", e)))??;

        debug!(
            "📊 cpu={}% ram={}% disk={}MB/s sent={}MB recv={}MB",
            stats.cpu, stats.ram, stats.disk, stats.network_sent, stats.network_received
        );
        Ok(stats)
    }
}
