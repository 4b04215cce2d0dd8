/// 磁盘速率采样器
///
/// 将两次累计磁盘计数器读数换算为瞬时吞吐量（MB/s）。
/// 上一次读数及其时间戳是进程内唯一的共享可变状态，由互斥锁保护：
/// 读取上一次状态、计算速率、替换状态这三步在同一临界区内完成。

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use common::utils::BYTES_PER_MB;
use common::DiskCounters;
use tracing::debug;

/// 两次采样时间戳相同时使用的时长（秒）
///
/// 轮询快于时钟精度时报告的吞吐量会偏低。
pub const MIN_SAMPLE_SECS: f64 = 1.0;

/// 上一次采样状态
#[derive(Debug, Clone, Copy)]
struct SamplerState {
    previous: DiskCounters,
    taken_at: Instant,
}

pub struct RateSampler {
    state: Mutex<SamplerState>,
}

impl RateSampler {
    /// 以启动时的初始读数创建采样器
    pub fn new(initial: DiskCounters, taken_at: Instant) -> Self {
        Self {
            state: Mutex::new(SamplerState {
                previous: initial,
                taken_at,
            }),
        }
    }

    /// 在锁内读取计数器并计算速率
    ///
    /// 读取失败时状态保持不变。
    pub fn sample<F>(&self, read: F) -> common::Result<f64>
    where
        F: FnOnce() -> common::Result<DiskCounters>,
    {
        self.sample_with_clock(read, Instant::now)
    }

    /// 同 `sample`，时间戳由 `clock` 提供
    pub fn sample_with_clock<F, C>(&self, read: F, clock: C) -> common::Result<f64>
    where
        F: FnOnce() -> common::Result<DiskCounters>,
        C: FnOnce() -> Instant,
    {
        let mut state = self.lock();
        let current = read()?;
        let now = clock();
        Ok(Self::advance(&mut state, current, now))
    }

    /// 上一次读数
    #[cfg(test)]
    pub fn previous(&self) -> (DiskCounters, Instant) {
        let state = self.lock();
        (state.previous, state.taken_at)
    }

    fn advance(state: &mut SamplerState, current: DiskCounters, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(state.taken_at);
        let rate = disk_throughput(&state.previous, &current, elapsed);

        debug!(
            "磁盘采样: read={} write={} elapsed={:?} rate={:.4} MB/s",
            current.bytes_read, current.bytes_written, elapsed, rate
        );

        *state = SamplerState {
            previous: current,
            taken_at: now,
        };
        rate
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SamplerState> {
        // 状态只会整体替换，锁中毒后依然一致
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 计算两次读数之间的磁盘吞吐量（MB/s）
///
/// 计数器回退（溢出或设备重置）时该项增量按 0 计。
pub fn disk_throughput(previous: &DiskCounters, current: &DiskCounters, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    let duration = if secs > 0.0 { secs } else { MIN_SAMPLE_SECS };

    let read_delta = counter_delta(previous.bytes_read, current.bytes_read);
    let write_delta = counter_delta(previous.bytes_written, current.bytes_written);

    let read_bps = read_delta as f64 / duration;
    let write_bps = write_delta as f64 / duration;
    (read_bps + write_bps) / BYTES_PER_MB
}

fn counter_delta(previous: u64, current: u64) -> u64 {
    current.checked_sub(previous).unwrap_or_else(|| {
        debug!("计数器回退: {} -> {}，本次增量按 0 计", previous, current);
        0
    })
}
