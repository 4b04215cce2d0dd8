/// 系统指标采集模块

#[cfg(target_os = "linux")]
pub mod diskstats;
pub mod sampler;
pub mod source;

pub use sampler::RateSampler;
pub use source::{MetricsSource, SysinfoSource};
