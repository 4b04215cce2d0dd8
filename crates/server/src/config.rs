/// 配置管理

use std::time::Duration;

use common::utils::parse_bool;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub open_browser: bool,
    pub browser_delay_ms: u64,
    pub kill_stale_instances: bool,
    pub cpu_sample_ms: u64,
    pub shutdown_grace_ms: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 5000,
            open_browser: true,
            browser_delay_ms: 1000,
            kill_stale_instances: true,
            cpu_sample_ms: 500,
            shutdown_grace_ms: 500,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置，未设置的项使用默认值
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let server_port = match lookup("SERVER_PORT") {
            Some(v) => v.trim().parse()?,
            None => defaults.server_port,
        };

        let open_browser = match lookup("OPEN_BROWSER") {
            Some(v) => parse_flag("OPEN_BROWSER", &v)?,
            None => defaults.open_browser,
        };

        let browser_delay_ms = match lookup("BROWSER_DELAY_MS") {
            Some(v) => v.trim().parse()?,
            None => defaults.browser_delay_ms,
        };

        let kill_stale_instances = match lookup("KILL_STALE_INSTANCES") {
            Some(v) => parse_flag("KILL_STALE_INSTANCES", &v)?,
            None => defaults.kill_stale_instances,
        };

        let cpu_sample_ms = match lookup("CPU_SAMPLE_MS") {
            Some(v) => v.trim().parse()?,
            None => defaults.cpu_sample_ms,
        };

        let shutdown_grace_ms = match lookup("SHUTDOWN_GRACE_MS") {
            Some(v) => v.trim().parse()?,
            None => defaults.shutdown_grace_ms,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Self {
            server_port,
            open_browser,
            browser_delay_ms,
            kill_stale_instances,
            cpu_sample_ms,
            shutdown_grace_ms,
            log_level,
        })
    }

    pub fn cpu_sample_interval(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }

    pub fn browser_delay(&self) -> Duration {
        Duration::from_millis(self.browser_delay_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

fn parse_flag(key: &str, value: &str) -> anyhow::Result<bool> {
    parse_bool(value).ok_or_else(|| {
        common::Error::Config(format!("{} 不是有效的布尔值: {}", key, value)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.server_port, 5000);
        assert!(cfg.open_browser);
        assert!(cfg.kill_stale_instances);
        assert_eq!(cfg.cpu_sample_interval(), Duration::from_millis(500));
        assert_eq!(cfg.shutdown_grace(), Duration::from_millis(500));
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("SERVER_PORT", "8080"),
            ("OPEN_BROWSER", "false"),
            ("CPU_SAMPLE_MS", "250"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(cfg.server_port, 8080);
        assert!(!cfg.open_browser);
        assert_eq!(cfg.cpu_sample_ms, 250);
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("SERVER_PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("SERVER_PORT", "70000")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("OPEN_BROWSER", "sometimes")])).is_err());
    }
}
