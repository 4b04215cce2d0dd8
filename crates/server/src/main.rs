/// Hostdash - Server
///
/// 本地主机监控面板：采集 CPU、内存、磁盘吞吐、网络流量，
/// 通过本地 HTTP 接口提供给浏览器页面轮询

mod api;
mod app_state;
mod config;
mod lifecycle;
mod metrics;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use crate::{
    app_state::AppState,
    lifecycle::Shutdown,
    metrics::SysinfoSource,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 加载配置
    let cfg = config::Config::from_env()?;

    // 初始化日志
    // 可以通过环境变量 RUST_LOG 设置日志级别，例如：
    // RUST_LOG=hostdash=debug cargo run
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.log_level))
        )
        .init();

    info!("🚀 启动 Hostdash...");
    info!("✅ 配置加载成功");

    // 结束旧实例，避免端口被占用
    if cfg.kill_stale_instances {
        match lifecycle::current_exe_name() {
            Some(name) => {
                let killed =
                    tokio::task::spawn_blocking(move || lifecycle::kill_other_instances(&name))
                        .await?;
                info!("🧹 已清理 {} 个旧实例", killed);
            }
            None => warn!("无法获取当前可执行文件名，跳过旧实例清理"),
        }
    }

    let shutdown = Shutdown::new();

    // Ctrl-C 与 /api/stop 共用同一关闭信号
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.trigger();
            }
        });
    }

    // 创建应用状态（读取初始磁盘计数器）
    let source = Arc::new(SysinfoSource::new());
    let app_state = AppState::new(source, shutdown.clone(), cfg.cpu_sample_interval())?;
    info!("📊 指标采样器初始化成功");

    let app = api::app_router(app_state);

    // 启动服务器，仅监听本地回环地址
    let addr = SocketAddr::from(([127, 0, 0, 1], cfg.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let url = format!("http://{}", addr);
    info!("🎯 服务器监听在 {}", url);

    let mut server = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.wait().await })
                .await
        })
    };

    if cfg.open_browser {
        tokio::select! {
            _ = tokio::time::sleep(cfg.browser_delay()) => lifecycle::open_browser(&url),
            _ = shutdown.wait() => {}
        }
    }

    // 等待服务器退出；收到关闭信号后最多等待一个宽限期
    let grace = cfg.shutdown_grace();
    tokio::select! {
        result = &mut server => {
            result??;
            info!("👋 服务器已关闭");
        }
        _ = async {
            shutdown.wait().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!("⏱️ 服务器未在 {:?} 内完成关闭，强制退出", grace);
        }
    }

    Ok(())
}
