/// 进程生命周期管理
///
/// - 启动前结束同名的旧实例
/// - 打开浏览器
/// - 优雅关闭信号

use std::ffi::OsStr;
use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 关闭信号
///
/// 克隆后共享同一信号，任一持有者触发后所有等待者都会被唤醒。
#[derive(Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// 触发关闭
    pub fn trigger(&self) {
        if !self.is_triggered() {
            info!("🛑 收到关闭请求");
        }
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 等待关闭信号
    pub async fn wait(&self) {
        self.token.cancelled().await
    }
}

/// 当前可执行文件名
pub fn current_exe_name() -> Option<String> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
}

/// 等待被结束的进程退出的最长时间
const EXIT_WAIT_TIMEOUT: Duration = Duration::from_secs(1);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// 结束其他同名进程（不包括当前进程）
///
/// 尽力而为：权限不足或进程已退出时忽略。发出结束信号后会等待进程真正退出
/// （最多 1 秒），以便随后绑定其占用的端口。返回已退出的进程数。
pub fn kill_other_instances(exe_name: &str) -> usize {
    let me = sysinfo::get_current_pid().ok();
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    let mut signalled = Vec::new();
    for pid in other_instances(&sys, me, exe_name) {
        let Some(process) = sys.process(pid) else {
            continue;
        };
        if process.kill() {
            info!("🔪 已向旧实例 {} (PID {}) 发送结束信号", exe_name, pid);
            signalled.push(pid);
        } else {
            warn!("无法结束旧实例 {} (PID {})，忽略", exe_name, pid);
        }
    }

    signalled
        .into_iter()
        .filter(|pid| {
            let exited = wait_for_exit(&mut sys, *pid, EXIT_WAIT_TIMEOUT);
            if !exited {
                warn!("旧实例 (PID {}) 在 {:?} 内未退出", pid, EXIT_WAIT_TIMEOUT);
            }
            exited
        })
        .count()
}

/// 进程表中名称匹配且不是当前进程的 PID（不含线程）
fn other_instances(sys: &System, me: Option<Pid>, exe_name: &str) -> Vec<Pid> {
    sys.processes()
        .iter()
        .filter(|(pid, _)| Some(**pid) != me)
        .filter(|(_, process)| process.thread_kind().is_none())
        .filter(|(_, process)| same_process_name(process.name(), exe_name))
        .map(|(pid, _)| *pid)
        .collect()
}

/// 轮询直到进程消失或成为僵尸进程（资源已释放，只等父进程回收）
fn wait_for_exit(sys: &mut System, pid: Pid, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        match sys.process(pid) {
            None => return true,
            Some(process)
                if matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead) =>
            {
                return true
            }
            Some(_) => {}
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(EXIT_POLL_INTERVAL);
    }
}

fn same_process_name(name: &OsStr, exe_name: &str) -> bool {
    name.to_string_lossy().eq_ignore_ascii_case(exe_name)
}

/// 在默认浏览器中打开地址
pub fn open_browser(url: &str) {
    let result = if cfg!(target_os = "windows") {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()
    } else if cfg!(target_os = "macos") {
        std::process::Command::new("open").arg(url).spawn()
    } else {
        std::process::Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => debug!("已打开浏览器: {}", url),
        Err(e) => warn!("打开浏览器失败: {}，请手动访问 {}", e, url),
    }
}
