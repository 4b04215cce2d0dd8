/// 进程控制接口

use axum::extract::State;

use crate::app_state::AppState;

/// 关闭服务
///
/// 先返回确认，服务器随后停止接受连接并在处理完当前请求后退出。
pub async fn stop(State(state): State<AppState>) -> &'static str {
    state.shutdown.trigger();
    "Shutting down…"
}
