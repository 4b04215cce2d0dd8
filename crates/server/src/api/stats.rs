/// 系统统计接口

use axum::{extract::State, http::StatusCode, Json};
use common::StatsResponse;
use serde::Serialize;
use tracing::error;

use crate::{app_state::AppState, services::stats_service::StatsService};

/// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// 获取当前 CPU / 内存 / 磁盘 / 网络统计
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let service = StatsService::new(state);
    match service.collect().await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => {
            error!("采集系统统计失败: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    error: format!("采集系统统计失败: {}", e),
                }),
            ))
        }
    }
}
