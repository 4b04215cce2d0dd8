pub mod dashboard;
pub mod stats;
pub mod system;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// 所有 API 路由（统一入口）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats::get_stats))
        .route("/stop", post(system::stop))
}

/// 完整应用路由
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/health", get(health_handler))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::services::stats_service::tests::{state_with, FakeSource};

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = app_router(state_with(FakeSource::new(42.567, 50.0)));

        let response = app
            .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["cpu"], 42.57);
        assert_eq!(body["ram"], 50.0);
        assert_eq!(body["disk"], 0.0);
        assert_eq!(body["network_sent"], 1.0);
        assert_eq!(body["network_received"], 2.0);
        assert_eq!(body.as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_stats_failure_is_server_error() {
        let state = state_with(FakeSource::new(1.0, 1.0));
        let state = AppState {
            source: std::sync::Arc::new(FakeSource::failing()),
            ..state
        };

        let response = app_router(state)
            .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_stop_acknowledges_and_triggers_shutdown() {
        let state = state_with(FakeSource::new(1.0, 1.0));
        let shutdown = state.shutdown.clone();

        let response = app_router(state)
            .oneshot(Request::post("/api/stop").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(body_string(response).await, "Shutting down…");
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_stop_closes_running_server() {
        use std::time::Duration;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::{TcpListener, TcpStream};

        let state = state_with(FakeSource::new(1.0, 1.0));
        let shutdown = state.shutdown.clone();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            axum::serve(listener, app_router(state))
                .with_graceful_shutdown(async move { shutdown.wait().await })
                .await
        });

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                b"POST /api/stop HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            )
            .await
            .unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let response = String::from_utf8_lossy(&raw);
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("Shutting down…"));

        tokio::time::timeout(Duration::from_secs(1), server)
            .await
            .expect("服务器未在 1 秒内退出")
            .unwrap()
            .unwrap();
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_stop_requires_post() {
        let app = app_router(state_with(FakeSource::new(1.0, 1.0)));
        let response = app
            .oneshot(Request::get("/api/stop").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_dashboard_page() {
        let app = app_router(state_with(FakeSource::new(1.0, 1.0)));
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("/api/stats"));
    }

    #[tokio::test]
    async fn test_health() {
        let app = app_router(state_with(FakeSource::new(1.0, 1.0)));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "OK");
    }
}
