/// 仪表盘页面

use axum::response::Html;

/// 编译期嵌入的仪表盘页面
const INDEX_HTML: &str = include_str!("../../assets/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
