use axum::response::Html;

const DASHBOARD_HTML: &str = include_str!("../../templates/dashboard.html");

pub async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}
