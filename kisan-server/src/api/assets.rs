use axum::{http::header, response::IntoResponse};

use crate::views::STYLESHEET;

/// GET /static/style.css
pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
