use axum::{response::Html, Extension};

use crate::middleware::CurrentUser;
use crate::views;

/// GET /dashboard
pub async fn dashboard(Extension(current): Extension<CurrentUser>) -> Html<String> {
    Html(views::dashboard_page(&current.user))
}

/// GET /weather - the weather card lives on the dashboard
pub async fn weather(Extension(current): Extension<CurrentUser>) -> Html<String> {
    Html(views::dashboard_page(&current.user))
}
