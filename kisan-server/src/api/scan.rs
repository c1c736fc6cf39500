use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};

use super::{form_data::FormData, AppResult};
use crate::diagnosis::diagnose_upload;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::views;

/// GET /scan
pub async fn scan_page() -> Html<String> {
    Html(views::scan_page(None))
}

/// POST /scan and POST /analyze
///
/// A missing or empty upload sends the user back to the scan form.
pub async fn analyze(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<Response> {
    let mut form = FormData::read(multipart).await?;
    let Some(file) = form.take_image("file") else {
        return Ok(Redirect::to("/scan").into_response());
    };

    tracing::debug!("User {} uploaded {} bytes for scanning", current.user.id, file.bytes.len());

    let diagnosis = diagnose_upload(&state.upload_dir, &file.file_name, &file.bytes).await?;
    Ok(Html(views::scan_page(Some(&diagnosis))).into_response())
}
