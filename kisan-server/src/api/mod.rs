pub mod assets;
pub mod assistant;
pub mod auth;
pub mod community;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod form_data;
pub mod market;
pub mod scan;

pub use error::{AppError, AppResult};

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use kisan_types::StoredImage;

/// Parse a path segment as a UUID
pub(crate) fn parse_id(raw: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {what} ID")))
}

/// Serve stored image bytes. Only allowed image types keep their content
/// type; anything else goes out as an opaque download. Never sniffed.
pub(crate) fn image_response(image: StoredImage) -> Response {
    let content_type = if form_data::is_allowed_image_type(&image.content_type) {
        HeaderValue::from_str(&image.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
    } else {
        HeaderValue::from_static("application/octet-stream")
    };

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        ],
        image.bytes,
    )
        .into_response()
}
