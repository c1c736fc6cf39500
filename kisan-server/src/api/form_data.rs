use std::collections::HashMap;

use axum::extract::Multipart;

use kisan_types::StoredImage;

use super::AppResult;

/// Raster image types accepted for uploads. SVG is left out since it can carry script.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/heic",
    "image/heif",
];

/// True for a content type in [`ALLOWED_IMAGE_TYPES`], ignoring case and parameters
pub fn is_allowed_image_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES.contains(&essence.as_str())
}

/// A file part of a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn into_image(self) -> StoredImage {
        StoredImage {
            content_type: self.content_type,
            bytes: self.bytes,
        }
    }
}

/// Fully buffered multipart form
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Drain a multipart body. Parts with a filename are files, the rest text.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?.to_vec();
                    form.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed text field; empty strings count as missing
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Take an image part. Browsers send an empty part when no file was chosen,
    /// so empty uploads count as missing, and so does anything that is not
    /// an allowed image type.
    pub fn take_image(&mut self, name: &str) -> Option<UploadedFile> {
        let file = self.files.remove(name).filter(|f| !f.bytes.is_empty())?;
        if is_allowed_image_type(&file.content_type) {
            Some(file)
        } else {
            tracing::warn!(
                "Dropped upload {:?} with content type {:?}",
                file.file_name,
                file.content_type
            );
            None
        }
    }
}
