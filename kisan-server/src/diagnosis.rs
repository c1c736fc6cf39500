use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use kisan_types::{DiseaseRecord, DISEASE_TABLE, MAX_CONFIDENCE, MIN_CONFIDENCE};

/// Characters that survive filename sanitization
static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("Failed to compile filename regex"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

/// Result of the mock crop scan
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub record: DiseaseRecord,
    pub confidence: u8,
    /// Name of the saved upload, relative to the upload directory
    pub stored_file: String,
}

/// Reduce a client-supplied filename to a safe ASCII name.
///
/// Only the last path component is kept, whitespace becomes `_`, and
/// anything outside `[A-Za-z0-9._-]` is dropped. Leading and trailing dots
/// and underscores are stripped so the result can never be `..` or hidden.
/// Returns `None` when nothing usable is left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let spaced = WHITESPACE.replace_all(last.trim(), "_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&spaced, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Pick one entry of the disease table uniformly at random
pub fn choose_record<R: Rng>(rng: &mut R) -> DiseaseRecord {
    *DISEASE_TABLE
        .choose(rng)
        .unwrap_or(&DISEASE_TABLE[DISEASE_TABLE.len() - 1])
}

pub fn choose_confidence<R: Rng>(rng: &mut R) -> u8 {
    rng.random_range(MIN_CONFIDENCE..=MAX_CONFIDENCE)
}

/// Extensions kept on stored uploads. Anything else gets `.bin` appended so the
/// static file server never picks a scriptable content type for it.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "heic", "heif"];

/// Name under which an upload is stored.
///
/// A usable name becomes `<uuid>-<name>`, so uploads never overwrite each
/// other. A name that sanitizes to nothing becomes `upload-<uuid>`.
pub fn stored_name(original_name: &str) -> String {
    let Some(base) = sanitize_filename(original_name) else {
        return format!("upload-{}", Uuid::new_v4());
    };

    let has_image_extension = base
        .rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    if has_image_extension {
        format!("{}-{}", Uuid::new_v4(), base)
    } else {
        format!("{}-{}.bin", Uuid::new_v4(), base)
    }
}

/// Save an uploaded crop photo and return the stored file name
pub async fn save_upload(dir: &Path, original_name: &str, bytes: &[u8]) -> Result<String> {
    let file_name = stored_name(original_name);
    let path: PathBuf = dir.join(&file_name);

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write upload {}", path.display()))?;

    Ok(file_name)
}

/// Save the upload and run the mock classifier. File content is never inspected.
pub async fn diagnose_upload(dir: &Path, original_name: &str, bytes: &[u8]) -> Result<Diagnosis> {
    let stored_file = save_upload(dir, original_name, bytes).await?;

    let (record, confidence) = {
        let mut rng = rand::rng();
        (choose_record(&mut rng), choose_confidence(&mut rng))
    };

    tracing::info!(
        "Diagnosed upload {} as {} ({}%)",
        stored_file,
        record.name,
        confidence
    );

    Ok(Diagnosis {
        record,
        confidence,
        stored_file,
    })
}
