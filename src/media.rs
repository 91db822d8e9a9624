// src/media.rs — Image validation, MIME lookup, data-URL encoding

use base64::Engine;
use std::path::{Path, PathBuf};

use crate::infra::errors::RetouchError;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff"];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// Check that the input exists and carries a supported image extension.
/// Runs before the workflow is ever constructed.
pub fn validate_image(path: &Path) -> Result<(), RetouchError> {
    if !path.is_file() {
        return Err(RetouchError::UnsupportedImage {
            path: path.display().to_string(),
            reason: "file not found".into(),
        });
    }

    match extension(path) {
        Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(RetouchError::UnsupportedImage {
            path: path.display().to_string(),
            reason: format!(
                "unsupported format '.{ext}' (supported: {})",
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        }),
        None => Err(RetouchError::UnsupportedImage {
            path: path.display().to_string(),
            reason: "missing file extension".into(),
        }),
    }
}

/// MIME type from the file extension. Defaults to JPEG for anything unknown,
/// matching how the vision endpoint tolerates mislabeled payloads.
pub fn media_type(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tiff") => "image/tiff",
        _ => "image/jpeg",
    }
}

/// Read the file and encode it as a `data:` URL for a vision message part.
pub fn encode_data_url(path: &Path) -> Result<String, RetouchError> {
    let bytes = std::fs::read(path)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{encoded}", media_type(path)))
}

/// Collision-free artifact path in the output directory. Each run (and each
/// regeneration within a run) gets a fresh uuid-suffixed name so concurrent
/// runs never overwrite each other.
pub fn fresh_output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let ext = extension(input).unwrap_or_else(|| "png".into());
    let tag = uuid::Uuid::new_v4().simple().to_string();
    output_dir.join(format!("edited_{}.{ext}", &tag[..8]))
}
