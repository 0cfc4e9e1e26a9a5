//! Upload storage
//!
//! The rules pipeline keeps uploads under the configured upload directory
//! (same name overwrites, last write wins). The assisted pipeline only needs
//! the photo for the duration of the request and uses a temporary file.

use axum::body::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const FALLBACK_FILENAME: &str = "upload.bin";
const DEFAULT_MIME: &str = "image/jpeg";

/// Photo received in the `image` form field
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Client-supplied filename, if any
    pub file_name: Option<String>,
    /// Content type of the multipart part, if any
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedImage {
    /// Filename safe to join onto a directory
    pub fn safe_file_name(&self) -> String {
        sanitize_filename(self.file_name.as_deref().unwrap_or_default())
    }

    /// MIME type for the model request
    ///
    /// Part content type when it names an image, else a guess from the
    /// extension, else JPEG.
    pub fn mime_type(&self) -> &str {
        if let Some(ct) = self.content_type.as_deref() {
            if ct.starts_with("image/") {
                return ct;
            }
        }
        self.file_name
            .as_deref()
            .and_then(|name| mime_for_path(Path::new(name)))
            .unwrap_or(DEFAULT_MIME)
    }
}

/// Reduce a client filename to its last path component
///
/// Both `/` and `\` are treated as separators. Empty, `.` and `..` fall back
/// to `upload.bin`.
pub fn sanitize_filename(raw: &str) -> String {
    let last = raw
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    match last {
        "" | "." | ".." => FALLBACK_FILENAME.to_string(),
        name => name.to_string(),
    }
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// Write the upload to `<upload_dir>/<filename>`, creating the directory
pub async fn save_upload(upload_dir: &Path, image: &UploadedImage) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let path = upload_dir.join(image.safe_file_name());
    tokio::fs::write(&path, &image.bytes).await?;

    tracing::debug!(path = %path.display(), bytes = image.bytes.len(), "Saved upload");
    Ok(path)
}

/// Write the upload to a temporary file, removed when the handle drops
///
/// File creation and the write run on the blocking pool.
pub async fn save_temp_upload(image: &UploadedImage) -> std::io::Result<NamedTempFile> {
    let suffix = Path::new(&image.safe_file_name())
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let bytes = image.bytes.clone();

    let file = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("kairos-upload-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(file)
    })
    .await
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

    tracing::debug!(path = %file.path().display(), bytes = image.bytes.len(), "Saved temporary upload");
    Ok(file)
}
