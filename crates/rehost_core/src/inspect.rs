//! Content inspection: hashing, extension inference, dimensions.
//!
//! Everything here is best-effort metadata except the hash, which is both the
//! deduplication key and part of the storage path. Decode failures degrade to
//! `"bin"` and absent dimensions instead of failing the upload.

use image::{ImageFormat, ImageReader};
use sha2::{Digest, Sha256};
use std::io::Cursor;

/// Extension used when neither the declared MIME type nor the bytes identify
/// the format.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Content type sent to the object store when the vendor declared none.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const EXT_BY_CONTENT_TYPE: [(&str, &str); 5] = [
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Everything the cache records about a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInfo {
    /// Lowercase hex SHA-256 of the raw payload
    pub sha256: String,
    /// Short file extension (`jpg`, `png`, `webp`, `gif` or `bin`)
    pub extension: &'static str,
    /// Normalized MIME type as declared by the vendor
    pub content_type: Option<String>,
    /// Payload size in bytes
    pub size_bytes: i64,
    /// Pixel width, when the payload is a decodable raster image
    pub width: Option<u32>,
    /// Pixel height, when the payload is a decodable raster image
    pub height: Option<u32>,
}

impl ContentInfo {
    /// Content-addressed object path: `<prefix>/<sha256>.<ext>`.
    pub fn storage_path(&self, prefix: &str) -> String {
        storage_path(prefix, &self.sha256, self.extension)
    }
}

/// Content-addressed object path for a digest and extension.
///
/// # Examples
///
/// ```
/// use rehost_core::storage_path;
///
/// assert_eq!(storage_path("assets", "abc", "jpg"), "assets/abc.jpg");
/// assert_eq!(storage_path("assets/", "abc", "png"), "assets/abc.png");
/// ```
pub fn storage_path(prefix: &str, sha256: &str, extension: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{sha256}.{extension}")
    } else {
        format!("{prefix}/{sha256}.{extension}")
    }
}

/// Inspect a downloaded payload.
#[tracing::instrument(skip(data), fields(size = data.len()))]
pub fn inspect(content_type: Option<&str>, data: &[u8]) -> ContentInfo {
    let content_type = normalize_content_type(content_type);
    let (width, height) = match dimensions(data) {
        Some((w, h)) => (Some(w), Some(h)),
        None => (None, None),
    };

    ContentInfo {
        sha256: sha256_hex(data),
        extension: infer_extension(content_type.as_deref(), data),
        content_type,
        size_bytes: data.len() as i64,
        width,
        height,
    }
}

/// Compute the lowercase hex SHA-256 of a payload.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Drop any `;charset=...` suffix, trim and lower-case. Empty becomes `None`.
///
/// # Examples
///
/// ```
/// use rehost_core::normalize_content_type;
///
/// assert_eq!(
///     normalize_content_type(Some("Image/JPEG; charset=binary")),
///     Some("image/jpeg".to_string())
/// );
/// assert_eq!(normalize_content_type(Some(" ; x")), None);
/// assert_eq!(normalize_content_type(None), None);
/// ```
pub fn normalize_content_type(content_type: Option<&str>) -> Option<String> {
    let raw = content_type?;
    let essence = raw.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        None
    } else {
        Some(essence.to_ascii_lowercase())
    }
}

/// Pick a file extension from the declared MIME type, falling back to
/// sniffing the bytes, falling back to `"bin"`.
pub fn infer_extension(content_type: Option<&str>, data: &[u8]) -> &'static str {
    if let Some(ct) = normalize_content_type(content_type)
        && let Some(&(_, ext)) = EXT_BY_CONTENT_TYPE.iter().find(|(mime, _)| *mime == ct)
    {
        return ext;
    }

    match sniff(data) {
        Some((ImageFormat::Jpeg, _)) => "jpg",
        Some((ImageFormat::Png, _)) => "png",
        Some((ImageFormat::WebP, _)) => "webp",
        Some((ImageFormat::Gif, _)) => "gif",
        _ => FALLBACK_EXTENSION,
    }
}

/// Pixel dimensions of a decodable raster image.
pub fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
    sniff(data).map(|(_, dims)| dims)
}

/// Detect the format from magic bytes and confirm the header decodes.
fn sniff(data: &[u8]) -> Option<(ImageFormat, (u32, u32))> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?;
    let format = reader.format()?;
    match reader.into_dimensions() {
        Ok(dims) => Some((format, dims)),
        Err(e) => {
            tracing::debug!(error = %e, ?format, "Payload is not a decodable image");
            None
        }
    }
}
