//! Image cache – maps a resource identifier (URL string) to a registered
//! XObject plus its natural extent.
//!
//! Registration is idempotent per identifier: the fetch, the decode and the
//! PDF registration happen at most once no matter how often the image is
//! placed. Supported sources are `http(s)://` URLs (fetched synchronously
//! and inline) and `data:image/...;base64,...` URIs. The encoding kind is
//! taken from the declared content type, not sniffed from the bytes.

use std::collections::HashMap;
use std::io::Read;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

use crate::canvas::Canvas;
use crate::error::LayoutError;

/// Image encoding kinds the canvas can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// Determine the kind from a declared content type, e.g. an HTTP
    /// `Content-Type` header or the media type of a data URI. Parameters
    /// after `;` are ignored.
    pub fn from_content_type(content_type: &str) -> Result<Self, LayoutError> {
        let media = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match media.as_str() {
            "image/jpeg" | "image/jpg" => Ok(ImageKind::Jpeg),
            "image/png" => Ok(ImageKind::Png),
            "image/gif" => Ok(ImageKind::Gif),
            _ => Err(LayoutError::UnsupportedFormat(content_type.to_string())),
        }
    }
}

/// A decoded and registered image, alive for the document's lifetime.
#[derive(Debug, Clone)]
pub struct RegisteredImage {
    /// Canvas XObject handle.
    pub handle: usize,
    /// Natural width in PDF points (1 px = 1 pt at 72 dpi).
    pub width_pt: f32,
    /// Natural height in PDF points.
    pub height_pt: f32,
    pub kind: ImageKind,
}

/// Per-document image registry. Not shared between documents: two documents
/// placing the same URL fetch it independently.
#[derive(Default)]
pub struct ImageCache {
    entries: HashMap<String, RegisteredImage>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&RegisteredImage> {
        self.entries.get(identifier)
    }

    /// Fetch, decode and register an image once. A second call with the same
    /// identifier returns the cached entry without any fetch or decode work.
    pub fn register(
        &mut self,
        canvas: &mut Canvas,
        identifier: &str,
    ) -> Result<&RegisteredImage, LayoutError> {
        if self.entries.contains_key(identifier) {
            return Ok(&self.entries[identifier]);
        }

        let (bytes, content_type) = fetch_resource(identifier)?;
        let kind = ImageKind::from_content_type(&content_type)?;

        let (px_w, px_h) = image::load_from_memory(&bytes)
            .map(|img| (img.width(), img.height()))
            .map_err(|e| {
                LayoutError::ImageFetch(format!("could not decode image {identifier:?}: {e}"))
            })?;

        let handle = canvas.add_image(&bytes, px_w, px_h)?;
        log::debug!("registered image {identifier} ({px_w}×{px_h} px, {kind:?})");

        self.entries.insert(
            identifier.to_string(),
            RegisteredImage {
                handle,
                width_pt: px_w as f32,
                height_pt: px_h as f32,
                kind,
            },
        );
        Ok(&self.entries[identifier])
    }
}

/// Resolve an identifier to raw bytes plus the declared content type.
fn fetch_resource(identifier: &str) -> Result<(Vec<u8>, String), LayoutError> {
    if identifier.starts_with("data:") {
        return parse_data_uri(identifier);
    }
    if identifier.starts_with("http://") || identifier.starts_with("https://") {
        return fetch_url(identifier);
    }
    Err(LayoutError::ImageFetch(format!(
        "unsupported image source {identifier:?} (expected http(s):// or a data URI)"
    )))
}

fn fetch_url(url: &str) -> Result<(Vec<u8>, String), LayoutError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| LayoutError::ImageFetch(format!("GET {url} failed: {e}")))?;

    let content_type = response.content_type().to_string();
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| LayoutError::ImageFetch(format!("reading {url} failed: {e}")))?;

    Ok((bytes, content_type))
}

/// Parse a `data:<mime>;base64,<data>` URI into bytes plus its media type.
fn parse_data_uri(uri: &str) -> Result<(Vec<u8>, String), LayoutError> {
    let rest = &uri["data:".len()..];
    let comma_pos = rest.find(',').ok_or_else(|| {
        LayoutError::ImageFetch("invalid data URI: missing `,` separator".to_string())
    })?;
    let header = &rest[..comma_pos];
    if !header.contains(";base64") {
        return Err(LayoutError::ImageFetch(
            "only base64-encoded data URIs are supported".to_string(),
        ));
    }
    let media = header.split(';').next().unwrap_or("").to_string();
    let bytes = BASE64_STD
        .decode(rest[comma_pos + 1..].trim())
        .map_err(|e| LayoutError::ImageFetch(format!("base64 decode error: {e}")))?;
    Ok((bytes, media))
}
