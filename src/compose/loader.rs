use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;

use crate::foundation::error::{ThumbError, ThumbResult};

/// Decoded source image in straight (non-premultiplied) RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8: Arc<Vec<u8>>,
}

impl LoadedImage {
    /// Wrap raw straight-alpha bytes, checking the buffer size against the dimensions.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> ThumbResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| ThumbError::resource("image buffer size overflow"))?;
        if width == 0 || height == 0 || rgba8.len() != expected {
            return Err(ThumbError::resource(format!(
                "image buffer does not match {width}x{height} RGBA8"
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }
}

/// Resolves a background `imagePath` to decoded pixels.
///
/// Every failure is reported as [`ThumbError::Resource`] so callers can fall back instead of
/// aborting.
pub trait ImageLoader {
    fn load_image(&self, source: &str) -> ThumbResult<LoadedImage>;

    /// URL a markup host should fetch `source` from so it sees the same file as
    /// [`ImageLoader::load_image`]. Defaults to `source` unchanged.
    fn locate(&self, source: &str) -> String {
        source.to_string()
    }
}

/// Loads from the local filesystem, relative to a base directory, or from inline `data:` URLs.
#[derive(Clone, Debug, Default)]
pub struct FsImageLoader {
    base_dir: PathBuf,
}

impl FsImageLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Loader rooted at the directory holding `document_path`.
    pub fn for_document(document_path: &Path) -> Self {
        Self::new(
            document_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        )
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Filesystem path a non-`data:` source resolves to.
    pub fn resolve_path(&self, source: &str) -> PathBuf {
        let p = Path::new(source);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }
}

impl ImageLoader for FsImageLoader {
    fn load_image(&self, source: &str) -> ThumbResult<LoadedImage> {
        let bytes = if is_data_url(source) {
            decode_data_url(source)?
        } else {
            let path = self.resolve_path(source);
            std::fs::read(&path).map_err(|e| {
                ThumbError::resource(format!("read image '{}': {e}", path.display()))
            })?
        };
        decode_image(&bytes)
    }

    /// `data:` URLs pass through; filesystem sources become absolute `file://` URLs.
    fn locate(&self, source: &str) -> String {
        if is_data_url(source) {
            return source.to_string();
        }
        let path = self.resolve_path(source);
        let path = std::path::absolute(&path).unwrap_or(path);
        match url::Url::from_file_path(&path) {
            Ok(url) => url.into(),
            Err(()) => {
                tracing::warn!(path = %path.display(), "cannot express image path as a file URL");
                source.to_string()
            }
        }
    }
}

pub fn is_data_url(source: &str) -> bool {
    source
        .get(..5)
        .is_some_and(|p| p.eq_ignore_ascii_case("data:"))
}

/// Payload bytes of a `data:[<mime>][;base64],<data>` URL.
pub fn decode_data_url(source: &str) -> ThumbResult<Vec<u8>> {
    let rest = source
        .get(5..)
        .filter(|_| is_data_url(source))
        .ok_or_else(|| ThumbError::resource("not a data: URL"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ThumbError::resource("data: URL is missing ','"))?;
    if meta
        .split(';')
        .any(|part| part.eq_ignore_ascii_case("base64"))
    {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ThumbError::resource(format!("decode data: URL base64: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Decode any format the `image` crate recognizes into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> ThumbResult<LoadedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ThumbError::resource(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    LoadedImage::from_rgba8(width, height, rgba.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/loader.rs"]
mod tests;
