use crate::{
    foundation::error::{ThumbError, ThumbResult},
    plan::ThumbnailPlan,
};

/// Rendered pixels, row-major RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixel data, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            for px in out.chunks_exact_mut(4) {
                let a = u16::from(px[3]);
                if a == 0 || a == 255 {
                    continue;
                }
                for c in &mut px[..3] {
                    *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
        out
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> ThumbResult<Vec<u8>> {
        let mut buf = Vec::new();
        image::write_buffer_with_format(
            &mut std::io::Cursor::new(&mut buf),
            &self.to_straight_rgba8(),
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| ThumbError::render(format!("encode png: {e}")))?;
        Ok(buf)
    }
}

/// Final instruction-emission step. Implementations share layout through [`ThumbnailPlan`] and
/// differ only in what they produce from it.
pub trait RenderBackend {
    type Output;

    fn render(&mut self, plan: &ThumbnailPlan) -> ThumbResult<Self::Output>;
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
