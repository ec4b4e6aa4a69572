use image::{RgbaImage, imageops};

use crate::{
    compose::loader::{ImageLoader, LoadedImage},
    foundation::core::{Canvas, Rect, Rgba8},
    foundation::error::{ThumbError, ThumbResult},
    layout::text::LayoutConfig,
    model::document::Background,
};

/// One color stop of a horizontal gradient.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct GradientStop {
    /// Fractional position in `[0, 1]`, left edge to right edge.
    pub offset: f64,
    pub color: Rgba8,
}

/// Source-space rectangle that is scaled onto the full canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Resolved background, ready for either backend.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BackgroundPlan {
    Solid {
        color: Rgba8,
    },
    Gradient {
        stops: Vec<GradientStop>,
    },
    Image {
        source: String,
        /// Where a markup host finds the file the pixels were decoded from.
        location: String,
        intrinsic_width: u32,
        intrinsic_height: u32,
        crop: CropRect,
        blur: f32,
        opacity: f32,
        #[serde(skip)]
        image: LoadedImage,
    },
    /// Flat fill standing in for an image that failed to load.
    Placeholder {
        color: Rgba8,
        source: String,
    },
}

/// Evenly spaced stops: stop `i` of `n` sits at `i / (n - 1)`.
pub fn gradient_stops(colors: &[Rgba8]) -> ThumbResult<Vec<GradientStop>> {
    if colors.len() < 2 {
        return Err(ThumbError::validation(format!(
            "gradient needs at least 2 colors (got {})",
            colors.len()
        )));
    }
    let last = (colors.len() - 1) as f64;
    Ok(colors
        .iter()
        .enumerate()
        .map(|(i, &color)| GradientStop {
            offset: i as f64 / last,
            color,
        })
        .collect())
}

/// Center crop of an `iw x ih` source matching the canvas aspect ratio.
///
/// Sources wider than the canvas lose equal strips left and right; taller sources lose them top
/// and bottom. The crop always stays inside the source.
pub fn cover_crop(iw: u32, ih: u32, canvas: Canvas) -> CropRect {
    let (iw, ih) = (f64::from(iw), f64::from(ih));
    let cr = canvas.aspect();
    if iw / ih > cr {
        let sw = (ih * cr).min(iw);
        CropRect {
            x: (iw - sw) / 2.0,
            y: 0.0,
            width: sw,
            height: ih,
        }
    } else {
        let sh = (iw / cr).min(ih);
        CropRect {
            x: 0.0,
            y: (ih - sh) / 2.0,
            width: iw,
            height: sh,
        }
    }
}

/// Resolve the document background against `canvas`.
///
/// Image load failures never abort: they are logged and replaced with
/// [`BackgroundPlan::Placeholder`].
pub fn compose_background(
    background: &Background,
    canvas: Canvas,
    loader: &dyn ImageLoader,
    cfg: &LayoutConfig,
) -> ThumbResult<BackgroundPlan> {
    match background {
        Background::Solid { color } => Ok(BackgroundPlan::Solid {
            color: color.rgba8(),
        }),
        Background::Gradient { colors } => {
            let colors: Vec<Rgba8> = colors.iter().map(|c| c.rgba8()).collect();
            Ok(BackgroundPlan::Gradient {
                stops: gradient_stops(&colors)?,
            })
        }
        Background::Image {
            image_path,
            image_blur,
            image_opacity,
        } => match loader.load_image(image_path) {
            Ok(image) => {
                let crop = cover_crop(image.width, image.height, canvas);
                tracing::debug!(
                    source = %image_path,
                    width = image.width,
                    height = image.height,
                    ?crop,
                    "background image loaded"
                );
                Ok(BackgroundPlan::Image {
                    source: image_path.clone(),
                    location: loader.locate(image_path),
                    intrinsic_width: image.width,
                    intrinsic_height: image.height,
                    crop,
                    blur: *image_blur,
                    opacity: *image_opacity,
                    image,
                })
            }
            Err(err) if !err.is_fatal() => {
                tracing::warn!(source = %image_path, error = %err, "background image unavailable, using placeholder");
                Ok(BackgroundPlan::Placeholder {
                    color: cfg.placeholder,
                    source: image_path.clone(),
                })
            }
            Err(err) => Err(err),
        },
    }
}

/// Straight RGBA8 pixels of a horizontal gradient spanning `width x height`.
pub fn gradient_pixels(stops: &[GradientStop], width: u32, height: u32) -> Vec<u8> {
    let mut row = Vec::with_capacity(width as usize * 4);
    for x in 0..width {
        // Pixel centers, as CSS linear gradients sample.
        let t = (f64::from(x) + 0.5) / f64::from(width);
        row.extend_from_slice(&sample_stops(stops, t));
    }
    row.repeat(height as usize)
}

fn sample_stops(stops: &[GradientStop], t: f64) -> [u8; 4] {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return [0, 0, 0, 0];
    };
    if t <= first.offset {
        return rgba_array(first.color);
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let u = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            let mix = |ca: u8, cb: u8| {
                (f64::from(ca) + (f64::from(cb) - f64::from(ca)) * u)
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
            return [
                mix(a.color.r, b.color.r),
                mix(a.color.g, b.color.g),
                mix(a.color.b, b.color.b),
                mix(a.color.a, b.color.a),
            ];
        }
    }
    rgba_array(last.color)
}

fn rgba_array(c: Rgba8) -> [u8; 4] {
    [c.r, c.g, c.b, c.a]
}

/// Scale the `crop` region of `image` to exactly `width x height`, straight RGBA8.
pub fn resample_region(
    image: &LoadedImage,
    crop: CropRect,
    width: u32,
    height: u32,
) -> ThumbResult<Vec<u8>> {
    let src = RgbaImage::from_raw(image.width, image.height, image.rgba8.as_ref().clone())
        .ok_or_else(|| ThumbError::render("background image buffer does not match its size"))?;

    let x = (crop.x.floor().max(0.0) as u32).min(image.width.saturating_sub(1));
    let y = (crop.y.floor().max(0.0) as u32).min(image.height.saturating_sub(1));
    let w = (crop.width.round() as u32).clamp(1, image.width - x);
    let h = (crop.height.round() as u32).clamp(1, image.height - y);

    let region = imageops::crop_imm(&src, x, y, w, h).to_image();
    let scaled = imageops::resize(&region, width, height, imageops::FilterType::Triangle);
    Ok(scaled.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/background.rs"]
mod tests;
