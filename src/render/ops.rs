//! Imperative draw-op emission.

use crate::{
    compose::background::{BackgroundPlan, CropRect, GradientStop},
    compose::loader::LoadedImage,
    foundation::core::{Point, Rect, Rgba8},
    foundation::error::ThumbResult,
    layout::text::{FontRequest, TextMeasure},
    plan::ThumbnailPlan,
};

/// One instruction for a raster surface, in paint order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        color: Rgba8,
    },
    /// Horizontal gradient from `rect.x0` to `rect.x1`.
    FillGradientRect {
        rect: Rect,
        stops: Vec<GradientStop>,
    },
    /// Scale `src` of `image` onto `dst`.
    DrawImageRegion {
        #[serde(skip)]
        image: LoadedImage,
        src: CropRect,
        dst: Rect,
        blur: f32,
        opacity: f32,
    },
    /// Stroke one line of glyph outlines. `origin` is the top-left of the line box.
    StrokeText {
        text: String,
        font: FontRequest,
        origin: Point,
        line_height: f64,
        color: Rgba8,
        line_width: f64,
    },
    FillText {
        text: String,
        font: FontRequest,
        origin: Point,
        line_height: f64,
        color: Rgba8,
    },
}

/// Turn a plan into draw ops, measuring each line with `measure` to place it horizontally.
pub fn emit_draw_ops(
    plan: &ThumbnailPlan,
    measure: &mut dyn TextMeasure,
) -> ThumbResult<Vec<DrawOp>> {
    let full = plan.canvas.rect();
    let mut ops = Vec::new();

    match &plan.background {
        BackgroundPlan::Solid { color } | BackgroundPlan::Placeholder { color, .. } => {
            ops.push(DrawOp::FillRect {
                rect: full,
                color: *color,
            });
        }
        BackgroundPlan::Gradient { stops } => ops.push(DrawOp::FillGradientRect {
            rect: full,
            stops: stops.clone(),
        }),
        BackgroundPlan::Image {
            image,
            crop,
            blur,
            opacity,
            ..
        } => ops.push(DrawOp::DrawImageRegion {
            image: image.clone(),
            src: *crop,
            dst: full,
            blur: *blur,
            opacity: *opacity,
        }),
    }

    for block in &plan.blocks {
        let font = block.font_request();
        for line in &block.lines {
            let width = measure.line_width(&font, &line.text)?;
            let origin = Point::new(line.origin_x(width), line.y);

            if let Some(stroke) = block.outline.and_then(|o| o.stroke_pass()) {
                ops.push(DrawOp::StrokeText {
                    text: line.text.clone(),
                    font: font.clone(),
                    origin,
                    line_height: block.line_height,
                    color: stroke.color,
                    line_width: stroke.line_width,
                });
            }
            ops.push(DrawOp::FillText {
                text: line.text.clone(),
                font: font.clone(),
                origin,
                line_height: block.line_height,
                color: block.color,
            });
        }
    }

    Ok(ops)
}

#[cfg(test)]
#[path = "../../tests/unit/render/ops.rs"]
mod tests;
