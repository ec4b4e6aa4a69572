use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    compose::background::{gradient_pixels, resample_region},
    compose::blur::blur_rgba8_premul,
    foundation::core::{Rect, Rgba8},
    foundation::error::{ThumbError, ThumbResult},
    plan::ThumbnailPlan,
    render::backend::{FrameRGBA, RenderBackend},
    render::ops::{DrawOp, emit_draw_ops},
    render::text::TextEngine,
};

/// Raster backend options.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Directories whose font files are registered before rendering.
    pub font_dirs: Vec<PathBuf>,
    /// Directory that relative font face URLs resolve against.
    pub document_dir: PathBuf,
}

/// Imperative strategy: emits [`DrawOp`]s and replays them onto a `vello_cpu` surface.
pub struct CpuBackend {
    options: RenderOptions,
    text: TextEngine,
    fonts_loaded: bool,
}

impl CpuBackend {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            text: TextEngine::new(),
            fonts_loaded: false,
        }
    }

    pub fn text_engine_mut(&mut self) -> &mut TextEngine {
        &mut self.text
    }

    fn load_fonts(&mut self, plan: &ThumbnailPlan) {
        if !self.fonts_loaded {
            for dir in &self.options.font_dirs {
                match self.text.register_font_dir(dir) {
                    Ok(n) => tracing::debug!(dir = %dir.display(), fonts = n, "registered font dir"),
                    Err(err) => tracing::warn!(dir = %dir.display(), error = %err, "font dir unavailable"),
                }
            }
            self.fonts_loaded = true;
        }
        for block in &plan.blocks {
            self.text
                .register_faces(&block.font, &self.options.document_dir);
        }
    }

    /// Draw ops for `plan`, measured with this backend's fonts.
    pub fn draw_ops(&mut self, plan: &ThumbnailPlan) -> ThumbResult<Vec<DrawOp>> {
        self.load_fonts(plan);
        emit_draw_ops(plan, &mut self.text)
    }

    fn replay(&mut self, width: u32, height: u32, ops: &[DrawOp]) -> ThumbResult<FrameRGBA> {
        let w: u16 = width
            .try_into()
            .map_err(|_| ThumbError::render("canvas width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| ThumbError::render("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        for op in ops {
            draw_op(&mut self.text, &mut ctx, op)?;
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width,
            height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

impl RenderBackend for CpuBackend {
    type Output = FrameRGBA;

    fn render(&mut self, plan: &ThumbnailPlan) -> ThumbResult<FrameRGBA> {
        let ops = self.draw_ops(plan)?;
        tracing::debug!(ops = ops.len(), "replaying draw ops");
        self.replay(plan.canvas.width, plan.canvas.height, &ops)
    }
}

fn draw_op(
    text: &mut TextEngine,
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
) -> ThumbResult<()> {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::FillRect { rect, color } => {
            ctx.set_paint(cpu_color(*color));
            ctx.fill_rect(&rect_to_cpu(*rect));
            Ok(())
        }
        DrawOp::FillGradientRect { rect, stops } => {
            let (pw, ph) = pixel_size(*rect)?;
            let mut px = gradient_pixels(stops, pw, ph);
            premultiply_rgba8_in_place(&mut px);
            fill_with_pixels(ctx, *rect, &px, pw, ph, 1.0)
        }
        DrawOp::DrawImageRegion {
            image,
            src,
            dst,
            blur,
            opacity,
        } => {
            let (pw, ph) = pixel_size(*dst)?;
            let mut px = resample_region(image, *src, pw, ph)?;
            premultiply_rgba8_in_place(&mut px);
            let px = blur_rgba8_premul(&px, pw, ph, *blur)?;
            fill_with_pixels(ctx, *dst, &px, pw, ph, *opacity)
        }
        DrawOp::StrokeText {
            text: content,
            font,
            origin,
            line_height,
            color,
            line_width,
        } => {
            let shaped = text.shape_line(font, *line_height, content)?;
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*line_width));
            ctx.set_paint(cpu_color(*color));
            for run in &shaped.runs {
                ctx.glyph_run(&run.font)
                    .font_size(run.font_size)
                    .stroke_glyphs(run.glyphs.iter().copied());
            }
            Ok(())
        }
        DrawOp::FillText {
            text: content,
            font,
            origin,
            line_height,
            color,
        } => {
            let shaped = text.shape_line(font, *line_height, content)?;
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
            ctx.set_paint(cpu_color(*color));
            for run in &shaped.runs {
                ctx.glyph_run(&run.font)
                    .font_size(run.font_size)
                    .fill_glyphs(run.glyphs.iter().copied());
            }
            Ok(())
        }
    }
}

/// Paint premultiplied `px` (`pw x ph`) over `rect`.
fn fill_with_pixels(
    ctx: &mut vello_cpu::RenderContext,
    rect: Rect,
    px: &[u8],
    pw: u32,
    ph: u32,
    opacity: f32,
) -> ThumbResult<()> {
    if opacity <= 0.0 {
        return Ok(());
    }
    let pixmap = pixmap_from_premul_bytes(px, pw, ph)?;
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((rect.x0, rect.y0)));
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(pw),
        f64::from(ph),
    ));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
    Ok(())
}

fn pixel_size(rect: Rect) -> ThumbResult<(u32, u32)> {
    let w = rect.width().round();
    let h = rect.height().round();
    if !(w >= 1.0 && h >= 1.0) {
        return Err(ThumbError::render(format!(
            "draw target must be at least 1x1 (got {w}x{h})"
        )));
    }
    Ok((w as u32, h as u32))
}

fn cpu_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

fn pixmap_from_premul_bytes(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ThumbResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ThumbError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ThumbError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ThumbError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
