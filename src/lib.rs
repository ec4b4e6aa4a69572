//! Declarative thumbnail rendering.
//!
//! A JSON document names a resolution, a background (solid, gradient or cover-fitted image) and
//! ordered text layers anchored with keywords (`top`/`middle`/`bottom`, `left`/`center`/`right`).
//! The crate resolves that into concrete geometry once and hands it to one of two backends.
//!
//! # Pipeline overview
//!
//! 1. **Parse**: JSON -> [`ThumbnailDocument`] ([`ThumbnailDocument::from_path`])
//! 2. **Resolve**: [`ThumbnailSpec`] -> [`ThumbnailPlan`] ([`resolve_plan`]): canvas size,
//!    background instructions, per-line text boxes and outlines
//! 3. **Emit**: [`ThumbnailPlan`] -> output through a [`RenderBackend`]:
//!    - [`CpuBackend`]: measured [`DrawOp`]s replayed onto a `vello_cpu` surface ([`FrameRGBA`])
//!    - [`MarkupBackend`]: positioned HTML elements ([`MarkupDocument`])
//!
//! Config and validation problems abort with [`ThumbError`]. A background image that cannot be
//! loaded is replaced by a flat gray fill and logged with `tracing`.
#![forbid(unsafe_code)]

mod compose;
mod foundation;
mod layout;
mod model;
mod plan;
mod render;

pub use compose::background::{
    BackgroundPlan, CropRect, GradientStop, compose_background, cover_crop, gradient_stops,
};
pub use compose::loader::{FsImageLoader, ImageLoader, LoadedImage, decode_image};
pub use foundation::core::{Canvas, Point, Rect, Rgba8};
pub use foundation::error::{ThumbError, ThumbResult};
pub use layout::outline::{
    ResolvedOutline, ShadowOffset, StrokePass, effective_thickness, resolve_outline,
};
pub use layout::resolution::{PRESETS, preset_dimensions, resolve_resolution};
pub use layout::text::{
    Align, DEFAULT_LINE_HEIGHT_MULTIPLIER, DEFAULT_OUTLINE_THICKNESS_PX, FontRequest,
    LayoutConfig, LineBox, MARGIN_PX, TextBlock, TextMeasure, layout_text_layer,
    normalize_newlines, split_lines,
};
pub use model::color::Color;
pub use model::document::{
    Background, FontFace, FontSpec, FontStyle, FontWeight, HorizontalAnchor, OutlineSpec,
    Position, Resolution, TextAlign, TextKind, TextLayer, ThumbnailDocument, ThumbnailSpec,
    VerticalAnchor,
};
pub use plan::{ThumbnailPlan, resolve_plan};
pub use render::backend::{FrameRGBA, RenderBackend};
pub use render::cpu::{CpuBackend, RenderOptions};
pub use render::markup::{
    CssDecl, FontFaceRule, MarkupBackend, MarkupDocument, MarkupElement, build_markup,
};
pub use render::ops::{DrawOp, emit_draw_ops};
pub use render::text::TextEngine;

/// Resolve `spec` and rasterize it with a fresh [`CpuBackend`].
pub fn render_raster(
    spec: &ThumbnailSpec,
    loader: &dyn ImageLoader,
    cfg: &LayoutConfig,
    options: RenderOptions,
) -> ThumbResult<FrameRGBA> {
    let plan = resolve_plan(spec, loader, cfg)?;
    CpuBackend::new(options).render(&plan)
}

/// Resolve `spec` and describe it as positioned markup.
pub fn render_markup(
    spec: &ThumbnailSpec,
    loader: &dyn ImageLoader,
    cfg: &LayoutConfig,
) -> ThumbResult<MarkupDocument> {
    let plan = resolve_plan(spec, loader, cfg)?;
    MarkupBackend.render(&plan)
}
