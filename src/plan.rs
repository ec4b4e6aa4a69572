//! Backend-neutral resolved geometry for one thumbnail.

use crate::{
    compose::background::{BackgroundPlan, compose_background},
    compose::loader::ImageLoader,
    foundation::core::Canvas,
    foundation::error::ThumbResult,
    layout::resolution::resolve_resolution,
    layout::text::{LayoutConfig, TextBlock, layout_text_layer},
    model::document::ThumbnailSpec,
};

/// Output of layout: canvas size, background and text blocks in draw order.
///
/// Both backends consume the same plan; only instruction emission differs.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ThumbnailPlan {
    pub canvas: Canvas,
    pub background: BackgroundPlan,
    pub blocks: Vec<TextBlock>,
}

/// Validate `spec` and resolve it into a [`ThumbnailPlan`].
///
/// Config and validation errors abort. An unloadable background image does not.
#[tracing::instrument(level = "debug", skip_all, fields(layers = spec.texts.len()))]
pub fn resolve_plan(
    spec: &ThumbnailSpec,
    loader: &dyn ImageLoader,
    cfg: &LayoutConfig,
) -> ThumbResult<ThumbnailPlan> {
    spec.validate()?;
    let canvas = resolve_resolution(&spec.resolution)?;
    let background = compose_background(&spec.background, canvas, loader, cfg)?;
    let blocks: Vec<TextBlock> = spec
        .enabled_layers()
        .map(|layer| layout_text_layer(layer, canvas, cfg))
        .collect();

    tracing::debug!(
        width = canvas.width,
        height = canvas.height,
        blocks = blocks.len(),
        "resolved thumbnail plan"
    );
    Ok(ThumbnailPlan {
        canvas,
        background,
        blocks,
    })
}

#[cfg(test)]
#[path = "../tests/unit/plan.rs"]
mod tests;
