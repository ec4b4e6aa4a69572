use crate::{
    foundation::core::{Canvas, Rgba8},
    foundation::error::ThumbResult,
    layout::outline::{ResolvedOutline, resolve_outline},
    model::document::{
        FontSpec, FontStyle, FontWeight, HorizontalAnchor, TextAlign, TextKind, TextLayer,
        VerticalAnchor,
    },
};

/// Inset between canvas edges and text blocks.
pub const MARGIN_PX: f64 = 20.0;
/// Line-height multiplier applied to the font size unless a layer overrides it.
pub const DEFAULT_LINE_HEIGHT_MULTIPLIER: f64 = 1.1;
/// Outline thickness used when an outline is requested without a usable thickness.
pub const DEFAULT_OUTLINE_THICKNESS_PX: f64 = 4.0;

/// Layout constants shared by every layer of a render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Canvas-edge inset in pixels.
    pub margin_px: f64,
    /// Default line-height multiplier.
    pub line_height_multiplier: f64,
    /// Default outline thickness in pixels.
    pub default_outline_thickness_px: f64,
    /// Fill used when a background image cannot be loaded.
    pub placeholder: Rgba8,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_px: MARGIN_PX,
            line_height_multiplier: DEFAULT_LINE_HEIGHT_MULTIPLIER,
            default_outline_thickness_px: DEFAULT_OUTLINE_THICKNESS_PX,
            placeholder: Rgba8::PLACEHOLDER_GRAY,
        }
    }
}

impl LayoutConfig {
    /// Return a copy with a different margin.
    pub fn with_margin(mut self, margin_px: f64) -> Self {
        self.margin_px = margin_px;
        self
    }
}

/// Split `content` into lines on `\n`, `\r\n`, `\r` and the two-character sequence `\` `n`.
///
/// Empty lines are kept, including a trailing one: `"a\n"` yields `["a", ""]`.
pub fn split_lines(content: &str) -> Vec<&str> {
    let bytes = content.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let sep = match bytes[i] {
            b'\n' => 1,
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
            b'\r' => 1,
            b'\\' if bytes.get(i + 1) == Some(&b'n') => 2,
            _ => 0,
        };
        if sep == 0 {
            i += 1;
            continue;
        }
        out.push(&content[start..i]);
        i += sep;
        start = i;
    }
    out.push(&content[start..]);
    out
}

/// Rewrite every newline convention understood by [`split_lines`] as `\n`.
pub fn normalize_newlines(content: &str) -> String {
    split_lines(content).join("\n")
}

/// Alignment of a line about its horizontal anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Align {
    /// Line starts at the anchor.
    Start,
    /// Line is centered on the anchor.
    Center,
    /// Line ends at the anchor.
    End,
}

impl Align {
    /// Share of the line width that sits left of the anchor.
    pub fn fraction(self) -> f64 {
        match self {
            Self::Start => 0.0,
            Self::Center => 0.5,
            Self::End => 1.0,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            Self::Start => "left",
            Self::Center => "center",
            Self::End => "right",
        }
    }
}

impl From<HorizontalAnchor> for Align {
    fn from(value: HorizontalAnchor) -> Self {
        match value {
            HorizontalAnchor::Left => Self::Start,
            HorizontalAnchor::Center => Self::Center,
            HorizontalAnchor::Right => Self::End,
        }
    }
}

impl From<TextAlign> for Align {
    fn from(value: TextAlign) -> Self {
        match value {
            TextAlign::Left => Self::Start,
            TextAlign::Center => Self::Center,
            TextAlign::Right => Self::End,
        }
    }
}

/// One laid-out line.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LineBox {
    /// Line text without its separator.
    pub text: String,
    /// Top edge of the line box.
    pub y: f64,
    /// Horizontal anchor in canvas pixels.
    pub anchor_x: f64,
    /// Alignment about `anchor_x`.
    pub align: Align,
}

impl LineBox {
    /// Left edge of the line once its rendered width is known.
    ///
    /// With the default alignments this is `margin`, `(W - w) / 2` and `W - w - margin`.
    /// The result is not clamped: over-wide lines overflow the canvas.
    pub fn origin_x(&self, text_width: f64) -> f64 {
        self.anchor_x - text_width * self.align.fraction()
    }
}

/// A fully resolved text layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextBlock {
    pub kind: TextKind,
    pub font: FontSpec,
    pub font_size: f64,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub color: Rgba8,
    /// Distance between consecutive line tops.
    pub line_height: f64,
    /// `lines.len() * line_height`.
    pub block_height: f64,
    /// Top edge of the first line.
    pub origin_y: f64,
    /// Horizontal keyword the block was anchored with.
    pub anchor: HorizontalAnchor,
    pub lines: Vec<LineBox>,
    pub outline: Option<ResolvedOutline>,
}

/// Everything a shaper needs to set one line of a block.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FontRequest {
    pub family: String,
    pub size: f64,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl TextBlock {
    pub fn font_request(&self) -> FontRequest {
        FontRequest {
            family: self.font.name.clone(),
            size: self.font_size,
            weight: self.weight,
            style: self.style,
        }
    }
}

/// Measures rendered line widths for strategies that position text explicitly.
pub trait TextMeasure {
    /// Advance width of `text` set with `font`.
    fn line_width(&mut self, font: &FontRequest, text: &str) -> ThumbResult<f64>;
}

/// Top edge of a block of height `block_height`.
pub fn vertical_origin(
    anchor: VerticalAnchor,
    canvas_height: f64,
    block_height: f64,
    margin: f64,
) -> f64 {
    match anchor {
        VerticalAnchor::Top => margin,
        VerticalAnchor::Middle => (canvas_height - block_height) / 2.0,
        VerticalAnchor::Bottom => canvas_height - block_height - margin,
    }
}

/// Horizontal anchor coordinate for a keyword.
pub fn horizontal_anchor(anchor: HorizontalAnchor, canvas_width: f64, margin: f64) -> f64 {
    match anchor {
        HorizontalAnchor::Left => margin,
        HorizontalAnchor::Center => canvas_width / 2.0,
        HorizontalAnchor::Right => canvas_width - margin,
    }
}

/// Lay out one text layer against `canvas`.
pub fn layout_text_layer(layer: &TextLayer, canvas: Canvas, cfg: &LayoutConfig) -> TextBlock {
    let lines = split_lines(&layer.content);
    let multiplier = layer.line_height.unwrap_or(cfg.line_height_multiplier);
    let line_height = layer.font_size * multiplier;
    let block_height = lines.len() as f64 * line_height;

    let canvas_w = f64::from(canvas.width);
    let canvas_h = f64::from(canvas.height);
    let origin_y = vertical_origin(
        layer.position.vertical,
        canvas_h,
        block_height,
        cfg.margin_px,
    );
    let anchor_x = horizontal_anchor(layer.position.horizontal, canvas_w, cfg.margin_px);
    let align = layer
        .text_align
        .map(Align::from)
        .unwrap_or_else(|| layer.position.horizontal.into());

    let mut y = origin_y;
    let mut boxes = Vec::with_capacity(lines.len());
    for line in lines {
        boxes.push(LineBox {
            text: line.to_string(),
            y,
            anchor_x,
            align,
        });
        y += line_height;
    }

    TextBlock {
        kind: layer.kind,
        font: layer.font.clone(),
        font_size: layer.font_size,
        weight: layer.effective_weight(),
        style: layer.effective_style(),
        color: layer.color.rgba8(),
        line_height,
        block_height,
        origin_y,
        anchor: layer.position.horizontal,
        lines: boxes,
        outline: layer
            .outline
            .as_ref()
            .and_then(|o| resolve_outline(o, cfg.default_outline_thickness_px)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
