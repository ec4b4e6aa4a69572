//! Declarative strategy: absolutely positioned elements styled with CSS.
//!
//! Lines are anchored at fixed coordinates and the host's text alignment does the centering, so
//! no width measurement happens here. Outlines become stacked `text-shadow` rings.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{
    compose::background::BackgroundPlan,
    foundation::core::{Canvas, Rgba8},
    foundation::error::{ThumbError, ThumbResult},
    layout::text::{Align, FontRequest, TextBlock},
    model::document::FontSpec,
    plan::ThumbnailPlan,
    render::backend::RenderBackend,
};

/// One CSS declaration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CssDecl {
    pub property: String,
    pub value: String,
}

fn decl(property: &str, value: impl Into<String>) -> CssDecl {
    CssDecl {
        property: property.to_string(),
        value: value.into(),
    }
}

/// Render declarations as an inline `style` attribute value.
pub fn inline_style(decls: &[CssDecl]) -> String {
    decls
        .iter()
        .map(|d| format!("{}: {};", d.property, d.value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// An `@font-face` registration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FontFaceRule {
    pub family: String,
    pub src: String,
    pub weight: u16,
    pub style: &'static str,
}

impl FontFaceRule {
    pub fn to_css(&self) -> String {
        format!(
            "@font-face {{ font-family: {}; src: url({}); font-weight: {}; font-style: {}; font-display: block; }}",
            css_string(&self.family),
            css_string(&self.src),
            self.weight,
            self.style,
        )
    }
}

/// A positioned element: the background layer or one text line.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct MarkupElement {
    pub class: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub style: Vec<CssDecl>,
}

/// Declarative rendition of a [`ThumbnailPlan`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupDocument {
    pub width: u32,
    pub height: u32,
    pub font_faces: Vec<FontFaceRule>,
    pub container_style: Vec<CssDecl>,
    /// Background layer first, then lines in draw order.
    pub elements: Vec<MarkupElement>,
}

impl MarkupDocument {
    /// Self-contained HTML page whose `#thumb` element is the thumbnail.
    pub fn to_html(&self) -> String {
        let mut css = String::from(
            "html, body { margin: 0; padding: 0; background: transparent; }\n\
             #thumb { position: relative; overflow: hidden; }\n\
             #thumb > .line { position: absolute; white-space: pre; margin: 0; }\n",
        );
        for face in &self.font_faces {
            css.push_str(&face.to_css());
            css.push('\n');
        }
        page(&css, self).into_string()
    }

    pub fn to_json(&self) -> ThumbResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ThumbError::render(format!("serialize markup document: {e}")))
    }
}

fn page(css: &str, doc: &MarkupDocument) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                style { (PreEscaped(css)) }
            }
            body {
                div #thumb style=(inline_style(&doc.container_style)) {
                    @for el in &doc.elements {
                        div class=(el.class) style=(inline_style(&el.style)) {
                            @if let Some(text) = &el.text {
                                (text)
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Markup backend. Stateless; font faces are emitted as `@font-face` rules for the host to load.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkupBackend;

impl RenderBackend for MarkupBackend {
    type Output = MarkupDocument;

    fn render(&mut self, plan: &ThumbnailPlan) -> ThumbResult<MarkupDocument> {
        Ok(build_markup(plan))
    }
}

/// Build the markup description for `plan`.
pub fn build_markup(plan: &ThumbnailPlan) -> MarkupDocument {
    let canvas = plan.canvas;
    let mut container_style = vec![
        decl("width", px(f64::from(canvas.width))),
        decl("height", px(f64::from(canvas.height))),
    ];
    let mut elements = Vec::new();

    match &plan.background {
        BackgroundPlan::Solid { color } | BackgroundPlan::Placeholder { color, .. } => {
            container_style.push(decl("background-color", color.to_css()));
        }
        BackgroundPlan::Gradient { stops } => {
            let stops: Vec<String> = stops
                .iter()
                .map(|s| format!("{} {}%", s.color.to_css(), fmt_num(s.offset * 100.0)))
                .collect();
            container_style.push(decl(
                "background-image",
                format!("linear-gradient(to right, {})", stops.join(", ")),
            ));
        }
        BackgroundPlan::Image {
            location,
            intrinsic_width,
            intrinsic_height,
            crop,
            blur,
            opacity,
            ..
        } => {
            // Scale so the crop rectangle spans the canvas, then shift it to the origin.
            let scale = f64::from(canvas.width) / crop.width;
            let mut style = vec![
                decl("position", "absolute"),
                decl("inset", "0"),
                decl("background-image", format!("url({})", css_string(location))),
                decl("background-repeat", "no-repeat"),
                decl(
                    "background-size",
                    format!(
                        "{} {}",
                        px(f64::from(*intrinsic_width) * scale),
                        px(f64::from(*intrinsic_height) * scale)
                    ),
                ),
                decl(
                    "background-position",
                    format!("{} {}", px(-crop.x * scale), px(-crop.y * scale)),
                ),
            ];
            if *blur > 0.0 {
                style.push(decl("filter", format!("blur({})", px(f64::from(*blur)))));
            }
            if *opacity < 1.0 {
                style.push(decl("opacity", fmt_num(f64::from(*opacity))));
            }
            elements.push(MarkupElement {
                class: "bg",
                text: None,
                style,
            });
        }
    }

    let mut font_faces = Vec::new();
    for block in &plan.blocks {
        push_font_faces(&mut font_faces, &block.font);
        for line in &block.lines {
            let mut style = line_position(canvas, line.anchor_x, line.align);
            style.push(decl("top", px(line.y)));
            style.extend(text_style(block));
            elements.push(MarkupElement {
                class: "line",
                text: Some(line.text.clone()),
                style,
            });
        }
    }

    MarkupDocument {
        width: canvas.width,
        height: canvas.height,
        font_faces,
        container_style,
        elements,
    }
}

/// Anchor a line box at `anchor_x` and let `text-align` place the text about it.
fn line_position(canvas: Canvas, anchor_x: f64, align: Align) -> Vec<CssDecl> {
    let mut out = match align {
        Align::Start => vec![decl("left", px(anchor_x))],
        Align::Center => vec![
            decl("left", px(anchor_x)),
            decl("transform", "translateX(-50%)"),
        ],
        Align::End => vec![decl("right", px(f64::from(canvas.width) - anchor_x))],
    };
    out.push(decl("text-align", align.as_css()));
    out
}

fn text_style(block: &TextBlock) -> Vec<CssDecl> {
    let FontRequest {
        family,
        size,
        weight,
        style,
    } = block.font_request();
    let mut out = vec![
        decl("font-family", font_family(&block.font, &family)),
        decl("font-size", px(size)),
        decl("font-weight", weight.0.to_string()),
        decl("font-style", style.as_css()),
        decl("line-height", px(block.line_height)),
        decl("height", px(block.line_height)),
        decl("color", block.color.to_css()),
    ];
    if let Some(outline) = block.outline {
        out.push(decl(
            "text-shadow",
            text_shadow(&outline.shadow_offsets(), outline.color),
        ));
    }
    out
}

/// Family stack for a line: the layer family, face aliases registered by `@font-face`, then
/// `sans-serif`.
fn font_family(font: &FontSpec, family: &str) -> String {
    let mut names = vec![family];
    for name in font.faces.iter().filter_map(|f| f.name.as_deref()) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    let mut stack: Vec<String> = names.into_iter().map(css_string).collect();
    stack.push("sans-serif".to_string());
    stack.join(", ")
}

/// `text-shadow` value stacking one hard-edged copy per offset.
pub fn text_shadow(offsets: &[crate::layout::outline::ShadowOffset], color: Rgba8) -> String {
    let color = color.to_css();
    offsets
        .iter()
        .map(|o| format!("{}px {}px 0 {color}", o.dx, o.dy))
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_font_faces(out: &mut Vec<FontFaceRule>, font: &FontSpec) {
    for face in &font.faces {
        let rule = FontFaceRule {
            family: face.name.clone().unwrap_or_else(|| font.name.clone()),
            src: face.url.clone(),
            weight: face.weight.0,
            style: face.style.as_css(),
        };
        if !out.contains(&rule) {
            out.push(rule);
        }
    }
}

/// Double-quoted CSS string. Characters that could close the string or the style element are
/// escaped.
fn css_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            '<' => out.push_str("\\3c "),
            '\n' | '\r' => {}
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn px(v: f64) -> String {
    format!("{}px", fmt_num(v))
}

/// Shortest decimal form with at most three fractional digits.
fn fmt_num(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let s = format!("{rounded:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/render/markup.rs"]
mod tests;
