use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    foundation::error::{ThumbError, ThumbResult},
    layout::text::normalize_newlines,
    model::color::Color,
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// JSON-facing wrapper: the thumbnail description lives under a top-level `Thumbnail` key.
pub struct ThumbnailDocument {
    /// The thumbnail description.
    #[serde(rename = "Thumbnail")]
    pub thumbnail: ThumbnailSpec,
}

impl ThumbnailDocument {
    /// Parse a document from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ThumbResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ThumbError::config(format!("parse thumbnail document JSON: {e}")))
    }

    /// Parse a document from a JSON string.
    pub fn from_json_str(s: &str) -> ThumbResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| ThumbError::config(format!("parse thumbnail document JSON: {e}")))
    }

    /// Parse a document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ThumbResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ThumbError::config(format!(
                "open thumbnail document '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A complete thumbnail description: canvas size, background and ordered text layers.
pub struct ThumbnailSpec {
    /// Target resolution.
    #[serde(rename = "Resolution")]
    pub resolution: Resolution,
    /// Background treatment.
    #[serde(rename = "Background")]
    pub background: Background,
    /// Text layers; later layers draw over earlier ones.
    #[serde(rename = "Texts", default)]
    pub texts: Vec<TextLayer>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
/// Canvas resolution, either a named preset or explicit dimensions.
pub enum Resolution {
    /// Named preset (`16:9`, `9:16`, `4:3`, `1:1`).
    Preset {
        /// Preset name.
        value: String,
    },
    /// Explicit pixel dimensions.
    Custom {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// Aspect ratio plus one explicit dimension.
    #[serde(rename_all = "camelCase")]
    FixedRatio {
        /// Ratio as `W:H`.
        ratio_value: String,
        /// Width in pixels; takes precedence over `height`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        /// Height in pixels.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
/// Background treatment.
pub enum Background {
    /// Flat color fill.
    Solid {
        /// Fill color.
        color: Color,
    },
    /// Horizontal multi-stop gradient.
    Gradient {
        /// Evenly spaced stop colors, left to right (at least two).
        colors: Vec<Color>,
    },
    /// Cover-fitted image.
    #[serde(rename_all = "camelCase")]
    Image {
        /// File path (relative to the document) or `data:` URL.
        image_path: String,
        /// Gaussian blur sigma in pixels.
        #[serde(default)]
        image_blur: f32,
        /// Opacity multiplier in `[0, 1]`.
        #[serde(default = "default_opacity")]
        image_opacity: f32,
    },
}

fn default_opacity() -> f32 {
    1.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Role of a text layer; decides the default font weight.
pub enum TextKind {
    /// Headline text (bold by default).
    Title,
    /// Secondary text (normal weight by default).
    Subtitle,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One text layer.
pub struct TextLayer {
    /// Disabled layers are skipped entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Layer role.
    #[serde(rename = "type")]
    pub kind: TextKind,
    /// Text content; may contain `\n`, `\r\n`, `\r` or a literal backslash-n.
    pub content: String,
    /// Font family and face registrations.
    pub font: FontSpec,
    /// Font size in pixels.
    pub font_size: f64,
    /// Fill color.
    pub color: Color,
    /// Optional outline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<OutlineSpec>,
    /// Anchor keywords.
    #[serde(default)]
    pub position: Position,
    /// Weight override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    /// Style override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    /// Alignment override about the horizontal anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// Line-height multiplier override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
}

fn default_enabled() -> bool {
    true
}

impl TextLayer {
    /// Explicit weight, or bold for titles and normal for subtitles.
    pub fn effective_weight(&self) -> FontWeight {
        self.font_weight.unwrap_or(match self.kind {
            TextKind::Title => FontWeight::BOLD,
            TextKind::Subtitle => FontWeight::NORMAL,
        })
    }

    pub fn effective_style(&self) -> FontStyle {
        self.font_style.unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Font family plus optional face registrations for the markup strategy.
pub struct FontSpec {
    /// Family name.
    pub name: String,
    /// Face registrations (`@font-face` entries).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faces: Vec<FontFace>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A single font face registration.
pub struct FontFace {
    /// Family name the face registers under; falls back to the owning [`FontSpec::name`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Source URL or local path.
    pub url: String,
    /// Face weight.
    #[serde(default)]
    pub weight: FontWeight,
    /// Face style.
    #[serde(default)]
    pub style: FontStyle,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Outline request. `thickness` stays loosely typed: missing or non-numeric values fall back to
/// the default thickness during layout.
pub struct OutlineSpec {
    /// Outline color.
    pub color: Color,
    /// Requested thickness in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<serde_json::Value>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Anchor keywords for a text block.
pub struct Position {
    /// Vertical anchor.
    #[serde(default)]
    pub vertical: VerticalAnchor,
    /// Horizontal anchor.
    #[serde(default)]
    pub horizontal: HorizontalAnchor,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAnchor {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
            Self::Oblique => "oblique",
        }
    }
}

/// Numeric CSS font weight (1..=1000). Deserializes from a number, a numeric string, or the
/// keywords `normal` / `bold`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: Self = Self(400);
    pub const BOLD: Self = Self(700);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl<'de> serde::Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Str(String),
        }

        let w = match Repr::deserialize(deserializer)? {
            Repr::Num(n) => n,
            Repr::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "normal" | "regular" => 400.0,
                "bold" => 700.0,
                other => other.parse::<f64>().map_err(|_| {
                    serde::de::Error::custom(format!("unrecognized font weight \"{s}\""))
                })?,
            },
        };
        if !w.is_finite() || !(1.0..=1000.0).contains(&w) {
            return Err(serde::de::Error::custom(format!(
                "font weight {w} out of range 1..=1000"
            )));
        }
        Ok(Self(w.round() as u16))
    }
}

impl ThumbnailSpec {
    /// Check structural invariants that serde cannot express.
    pub fn validate(&self) -> ThumbResult<()> {
        match &self.resolution {
            Resolution::Custom { width, height } if *width == 0 || *height == 0 => {
                return Err(ThumbError::validation(format!(
                    "custom resolution must be > 0 (got {width}x{height})"
                )));
            }
            _ => {}
        }

        match &self.background {
            Background::Gradient { colors } if colors.len() < 2 => {
                return Err(ThumbError::validation(format!(
                    "gradient background needs at least 2 colors (got {})",
                    colors.len()
                )));
            }
            Background::Image {
                image_path,
                image_blur,
                image_opacity,
            } => {
                if image_path.trim().is_empty() {
                    return Err(ThumbError::config("image background requires imagePath"));
                }
                if !image_blur.is_finite() || *image_blur < 0.0 {
                    return Err(ThumbError::validation("imageBlur must be finite and >= 0"));
                }
                if !image_opacity.is_finite() || !(0.0..=1.0).contains(image_opacity) {
                    return Err(ThumbError::validation("imageOpacity must be within [0, 1]"));
                }
            }
            _ => {}
        }

        for (idx, layer) in self.texts.iter().enumerate() {
            if !layer.font_size.is_finite() || layer.font_size <= 0.0 {
                return Err(ThumbError::validation(format!(
                    "text layer {idx}: fontSize must be finite and > 0"
                )));
            }
            if let Some(lh) = layer.line_height
                && (!lh.is_finite() || lh <= 0.0)
            {
                return Err(ThumbError::validation(format!(
                    "text layer {idx}: lineHeight must be finite and > 0"
                )));
            }
            if layer.font.name.trim().is_empty() {
                return Err(ThumbError::config(format!(
                    "text layer {idx}: font.name must be non-empty"
                )));
            }
        }

        Ok(())
    }

    /// Layers that take part in rendering, in draw order.
    pub fn enabled_layers(&self) -> impl Iterator<Item = &TextLayer> {
        self.texts.iter().filter(|t| t.enabled)
    }

    /// Replace the content of every layer of `kind`. Newline conventions are normalized to `\n`.
    /// Returns how many layers were touched.
    pub fn override_content(&mut self, kind: TextKind, content: &str) -> usize {
        let content = normalize_newlines(content);
        let mut n = 0;
        for layer in self.texts.iter_mut().filter(|t| t.kind == kind) {
            layer.content = content.clone();
            n += 1;
        }
        n
    }

    /// Switch the background to a cover-fitted image, keeping blur/opacity if it already was one.
    pub fn override_background_image(&mut self, image_path: impl Into<String>) {
        let image_path = image_path.into();
        self.background = match &self.background {
            Background::Image {
                image_blur,
                image_opacity,
                ..
            } => Background::Image {
                image_path,
                image_blur: *image_blur,
                image_opacity: *image_opacity,
            },
            _ => Background::Image {
                image_path,
                image_blur: 0.0,
                image_opacity: default_opacity(),
            },
        };
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/document.rs"]
mod tests;
