//! Raster text engine: parley shaping plus a font collection seeded from system fonts, font
//! directories and document font faces.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::{
    compose::loader::{decode_data_url, is_data_url},
    foundation::error::{ThumbError, ThumbResult},
    layout::text::{FontRequest, TextMeasure},
    model::document::{FontSpec, FontStyle},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush carried through parley layouts. Paint color is set at draw time, so this stays
/// at its default.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Glyphs of one font within a shaped line.
#[derive(Clone)]
pub struct ShapedRun {
    pub font: vello_cpu::peniko::FontData,
    pub font_size: f32,
    /// Positions relative to the top-left of the line box.
    pub glyphs: Vec<vello_cpu::Glyph>,
}

/// A single shaped line.
#[derive(Clone)]
pub struct ShapedLine {
    pub width: f64,
    pub runs: Vec<ShapedRun>,
}

/// Stateful parley wrapper shared by measurement and drawing.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered_files: HashSet<PathBuf>,
    /// Requested family name -> families actually registered for it.
    aliases: BTreeMap<String, Vec<String>>,
    font_cache: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered_files: HashSet::new(),
            aliases: BTreeMap::new(),
            font_cache: HashMap::new(),
        }
    }

    /// Register raw font bytes, returning the family names they contain.
    pub fn register_font_bytes(&mut self, font_bytes: Vec<u8>) -> ThumbResult<Vec<String>> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes), None);
        let mut names = Vec::with_capacity(families.len());
        for (id, _) in &families {
            if let Some(name) = self.font_ctx.collection.family_name(*id) {
                names.push(name.to_string());
            }
        }
        if names.is_empty() {
            return Err(ThumbError::resource("no font families found in font data"));
        }
        Ok(names)
    }

    /// Register a font file once; repeated paths are ignored.
    pub fn register_font_file(&mut self, path: &Path) -> ThumbResult<Vec<String>> {
        if self.registered_files.contains(path) {
            return Ok(Vec::new());
        }
        let bytes = std::fs::read(path)
            .map_err(|e| ThumbError::resource(format!("read font '{}': {e}", path.display())))?;
        let names = self.register_font_bytes(bytes)?;
        self.registered_files.insert(path.to_path_buf());
        Ok(names)
    }

    /// Register every `.ttf`, `.otf`, `.ttc` and `.otc` file directly inside `dir`.
    pub fn register_font_dir(&mut self, dir: &Path) -> ThumbResult<usize> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ThumbError::resource(format!("read font dir '{}': {e}", dir.display()))
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| is_font_file(p))
            .collect();
        paths.sort();

        let mut n = 0;
        for path in paths {
            match self.register_font_file(&path) {
                Ok(_) => n += 1,
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "skipping font"),
            }
        }
        Ok(n)
    }

    /// Register the faces a document declares for `font`.
    ///
    /// Local paths (relative to `base_dir`), `file://` URLs and `data:` URLs are loaded. Remote
    /// URLs are left to markup hosts. Failures are logged and skipped.
    pub fn register_faces(&mut self, font: &FontSpec, base_dir: &Path) {
        for face in &font.faces {
            let loaded = if is_data_url(&face.url) {
                decode_data_url(&face.url).and_then(|bytes| self.register_font_bytes(bytes))
            } else if let Some(path) = local_face_path(&face.url, base_dir) {
                self.register_font_file(&path)
            } else {
                tracing::debug!(url = %face.url, "remote font face not loaded by raster backend");
                continue;
            };
            match loaded {
                Ok(families) => {
                    let known = self.aliases.entry(font.name.clone()).or_default();
                    for family in families {
                        if family != font.name && !known.contains(&family) {
                            known.push(family);
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(family = %font.name, url = %face.url, error = %err, "skipping font face");
                }
            }
        }
    }

    /// CSS-style family list tried for `family`: the name itself, any families registered for
    /// it from face files, then the generic sans-serif fallback.
    pub fn font_stack(&self, family: &str) -> String {
        let mut stack = vec![quote_family(family)];
        if let Some(extra) = self.aliases.get(family) {
            stack.extend(extra.iter().map(|f| quote_family(f)));
        }
        stack.push("sans-serif".to_string());
        stack.join(", ")
    }

    fn build_layout(
        &mut self,
        font: &FontRequest,
        text: &str,
    ) -> ThumbResult<parley::Layout<TextBrushRgba8>> {
        if !font.size.is_finite() || font.size <= 0.0 {
            return Err(ThumbError::validation("font size must be finite and > 0"));
        }
        let stack = self.font_stack(&font.family);

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(stack)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size as f32));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(font.weight.0)),
        ));
        builder.push_default(parley::style::StyleProperty::FontStyle(match font.style {
            FontStyle::Normal => parley::style::FontStyle::Normal,
            FontStyle::Italic => parley::style::FontStyle::Italic,
            FontStyle::Oblique => parley::style::FontStyle::Oblique(None),
        }));
        builder.push_default(parley::style::StyleProperty::Brush(
            TextBrushRgba8::default(),
        ));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Shape `text` as one line inside a box `line_height` tall.
    ///
    /// Glyphs are vertically centered in the box the way CSS distributes half-leading, so raster
    /// and markup output place baselines alike.
    pub fn shape_line(
        &mut self,
        font: &FontRequest,
        line_height: f64,
        text: &str,
    ) -> ThumbResult<ShapedLine> {
        let layout = self.build_layout(font, text)?;
        let mut runs = Vec::new();

        for line in layout.lines() {
            let m = line.metrics();
            let baseline = (line_height as f32 - (m.ascent + m.descent)) / 2.0 + m.ascent;
            let dy = baseline - m.baseline;

            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let run_font = run.run().font();
                let font_data =
                    self.font_data_for(run_font.data.id(), run_font.data.data(), run_font.index);
                let glyphs = run
                    .positioned_glyphs()
                    .map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y + dy,
                    })
                    .collect();
                runs.push(ShapedRun {
                    font: font_data,
                    font_size: run.run().font_size(),
                    glyphs,
                });
            }
        }

        Ok(ShapedLine {
            width: f64::from(layout.width()),
            runs,
        })
    }

    fn font_data_for(&mut self, blob_id: u64, bytes: &[u8], index: u32) -> vello_cpu::peniko::FontData {
        self.font_cache
            .entry((blob_id, index))
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(bytes.to_vec()),
                    index,
                )
            })
            .clone()
    }
}

impl TextMeasure for TextEngine {
    fn line_width(&mut self, font: &FontRequest, text: &str) -> ThumbResult<f64> {
        Ok(f64::from(self.build_layout(font, text)?.width()))
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc" | "otc"))
}

/// Local file a face URL points at, or `None` for remote URLs.
fn local_face_path(url: &str, base_dir: &Path) -> Option<PathBuf> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//") {
        return None;
    }
    let raw = url.strip_prefix("file://").unwrap_or(url);
    let path = Path::new(raw);
    Some(if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    })
}

fn quote_family(name: &str) -> String {
    format!("\"{}\"", name.replace('"', ""))
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
