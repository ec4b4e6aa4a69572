//! Outline derivation.
//!
//! Two renditions come out of the same [`ResolvedOutline`]:
//! - a true glyph stroke ([`ResolvedOutline::stroke_pass`]) for raster surfaces;
//! - stacked offset copies ([`ResolvedOutline::shadow_offsets`]) for markup hosts without glyph
//!   stroking. The shadow rings only approximate a stroke: corners come out squarer and the
//!   fractional part of a thickness is dropped. The two are not pixel-identical.

use crate::{foundation::core::Rgba8, model::document::OutlineSpec};

/// Outline with its effective thickness. Never constructed with a zero thickness.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedOutline {
    pub color: Rgba8,
    pub thickness: f64,
}

/// Stroke the glyph path with `color` at `line_width` before filling.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct StrokePass {
    pub color: Rgba8,
    pub line_width: f64,
}

/// One offset copy of the text drawn in the outline color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ShadowOffset {
    pub dx: i32,
    pub dy: i32,
}

/// Effective thickness for a requested outline.
///
/// Numbers (or numeric strings) >= 0 are taken as is. Missing, negative or non-numeric values
/// resolve to `default_px`.
pub fn effective_thickness(raw: Option<&serde_json::Value>, default_px: f64) -> f64 {
    let parsed = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(t) if t.is_finite() && t >= 0.0 => t,
        _ => default_px,
    }
}

/// Resolve an outline request. Returns `None` when the effective thickness is zero.
pub fn resolve_outline(spec: &OutlineSpec, default_px: f64) -> Option<ResolvedOutline> {
    let thickness = effective_thickness(spec.thickness.as_ref(), default_px);
    if thickness <= 0.0 {
        return None;
    }
    Some(ResolvedOutline {
        color: spec.color.rgba8(),
        thickness,
    })
}

impl ResolvedOutline {
    /// Stroke instruction for surfaces that can stroke glyph paths.
    pub fn stroke_pass(&self) -> Option<StrokePass> {
        (self.thickness > 0.0).then_some(StrokePass {
            color: self.color,
            line_width: self.thickness,
        })
    }

    /// Number of shadow rings: one per whole pixel of thickness, so no ring lies outside it.
    ///
    /// Sub-pixel outlines (`0 < thickness < 1`) still get the radius-1 ring; otherwise the
    /// markup rendition would drop an outline the raster stroke draws.
    pub fn ring_count(&self) -> u32 {
        if self.thickness <= 0.0 {
            return 0;
        }
        (self.thickness.floor() as u32).max(1)
    }

    /// The 8-neighbor ring at every radius `1..=ring_count()`, innermost first.
    pub fn shadow_offsets(&self) -> Vec<ShadowOffset> {
        let rings = self.ring_count() as i32;
        let mut out = Vec::with_capacity((rings as usize) * 8);
        for t in 1..=rings {
            for (dx, dy) in [
                (t, 0),
                (-t, 0),
                (0, t),
                (0, -t),
                (t, t),
                (t, -t),
                (-t, t),
                (-t, -t),
            ] {
                out.push(ShadowOffset { dx, dy });
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/outline.rs"]
mod tests;
