use crate::{
    foundation::core::Canvas,
    foundation::error::{ThumbError, ThumbResult},
    model::document::Resolution,
};

/// Fixed preset table: name -> (width, height).
pub const PRESETS: [(&str, u32, u32); 4] = [
    ("16:9", 480, 270),
    ("9:16", 270, 480),
    ("4:3", 480, 360),
    ("1:1", 360, 360),
];

/// Look up a preset by name.
pub fn preset_dimensions(name: &str) -> ThumbResult<(u32, u32)> {
    PRESETS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, w, h)| (w, h))
        .ok_or_else(|| {
            let known: Vec<&str> = PRESETS.iter().map(|(n, _, _)| *n).collect();
            ThumbError::config(format!(
                "unknown resolution preset '{name}' (expected one of {})",
                known.join(", ")
            ))
        })
}

/// Resolve a [`Resolution`] into concrete canvas dimensions.
pub fn resolve_resolution(resolution: &Resolution) -> ThumbResult<Canvas> {
    match resolution {
        Resolution::Preset { value } => {
            let (w, h) = preset_dimensions(value.trim())?;
            Canvas::new(w, h)
        }
        Resolution::Custom { width, height } => Canvas::new(*width, *height),
        Resolution::FixedRatio {
            ratio_value,
            width,
            height,
        } => {
            let ratio = parse_ratio(ratio_value)?;
            match (width, height) {
                (Some(w), _) => Canvas::new(*w, floor_px(f64::from(*w) / ratio)),
                (None, Some(h)) => Canvas::new(floor_px(f64::from(*h) * ratio), *h),
                (None, None) => Err(ThumbError::config(
                    "fixedRatio resolution requires width or height",
                )),
            }
        }
    }
}

// Ratios like 4:3 are not exact in binary floating point; absorb the error before flooring.
fn floor_px(v: f64) -> u32 {
    (v + 1e-9).floor().max(0.0) as u32
}

fn parse_ratio(s: &str) -> ThumbResult<f64> {
    let Some((w, h)) = s.split_once(':') else {
        return Err(ThumbError::config(format!(
            "ratioValue must look like 'W:H' (got '{s}')"
        )));
    };
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|e| ThumbError::config(format!("invalid ratioValue '{s}': {e}")))
    };
    let (w, h) = (parse(w)?, parse(h)?);
    if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
        return Err(ThumbError::validation(format!(
            "ratioValue parts must be > 0 (got '{s}')"
        )));
    }
    Ok(w / h)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/resolution.rs"]
mod tests;
