use crate::foundation::core::Rgba8;
use serde::{Deserialize, Serialize};

/// A document color, parsed once into straight RGBA8.
///
/// Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)`,
/// a handful of CSS named colors, or an array `[r, g, b]` / `[r, g, b, a]` of 0..=255 channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub Rgba8);

impl Color {
    /// Parse a CSS-like color string.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).map(Self);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            return parse_rgb_fn(args).map(Self);
        }
        named(&lower)
            .map(Self)
            .ok_or_else(|| format!("unrecognized color \"{s}\""))
    }

    /// Straight RGBA8 value.
    pub fn rgba8(self) -> Rgba8 {
        self.0
    }
}

impl From<Rgba8> for Color {
    fn from(value: Rgba8) -> Self {
        Self(value)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_css())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Css(String),
            Arr(Vec<f64>),
        }

        fn channel(v: f64) -> u8 {
            v.clamp(0.0, 255.0).round() as u8
        }

        match Repr::deserialize(deserializer)? {
            Repr::Css(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self(Rgba8::rgb(channel(*r), channel(*g), channel(*b)))),
                [r, g, b, a] => Ok(Self(Rgba8::rgba(
                    channel(*r),
                    channel(*g),
                    channel(*b),
                    channel(*a),
                ))),
                _ => Err(serde::de::Error::custom(
                    "color array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    fn nibble(c: char) -> Result<u8, String> {
        c.to_digit(16)
            .map(|d| (d as u8) * 17)
            .ok_or_else(|| format!("invalid hex digit '{c}'"))
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }

    match s.len() {
        3 | 4 => {
            let mut chans = [255u8; 4];
            for (slot, c) in chans.iter_mut().zip(s.chars()) {
                *slot = nibble(c)?;
            }
            Ok(Rgba8::rgba(chans[0], chans[1], chans[2], chans[3]))
        }
        6 => Ok(Rgba8::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Ok(Rgba8::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err("hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

fn parse_rgb_fn(args: &str) -> Result<Rgba8, String> {
    let inner = args
        .strip_suffix(')')
        .ok_or_else(|| "rgb()/rgba() is missing ')'".to_owned())?;
    let parts = inner
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid rgb() component: {e}"))?;

    let chan = |v: f64| v.clamp(0.0, 255.0).round() as u8;
    match parts.as_slice() {
        [r, g, b] => Ok(Rgba8::rgb(chan(*r), chan(*g), chan(*b))),
        [r, g, b, a] => Ok(Rgba8::rgba(
            chan(*r),
            chan(*g),
            chan(*b),
            (a.clamp(0.0, 1.0) * 255.0).round() as u8,
        )),
        _ => Err("rgb() takes 3 components, rgba() takes 4".to_owned()),
    }
}

fn named(s: &str) -> Option<Rgba8> {
    Some(match s {
        "black" => Rgba8::rgb(0, 0, 0),
        "white" => Rgba8::rgb(255, 255, 255),
        "red" => Rgba8::rgb(255, 0, 0),
        "green" => Rgba8::rgb(0, 128, 0),
        "blue" => Rgba8::rgb(0, 0, 255),
        "yellow" => Rgba8::rgb(255, 255, 0),
        "orange" => Rgba8::rgb(255, 165, 0),
        "gray" | "grey" => Rgba8::rgb(128, 128, 128),
        "transparent" => Rgba8::rgba(0, 0, 0, 0),
        _ => return None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/model/color.rs"]
mod tests;
