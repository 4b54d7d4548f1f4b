//! RGBA color value shared by notes, note collections and story elements.

use crate::{PlotnotesError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An 8-bit-per-channel RGBA color.
///
/// Serializes as `#rrggbb`, or `#aarrggbb` when the color is not fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Returns the canonical hex name of this color.
    #[must_use]
    pub fn name(&self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn named(name: &str) -> Option<Color> {
    let color = match name {
        "white" => Color::WHITE,
        "black" => Color::BLACK,
        "red" => Color::rgb(0xff, 0, 0),
        "green" => Color::rgb(0, 0x80, 0),
        "lime" => Color::rgb(0, 0xff, 0),
        "blue" => Color::rgb(0, 0, 0xff),
        "yellow" => Color::rgb(0xff, 0xff, 0),
        "cyan" | "aqua" => Color::rgb(0, 0xff, 0xff),
        "magenta" | "fuchsia" => Color::rgb(0xff, 0, 0xff),
        "orange" => Color::rgb(0xff, 0xa5, 0),
        "purple" => Color::rgb(0x80, 0, 0x80),
        "gray" | "grey" => Color::rgb(0x80, 0x80, 0x80),
        "lightgray" | "lightgrey" => Color::rgb(0xd3, 0xd3, 0xd3),
        "transparent" => Color { r: 0, g: 0, b: 0, a: 0 },
        _ => return None,
    };
    Some(color)
}

impl FromStr for Color {
    type Err = PlotnotesError;

    /// Accepts `#rgb`, `#rrggbb`, `#aarrggbb` and a small set of SVG color names.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || PlotnotesError::InvalidColor(s.to_string());

        let Some(hex) = trimmed.strip_prefix('#') else {
            return named(&trimmed.to_ascii_lowercase()).ok_or_else(invalid);
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let nibble = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 0x11)
                        .map_err(|_| invalid())
                };
                Ok(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#FF0000".parse::<Color>().unwrap(), Color::rgb(0xff, 0, 0));
        let translucent = "#80112233".parse::<Color>().unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.name(), "#80112233");
    }

    #[test]
    fn test_parse_named_color() {
        assert_eq!("Yellow".parse::<Color>().unwrap(), Color::rgb(0xff, 0xff, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("#12".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("not-a-color".parse::<Color>().is_err());
    }

    #[test]
    fn test_serde_uses_hex_name() {
        let json = serde_json::to_string(&Color::rgb(1, 2, 3)).unwrap();
        assert_eq!(json, r##""#010203""##);
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(1, 2, 3));
    }
}
