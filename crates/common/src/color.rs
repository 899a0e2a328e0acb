use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors from parsing a CSS-style color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("empty color string")]
    Empty,
    #[error("invalid hex color: {0}")]
    InvalidHex(String),
    #[error("invalid rgb() color: {0}")]
    InvalidRgb(String),
    #[error("unknown color name: {0}")]
    UnknownName(String),
}

/// An sRGB color with components in `[0, 1]`.
///
/// Parses the CSS forms used by scene descriptions: `#rrggbb`, `#rgb`,
/// `rgb(r, g, b)` with 0-255 components, and a handful of named colors.
/// Surrounding whitespace is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("grey", [128, 128, 128]),
    ("gray", [128, 128, 128]),
    ("orange", [255, 165, 0]),
];

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn from_hex(hex: u32) -> Self {
        Self::from_rgb8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Components converted from sRGB to linear light for shading.
    pub fn to_linear(self) -> [f32; 3] {
        let lin = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        [lin(self.r), lin(self.g), lin(self.b)]
    }

    fn parse_hex(digits: &str, original: &str) -> Result<Self, ColorError> {
        let err = || ColorError::InvalidHex(original.to_string());
        let value = u32::from_str_radix(digits, 16).map_err(|_| err())?;
        match digits.len() {
            6 => Ok(Self::from_hex(value)),
            3 => {
                let expand = |n: u32| ((n & 0xf) * 17) as u8;
                Ok(Self::from_rgb8(
                    expand(value >> 8),
                    expand(value >> 4),
                    expand(value),
                ))
            }
            _ => Err(err()),
        }
    }

    fn parse_rgb(body: &str, original: &str) -> Result<Self, ColorError> {
        let err = || ColorError::InvalidRgb(original.to_string());
        let parts: Vec<u8> = body
            .split(',')
            .map(|p| p.trim().parse::<u8>().map_err(|_| err()))
            .collect::<Result<_, _>>()?;
        match parts.as_slice() {
            [r, g, b] => Ok(Self::from_rgb8(*r, *g, *b)),
            _ => Err(err()),
        }
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ColorError::Empty);
        }
        if let Some(digits) = trimmed.strip_prefix('#') {
            return Self::parse_hex(digits, s);
        }
        let lower = trimmed.to_ascii_lowercase();
        if let Some(body) = lower
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Self::parse_rgb(body, s);
        }
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, [r, g, b])| Self::from_rgb8(*r, *g, *b))
            .ok_or_else(|| ColorError::UnknownName(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex() {
        let c: Color = "#b35f45".parse().unwrap();
        assert_eq!(c.to_rgb8(), [0xb3, 0x5f, 0x45]);
        let short: Color = "#fff".parse().unwrap();
        assert_eq!(short, Color::WHITE);
    }

    #[test]
    fn parses_rgb_function() {
        let c: Color = "rgb(6, 44, 44)".parse().unwrap();
        assert_eq!(c.to_rgb8(), [6, 44, 44]);
    }

    #[test]
    fn named_colors_ignore_stray_whitespace() {
        let c: Color = "grey ".parse().unwrap();
        assert_eq!(c.to_rgb8(), [128, 128, 128]);
        let g: Color = "green".parse().unwrap();
        assert_eq!(g.to_rgb8(), [0, 128, 0]);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!("".parse::<Color>(), Err(ColorError::Empty));
        assert!(matches!(
            "#12345".parse::<Color>(),
            Err(ColorError::InvalidHex(_))
        ));
        assert!(matches!(
            "rgb(1, 2)".parse::<Color>(),
            Err(ColorError::InvalidRgb(_))
        ));
        assert!(matches!(
            "rgb(300, 0, 0)".parse::<Color>(),
            Err(ColorError::InvalidRgb(_))
        ));
        assert!(matches!(
            "ectoplasm".parse::<Color>(),
            Err(ColorError::UnknownName(_))
        ));
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Color::from_hex(0xff7d46).to_string(), "#ff7d46");
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let w = Color::WHITE.to_linear();
        assert!(w.iter().all(|c| (c - 1.0).abs() < 1e-6));
    }
}
