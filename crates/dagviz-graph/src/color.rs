//! Color resolution for the WebGL renderer.
//!
//! The renderer consumes colors as packed `0xRRGGBBAA` integers. Style
//! tables and operators specify them as CSS-like hex strings; this module
//! converts between the two.
//!
//! Accepted formats:
//! - `#rgb` -- each digit is doubled, then treated as `#rrggbb`
//! - `#rrggbb` -- fully opaque
//! - `#rrggbbaa` -- explicit alpha
//!
//! An empty specification resolves to [`Rgba::FALLBACK`], the renderer's
//! own default. Anything else is a [`ColorError`].

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// A packed `0xRRGGBBAA` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub u32);

impl Rgba {
    /// Renderer default used when no color is specified.
    pub const FALLBACK: Self = Self(0x009e_e8ff);

    /// Red channel.
    pub const fn red(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    /// Green channel.
    pub const fn green(self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    /// Blue channel.
    pub const fn blue(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    /// Alpha channel.
    pub const fn alpha(self) -> u8 {
        self.0.to_be_bytes()[3]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl core::fmt::Display for Rgba {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

/// A color as written by a caller: already packed, or a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec<'a> {
    /// A packed value, passed through unchanged.
    Packed(Rgba),
    /// A hex string to parse.
    Hex(&'a str),
}

/// Resolve a [`ColorSpec`] to a packed color.
pub fn resolve(spec: ColorSpec<'_>) -> Result<Rgba, ColorError> {
    match spec {
        ColorSpec::Packed(rgba) => Ok(rgba),
        ColorSpec::Hex(hex) => parse_color(hex),
    }
}

/// Parse a hex color string into a packed `0xRRGGBBAA` value.
pub fn parse_color(spec: &str) -> Result<Rgba, ColorError> {
    if spec.is_empty() {
        return Ok(Rgba::FALLBACK);
    }

    let Some(digits) = spec.strip_prefix('#') else {
        return Err(ColorError::Format(spec.to_owned()));
    };
    if !matches!(digits.len(), 3 | 6 | 8) {
        return Err(ColorError::Format(spec.to_owned()));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidDigit(spec.to_owned()));
    }

    match digits.len() {
        3 => {
            let doubled: String = digits.chars().flat_map(|c| [c, c]).collect();
            opaque(&doubled, spec)
        }
        6 => opaque(digits, spec),
        _ => u32::from_str_radix(digits, 16)
            .map(Rgba)
            .map_err(|_parse| ColorError::InvalidDigit(spec.to_owned())),
    }
}

/// Parse six hex digits and append a fully opaque alpha channel.
fn opaque(digits: &str, spec: &str) -> Result<Rgba, ColorError> {
    let rgb = u32::from_str_radix(digits, 16)
        .map_err(|_parse| ColorError::InvalidDigit(spec.to_owned()))?;
    Ok(Rgba(rgb.wrapping_shl(8) | 0xff))
}
