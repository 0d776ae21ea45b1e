//! Color values used by decoration palettes

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid hex color '{0}': expected 6 hex digits")]
    BadHex(String),
    #[error("invalid color function '{0}'")]
    BadFunction(String),
    #[error("unknown color '{0}'")]
    Unknown(String),
}

/// RGB color with straight (non-premultiplied) alpha in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#rrggbb`, `rgb(r, g, b)` or `rgba(r, g, b, a)`
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorError::BadHex(s.to_string()));
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_function(args).ok_or_else(|| ColorError::BadFunction(s.to_string()));
        }
        if s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            return parse_hex(s).ok_or_else(|| ColorError::BadHex(s.to_string()));
        }
        Err(ColorError::Unknown(s.to_string()))
    }

    /// Composite this color over an opaque background
    pub fn over(self, bg: Rgba) -> Rgba {
        let a = self.a.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (fg as f32 * a + bg as f32 * (1.0 - a)).round().clamp(0.0, 255.0) as u8
        };
        Rgba::opaque(mix(self.r, bg.r), mix(self.g, bg.g), mix(self.b, bg.b))
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgba::parse(s)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.a - 1.0).abs() < f32::EPSILON {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgba::opaque(r, g, b))
}

fn parse_function(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let channel = |s: &str| s.parse::<u8>().ok();
    match parts.as_slice() {
        [r, g, b] => Some(Rgba::opaque(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let a = a.parse::<f32>().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            Some(Rgba::new(channel(r)?, channel(g)?, channel(b)?, a))
        }
        _ => None,
    }
}

/// Resolve a color value, following one level of named definitions
pub fn resolve_color(value: &str, defs: &HashMap<String, String>) -> Result<Rgba, ColorError> {
    let key = value.trim();
    match defs.get(key) {
        Some(def) => Rgba::parse(def),
        None => Rgba::parse(key),
    }
}
