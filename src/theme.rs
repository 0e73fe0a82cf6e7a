//! Theme loading: light/dark palettes and btop-style `theme[key]="value"` files.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Header and status panel colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Blocks (settled, falling and vanishing).
    pub accent: Color,
    /// Header band background.
    pub header_bg: Color,
    /// Everything below the header.
    pub bg: Color,
    /// Header bottom border.
    pub div_line: Color,
    pub main_fg: Color,
    /// Header title.
    pub title: Color,
    /// Key help and other secondary text.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub const fn dark() -> Self {
        Self {
            accent: Color::Rgb(0x61, 0xAF, 0xEF),
            header_bg: Color::Rgb(0x21, 0x25, 0x2B),
            bg: Color::Rgb(0x28, 0x2C, 0x34),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    pub const fn light() -> Self {
        Self {
            accent: Color::Rgb(0x40, 0x78, 0xF2),
            header_bg: Color::Rgb(0xF5, 0xF5, 0xF5),
            bg: Color::Rgb(0xFF, 0xFF, 0xFF),
            div_line: Color::Rgb(0xDD, 0xDD, 0xDD),
            main_fg: Color::Rgb(0x38, 0x3A, 0x42),
            title: Color::Rgb(0x98, 0x68, 0x01),
            inactive_fg: Color::Rgb(0xA0, 0xA1, 0xA7),
        }
    }

    pub fn for_palette(palette: crate::Palette) -> Self {
        match palette {
            crate::Palette::Dark => Self::dark(),
            crate::Palette::Light => Self::light(),
        }
    }

    /// Load a btop-style theme file on top of `palette`'s colours.
    /// A missing path falls back to the palette alone.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let base = Self::for_palette(palette);
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(base),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        Ok(Self::from_map(&map, base))
    }

    fn from_map(map: &HashMap<String, String>, base: Self) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        // Keys follow btop themes so existing theme files work unchanged.
        Self {
            accent: get("hi_fg").or_else(|| get("cpu_box")).unwrap_or(base.accent),
            header_bg: get("meter_bg").unwrap_or(base.header_bg),
            bg: get("main_bg").unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    if !hex.is_ascii() {
        return Err(invalid());
    }
    let (r, g, b) = match hex.len() {
        6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
        3 => (
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
        ),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}
