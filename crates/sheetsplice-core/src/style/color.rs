//! Color representation

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Color representation
///
/// Supports RGB, ARGB, theme colors, and indexed colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color (no alpha)
    Rgb { r: u8, g: u8, b: u8 },

    /// ARGB color with alpha channel
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Theme color index
    Theme(u32),

    /// Indexed color (legacy Excel palette)
    Indexed(u32),
}

impl Color {
    /// Black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// White
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create an ARGB color
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color::Argb { a, r, g, b }
    }

    /// Create from a hex string (e.g., "#FF0000", "FF0000" or "FFFF0000")
    ///
    /// # Examples
    /// ```
    /// use sheetsplice_core::Color;
    ///
    /// assert_eq!(Color::from_hex("#FF0000").unwrap(), Color::rgb(255, 0, 0));
    /// assert_eq!(Color::from_hex("80FF0000").unwrap().to_argb_hex().as_deref(), Some("80FF0000"));
    /// assert!(Color::from_hex("red").is_err());
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim_start_matches('#');
        let invalid = || Error::InvalidColor(hex.to_string());
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());

        match digits.len() {
            6 => Ok(Color::Rgb {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            }),
            8 => Ok(Color::Argb {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => Err(invalid()),
        }
    }

    /// Convert to an 8-character ARGB hex string as used by the `rgb` attribute
    ///
    /// Returns `None` for theme, indexed and automatic colors, which are
    /// written through their own attributes.
    pub fn to_argb_hex(&self) -> Option<String> {
        match self {
            Color::Rgb { r, g, b } => Some(format!("FF{:02X}{:02X}{:02X}", r, g, b)),
            Color::Argb { a, r, g, b } => Some(format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b)),
            Color::Auto | Color::Theme(_) | Color::Indexed(_) => None,
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => write!(f, "auto"),
            Color::Theme(i) => write!(f, "theme({})", i),
            Color::Indexed(i) => write!(f, "indexed({})", i),
            Color::Rgb { .. } | Color::Argb { .. } => {
                write!(f, "#{}", self.to_argb_hex().unwrap_or_default())
            }
        }
    }
}
