//! Colors.

use std::fmt;
use std::convert::TryFrom;
use std::num::ParseIntError;
use serde::Deserialize;


//------------ Color ---------------------------------------------------------

/// A color.
///
/// Components are kept as fractions between 0 and 1.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(try_from = "String")]
pub struct Color {
    red: f64,
    green: f64,
    blue: f64,
    alpha: f64
}

impl Color {
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Color { red, green, blue, alpha: 1. }
    }

    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Color { red, green, blue, alpha }
    }

    /// Creates a color from 8 bit components.
    pub fn rgb8(red: u8, green: u8, blue: u8) -> Self {
        Color::rgb(
            f64::from(red) / 255.,
            f64::from(green) / 255.,
            f64::from(blue) / 255.,
        )
    }

    pub fn hex(mut hex: &str) -> Result<Self, InvalidHexColor> {
        if let Some(stripped) = hex.strip_prefix('#') {
            hex = stripped
        }
        if !hex.is_ascii() {
            return Err(InvalidHexColor)
        }
        let (r, g, b, a) = if hex.len() == 6 {
            (
                u8::from_str_radix(&hex[0..2], 16)?,
                u8::from_str_radix(&hex[2..4], 16)?,
                u8::from_str_radix(&hex[4..6], 16)?,
                0xFF,
            )
        }
        else if hex.len() == 8 {
            (
                u8::from_str_radix(&hex[0..2], 16)?,
                u8::from_str_radix(&hex[2..4], 16)?,
                u8::from_str_radix(&hex[4..6], 16)?,
                u8::from_str_radix(&hex[6..8], 16)?,
            )
        }
        else {
            return Err(InvalidHexColor)
        };
        Ok(Color::rgba(
            f64::from(r) / 255.,
            f64::from(g) / 255.,
            f64::from(b) / 255.,
            f64::from(a) / 255.,
        ))
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Color { red: self.red, green: self.green, blue: self.blue, alpha }
    }

    pub fn alpha(self) -> f64 {
        self.alpha
    }

    /// Returns whether the color is fully opaque.
    pub fn is_solid(self) -> bool {
        self.alpha >= 1.
    }

    fn component8(value: f64) -> u8 {
        (value.clamp(0., 1.) * 255.).round() as u8
    }
}

impl TryFrom<String> for Color {
    type Error = InvalidHexColor;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Self::hex(&src)
    }
}

/// Formats the color the way CSS wants it.
///
/// Solid colors become `rgb(r, g, b)`, everything else
/// `rgba(r, g, b, a)` with the alpha value given to two decimals.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (r, g, b) = (
            Self::component8(self.red),
            Self::component8(self.green),
            Self::component8(self.blue),
        );
        if self.is_solid() {
            write!(f, "rgb({}, {}, {})", r, g, b)
        }
        else {
            write!(f, "rgba({}, {}, {}, {:.2})", r, g, b, self.alpha)
        }
    }
}


//------------ InvalidHexColor -----------------------------------------------

#[derive(Clone, Copy, Debug)]
pub struct InvalidHexColor;

impl From<ParseIntError> for InvalidHexColor {
    fn from(_: ParseIntError) -> Self {
        InvalidHexColor
    }
}

impl fmt::Display for InvalidHexColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid color")
    }
}

impl std::error::Error for InvalidHexColor { }


//============ Tests =========================================================
