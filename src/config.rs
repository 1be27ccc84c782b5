//! Configuration of the data layer driver.

use std::{fmt, fs, io};
use std::path::Path;
use kurbo::Point;
use serde::Deserialize;
use crate::color::Color;
use crate::style::{Palette, ACCENT};
use crate::viewport::Viewport;


//------------ Config --------------------------------------------------------

/// The configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The data layer.
    pub layer: LayerConfig,

    /// The map view.
    pub view: ViewConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&data)
    }

    pub fn from_toml(data: &str) -> Result<Self, ConfigError> {
        toml::from_str(data).map_err(Into::into)
    }
}


//------------ LayerConfig ---------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// The name the layer is attached to the map under.
    pub name: String,

    /// The accent color features are drawn in.
    pub accent: Color,
}

impl LayerConfig {
    pub fn palette(&self) -> Palette {
        Palette::new(self.accent)
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        LayerConfig {
            name: "verzoeken".into(),
            accent: ACCENT,
        }
    }
}


//------------ ViewConfig ----------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// The world coordinates of the top left pixel.
    pub origin: [f64; 2],

    /// The number of pixels per world unit.
    pub scale: f64,

    /// The hit tolerance in pixels.
    pub tolerance: f64,
}

impl ViewConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport::north_up(
            Point::new(self.origin[0], self.origin[1]), self.scale
        ).with_tolerance(self.tolerance)
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            origin: [0., 0.],
            scale: 1.,
            tolerance: Viewport::DEFAULT_TOLERANCE,
        }
    }
}


//------------ ConfigError ---------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Toml(toml::de::Error),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(err) => err.fmt(f),
            ConfigError::Toml(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ConfigError { }


//============ Tests =========================================================
