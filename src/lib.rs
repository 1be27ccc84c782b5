//! Interactive data layers for maps.
//!
//! A data layer shows the geometry of a set of items on a map and lets the
//! user pick items by clicking on or hovering over them.

pub use self::config::Config;
pub use self::geometry::{DataLayerItem, Geometry, UnsupportedGeometryKind};
pub use self::interaction::LayerListener;
pub use self::layer::{DataLayer, PopulateReport};
pub use self::style::{resolve_style, Style};
pub use self::surface::{Cursor, MapEvent, MapSurface};
pub use self::viewport::Viewport;

pub mod color;
pub mod config;
pub mod feature;
pub mod geometry;
pub mod interaction;
pub mod layer;
pub mod style;
pub mod surface;
pub mod viewport;
