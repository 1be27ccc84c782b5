//! The interface to the map a data layer is shown on.

use std::fmt;
use kurbo::Point;
use smallvec::SmallVec;
use crate::feature::{FeatureId, FeatureStore};


//------------ MapSurface ----------------------------------------------------

/// The map a data layer is drawn on.
///
/// The surface owns drawing and turning pixels into features. It calls
/// back into the layer by delivering [`MapEvent`]s to
/// [`DataLayer::handle_event`].
///
/// [`DataLayer::handle_event`]: crate::layer::DataLayer::handle_event
pub trait MapSurface {
    /// Adds the layer with the given name to the map.
    ///
    /// Adding a layer that is already present does nothing.
    fn attach_layer(&mut self, name: &str);

    /// Removes the layer with the given name from the map.
    ///
    /// Removing a layer that isn’t present does nothing.
    fn detach_layer(&mut self, name: &str);

    /// Returns the features of a layer drawn at the given pixel.
    ///
    /// The topmost feature comes first. A layer that isn’t attached has no
    /// features at any pixel.
    fn features_at_pixel(
        &self, layer: &str, pixel: Point, features: &FeatureStore
    ) -> Hits;

    /// Sets the cursor shown over the map.
    fn set_cursor(&mut self, cursor: Cursor);
}

/// The features found at a pixel.
pub type Hits = SmallVec<[FeatureId; 4]>;


//------------ MapEvent ------------------------------------------------------

/// Something happened on the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MapEvent {
    /// The pointer was moved to the given pixel.
    PointerMove(Point),

    /// The map was clicked at the given pixel.
    Click(Point),

    /// The map started panning or zooming.
    MoveStart,
}


//------------ Cursor --------------------------------------------------------

/// The cursor shown over the map.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Cursor {
    #[default]
    Default,

    /// There is something clickable under the cursor.
    Pointer,
}

impl Cursor {
    /// Returns the CSS cursor value.
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Default => "",
            Cursor::Pointer => "pointer",
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
        })
    }
}
