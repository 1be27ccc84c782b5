//! Data layers.

use std::fmt;
use kurbo::Point;
use crate::feature::{FeatureStore, RenderFeature};
use crate::geometry::{DataLayerItem, UnsupportedGeometryKind};
use crate::interaction::{distinct_owners, Interaction, LayerListener};
use crate::style::{Palette, Style};
use crate::surface::{Cursor, MapEvent, MapSurface};


//------------ DataLayer -----------------------------------------------------

/// A map layer showing a set of items.
///
/// The layer keeps the features of its items and reacts to clicks and
/// pointer movement on the map, highlighting the features of the item in
/// question and telling its listener about it.
pub struct DataLayer<L> {
    /// The name the layer is attached to the map under.
    name: String,

    /// The features currently shown.
    store: FeatureStore,

    /// The interaction state.
    interaction: Interaction,

    /// The colors to use.
    palette: Palette,

    /// The listener informed about clicks and hovers.
    listener: L,
}

impl<L: LayerListener> DataLayer<L> {
    pub fn new(name: impl Into<String>, listener: L) -> Self {
        DataLayer {
            name: name.into(),
            store: FeatureStore::new(),
            interaction: Interaction::new(),
            palette: Palette::default(),
            listener,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> &FeatureStore {
        &self.store
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Replaces the features of the layer with those of `items`.
    ///
    /// The layer is taken off the map while its features are rebuilt and
    /// added back afterwards. Items without a geometry are skipped. Items
    /// with a geometry that can’t be styled are rejected as a whole and
    /// listed in the returned report.
    pub fn populate<'a, S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        items: impl IntoIterator<Item = &'a DataLayerItem>,
    ) -> PopulateReport {
        let mut report = PopulateReport::default();
        self.store.clear();
        surface.detach_layer(&self.name);

        for item in items {
            let geometry = match item.geometry.as_ref() {
                Some(geometry) => geometry,
                None => continue,
            };
            let unsupported = geometry.atoms().find_map(|atomic| {
                atomic.kind().err()
            });
            match unsupported {
                Some(err) => {
                    tracing::warn!("skipping item {}: {}", item.id, err);
                    report.rejected.push(RejectedItem {
                        id: item.id.clone(), err
                    });
                }
                None => {
                    report.features += self.store.add(geometry, &item.id);
                    report.items += 1;
                }
            }
        }

        let res = self.interaction.restore(
            &mut self.store, self.palette, &mut self.listener
        );
        debug_assert!(res.is_ok(), "unsupported feature in store");
        surface.attach_layer(&self.name);
        tracing::debug!(
            "layer {} populated with {} features from {} items",
            self.name, report.features, report.items
        );
        report
    }

    /// Takes the layer off the map.
    ///
    /// The features are kept until the next call to
    /// [`populate`][Self::populate].
    pub fn clear<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        surface.detach_layer(&self.name)
    }

    /// Processes an event of the map.
    pub fn handle_event<S: MapSurface + ?Sized>(
        &mut self, surface: &mut S, event: MapEvent
    ) -> Result<(), UnsupportedGeometryKind> {
        match event {
            MapEvent::PointerMove(pixel) => {
                self.pointer_move(surface, pixel)
            }
            MapEvent::Click(pixel) => {
                self.click(surface, pixel)
            }
            MapEvent::MoveStart => {
                self.listener.on_moved();
                Ok(())
            }
        }
    }

    fn pointer_move<S: MapSurface + ?Sized>(
        &mut self, surface: &mut S, pixel: Point
    ) -> Result<(), UnsupportedGeometryKind> {
        let hits = surface.features_at_pixel(&self.name, pixel, &self.store);
        surface.set_cursor(
            if hits.is_empty() { Cursor::Default } else { Cursor::Pointer }
        );
        let owners = distinct_owners(&self.store, &hits);
        self.interaction.pointer_move(
            &mut self.store, self.palette, &owners, pixel, &mut self.listener
        )
    }

    fn click<S: MapSurface + ?Sized>(
        &mut self, surface: &mut S, pixel: Point
    ) -> Result<(), UnsupportedGeometryKind> {
        let hits = surface.features_at_pixel(&self.name, pixel, &self.store);
        let owners = distinct_owners(&self.store, &hits);
        self.interaction.click(
            &mut self.store, self.palette, &owners, pixel, &mut self.listener
        )
    }

    /// Highlights the item `id` unless it is clicked.
    pub fn hover(&mut self, id: &str) -> Result<(), UnsupportedGeometryKind> {
        self.interaction.hover(&mut self.store, self.palette, id)
    }

    /// Removes the highlight of item `id` unless it is clicked.
    pub fn remove_hover(
        &mut self, id: &str
    ) -> Result<(), UnsupportedGeometryKind> {
        self.interaction.remove_hover(&mut self.store, self.palette, id)
    }

    /// Makes `id` the clicked item.
    pub fn clicked(
        &mut self, id: &str
    ) -> Result<(), UnsupportedGeometryKind> {
        self.interaction.clicked(&mut self.store, self.palette, id)
    }

    /// Returns the item `id` to its default style and un-clicks it.
    pub fn remove_clicked(
        &mut self, id: &str
    ) -> Result<(), UnsupportedGeometryKind> {
        self.interaction.remove_clicked(&mut self.store, self.palette, id)
    }

    /// Returns the style a feature is currently drawn with.
    pub fn style_of(
        &self, feature: &RenderFeature
    ) -> Result<Style, UnsupportedGeometryKind> {
        match feature.style() {
            Some(style) => Ok(*style),
            None => {
                self.palette.resolve_name(
                    feature.geometry().kind_name(), false
                )
            }
        }
    }
}

impl<L: fmt::Debug> fmt::Debug for DataLayer<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DataLayer")
            .field("name", &self.name)
            .field("features", &self.store.len())
            .field("interaction", &self.interaction)
            .field("listener", &self.listener)
            .finish()
    }
}


//------------ PopulateReport ------------------------------------------------

/// What happened when populating a layer.
#[derive(Clone, Debug, Default)]
pub struct PopulateReport {
    /// The number of items that made it onto the layer.
    pub items: usize,

    /// The number of features created from these items.
    pub features: usize,

    /// The items that were rejected.
    pub rejected: Vec<RejectedItem>,
}

impl PopulateReport {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}


//------------ RejectedItem --------------------------------------------------

/// An item that couldn’t be put on the layer.
#[derive(Clone, Debug)]
pub struct RejectedItem {
    pub id: String,
    pub err: UnsupportedGeometryKind,
}

impl fmt::Display for RejectedItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.err)
    }
}


//============ Tests =========================================================
