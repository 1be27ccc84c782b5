//! Clicking and hovering.
//!
//! A data layer has two interaction channels. The click channel keeps track
//! of the one item that has been clicked, the hover channel follows the
//! pointer. Both highlight the features of their item. A clicked item always
//! wins: hovering over it or un-hovering it leaves it highlighted.
//!
//! Highlighting can also be driven from the outside, e.g., when the user
//! hovers over an item in a list next to the map.

use kurbo::Point;
use smallvec::SmallVec;
use crate::feature::{FeatureId, FeatureStore};
use crate::geometry::UnsupportedGeometryKind;
use crate::style::Palette;


//------------ LayerListener -------------------------------------------------

/// Receives the interesting things that happen on a data layer.
///
/// All methods are called synchronously while an event is processed.
pub trait LayerListener {
    /// The map was clicked at `pixel`.
    ///
    /// `ids` contains the identifiers of all the items with a feature at
    /// the pixel, each only once and topmost first. It may be empty. If
    /// there is more than one, it is up to the listener to let the user
    /// pick one.
    fn on_click(&mut self, ids: &[String], pixel: Point);

    /// The pointer moved onto a feature of the item `id`.
    fn on_hover(&mut self, id: &str, pixel: Point);

    /// The item last reported through `on_hover` is no longer hovered.
    ///
    /// This is only called after a call to `on_hover`, once for every
    /// run of hovers. Moving onto the clicked item, an ambiguous click,
    /// and repopulating the layer end a hover, too.
    fn on_hover_end(&mut self);

    /// The map started moving.
    fn on_moved(&mut self);
}


//------------ Interaction ---------------------------------------------------

/// The interaction state of a data layer.
#[derive(Clone, Debug, Default)]
pub struct Interaction {
    /// The identifier of the clicked item.
    clicked: Option<String>,

    /// The identifier of the item under the pointer.
    ///
    /// This is what the last pointer move resolved to, even if the item is
    /// the clicked one and hasn’t been highlighted for hovering.
    pointer: Option<String>,

    /// Whether the listener has been told about a hover not yet ended.
    hovering: bool,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier of the clicked item.
    pub fn clicked_id(&self) -> Option<&str> {
        self.clicked.as_deref()
    }

    /// Returns the identifier of the item under the pointer.
    pub fn pointer_id(&self) -> Option<&str> {
        self.pointer.as_deref()
    }

    /// Returns whether the listener was told about a hover still going on.
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    fn is_clicked(&self, id: &str) -> bool {
        self.clicked.as_deref() == Some(id)
    }

    /// Highlights the features of `id` unless it is clicked.
    pub fn hover(
        &mut self, store: &mut FeatureStore, palette: Palette, id: &str
    ) -> Result<(), UnsupportedGeometryKind> {
        if self.is_clicked(id) {
            return Ok(())
        }
        highlight(store, palette, id, true)
    }

    /// Removes the highlight of the features of `id` unless it is clicked.
    pub fn remove_hover(
        &mut self, store: &mut FeatureStore, palette: Palette, id: &str
    ) -> Result<(), UnsupportedGeometryKind> {
        if self.is_clicked(id) {
            return Ok(())
        }
        highlight(store, palette, id, false)
    }

    /// Makes `id` the clicked item.
    ///
    /// A previously clicked item returns to its default style.
    pub fn clicked(
        &mut self, store: &mut FeatureStore, palette: Palette, id: &str
    ) -> Result<(), UnsupportedGeometryKind> {
        let mut res = Ok(());
        if let Some(prev) = self.clicked.take() {
            if prev != id {
                res = highlight(store, palette, &prev, false);
            }
        }
        tracing::debug!("item {} clicked", id);
        self.clicked = Some(id.into());
        res.and(highlight(store, palette, id, true))
    }

    /// Returns `id` to its default style, un-clicking it if it was clicked.
    pub fn remove_clicked(
        &mut self, store: &mut FeatureStore, palette: Palette, id: &str
    ) -> Result<(), UnsupportedGeometryKind> {
        if self.is_clicked(id) {
            tracing::debug!("item {} no longer clicked", id);
            self.clicked = None;
        }
        highlight(store, palette, id, false)
    }

    /// Processes a pointer move resolved to the items in `owners`.
    ///
    /// Listeners are only informed if the item under the pointer changed.
    /// If there is more than one item under the pointer, nothing happens
    /// at all.
    pub fn pointer_move(
        &mut self,
        store: &mut FeatureStore,
        palette: Palette,
        owners: &[String],
        pixel: Point,
        listener: &mut impl LayerListener,
    ) -> Result<(), UnsupportedGeometryKind> {
        let id = match owners {
            [] => None,
            [id] => Some(id.as_str()),
            _ => return Ok(())
        };
        if id == self.pointer.as_deref() {
            return Ok(())
        }

        let mut res = self.release_pointer(store, palette);
        match id {
            None => self.end_hover(listener),
            Some(id) => {
                self.pointer = Some(id.into());
                if self.is_clicked(id) {
                    self.end_hover(listener)
                }
                else {
                    res = res.and(highlight(store, palette, id, true));
                    self.hovering = true;
                    listener.on_hover(id, pixel);
                }
            }
        }
        res
    }

    /// Processes a click resolved to the items in `owners`.
    ///
    /// The listener is always informed, even if nothing was hit.
    pub fn click(
        &mut self,
        store: &mut FeatureStore,
        palette: Palette,
        owners: &[String],
        pixel: Point,
        listener: &mut impl LayerListener,
    ) -> Result<(), UnsupportedGeometryKind> {
        let mut res = Ok(());
        if let Some(prev) = self.clicked.clone() {
            res = self.remove_clicked(store, palette, &prev);
        }
        match owners {
            [] => { }
            [id] => {
                res = res.and(self.clicked(store, palette, id));
            }
            _ => {
                tracing::debug!(
                    "ambiguous click on {} items", owners.len()
                );
                res = res.and(self.release_pointer(store, palette));
                self.end_hover(listener);
            }
        }
        listener.on_click(owners, pixel);
        res
    }

    /// Re-applies the highlight of the clicked item after a rebuild.
    ///
    /// The hover channel starts over, ending an ongoing hover.
    pub fn restore(
        &mut self,
        store: &mut FeatureStore,
        palette: Palette,
        listener: &mut impl LayerListener,
    ) -> Result<(), UnsupportedGeometryKind> {
        self.pointer = None;
        self.end_hover(listener);
        match self.clicked.as_deref() {
            Some(id) => highlight(store, palette, id, true),
            None => Ok(())
        }
    }

    /// Forgets the item under the pointer and removes its hover highlight.
    fn release_pointer(
        &mut self, store: &mut FeatureStore, palette: Palette
    ) -> Result<(), UnsupportedGeometryKind> {
        match self.pointer.take() {
            Some(prev) if !self.is_clicked(&prev) => {
                highlight(store, palette, &prev, false)
            }
            _ => Ok(())
        }
    }

    /// Tells the listener that an ongoing hover is over.
    fn end_hover(&mut self, listener: &mut impl LayerListener) {
        if self.hovering {
            self.hovering = false;
            listener.on_hover_end();
        }
    }
}


//------------ Helper Functions ----------------------------------------------

/// Sets the style of all features of `id`.
///
/// Features that can’t be styled are skipped. The first such failure is
/// returned after all other features have been updated.
fn highlight(
    store: &mut FeatureStore, palette: Palette, id: &str, on: bool
) -> Result<(), UnsupportedGeometryKind> {
    let mut res = Ok(());
    for feature in store.features_by_owner_mut(id) {
        match feature.geometry().kind() {
            Ok(kind) => feature.set_style(Some(palette.resolve(kind, on))),
            Err(err) => {
                tracing::warn!("cannot highlight item {}: {}", id, err);
                if res.is_ok() {
                    res = Err(err)
                }
            }
        }
    }
    res
}

/// Returns the distinct owners of the given features in order.
pub fn distinct_owners(
    store: &FeatureStore, hits: &[FeatureId]
) -> Vec<String> {
    let mut res: SmallVec<[&str; 4]> = SmallVec::new();
    let owners = hits.iter().filter_map(|id| store.get(*id)).map(|feature| {
        feature.owner()
    });
    for owner in owners {
        if !res.contains(&owner) {
            res.push(owner)
        }
    }
    res.into_iter().map(Into::into).collect()
}


//============ Tests =========================================================

#[cfg(test)]
pub(crate) mod test {
    use crate::geometry::{Atomic, Geometry, GeometryKind};
    use crate::style::Style;
    use super::*;

    /// Everything a listener was told.
    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        Click(Vec<String>, Point),
        Hover(String, Point),
        HoverEnd,
        Moved,
    }

    #[derive(Debug, Default)]
    pub struct Recorder(pub Vec<Call>);

    impl LayerListener for Recorder {
        fn on_click(&mut self, ids: &[String], pixel: Point) {
            self.0.push(Call::Click(ids.into(), pixel))
        }

        fn on_hover(&mut self, id: &str, pixel: Point) {
            self.0.push(Call::Hover(id.into(), pixel))
        }

        fn on_hover_end(&mut self) {
            self.0.push(Call::HoverEnd)
        }

        fn on_moved(&mut self) {
            self.0.push(Call::Moved)
        }
    }

    fn store() -> FeatureStore {
        let mut store = FeatureStore::new();
        for id in ["A", "B"] {
            store.add(
                &Geometry::collection([
                    Atomic::Point(Point::ORIGIN).into(),
                    Atomic::Polygon(vec![vec![Point::ORIGIN]]).into(),
                ]),
                id
            );
        }
        store
    }

    /// Returns which of the features of `id` are highlighted.
    fn highlighted(store: &FeatureStore, id: &str) -> Vec<bool> {
        store.features_by_owner(id).map(|feature| {
            let kind = feature.geometry().kind().unwrap();
            let style = feature.style().copied().unwrap_or_else(|| {
                Palette::default().resolve(kind, false)
            });
            style == Palette::default().resolve(kind, true)
        }).collect()
    }

    fn owners(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| String::from(*id)).collect()
    }

    #[test]
    fn hover() {
        let (mut store, palette) = (store(), Palette::default());
        let mut inter = Interaction::new();
        inter.hover(&mut store, palette, "A").unwrap();
        assert_eq!(highlighted(&store, "A"), [true, true]);
        assert_eq!(highlighted(&store, "B"), [false, false]);
        inter.remove_hover(&mut store, palette, "A").unwrap();
        assert_eq!(highlighted(&store, "A"), [false, false]);
    }

    #[test]
    fn clicked_wins_over_hover() {
        let (mut store, palette) = (store(), Palette::default());
        let mut inter = Interaction::new();
        inter.clicked(&mut store, palette, "A").unwrap();
        inter.hover(&mut store, palette, "A").unwrap();
        assert_eq!(highlighted(&store, "A"), [true, true]);
        inter.remove_hover(&mut store, palette, "A").unwrap();
        assert_eq!(highlighted(&store, "A"), [true, true]);
        assert_eq!(inter.clicked_id(), Some("A"));
    }

    #[test]
    fn one_click_only() {
        let (mut store, palette) = (store(), Palette::default());
        let mut inter = Interaction::new();
        inter.clicked(&mut store, palette, "A").unwrap();
        inter.clicked(&mut store, palette, "B").unwrap();
        assert_eq!(highlighted(&store, "A"), [false, false]);
        assert_eq!(highlighted(&store, "B"), [true, true]);
        assert_eq!(inter.clicked_id(), Some("B"));

        inter.remove_clicked(&mut store, palette, "B").unwrap();
        assert_eq!(highlighted(&store, "B"), [false, false]);
        assert_eq!(inter.clicked_id(), None);
    }

    #[test]
    fn pointer_move() {
        let (mut store, palette) = (store(), Palette::default());
        let mut inter = Interaction::new();
        let mut rec = Recorder::default();
        let pixel = Point::new(1., 2.);

        // Moving within the same item only reports once.
        for _ in 0..2 {
            inter.pointer_move(
                &mut store, palette, &owners(&["A"]), pixel, &mut rec
            ).unwrap();
        }
        assert_eq!(highlighted(&store, "A"), [true, true]);

        // Ambiguous moves change nothing.
        inter.pointer_move(
            &mut store, palette, &owners(&["A", "B"]), pixel, &mut rec
        ).unwrap();
        assert_eq!(inter.pointer_id(), Some("A"));

        inter.pointer_move(
            &mut store, palette, &owners(&["B"]), pixel, &mut rec
        ).unwrap();
        assert_eq!(highlighted(&store, "A"), [false, false]);
        assert_eq!(highlighted(&store, "B"), [true, true]);

        for _ in 0..2 {
            inter.pointer_move(
                &mut store, palette, &[], pixel, &mut rec
            ).unwrap();
        }
        assert_eq!(highlighted(&store, "B"), [false, false]);
        assert_eq!(
            rec.0,
            [
                Call::Hover("A".into(), pixel),
                Call::Hover("B".into(), pixel),
                Call::HoverEnd,
            ]
        );
    }

    #[test]
    fn pointer_move_over_clicked() {
        let (mut store, palette) = (store(), Palette::default());
        let mut inter = Interaction::new();
        let mut rec = Recorder::default();
        inter.clicked(&mut store, palette, "A").unwrap();
        inter.pointer_move(
            &mut store, palette, &owners(&["A"]), Point::ORIGIN, &mut rec
        ).unwrap();
        assert!(rec.0.is_empty());
        inter.pointer_move(
            &mut store, palette, &[], Point::ORIGIN, &mut rec
        ).unwrap();
        assert_eq!(highlighted(&store, "A"), [true, true]);
        assert!(rec.0.is_empty());

        // Going from a hovered item to the clicked one ends the hover.
        inter.pointer_move(
            &mut store, palette, &owners(&["B"]), Point::ORIGIN, &mut rec
        ).unwrap();
        inter.pointer_move(
            &mut store, palette, &owners(&["A"]), Point::ORIGIN, &mut rec
        ).unwrap();
        assert!(!inter.is_hovering());
        assert_eq!(highlighted(&store, "B"), [false, false]);
        inter.pointer_move(
            &mut store, palette, &[], Point::ORIGIN, &mut rec
        ).unwrap();
        assert_eq!(
            rec.0, [Call::Hover("B".into(), Point::ORIGIN), Call::HoverEnd]
        );
    }

    #[test]
    fn click() {
        let (mut store, palette) = (store(), Palette::default());
        let mut inter = Interaction::new();
        let mut rec = Recorder::default();
        let pixel = Point::new(3., 4.);

        inter.click(
            &mut store, palette, &owners(&["A"]), pixel, &mut rec
        ).unwrap();
        assert_eq!(inter.clicked_id(), Some("A"));
        assert_eq!(highlighted(&store, "A"), [true, true]);

        inter.click(&mut store, palette, &[], pixel, &mut rec).unwrap();
        assert_eq!(inter.clicked_id(), None);
        assert_eq!(highlighted(&store, "A"), [false, false]);

        assert_eq!(
            rec.0,
            [Call::Click(owners(&["A"]), pixel), Call::Click(vec![], pixel)]
        );
    }

    #[test]
    fn ambiguous_click() {
        let (mut store, palette) = (store(), Palette::default());
        let mut inter = Interaction::new();
        let mut rec = Recorder::default();
        inter.clicked(&mut store, palette, "A").unwrap();
        inter.pointer_move(
            &mut store, palette, &owners(&["B"]), Point::ORIGIN, &mut rec
        ).unwrap();
        inter.click(
            &mut store, palette, &owners(&["B", "A"]), Point::ORIGIN, &mut rec
        ).unwrap();
        assert_eq!(inter.clicked_id(), None);
        assert_eq!(inter.pointer_id(), None);
        assert_eq!(highlighted(&store, "A"), [false, false]);
        assert_eq!(highlighted(&store, "B"), [false, false]);
        assert!(!inter.is_hovering());
        assert_eq!(
            rec.0,
            [
                Call::Hover("B".into(), Point::ORIGIN),
                Call::HoverEnd,
                Call::Click(owners(&["B", "A"]), Point::ORIGIN),
            ]
        );
    }

    #[test]
    fn restore_ends_hover() {
        let (mut store, palette) = (store(), Palette::default());
        let mut inter = Interaction::new();
        let mut rec = Recorder::default();
        inter.restore(&mut store, palette, &mut rec).unwrap();
        assert!(rec.0.is_empty());

        inter.clicked(&mut store, palette, "B").unwrap();
        inter.pointer_move(
            &mut store, palette, &owners(&["A"]), Point::ORIGIN, &mut rec
        ).unwrap();
        let mut store = self::store();
        inter.restore(&mut store, palette, &mut rec).unwrap();
        assert_eq!(inter.pointer_id(), None);
        assert_eq!(highlighted(&store, "A"), [false, false]);
        assert_eq!(highlighted(&store, "B"), [true, true]);
        assert_eq!(
            rec.0, [Call::Hover("A".into(), Point::ORIGIN), Call::HoverEnd]
        );
    }

    #[test]
    fn unsupported_features_are_skipped() {
        let (mut store, palette) = (store(), Palette::default());
        store.add_atomic(
            Atomic::Unsupported {
                kind: "Circle".into(),
                coordinates: serde_json::Value::Null,
            },
            "A"
        );
        let mut inter = Interaction::new();
        assert_eq!(
            inter.clicked(&mut store, palette, "A"),
            Err(UnsupportedGeometryKind::new("Circle"))
        );
        assert_eq!(inter.clicked_id(), Some("A"));
        let styles: Vec<_> = store.features_by_owner("A").map(|f| {
            f.style().copied()
        }).collect();
        assert_eq!(
            styles,
            [
                Some(palette.resolve(GeometryKind::Point, true)),
                Some(palette.resolve(GeometryKind::Polygon, true)),
                None::<Style>,
            ]
        );
    }

    #[test]
    fn distinct() {
        let store = store();
        let ids: Vec<_> = store.all_features().rev().map(|(id, _)| {
            id
        }).collect();
        assert_eq!(distinct_owners(&store, &ids), ["B", "A"]);
        assert!(distinct_owners(&store, &[]).is_empty());
    }
}
