//! The features of a data layer.

use crate::geometry::{flatten, Atomic, Geometry};
use crate::style::Style;


//------------ FeatureId -----------------------------------------------------

/// The identifier of a feature within its store.
///
/// Identifiers are only valid until the store is cleared.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FeatureId(usize);

impl FeatureId {
    pub fn index(self) -> usize {
        self.0
    }
}


//------------ RenderFeature -------------------------------------------------

/// A single feature ready for drawing.
#[derive(Clone, Debug)]
pub struct RenderFeature {
    /// The geometry of the feature.
    ///
    /// This is never a collection.
    geometry: Atomic,

    /// The identifier of the item this feature belongs to.
    owner: String,

    /// An explicitly set style.
    ///
    /// If this is `None`, the layer’s default style applies.
    style: Option<Style>,
}

impl RenderFeature {
    fn new(geometry: Atomic, owner: String) -> Self {
        RenderFeature { geometry, owner, style: None }
    }

    pub fn geometry(&self) -> &Atomic {
        &self.geometry
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    pub fn set_style(&mut self, style: Option<Style>) {
        self.style = style
    }
}


//------------ FeatureStore --------------------------------------------------

/// The features currently shown by a data layer.
///
/// Features are kept in insertion order which is also the order they are
/// drawn in. Later features are on top.
#[derive(Clone, Debug, Default)]
pub struct FeatureStore {
    features: Vec<RenderFeature>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all features.
    pub fn clear(&mut self) {
        self.features.clear()
    }

    /// Adds a geometry owned by `owner`.
    ///
    /// Collections are broken up into their atomic geometries, each of
    /// which becomes a separate feature. Returns the number of features
    /// added.
    pub fn add(&mut self, geometry: &Geometry, owner: &str) -> usize {
        let len = self.features.len();
        self.features.extend(flatten(geometry, owner).map(|(atomic, owner)| {
            RenderFeature::new(atomic.clone(), owner.into())
        }));
        self.features.len() - len
    }

    /// Adds a single atomic geometry owned by `owner`.
    pub fn add_atomic(&mut self, geometry: Atomic, owner: &str) -> FeatureId {
        self.features.push(RenderFeature::new(geometry, owner.into()));
        FeatureId(self.features.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, id: FeatureId) -> Option<&RenderFeature> {
        self.features.get(id.0)
    }

    pub fn get_mut(&mut self, id: FeatureId) -> Option<&mut RenderFeature> {
        self.features.get_mut(id.0)
    }

    /// Returns all features in insertion order.
    pub fn all_features(
        &self
    ) -> impl DoubleEndedIterator<Item = (FeatureId, &RenderFeature)> + '_ {
        self.features.iter().enumerate().map(|(idx, feature)| {
            (FeatureId(idx), feature)
        })
    }

    /// Returns the features owned by `owner` in insertion order.
    pub fn features_by_owner<'a>(
        &'a self, owner: &'a str
    ) -> impl Iterator<Item = &'a RenderFeature> + 'a {
        self.features.iter().filter(move |feature| feature.owner == owner)
    }

    /// Returns the features owned by `owner` for modification.
    pub fn features_by_owner_mut<'a>(
        &'a mut self, owner: &'a str
    ) -> impl Iterator<Item = &'a mut RenderFeature> + 'a {
        self.features.iter_mut().filter(move |feature| feature.owner == owner)
    }

    /// Returns whether there are any features owned by `owner`.
    pub fn contains_owner(&self, owner: &str) -> bool {
        self.features_by_owner(owner).next().is_some()
    }
}


//============ Tests =========================================================
