//! Geometry trees as delivered by the data source.
//!
//! Geometry arrives as GeoJSON-like trees: either a single atomic geometry
//! or a geometry collection that may contain further collections. Before
//! anything can be drawn, a tree is flattened into its atomic geometries,
//! each of which is tagged with the identifier of the item it belongs to.

use std::{fmt, slice};
use std::str::FromStr;
use kurbo::Point;
use serde::{Deserialize, Deserializer};


//------------ DataLayerItem -------------------------------------------------

/// A single item to be shown on a data layer.
#[derive(Clone, Debug, Deserialize)]
pub struct DataLayerItem {
    /// The identifier of the item.
    ///
    /// This is opaque to us and is handed back to the listener whenever a
    /// feature of the item is clicked or hovered.
    pub id: String,

    /// The geometry of the item if there is one.
    ///
    /// A geometry that fails to parse is treated as missing.
    #[serde(
        default, alias = "geometrie",
        deserialize_with = "DataLayerItem::lenient_geometry"
    )]
    pub geometry: Option<Geometry>,
}

impl DataLayerItem {
    pub fn new(id: impl Into<String>, geometry: Option<Geometry>) -> Self {
        DataLayerItem { id: id.into(), geometry }
    }

    /// Returns the atomic geometries of the item.
    ///
    /// An item without a geometry has none.
    pub fn flatten(
        &self
    ) -> impl Iterator<Item = (&Atomic, &str)> + '_ {
        self.geometry.iter().flat_map(|geom| flatten(geom, &self.id))
    }

    fn lenient_geometry<'de, D: Deserializer<'de>>(
        deserializer: D
    ) -> Result<Option<Geometry>, D::Error> {
        let value = match Option::<serde_json::Value>::deserialize(
            deserializer
        )? {
            Some(value) if !value.is_null() => value,
            _ => return Ok(None)
        };
        match serde_json::from_value(value) {
            Ok(geometry) => Ok(Some(geometry)),
            Err(err) => {
                tracing::debug!("ignoring malformed geometry: {}", err);
                Ok(None)
            }
        }
    }
}


//------------ Geometry ------------------------------------------------------

/// A geometry tree.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(try_from = "RawGeometry")]
pub enum Geometry {
    /// A geometry that cannot be decomposed any further.
    Atomic(Atomic),

    /// An ordered collection of geometries.
    Collection(Vec<Geometry>),
}

impl Geometry {
    pub fn collection(children: impl IntoIterator<Item = Geometry>) -> Self {
        Geometry::Collection(children.into_iter().collect())
    }

    /// Returns the GeoJSON type name of the geometry.
    pub fn kind_name(&self) -> &str {
        match self {
            Geometry::Atomic(atomic) => atomic.kind_name(),
            Geometry::Collection(_) => GeometryKind::Collection.as_str(),
        }
    }

    /// Returns an iterator over the atomic geometries in the tree.
    ///
    /// The tree is walked depth-first, left to right.
    pub fn atoms(&self) -> Atoms<'_> {
        Atoms { stack: vec![slice::from_ref(self).iter()] }
    }
}

impl From<Atomic> for Geometry {
    fn from(atomic: Atomic) -> Self {
        Geometry::Atomic(atomic)
    }
}


//------------ Atomic --------------------------------------------------------

/// An atomic geometry.
///
/// Positions are kept in world coordinates exactly as they were given.
/// Polygons are a list of rings, the first being the outer boundary and
/// all others holes.
#[derive(Clone, Debug, PartialEq)]
pub enum Atomic {
    Point(Point),
    MultiPoint(Vec<Point>),
    LineString(Vec<Point>),
    MultiLineString(Vec<Vec<Point>>),
    Polygon(Vec<Vec<Point>>),
    MultiPolygon(Vec<Vec<Vec<Point>>>),

    /// A geometry of a type we don’t know how to draw.
    ///
    /// These are carried along so that the decision what to do with them
    /// can be made when they are about to be styled.
    Unsupported {
        kind: String,
        coordinates: serde_json::Value,
    },
}

impl Atomic {
    /// Returns the GeoJSON type name of the geometry.
    pub fn kind_name(&self) -> &str {
        match self {
            Atomic::Point(_) => GeometryKind::Point.as_str(),
            Atomic::MultiPoint(_) => GeometryKind::MultiPoint.as_str(),
            Atomic::LineString(_) => GeometryKind::LineString.as_str(),
            Atomic::MultiLineString(_) => {
                GeometryKind::MultiLineString.as_str()
            }
            Atomic::Polygon(_) => GeometryKind::Polygon.as_str(),
            Atomic::MultiPolygon(_) => GeometryKind::MultiPolygon.as_str(),
            Atomic::Unsupported { kind, .. } => kind,
        }
    }

    /// Returns the kind of the geometry.
    pub fn kind(&self) -> Result<GeometryKind, UnsupportedGeometryKind> {
        self.kind_name().parse()
    }
}


//------------ GeometryKind --------------------------------------------------

/// The kinds of geometry we know how to style.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    Collection,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 7] = [
        GeometryKind::Point,
        GeometryKind::MultiPoint,
        GeometryKind::LineString,
        GeometryKind::MultiLineString,
        GeometryKind::Polygon,
        GeometryKind::MultiPolygon,
        GeometryKind::Collection,
    ];

    /// Returns the GeoJSON type name for the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::Collection => "GeometryCollection",
        }
    }
}

impl FromStr for GeometryKind {
    type Err = UnsupportedGeometryKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == s).ok_or_else(
            || UnsupportedGeometryKind::new(s)
        )
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//------------ flatten and Flatten -------------------------------------------

/// Flattens a geometry tree into its atomic geometries tagged with `owner`.
///
/// An atomic geometry results in exactly itself. Collections are walked
/// depth-first, left to right. No kind is rejected here.
pub fn flatten<'a>(node: &'a Geometry, owner: &'a str) -> Flatten<'a> {
    Flatten { atoms: node.atoms(), owner }
}

/// The iterator returned by [`flatten`].
#[derive(Clone, Debug)]
pub struct Flatten<'a> {
    atoms: Atoms<'a>,
    owner: &'a str,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = (&'a Atomic, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.atoms.next().map(|atomic| (atomic, self.owner))
    }
}


//------------ Atoms ---------------------------------------------------------

/// An iterator over the atomic geometries of a tree.
///
/// This keeps its own stack so arbitrarily deep trees don’t blow the call
/// stack.
#[derive(Clone, Debug)]
pub struct Atoms<'a> {
    stack: Vec<slice::Iter<'a, Geometry>>,
}

impl<'a> Iterator for Atoms<'a> {
    type Item = &'a Atomic;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(Geometry::Atomic(atomic)) => return Some(atomic),
                Some(Geometry::Collection(children)) => {
                    self.stack.push(children.iter())
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}


//------------ RawGeometry ---------------------------------------------------

/// A GeoJSON geometry object before we had a closer look.
#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,

    #[serde(default)]
    coordinates: serde_json::Value,

    #[serde(default)]
    geometries: Option<Vec<RawGeometry>>,
}

type Position = Vec<f64>;

impl TryFrom<RawGeometry> for Geometry {
    type Error = InvalidGeometry;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        let kind = match raw.kind.parse() {
            Ok(kind) => kind,
            Err(_) => {
                return Ok(Geometry::Atomic(Atomic::Unsupported {
                    kind: raw.kind,
                    coordinates: raw.coordinates,
                }))
            }
        };
        let coords = raw.coordinates;
        let atomic = match kind {
            GeometryKind::Collection => {
                let children = raw.geometries.ok_or(
                    InvalidGeometry("collection without geometries")
                )?;
                return children.into_iter().map(Geometry::try_from)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Geometry::Collection)
            }
            GeometryKind::Point => {
                Atomic::Point(position(parse::<Position>(coords)?)?)
            }
            GeometryKind::MultiPoint => {
                Atomic::MultiPoint(positions(parse(coords)?)?)
            }
            GeometryKind::LineString => {
                Atomic::LineString(positions(parse(coords)?)?)
            }
            GeometryKind::MultiLineString => {
                Atomic::MultiLineString(
                    parse::<Vec<Vec<Position>>>(coords)?.into_iter()
                        .map(positions).collect::<Result<_, _>>()?
                )
            }
            GeometryKind::Polygon => {
                Atomic::Polygon(
                    parse::<Vec<Vec<Position>>>(coords)?.into_iter()
                        .map(positions).collect::<Result<_, _>>()?
                )
            }
            GeometryKind::MultiPolygon => {
                Atomic::MultiPolygon(
                    parse::<Vec<Vec<Vec<Position>>>>(coords)?.into_iter()
                        .map(|polygon| {
                            polygon.into_iter().map(positions)
                                .collect::<Result<Vec<_>, _>>()
                        })
                        .collect::<Result<_, _>>()?
                )
            }
        };
        Ok(Geometry::Atomic(atomic))
    }
}

fn parse<T: serde::de::DeserializeOwned>(
    coords: serde_json::Value
) -> Result<T, InvalidGeometry> {
    serde_json::from_value(coords).map_err(|_| {
        InvalidGeometry("malformed coordinates")
    })
}

fn position(pos: Position) -> Result<Point, InvalidGeometry> {
    match pos.as_slice() {
        [x, y, ..] => Ok(Point::new(*x, *y)),
        _ => Err(InvalidGeometry("position with less than two ordinates")),
    }
}

fn positions(pos: Vec<Position>) -> Result<Vec<Point>, InvalidGeometry> {
    pos.into_iter().map(position).collect()
}


//------------ UnsupportedGeometryKind ---------------------------------------

/// A geometry kind we don’t know how to style.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnsupportedGeometryKind {
    kind: String,
}

impl UnsupportedGeometryKind {
    pub fn new(kind: impl Into<String>) -> Self {
        UnsupportedGeometryKind { kind: kind.into() }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl fmt::Display for UnsupportedGeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "Feature with unsupported geometry type on the map: {}",
            self.kind
        )
    }
}

impl std::error::Error for UnsupportedGeometryKind { }


//------------ InvalidGeometry -----------------------------------------------

/// A GeoJSON geometry could not be understood.
#[derive(Clone, Copy, Debug)]
pub struct InvalidGeometry(&'static str);

impl fmt::Display for InvalidGeometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid geometry: {}", self.0)
    }
}

impl std::error::Error for InvalidGeometry { }


//============ Tests =========================================================
