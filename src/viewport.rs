//! A map surface that lives entirely in memory.
//!
//! The viewport maps world coordinates onto pixels through an affine
//! transform and finds features at a pixel by looking at their geometry.
//! It doesn’t draw anything, which makes it useful for driving a layer
//! from the command line and in tests.

use kurbo::{Affine, BezPath, Point, Shape, Vec2};
use crate::feature::FeatureStore;
use crate::geometry::Atomic;
use crate::surface::{Cursor, Hits, MapSurface};


//------------ Viewport ------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Viewport {
    /// The transformation from world to pixel coordinates.
    transform: Affine,

    /// How far from a geometry a pixel may be to still hit it.
    tolerance: f64,

    /// The names of the attached layers, bottom to top.
    layers: Vec<String>,

    /// The current cursor.
    cursor: Cursor,
}

impl Viewport {
    /// The default hit tolerance in pixels.
    pub const DEFAULT_TOLERANCE: f64 = 7.;

    pub fn new(transform: Affine) -> Self {
        Viewport {
            transform,
            tolerance: Self::DEFAULT_TOLERANCE,
            layers: Vec::new(),
            cursor: Cursor::Default,
        }
    }

    /// Creates a viewport with the pixel at `origin` in the top left.
    ///
    /// One world unit becomes `scale` pixels. Since pixels grow downwards
    /// and world coordinates northwards, the y axis is flipped.
    pub fn north_up(origin: Point, scale: f64) -> Self {
        Self::new(Affine::new([
            scale, 0., 0., -scale,
            -origin.x * scale, origin.y * scale
        ]))
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_attached(&self, name: &str) -> bool {
        self.layers.iter().any(|layer| layer == name)
    }

    /// Returns the names of the attached layers, bottom to top.
    pub fn layers(&self) -> impl Iterator<Item = &str> + '_ {
        self.layers.iter().map(String::as_str)
    }

    pub fn to_pixel(&self, world: Point) -> Point {
        self.transform * world
    }

    /// Returns whether `pixel` hits the given geometry.
    pub fn hits(&self, geometry: &Atomic, pixel: Point) -> bool {
        match geometry {
            Atomic::Point(point) => self.hits_point(*point, pixel),
            Atomic::MultiPoint(points) => {
                points.iter().any(|point| self.hits_point(*point, pixel))
            }
            Atomic::LineString(line) => self.hits_line(line, pixel),
            Atomic::MultiLineString(lines) => {
                lines.iter().any(|line| self.hits_line(line, pixel))
            }
            Atomic::Polygon(rings) => self.hits_polygon(rings, pixel),
            Atomic::MultiPolygon(polygons) => {
                polygons.iter().any(|rings| self.hits_polygon(rings, pixel))
            }
            Atomic::Unsupported { .. } => false,
        }
    }

    fn hits_point(&self, point: Point, pixel: Point) -> bool {
        self.to_pixel(point).distance(pixel) <= self.tolerance
    }

    fn hits_line(&self, line: &[Point], pixel: Point) -> bool {
        match line {
            [] => false,
            [point] => self.hits_point(*point, pixel),
            _ => {
                line.windows(2).any(|seg| {
                    segment_distance(
                        pixel, self.to_pixel(seg[0]), self.to_pixel(seg[1])
                    ) <= self.tolerance
                })
            }
        }
    }

    fn hits_polygon(&self, rings: &[Vec<Point>], pixel: Point) -> bool {
        let (outer, holes) = match rings.split_first() {
            Some(some) => some,
            None => return false
        };
        if rings.iter().any(|ring| self.hits_line(ring, pixel)) {
            return true
        }
        self.ring_path(outer).winding(pixel) != 0
            && holes.iter().all(|ring| {
                self.ring_path(ring).winding(pixel) == 0
            })
    }

    fn ring_path(&self, ring: &[Point]) -> BezPath {
        let mut path = BezPath::new();
        let mut points = ring.iter().map(|point| self.to_pixel(*point));
        if let Some(first) = points.next() {
            path.move_to(first);
            points.for_each(|point| path.line_to(point));
            path.close_path();
        }
        path
    }
}

impl MapSurface for Viewport {
    fn attach_layer(&mut self, name: &str) {
        if !self.is_attached(name) {
            self.layers.push(name.into())
        }
    }

    fn detach_layer(&mut self, name: &str) {
        self.layers.retain(|layer| layer != name)
    }

    fn features_at_pixel(
        &self, layer: &str, pixel: Point, features: &FeatureStore
    ) -> Hits {
        if !self.is_attached(layer) {
            return Hits::new()
        }
        features.all_features().rev().filter_map(|(id, feature)| {
            self.hits(feature.geometry(), pixel).then_some(id)
        }).collect()
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor
    }
}


//------------ Helper Functions ----------------------------------------------

/// Returns the distance of `point` from the segment between `a` and `b`.
fn segment_distance(point: Point, a: Point, b: Point) -> f64 {
    let ab: Vec2 = b - a;
    let len2 = ab.hypot2();
    if len2 == 0. {
        return point.distance(a)
    }
    let t = ((point - a).dot(ab) / len2).clamp(0., 1.);
    point.distance(a + ab * t)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x0, y0), Point::new(x0 + size, y0),
            Point::new(x0 + size, y0 + size), Point::new(x0, y0 + size),
            Point::new(x0, y0),
        ]
    }

    fn viewport() -> Viewport {
        Viewport::new(Affine::IDENTITY).with_tolerance(2.)
    }

    #[test]
    fn north_up() {
        let view = Viewport::north_up(Point::new(100., 50.), 2.);
        assert_eq!(view.to_pixel(Point::new(100., 50.)), Point::new(0., 0.));
        assert_eq!(view.to_pixel(Point::new(110., 40.)), Point::new(20., 20.));
    }

    #[test]
    fn segment() {
        let (a, b) = (Point::new(0., 0.), Point::new(10., 0.));
        assert_eq!(segment_distance(Point::new(5., 3.), a, b), 3.);
        assert_eq!(segment_distance(Point::new(-4., 3.), a, b), 5.);
        assert!(
            (segment_distance(Point::new(1., 1.), a, a) - 2f64.sqrt()).abs()
                < 1e-9
        );
    }

    #[test]
    fn hit_point() {
        let view = viewport();
        let geom = Atomic::MultiPoint(
            vec![Point::new(0., 0.), Point::new(20., 20.)]
        );
        assert!(view.hits(&geom, Point::new(1., 1.)));
        assert!(view.hits(&geom, Point::new(21., 20.)));
        assert!(!view.hits(&geom, Point::new(10., 10.)));
    }

    #[test]
    fn hit_line() {
        let view = viewport();
        let geom = Atomic::LineString(
            vec![Point::new(0., 0.), Point::new(10., 0.), Point::new(10., 10.)]
        );
        assert!(view.hits(&geom, Point::new(5., 1.5)));
        assert!(view.hits(&geom, Point::new(11., 5.)));
        assert!(!view.hits(&geom, Point::new(5., 5.)));
    }

    #[test]
    fn hit_polygon() {
        let view = viewport();
        let geom = Atomic::Polygon(vec![
            square(0., 0., 30.), square(10., 10., 10.)
        ]);
        assert!(view.hits(&geom, Point::new(5., 5.)));
        assert!(view.hits(&geom, Point::new(-1., 15.)));
        assert!(!view.hits(&geom, Point::new(15., 15.)));
        assert!(view.hits(&geom, Point::new(10.5, 15.)));
        assert!(!view.hits(&geom, Point::new(40., 40.)));
        assert!(!view.hits(&Atomic::Polygon(Vec::new()), Point::ORIGIN));
    }

    #[test]
    fn unsupported_never_hit() {
        let geom = Atomic::Unsupported {
            kind: "Circle".into(),
            coordinates: serde_json::Value::Null,
        };
        assert!(!viewport().hits(&geom, Point::ORIGIN));
    }

    #[test]
    fn features_at_pixel() {
        let mut store = FeatureStore::new();
        let below = store.add_atomic(
            Atomic::Polygon(vec![square(0., 0., 20.)]), "A"
        );
        let above = store.add_atomic(
            Atomic::Polygon(vec![square(10., 10., 20.)]), "B"
        );
        let mut view = viewport();
        let pixel = Point::new(15., 15.);

        assert!(view.features_at_pixel("layer", pixel, &store).is_empty());

        view.attach_layer("layer");
        view.attach_layer("layer");
        assert_eq!(view.layers().count(), 1);
        assert_eq!(
            view.features_at_pixel("layer", pixel, &store).as_slice(),
            [above, below]
        );
        assert_eq!(
            view.features_at_pixel(
                "layer", Point::new(5., 5.), &store
            ).as_slice(),
            [below]
        );
        assert!(view.features_at_pixel("other", pixel, &store).is_empty());

        view.detach_layer("layer");
        view.detach_layer("layer");
        assert!(!view.is_attached("layer"));
        assert!(view.features_at_pixel("layer", pixel, &store).is_empty());
    }
}
