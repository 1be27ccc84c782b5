//! The rendering style of features.
//!
//! How a feature is drawn depends only on the kind of its geometry and
//! whether it is currently highlighted. Everything is drawn in a single
//! accent color, either faded or solid.

use std::fmt;
use crate::color::Color;
use crate::geometry::{GeometryKind, UnsupportedGeometryKind};


//------------ Tweakables ----------------------------------------------------

/// The default accent color.
pub const ACCENT: Color = Color::rgb(225. / 255., 112. / 255., 0.);

/// The alpha value of the faded accent color.
pub const FADED_ALPHA: f64 = 0.2;

/// The stroke width of areas.
const AREA_WIDTH: f64 = 1.;

/// The stroke width of lines.
const LINE_WIDTH: f64 = 8.;

/// The stroke width of highlighted areas and lines.
const HIGHLIGHT_WIDTH: f64 = 3.;

/// The radius of point markers.
const MARKER_RADIUS: f64 = 7.;

/// The radius of the point marker of a geometry collection.
const COLLECTION_MARKER_RADIUS: f64 = 10.;


//------------ resolve_style -------------------------------------------------

/// Returns the style for a geometry kind given by its GeoJSON name.
///
/// This uses the default palette.
pub fn resolve_style(
    kind: &str, highlighted: bool
) -> Result<Style, UnsupportedGeometryKind> {
    Palette::default().resolve_name(kind, highlighted)
}


//------------ Palette -------------------------------------------------------

/// The colors the style is derived from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    accent: Color,
    faded_alpha: f64,
}

impl Palette {
    pub fn new(accent: Color) -> Self {
        Palette { accent, faded_alpha: FADED_ALPHA }
    }

    pub fn accent(self) -> Color {
        self.accent
    }

    fn solid(self) -> Color {
        self.accent.with_alpha(1.)
    }

    fn faded(self) -> Color {
        self.accent.with_alpha(self.faded_alpha)
    }

    /// Returns the style for the given geometry kind.
    pub fn resolve(self, kind: GeometryKind, highlighted: bool) -> Style {
        use GeometryKind::*;

        match (kind, highlighted) {
            (Polygon | MultiPolygon, false) => Style {
                fill: Some(Fill::new(self.faded())),
                stroke: Some(Stroke::new(self.faded(), AREA_WIDTH)),
                marker: None,
            },
            (Polygon | MultiPolygon, true) => Style {
                fill: Some(Fill::new(self.faded())),
                stroke: Some(Stroke::new(self.solid(), HIGHLIGHT_WIDTH)),
                marker: None,
            },
            (LineString | MultiLineString, false) => Style {
                stroke: Some(Stroke::new(self.faded(), LINE_WIDTH)),
                .. Style::default()
            },
            (LineString | MultiLineString, true) => Style {
                stroke: Some(Stroke::new(self.solid(), HIGHLIGHT_WIDTH)),
                .. Style::default()
            },
            (Point | MultiPoint, false) => Style {
                marker: Some(Marker::new(MARKER_RADIUS, self.faded())),
                .. Style::default()
            },
            (Point | MultiPoint, true) => Style {
                marker: Some(Marker::new(MARKER_RADIUS, self.solid())),
                .. Style::default()
            },
            (Collection, false) => Style {
                fill: Some(Fill::new(self.faded())),
                stroke: Some(Stroke::new(self.faded(), AREA_WIDTH)),
                marker: Some(
                    Marker::new(COLLECTION_MARKER_RADIUS, self.faded())
                ),
            },
            (Collection, true) => Style {
                fill: Some(Fill::new(self.faded())),
                stroke: Some(Stroke::new(self.solid(), HIGHLIGHT_WIDTH)),
                marker: Some(Marker::new(MARKER_RADIUS, self.solid())),
            },
        }
    }

    /// Returns the style for a geometry kind given by its GeoJSON name.
    pub fn resolve_name(
        self, kind: &str, highlighted: bool
    ) -> Result<Style, UnsupportedGeometryKind> {
        Ok(self.resolve(kind.parse()?, highlighted))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new(ACCENT)
    }
}


//------------ Style ---------------------------------------------------------

/// How to draw a feature.
///
/// Parts that are `None` are not drawn at all.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Style {
    /// The fill of areas.
    pub fill: Option<Fill>,

    /// The stroke of lines and area boundaries.
    pub stroke: Option<Stroke>,

    /// The marker drawn for points.
    pub marker: Option<Marker>,
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(fill) = self.fill {
            parts.push(format!("fill {}", fill.color));
        }
        if let Some(stroke) = self.stroke {
            parts.push(
                format!("stroke {} width {}", stroke.color, stroke.width)
            );
        }
        if let Some(marker) = self.marker {
            parts.push(format!(
                "circle radius {} fill {}", marker.radius, marker.fill.color
            ));
        }
        if parts.is_empty() {
            f.write_str("none")
        }
        else {
            f.write_str(&parts.join("; "))
        }
    }
}


//------------ Fill ----------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fill {
    pub color: Color,
}

impl Fill {
    pub fn new(color: Color) -> Self {
        Fill { color }
    }
}


//------------ Stroke --------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,

    /// The width in pixels.
    pub width: f64,
}

impl Stroke {
    pub fn new(color: Color, width: f64) -> Self {
        Stroke { color, width }
    }
}


//------------ Marker --------------------------------------------------------

/// A filled circle drawn at a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    /// The radius in pixels.
    pub radius: f64,
    pub fill: Fill,
}

impl Marker {
    pub fn new(radius: f64, color: Color) -> Self {
        Marker { radius, fill: Fill::new(color) }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn supported_kinds() {
        for kind in GeometryKind::ALL {
            for highlighted in [false, true] {
                assert!(resolve_style(kind.as_str(), highlighted).is_ok());
            }
        }
    }

    #[test]
    fn unsupported_kinds() {
        for name in ["Circle", "", "polygon", "Feature", "FeatureCollection"] {
            for highlighted in [false, true] {
                assert_eq!(
                    resolve_style(name, highlighted),
                    Err(UnsupportedGeometryKind::new(name))
                );
            }
        }
    }

    #[test]
    fn polygon() {
        let faded = ACCENT.with_alpha(0.2);
        assert_eq!(
            resolve_style("MultiPolygon", false).unwrap(),
            Style {
                fill: Some(Fill::new(faded)),
                stroke: Some(Stroke::new(faded, 1.)),
                marker: None,
            }
        );
        let style = resolve_style("Polygon", true).unwrap();
        assert_eq!(style.fill, Some(Fill::new(faded)));
        assert_eq!(style.stroke, Some(Stroke::new(ACCENT, 3.)));
        assert!(style.marker.is_none());
    }

    #[test]
    fn line() {
        let style = resolve_style("LineString", false).unwrap();
        assert_eq!(style.stroke, Some(Stroke::new(ACCENT.with_alpha(0.2), 8.)));
        assert!(style.fill.is_none() && style.marker.is_none());
        let style = resolve_style("MultiLineString", true).unwrap();
        assert_eq!(style.stroke, Some(Stroke::new(ACCENT, 3.)));
    }

    #[test]
    fn point() {
        assert_eq!(
            resolve_style("Point", false).unwrap().marker,
            Some(Marker::new(7., ACCENT.with_alpha(0.2)))
        );
        assert_eq!(
            resolve_style("MultiPoint", true).unwrap().marker,
            Some(Marker::new(7., ACCENT))
        );
    }

    #[test]
    fn collection() {
        let faded = ACCENT.with_alpha(0.2);
        assert_eq!(
            resolve_style("GeometryCollection", false).unwrap(),
            Style {
                fill: Some(Fill::new(faded)),
                stroke: Some(Stroke::new(faded, 1.)),
                marker: Some(Marker::new(10., faded)),
            }
        );
        assert_eq!(
            resolve_style("GeometryCollection", true).unwrap(),
            Style {
                fill: Some(Fill::new(faded)),
                stroke: Some(Stroke::new(ACCENT, 3.)),
                marker: Some(Marker::new(7., ACCENT)),
            }
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            resolve_style("Polygon", true).unwrap().to_string(),
            "fill rgba(225, 112, 0, 0.20); stroke rgb(225, 112, 0) width 3"
        );
        assert_eq!(Style::default().to_string(), "none");
    }

    #[test]
    fn custom_accent() {
        let palette = Palette::new(Color::rgb8(0, 0, 255));
        assert_eq!(
            palette.resolve(GeometryKind::LineString, true).stroke,
            Some(Stroke::new(Color::rgb8(0, 0, 255), 3.))
        );
    }
}
