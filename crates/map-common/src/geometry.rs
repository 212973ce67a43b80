//! Vector geometry model consumed by the grid rasterizer.

use serde::{Deserialize, Serialize};

/// A feature geometry in layer coordinates.
///
/// Only the vector shapes needed for interaction-grid rendering are modeled;
/// raster sources are rejected before any geometry is touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point { x: f64, y: f64 },
    LineString(Vec<[f64; 2]>),
    Polygon { exterior: Vec<[f64; 2]> },
}

impl Geometry {
    /// A representative anchor position for the geometry, used to place the
    /// circular footprint of point features.
    pub fn anchor(&self) -> Option<(f64, f64)> {
        match self {
            Geometry::Point { x, y } => Some((*x, *y)),
            Geometry::LineString(points) | Geometry::Polygon { exterior: points } => {
                points.first().map(|p| (p[0], p[1]))
            }
        }
    }

    /// Number of vertices in the geometry.
    pub fn num_points(&self) -> usize {
        match self {
            Geometry::Point { .. } => 1,
            Geometry::LineString(points) | Geometry::Polygon { exterior: points } => points.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor() {
        let point = Geometry::Point { x: 3.0, y: 4.0 };
        assert_eq!(point.anchor(), Some((3.0, 4.0)));

        let line = Geometry::LineString(vec![[1.0, 2.0], [5.0, 6.0]]);
        assert_eq!(line.anchor(), Some((1.0, 2.0)));

        let empty = Geometry::LineString(vec![]);
        assert_eq!(empty.anchor(), None);
    }

    #[test]
    fn test_num_points() {
        assert_eq!(Geometry::Point { x: 0.0, y: 0.0 }.num_points(), 1);
        let poly = Geometry::Polygon {
            exterior: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
        };
        assert_eq!(poly.num_points(), 4);
    }
}
