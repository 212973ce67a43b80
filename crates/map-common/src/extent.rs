//! Map extent (bounding box) types and operations.

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// An axis-aligned rectangle in map coordinates.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857, etc.), coordinates are in meters.
///
/// Degenerate (zero-area) extents are legal; rendering a degenerate extent
/// still produces a full-size output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Create a new extent from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse an extent parameter string: "minx,miny,maxx,maxy"
    pub fn parse(s: &str) -> RenderResult<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(RenderError::InvalidArgument(format!(
                "invalid extent '{}': expected 'minx,miny,maxx,maxy'",
                s
            )));
        }

        let mut coords = [0.0f64; 4];
        for (i, part) in parts.iter().enumerate() {
            coords[i] = part.trim().parse().map_err(|_| {
                RenderError::InvalidArgument(format!("invalid number in extent: '{}'", part))
            })?;
        }

        let extent = Self::new(coords[0], coords[1], coords[2], coords[3]);
        extent.validate()?;
        Ok(extent)
    }

    /// Check that the extent is well-formed (min <= max on both axes and all
    /// coordinates finite). Zero-area extents pass.
    pub fn validate(&self) -> RenderResult<()> {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|c| c.is_finite());
        if !finite {
            return Err(RenderError::InvalidArgument(
                "extent coordinates must be finite".to_string(),
            ));
        }
        if self.min_x > self.max_x || self.min_y > self.max_y {
            return Err(RenderError::InvalidArgument(format!(
                "extent min corner exceeds max corner: {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Width of the extent in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the extent in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether this extent covers no area at all.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// Check if this extent intersects another.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Compute the intersection of two extents.
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        if !self.intersects(other) {
            return None;
        }

        Some(Extent {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Check if a point is contained within this extent.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}
