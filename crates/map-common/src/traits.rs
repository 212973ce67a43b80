//! External collaborator contracts: renderer, image codec, projections.

use crate::error::{RenderError, RenderResult};
use crate::image::{ImageFormat, PixelBuffer};
use crate::view::MapView;

/// External rasterizer: renders a map view into an RGBA pixel buffer sized
/// exactly `view.width() x view.height()`.
pub trait MapRenderer: Send + Sync {
    fn render(&self, view: &MapView) -> RenderResult<PixelBuffer>;
}

/// External image codec: encodes a pixel buffer into the requested format.
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, buffer: &PixelBuffer, format: ImageFormat) -> RenderResult<Vec<u8>>;
}

/// External coordinate reprojection.
///
/// Projection mathematics are out of scope here; jobs only ever ask for a
/// point to be carried from one named SRS to another.
pub trait ProjectionTransform: Send + Sync {
    fn transform(&self, from_srs: &str, to_srs: &str, x: f64, y: f64) -> RenderResult<(f64, f64)>;
}

/// Pass-through transform for maps whose layers share the map SRS.
///
/// Fails loudly on a genuine cross-SRS request rather than silently
/// returning wrong coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl ProjectionTransform for IdentityTransform {
    fn transform(&self, from_srs: &str, to_srs: &str, x: f64, y: f64) -> RenderResult<(f64, f64)> {
        if from_srs != to_srs {
            return Err(RenderError::Projection(format!(
                "identity transform cannot reproject '{}' to '{}'",
                from_srs, to_srs
            )));
        }
        Ok((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform_same_srs() {
        let t = IdentityTransform;
        assert_eq!(
            t.transform("epsg:4326", "epsg:4326", 1.5, -2.5).unwrap(),
            (1.5, -2.5)
        );
    }

    #[test]
    fn test_identity_transform_rejects_cross_srs() {
        let t = IdentityTransform;
        let err = t.transform("epsg:4326", "epsg:3857", 0.0, 0.0).unwrap_err();
        assert!(matches!(err, RenderError::Projection(_)));
    }
}
