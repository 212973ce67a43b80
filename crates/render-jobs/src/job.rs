//! Render job definitions and their blocking execution paths.
//!
//! A job is immutable once submitted and owns a private [`MapView`], so its
//! temporary zoom is invisible to every other job. Execution happens on a
//! worker thread; these functions are synchronous and do all the blocking
//! work (datasource I/O, rasterization, encoding).

use std::collections::BTreeMap;

use tracing::debug;

use hit_grid::{
    encode_grid, rasterize_feature, FeatureKeyTable, GridPayload, HitBuffer, RasterTransform,
    FIRST_FEATURE_ID,
};
use map_common::{
    Extent, FeatureQuery, Geometry, ImageEncoder, ImageFormat, MapRenderer, MapView,
    ProjectionTransform, RenderError, RenderResult, SourceType,
};

use crate::config::DEFAULT_POINT_RADIUS;

/// Render the view and encode the pixels, synchronously.
///
/// This is the shared image path: the async job calls it from a worker
/// thread, and embedders that already sit on a blocking thread can call it
/// directly.
pub fn render_image_sync(
    view: &MapView,
    format: ImageFormat,
    renderer: &dyn MapRenderer,
    encoder: &dyn ImageEncoder,
) -> RenderResult<Vec<u8>> {
    let buffer = renderer.render(view)?;
    if buffer.width() != view.width() || buffer.height() != view.height() {
        return Err(RenderError::Internal(format!(
            "renderer returned a {}x{} buffer for a {}x{} view",
            buffer.width(),
            buffer.height(),
            view.width(),
            view.height()
        )));
    }
    encoder.encode(&buffer, format)
}

/// A request to render the map to encoded image bytes.
#[derive(Debug, Clone)]
pub struct ImageJob {
    pub view: MapView,
    pub extent: Extent,
    pub format: ImageFormat,
}

impl ImageJob {
    pub fn new(view: MapView, extent: Extent, format: ImageFormat) -> Self {
        Self {
            view,
            extent,
            format,
        }
    }

    /// Submission-time checks; nothing is dispatched if these fail.
    pub fn validate(&self) -> RenderResult<()> {
        self.extent.validate()
    }

    /// Zoom, render, encode. Any failure aborts with the triggering error;
    /// no partial bytes are ever returned.
    pub(crate) fn execute(
        mut self,
        renderer: &dyn MapRenderer,
        encoder: &dyn ImageEncoder,
    ) -> RenderResult<Vec<u8>> {
        self.view.zoom_to_box(self.extent)?;
        render_image_sync(&self.view, self.format, renderer, encoder)
    }
}

/// A request to render one layer into an interaction grid.
#[derive(Debug, Clone)]
pub struct GridJob {
    pub view: MapView,
    pub layer_index: usize,
    pub step: u32,
    pub join_field: String,
    pub include_features: bool,
    /// Circular footprint radius for point features; `None` takes the
    /// scheduler default.
    pub point_radius: Option<u32>,
}

impl GridJob {
    pub fn new(view: MapView, layer_index: usize, step: u32, join_field: impl Into<String>) -> Self {
        Self {
            view,
            layer_index,
            step,
            join_field: join_field.into(),
            include_features: false,
            point_radius: None,
        }
    }

    pub fn with_features(mut self) -> Self {
        self.include_features = true;
        self
    }

    pub fn with_point_radius(mut self, radius: u32) -> Self {
        self.point_radius = Some(radius);
        self
    }

    /// Submission-time checks: square power-of-two raster and a usable
    /// step. Violations are configuration mistakes the caller must fix; no
    /// worker is dispatched for them.
    pub fn validate(&self) -> RenderResult<()> {
        let width = self.view.width();
        let height = self.view.height();
        if width != height {
            return Err(RenderError::InvalidArgument(format!(
                "grid rendering requires a square map, got {}x{}",
                width, height
            )));
        }
        if !width.is_power_of_two() {
            return Err(RenderError::InvalidArgument(format!(
                "map dimension must be a power of two, got {}",
                width
            )));
        }
        if self.step == 0 {
            return Err(RenderError::InvalidArgument(
                "step must be at least 1".to_string(),
            ));
        }
        if width % self.step != 0 {
            return Err(RenderError::InvalidArgument(format!(
                "step {} does not divide map dimension {}",
                self.step, width
            )));
        }
        Ok(())
    }

    /// Rasterize, downsample, encode. Runs on a worker thread.
    pub(crate) fn execute(self, projector: &dyn ProjectionTransform) -> RenderResult<GridPayload> {
        let width = self.view.width();
        let height = self.view.height();

        let layer = self.view.layers().get(self.layer_index).ok_or_else(|| {
            RenderError::InvalidArgument(format!(
                "invalid layer index {}: map has {} layers",
                self.layer_index,
                self.view.layers().len()
            ))
        })?;

        if layer.source().source_type() == SourceType::Raster {
            return Err(RenderError::UnsupportedLayerType(format!(
                "layer '{}' has a raster datasource; grid rendering is vector-only",
                layer.name()
            )));
        }

        // Carry the view extent into the layer's native SRS for the query.
        let extent = self.view.current_extent();
        let (qx0, qy0) =
            projector.transform(self.view.srs(), layer.srs(), extent.min_x, extent.min_y)?;
        let (qx1, qy1) =
            projector.transform(self.view.srs(), layer.srs(), extent.max_x, extent.max_y)?;
        let query_extent = Extent::new(qx0.min(qx1), qy0.min(qy1), qx0.max(qx1), qy0.max(qy1));

        let mut query = FeatureQuery::new(query_extent);
        if self.include_features {
            for name in layer.source().descriptor() {
                query = query.with_property(name);
            }
        } else {
            query = query.with_property(self.join_field.clone());
        }

        let features = layer.source().features(&query)?;
        debug!(
            layer = layer.name(),
            features = features.len(),
            step = self.step,
            "rasterizing grid features"
        );

        let mut hits = HitBuffer::new(width, height);
        let mut table = FeatureKeyTable::new();
        let transform = RasterTransform::new(extent, width, height);
        let point_radius = self.point_radius.unwrap_or(DEFAULT_POINT_RADIUS);
        let mut data = self.include_features.then(BTreeMap::new);

        let mut feature_id = FIRST_FEATURE_ID;
        for feature in &features {
            let join_value = feature.join_value(&self.join_field);
            table.record(feature_id, &join_value);
            if let Some(map) = data.as_mut() {
                // Two features sharing a join value: the later one wins.
                if !join_value.is_empty() {
                    map.insert(join_value.clone(), feature.properties.clone());
                }
            }

            for geometry in &feature.geometries {
                let projected =
                    project_geometry(geometry, projector, layer.srs(), self.view.srs())?;
                rasterize_feature(&mut hits, &transform, &projected, feature_id, point_radius);
            }
            feature_id += 1;
        }

        let downsampled = hits.downsample(self.step);
        let (grid, keys) = encode_grid(&downsampled, &table)?;

        Ok(GridPayload { grid, keys, data })
    }
}

/// Reproject every vertex of a geometry from layer SRS to map SRS.
fn project_geometry(
    geometry: &Geometry,
    projector: &dyn ProjectionTransform,
    from_srs: &str,
    to_srs: &str,
) -> RenderResult<Geometry> {
    let project_points = |points: &[[f64; 2]]| -> RenderResult<Vec<[f64; 2]>> {
        points
            .iter()
            .map(|p| {
                let (x, y) = projector.transform(from_srs, to_srs, p[0], p[1])?;
                Ok([x, y])
            })
            .collect()
    };

    match geometry {
        Geometry::Point { x, y } => {
            let (x, y) = projector.transform(from_srs, to_srs, *x, *y)?;
            Ok(Geometry::Point { x, y })
        }
        Geometry::LineString(points) => Ok(Geometry::LineString(project_points(points)?)),
        Geometry::Polygon { exterior } => Ok(Geometry::Polygon {
            exterior: project_points(exterior)?,
        }),
    }
}
