//! Per-job map view: a cheap, private snapshot of a renderable map.

use crate::error::{RenderError, RenderResult};
use crate::extent::Extent;
use crate::layer::Layer;

/// A renderable map snapshot.
///
/// Each job owns its own `MapView`, so a job's temporary zoom never leaks
/// into another job running against the same underlying map. Cloning is
/// cheap: layers hold their datasource behind an `Arc`.
///
/// Width and height are fixed at construction; there is no resize while a
/// view is in flight because nothing else can reach it.
#[derive(Debug, Clone)]
pub struct MapView {
    width: u32,
    height: u32,
    srs: String,
    layers: Vec<Layer>,
    extent: Extent,
}

impl MapView {
    pub fn new(width: u32, height: u32, srs: impl Into<String>) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::Configuration(format!(
                "map dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            srs: srs.into(),
            layers: Vec::new(),
            extent: Extent::new(0.0, 0.0, width as f64, height as f64),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn srs(&self) -> &str {
        &self.srs
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Zoom the view to the given extent. Affects only this view.
    pub fn zoom_to_box(&mut self, extent: Extent) -> RenderResult<()> {
        extent.validate()?;
        self.extent = extent;
        Ok(())
    }

    pub fn current_extent(&self) -> Extent {
        self.extent
    }
}
