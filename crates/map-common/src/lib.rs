//! Common types shared across the hit-grid rendering crates.

pub mod error;
pub mod extent;
pub mod feature;
pub mod geometry;
pub mod image;
pub mod layer;
pub mod traits;
pub mod view;

pub use error::{RenderError, RenderResult};
pub use extent::Extent;
pub use feature::{Feature, PropertyValue};
pub use geometry::Geometry;
pub use image::{ImageFormat, PixelBuffer};
pub use layer::{FeatureQuery, FeatureSource, Layer, SourceType};
pub use traits::{IdentityTransform, ImageEncoder, MapRenderer, ProjectionTransform};
pub use view::MapView;
