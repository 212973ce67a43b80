//! Interaction-grid ("hit grid") rasterization and encoding.
//!
//! A hit grid maps every output cell to the feature that last drew there.
//! The pipeline is: rasterize feature identifiers into a [`HitBuffer`],
//! downsample, then encode rows into JSON-embeddable strings where each
//! distinct join value owns one printable code unit.

pub mod buffer;
pub mod codepoint;
pub mod encode;
pub mod payload;
pub mod rasterize;

pub use buffer::{FeatureKeyTable, HitBuffer, FIRST_FEATURE_ID, NO_HIT};
pub use codepoint::CodepointAllocator;
pub use encode::encode_grid;
pub use payload::GridPayload;
pub use rasterize::{rasterize_feature, RasterTransform};
