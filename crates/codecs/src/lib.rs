//! Built-in image codecs.
//!
//! Provides a default [`map_common::ImageEncoder`] so embedders get working
//! PNG output without wiring an external codec. Formats the built-in codec
//! does not handle (JPEG and the vector/document family) return a codec
//! error; callers plug their own encoder for those.

pub mod png;

pub use png::PngEncoder;
