//! Pixel buffer and output image format types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// A dense RGBA8 pixel buffer, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a buffer filled with transparent pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap existing RGBA data. Fails if the length does not match the
    /// declared dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> RenderResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RenderError::Internal(format!(
                "pixel buffer size mismatch: {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let offset = (y as usize * self.width as usize + x as usize) * 4;
            self.data[offset..offset + 4].copy_from_slice(&rgba);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.data[offset..offset + 4]);
        Some(rgba)
    }

    /// Fill the whole buffer with one color.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&rgba);
        }
    }
}

/// Recognized output formats.
///
/// Raster formats go through the image codec; the document formats (PDF,
/// SVG, PostScript) exist for whole-map export through an external vector
/// backend and are not handled by the built-in codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Full-color PNG (RGBA, color type 6).
    Png,
    /// 8-bit indexed PNG (palette, color type 3).
    Png8,
    Jpeg,
    Pdf,
    Svg,
    Ps,
}

impl ImageFormat {
    /// Whether this format is produced by a raster image codec (as opposed
    /// to a vector/document backend).
    pub fn is_raster(&self) -> bool {
        matches!(self, ImageFormat::Png | ImageFormat::Png8 | ImageFormat::Jpeg)
    }
}

impl FromStr for ImageFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" | "png24" | "png32" => Ok(ImageFormat::Png),
            "png8" | "png256" => Ok(ImageFormat::Png8),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "pdf" => Ok(ImageFormat::Pdf),
            "svg" => Ok(ImageFormat::Svg),
            "ps" => Ok(ImageFormat::Ps),
            other => Err(RenderError::InvalidArgument(format!(
                "unrecognized image format: '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Png => "png",
            ImageFormat::Png8 => "png8",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Pdf => "pdf",
            ImageFormat::Svg => "svg",
            ImageFormat::Ps => "ps",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_buffer_roundtrip() {
        let mut buf = PixelBuffer::new(4, 3);
        assert_eq!(buf.data().len(), 4 * 3 * 4);

        buf.set_pixel(2, 1, [10, 20, 30, 255]);
        assert_eq!(buf.pixel(2, 1), Some([10, 20, 30, 255]));
        assert_eq!(buf.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(buf.pixel(4, 0), None);
    }

    #[test]
    fn test_from_rgba_size_check() {
        assert!(PixelBuffer::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert!(PixelBuffer::from_rgba(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("png256".parse::<ImageFormat>().unwrap(), ImageFormat::Png8);
        assert_eq!("jpg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert!("bmp".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn test_raster_classification() {
        assert!(ImageFormat::Png.is_raster());
        assert!(!ImageFormat::Pdf.is_raster());
    }
}
