//! PNG encoding for RGBA pixel buffers.
//!
//! Two encoding modes:
//! - **RGBA PNG (color type 6)**: full color, always available.
//! - **Indexed PNG (color type 3)**: used for `Png8` when the image has
//!   no more than 256 unique colors; falls back to RGBA otherwise.

use std::collections::HashMap;
use std::io::Write;

use rayon::prelude::*;
use tracing::debug;

use map_common::{ImageEncoder, ImageFormat, PixelBuffer, RenderError, RenderResult};

/// Maximum palette entries for indexed PNG.
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixel count before parallel palette extraction pays off.
const PARALLEL_THRESHOLD: usize = 4096;

/// Default image codec: in-tree PNG writer on flate2 + crc32fast.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn encode(&self, buffer: &PixelBuffer, format: ImageFormat) -> RenderResult<Vec<u8>> {
        match format {
            ImageFormat::Png => encode_rgba(buffer),
            ImageFormat::Png8 => encode_indexed(buffer),
            other => Err(RenderError::Codec(format!(
                "built-in codec does not support '{}'; configure an external encoder",
                other
            ))),
        }
    }
}

/// Encode as truecolor RGBA PNG (color type 6, bit depth 8).
pub fn encode_rgba(buffer: &PixelBuffer) -> RenderResult<Vec<u8>> {
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_ihdr(&mut png, width, height, ColorType::Rgba);

    // Each scanline: 1 filter byte (none) + width * 4 pixel bytes.
    let mut raw = Vec::with_capacity(height * (1 + width * 4));
    for y in 0..height {
        raw.push(0);
        let start = y * width * 4;
        raw.extend_from_slice(&buffer.data()[start..start + width * 4]);
    }
    let idat = deflate(&raw)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode as indexed PNG (color type 3) when the palette fits, otherwise
/// fall back to RGBA.
pub fn encode_indexed(buffer: &PixelBuffer) -> RenderResult<Vec<u8>> {
    let num_pixels = buffer.width() as usize * buffer.height() as usize;
    let palette_result = if num_pixels >= PARALLEL_THRESHOLD {
        extract_palette_parallel(buffer.data())
    } else {
        extract_palette(buffer.data())
    };

    let (palette, indices) = match palette_result {
        Some(p) => p,
        None => {
            debug!(
                pixels = num_pixels,
                "more than {} unique colors, falling back to RGBA PNG", MAX_PALETTE_SIZE
            );
            return encode_rgba(buffer);
        }
    };

    let width = buffer.width() as usize;
    let height = buffer.height() as usize;

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_ihdr(&mut png, width, height, ColorType::Indexed);

    let mut plte = Vec::with_capacity(palette.len() * 3);
    for &[r, g, b, _] in &palette {
        plte.extend_from_slice(&[r, g, b]);
    }
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS only when any palette entry is not fully opaque.
    if palette.iter().any(|&[_, _, _, a]| a < 255) {
        let trns: Vec<u8> = palette.iter().map(|&[_, _, _, a]| a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let mut raw = Vec::with_capacity(height * (1 + width));
    for y in 0..height {
        raw.push(0);
        raw.extend_from_slice(&indices[y * width..(y + 1) * width]);
    }
    let idat = deflate(&raw)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

enum ColorType {
    Indexed,
    Rgba,
}

fn write_ihdr(png: &mut Vec<u8>, width: usize, height: usize, color_type: ColorType) {
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(match color_type {
        ColorType::Indexed => 3,
        ColorType::Rgba => 6,
    });
    ihdr.push(0); // compression method
    ihdr.push(0); // filter method
    ihdr.push(0); // interlace method
    write_chunk(png, b"IHDR", &ihdr);
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

fn deflate(raw: &[u8]) -> RenderResult<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(raw)
        .map_err(|e| RenderError::Codec(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Codec(format!("IDAT compression failed: {}", e)))
}

#[inline(always)]
fn pack_color(rgba: &[u8]) -> u32 {
    (rgba[0] as u32) | ((rgba[1] as u32) << 8) | ((rgba[2] as u32) << 16) | ((rgba[3] as u32) << 24)
}

#[inline(always)]
fn unpack_color(packed: u32) -> [u8; 4] {
    [
        packed as u8,
        (packed >> 8) as u8,
        (packed >> 16) as u8,
        (packed >> 24) as u8,
    ]
}

/// Sequential palette extraction. Returns `None` past 256 unique colors.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = pack_color(chunk);
        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push([chunk[0], chunk[1], chunk[2], chunk[3]]);
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel palette extraction for larger buffers: collect unique colors
/// per chunk, merge, then map pixels to indices in parallel.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let pixels_per_chunk = (pixels.len() / 4 / rayon::current_num_threads()).max(256);
    let chunk_size = pixels_per_chunk * 4;

    let unique_colors: Vec<u32> = pixels
        .par_chunks(chunk_size)
        .flat_map(|chunk| {
            let mut local: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for pixel in chunk.chunks_exact(4) {
                local.insert(pack_color(pixel), ());
                if local.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            local.into_keys().collect::<Vec<_>>()
        })
        .collect();

    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    for packed in unique_colors {
        if !color_to_index.contains_key(&packed) {
            if palette.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            color_to_index.insert(packed, palette.len() as u8);
            palette.push(unpack_color(packed));
        }
    }

    let mut indices = vec![0u8; pixels.len() / 4];
    indices
        .par_chunks_mut(pixels_per_chunk)
        .zip(pixels.par_chunks(chunk_size))
        .for_each(|(idx_chunk, pixel_chunk)| {
            for (idx, pixel) in idx_chunk.iter_mut().zip(pixel_chunk.chunks_exact(4)) {
                *idx = *color_to_index.get(&pack_color(pixel)).unwrap_or(&0);
            }
        });

    Some((palette, indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if (x + y) % 2 == 0 {
                    buf.set_pixel(x, y, [255, 0, 0, 255]);
                } else {
                    buf.set_pixel(x, y, [0, 0, 255, 255]);
                }
            }
        }
        buf
    }

    #[test]
    fn test_rgba_png_has_signature_and_ihdr() {
        let png = encode_rgba(&checker(4, 4)).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        // IHDR chunk starts right after the signature.
        assert_eq!(&png[12..16], b"IHDR");
        // Width and height fields.
        assert_eq!(&png[16..20], &4u32.to_be_bytes());
        assert_eq!(&png[20..24], &4u32.to_be_bytes());
        // Color type 6 at offset 16 + 9.
        assert_eq!(png[25], 6);
    }

    #[test]
    fn test_indexed_png_when_palette_fits() {
        let png = encode_indexed(&checker(8, 8)).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        assert_eq!(png[25], 3); // color type 3 = indexed
        assert!(png.windows(4).any(|w| w == b"PLTE"));
    }

    #[test]
    fn test_indexed_falls_back_to_rgba() {
        // More than 256 unique colors.
        let mut buf = PixelBuffer::new(32, 32);
        for y in 0..32 {
            for x in 0..32 {
                buf.set_pixel(x, y, [x as u8 * 8, y as u8 * 8, (x + y) as u8, 255]);
            }
        }
        let png = encode_indexed(&buf).unwrap();
        assert_eq!(png[25], 6);
    }

    #[test]
    fn test_palette_extraction() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            255, 0, 0, 255, // red again
        ];
        let (palette, indices) = extract_palette(&pixels).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_parallel_palette_matches_sequential() {
        let buf = checker(128, 128); // above PARALLEL_THRESHOLD
        let (seq_palette, seq_indices) = extract_palette(buf.data()).unwrap();
        let (par_palette, par_indices) = extract_palette_parallel(buf.data()).unwrap();

        assert_eq!(seq_palette.len(), par_palette.len());
        // Index streams may permute with palette order; resolve both back
        // to colors and compare.
        let seq_colors: Vec<[u8; 4]> =
            seq_indices.iter().map(|&i| seq_palette[i as usize]).collect();
        let par_colors: Vec<[u8; 4]> =
            par_indices.iter().map(|&i| par_palette[i as usize]).collect();
        assert_eq!(seq_colors, par_colors);
    }

    #[test]
    fn test_encoder_rejects_unsupported_formats() {
        let encoder = PngEncoder;
        let buf = checker(2, 2);
        assert!(encoder.encode(&buf, ImageFormat::Png).is_ok());
        assert!(encoder.encode(&buf, ImageFormat::Png8).is_ok());
        let err = encoder.encode(&buf, ImageFormat::Jpeg).unwrap_err();
        assert!(matches!(err, RenderError::Codec(_)));
    }

    #[test]
    fn test_transparent_palette_gets_trns() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.set_pixel(0, 0, [255, 0, 0, 255]);
        // Remaining pixels stay transparent.
        let png = encode_indexed(&buf).unwrap();
        assert!(png.windows(4).any(|w| w == b"tRNS"));
    }
}
