//! Scanline rasterization of feature identifiers into a hit buffer.

use map_common::{Extent, Geometry};

use crate::buffer::HitBuffer;

/// Maps map-SRS coordinates onto raster pixel coordinates.
///
/// Pixel y grows downward: the extent's max_y edge is row 0. A degenerate
/// (zero-area) extent collapses to scale 0, which pins every coordinate to
/// the first row/column instead of dividing by zero.
#[derive(Debug, Clone, Copy)]
pub struct RasterTransform {
    extent: Extent,
    scale_x: f64,
    scale_y: f64,
}

impl RasterTransform {
    pub fn new(extent: Extent, width: u32, height: u32) -> Self {
        let scale_x = if extent.width() > 0.0 {
            width as f64 / extent.width()
        } else {
            0.0
        };
        let scale_y = if extent.height() > 0.0 {
            height as f64 / extent.height()
        } else {
            0.0
        };
        Self {
            extent,
            scale_x,
            scale_y,
        }
    }

    /// Map coordinates to fractional pixel coordinates.
    pub fn forward(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.extent.min_x) * self.scale_x,
            (self.extent.max_y - y) * self.scale_y,
        )
    }
}

/// Rasterize one geometry with the given feature identifier.
///
/// Coordinates must already be in the map SRS. Later calls overwrite
/// earlier cells, so the buffer ends up holding the feature last drawn at
/// each cell. Point geometries get a filled circular footprint of
/// `point_radius` pixels; a one-pixel hit target is unusable for
/// interaction.
pub fn rasterize_feature(
    buf: &mut HitBuffer,
    tr: &RasterTransform,
    geometry: &Geometry,
    id: u32,
    point_radius: u32,
) {
    match geometry {
        Geometry::Point { x, y } => {
            let (px, py) = tr.forward(*x, *y);
            fill_circle(buf, px, py, point_radius, id);
        }
        Geometry::LineString(points) => {
            let pixels: Vec<(f64, f64)> = points.iter().map(|p| tr.forward(p[0], p[1])).collect();
            for pair in pixels.windows(2) {
                draw_line(buf, pair[0], pair[1], id);
            }
        }
        Geometry::Polygon { exterior } => {
            let pixels: Vec<(f64, f64)> = exterior.iter().map(|p| tr.forward(p[0], p[1])).collect();
            fill_polygon(buf, &pixels, id);
        }
    }
}

/// Filled circle of radius `r` centered on fractional pixel coordinates.
fn fill_circle(buf: &mut HitBuffer, cx: f64, cy: f64, r: u32, id: u32) {
    let r = r as i64;
    let cx = cx.round() as i64;
    let cy = cy.round() as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                let x = cx + dx;
                let y = cy + dy;
                if x >= 0 && y >= 0 {
                    buf.set(x as u32, y as u32, id);
                }
            }
        }
    }
}

/// Bresenham line between two fractional pixel coordinates.
fn draw_line(buf: &mut HitBuffer, from: (f64, f64), to: (f64, f64), id: u32) {
    let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 {
            buf.set(x0 as u32, y0 as u32, id);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Even-odd scanline fill of a closed ring in pixel coordinates.
///
/// The ring is treated as implicitly closed; cells are covered when their
/// center falls inside the ring.
fn fill_polygon(buf: &mut HitBuffer, ring: &[(f64, f64)], id: u32) {
    if ring.len() < 3 {
        return;
    }

    let mut crossings: Vec<f64> = Vec::new();
    for y in 0..buf.height() {
        let sample_y = y as f64 + 0.5;
        crossings.clear();

        for i in 0..ring.len() {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % ring.len()];
            if (y0 <= sample_y && sample_y < y1) || (y1 <= sample_y && sample_y < y0) {
                let t = (sample_y - y0) / (y1 - y0);
                crossings.push(x0 + t * (x1 - x0));
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));

        for pair in crossings.chunks_exact(2) {
            // Cells whose center x + 0.5 lies in [pair[0], pair[1]); a
            // center exactly on the right crossing stays outside.
            let start = (pair[0] - 0.5).ceil().max(0.0) as i64;
            let end = ((pair[1] - 0.5).ceil() as i64 - 1).min(buf.width() as i64 - 1);
            for x in start..=end {
                if x >= 0 {
                    buf.set(x as u32, y, id);
                }
            }
        }
    }
}
