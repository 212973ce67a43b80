//! Feature-identifier raster buffer and the id-to-join-value table.

use std::collections::HashMap;

/// Cell value meaning "no feature drew here".
pub const NO_HIT: u32 = 0;

/// First identifier handed to a rasterized feature. Identifier 1 is
/// reserved and never assigned.
pub const FIRST_FEATURE_ID: u32 = 2;

/// A dense `width x height` raster of feature identifiers, row-major.
///
/// Lives only for the duration of one grid job: allocated at job start,
/// consumed by the encoder, never exposed outside the job.
#[derive(Debug, Clone, PartialEq)]
pub struct HitBuffer {
    width: u32,
    height: u32,
    cells: Vec<u32>,
}

impl HitBuffer {
    /// Allocate a buffer cleared to [`NO_HIT`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![NO_HIT; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y as usize * self.width as usize + x as usize])
    }

    /// Write an identifier. Out-of-bounds writes are silently clipped, so
    /// the rasterizer does not need to clamp footprints at the edges.
    pub fn set(&mut self, x: u32, y: u32, id: u32) {
        if x < self.width && y < self.height {
            self.cells[y as usize * self.width as usize + x as usize] = id;
        }
    }

    pub fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Reduce resolution by `step`, keeping the top-left cell of every
    /// `step x step` block. `step` must divide both dimensions (validated
    /// upstream at job submission). `step == 1` is a cheap clone.
    pub fn downsample(&self, step: u32) -> HitBuffer {
        if step <= 1 {
            return self.clone();
        }
        let out_w = self.width / step;
        let out_h = self.height / step;
        let mut out = HitBuffer::new(out_w, out_h);
        for y in 0..out_h {
            for x in 0..out_w {
                let id = self.cells
                    [(y * step) as usize * self.width as usize + (x * step) as usize];
                out.set(x, y, id);
            }
        }
        out
    }
}

/// Maps a rasterized feature identifier to its join-field value.
///
/// Built incrementally while features are drawn; read-only once
/// rasterization ends. The no-hit identifier always maps to the empty
/// string.
#[derive(Debug)]
pub struct FeatureKeyTable {
    keys: HashMap<u32, String>,
}

impl Default for FeatureKeyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureKeyTable {
    pub fn new() -> Self {
        let mut keys = HashMap::new();
        keys.insert(NO_HIT, String::new());
        Self { keys }
    }

    /// Record a feature's join value. First write for an id wins.
    pub fn record(&mut self, id: u32, join_value: &str) {
        self.keys.entry(id).or_insert_with(|| join_value.to_string());
    }

    /// The join value for an identifier. Unknown ids resolve to the empty
    /// string, same as no-hit.
    pub fn join_value(&self, id: u32) -> &str {
        self.keys.get(&id).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_all_no_hit() {
        let buf = HitBuffer::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(buf.get(x, y), Some(NO_HIT));
            }
        }
    }

    #[test]
    fn test_set_get_and_clipping() {
        let mut buf = HitBuffer::new(3, 2);
        buf.set(2, 1, 7);
        buf.set(3, 0, 9); // clipped
        buf.set(0, 2, 9); // clipped
        assert_eq!(buf.get(2, 1), Some(7));
        assert_eq!(buf.get(3, 0), None);
        assert_eq!(buf.row(1), &[0, 0, 7]);
    }

    #[test]
    fn test_downsample_keeps_block_corner() {
        let mut buf = HitBuffer::new(4, 4);
        buf.set(0, 0, 2);
        buf.set(2, 2, 3);
        buf.set(1, 1, 4); // not a block corner at step 2, must disappear

        let ds = buf.downsample(2);
        assert_eq!(ds.width(), 2);
        assert_eq!(ds.height(), 2);
        assert_eq!(ds.get(0, 0), Some(2));
        assert_eq!(ds.get(1, 1), Some(3));
        assert_eq!(ds.get(1, 0), Some(NO_HIT));
    }

    #[test]
    fn test_downsample_step_one_is_identity() {
        let mut buf = HitBuffer::new(2, 2);
        buf.set(1, 0, 5);
        assert_eq!(buf.downsample(1), buf);
    }

    #[test]
    fn test_key_table_first_write_wins() {
        let mut table = FeatureKeyTable::new();
        table.record(2, "A");
        table.record(2, "B");
        assert_eq!(table.join_value(2), "A");
        assert_eq!(table.join_value(NO_HIT), "");
        assert_eq!(table.join_value(99), "");
    }
}
