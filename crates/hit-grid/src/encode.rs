//! Row-by-row encoding of a hit buffer into JSON-embeddable strings.

use map_common::RenderResult;
use tracing::debug;

use crate::buffer::{FeatureKeyTable, HitBuffer};
use crate::codepoint::CodepointAllocator;

/// Encode a hit buffer into one string per row plus the ordered key array.
///
/// Each cell's identifier resolves through the key table to its join value
/// (no-hit and unknown ids resolve to the empty string), and each distinct
/// join value owns one code unit. Rows have no internal delimiters and all
/// have the same character length, so `grid` drops straight into a JSON
/// array of strings.
///
/// Output is deterministic: for a fixed buffer and table, the strings and
/// key order are bit-for-bit reproducible. An entirely empty buffer still
/// yields `height` rows of the no-hit code unit and a key array containing
/// the empty string.
pub fn encode_grid(
    buf: &HitBuffer,
    table: &FeatureKeyTable,
) -> RenderResult<(Vec<String>, Vec<String>)> {
    let mut allocator = CodepointAllocator::new();
    let mut grid = Vec::with_capacity(buf.height() as usize);

    for y in 0..buf.height() {
        let mut row = String::with_capacity(buf.width() as usize);
        for &id in buf.row(y) {
            let code = allocator.assign(table.join_value(id))?;
            row.push(code);
        }
        grid.push(row);
    }

    debug!(
        rows = grid.len(),
        distinct_keys = allocator.len(),
        "encoded hit grid"
    );

    Ok((grid, allocator.into_key_order()))
}
