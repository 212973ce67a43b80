//! Code unit allocation for encoded grid cells.

use std::collections::HashMap;

use map_common::{RenderError, RenderResult};

/// First assignable code unit (space).
const FIRST_CODE_UNIT: u32 = 32;

/// Assigns each distinct join value one printable code unit.
///
/// Allocation starts at 32 and steps over the two characters that would
/// break naive JSON-string embedding: `"` (34) and `\` (92). The UTF-16
/// surrogate block (0xD800..=0xDFFF) is also stepped over so every assigned
/// unit is a valid `char`. Assignment order is recorded so `keys[i]` is the
/// value owning the `i`-th allocated unit, which makes the encoding
/// invertible.
#[derive(Debug)]
pub struct CodepointAllocator {
    codes: HashMap<String, char>,
    order: Vec<String>,
    next: Option<u32>,
}

impl Default for CodepointAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodepointAllocator {
    pub fn new() -> Self {
        Self {
            codes: HashMap::new(),
            order: Vec::new(),
            next: Some(FIRST_CODE_UNIT),
        }
    }

    /// Return the code unit for `value`, allocating one on first sight.
    ///
    /// Idempotent: repeated calls with the same value return the same unit.
    /// Exhausting the assignable range is an explicit error, never a silent
    /// wrap.
    pub fn assign(&mut self, value: &str) -> RenderResult<char> {
        if let Some(&code) = self.codes.get(value) {
            return Ok(code);
        }

        let unit = self.next.ok_or_else(|| {
            RenderError::TooManyDistinctKeys(format!(
                "code unit range exhausted after {} distinct values",
                self.order.len()
            ))
        })?;
        // Assigned units never land in the skipped ranges, so this cannot fail.
        let code = char::from_u32(unit)
            .ok_or_else(|| RenderError::Internal(format!("unencodable code unit {}", unit)))?;

        self.codes.insert(value.to_string(), code);
        self.order.push(value.to_string());
        self.next = Self::step(unit);
        Ok(code)
    }

    /// The next assignable unit after `unit`, or `None` once the 16-bit
    /// range is exhausted.
    fn step(unit: u32) -> Option<u32> {
        let mut next = unit + 1;
        if next == 34 {
            next += 1; // skip "
        } else if next == 92 {
            next += 1; // skip backslash
        } else if next == 0xD800 {
            next = 0xE000; // skip the surrogate block
        }
        if next > u16::MAX as u32 {
            None
        } else {
            Some(next)
        }
    }

    /// Values in first-assignment order; index `i` owns the `i`-th unit.
    pub fn key_order(&self) -> &[String] {
        &self.order
    }

    pub fn into_key_order(self) -> Vec<String> {
        self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Invert a code unit back to its `keys` index.
    ///
    /// This is the consumer-side decode used for hover/click lookup: the
    /// adjustments mirror the ranges `step` skips during allocation.
    pub fn decode_index(code: char) -> Option<usize> {
        let unit = code as u32;
        if unit < FIRST_CODE_UNIT || unit == 34 || unit == 92 {
            return None;
        }
        let mut index = unit - FIRST_CODE_UNIT;
        if unit > 34 {
            index -= 1;
        }
        if unit > 92 {
            index -= 1;
        }
        if unit >= 0xE000 {
            index -= 0xE000 - 0xD800;
        }
        Some(index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_assignment_is_space() {
        let mut alloc = CodepointAllocator::new();
        assert_eq!(alloc.assign("").unwrap(), ' ');
        assert_eq!(alloc.key_order(), &["".to_string()]);
    }

    #[test]
    fn test_idempotent() {
        let mut alloc = CodepointAllocator::new();
        let a = alloc.assign("A").unwrap();
        let b = alloc.assign("B").unwrap();
        assert_eq!(alloc.assign("A").unwrap(), a);
        assert_ne!(a, b);
        assert_eq!(alloc.len(), 2);
    }

    #[test]
    fn test_reserved_characters_never_assigned() {
        let mut alloc = CodepointAllocator::new();
        // Allocate enough values to pass both reserved characters.
        for i in 0..100 {
            let code = alloc.assign(&format!("value-{}", i)).unwrap();
            assert_ne!(code, '"');
            assert_ne!(code, '\\');
        }
    }

    #[test]
    fn test_exact_skip_positions() {
        let mut alloc = CodepointAllocator::new();
        // Units 32..=33 assign normally, then 34 is skipped.
        assert_eq!(alloc.assign("v0").unwrap() as u32, 32);
        assert_eq!(alloc.assign("v1").unwrap() as u32, 33);
        assert_eq!(alloc.assign("v2").unwrap() as u32, 35);
    }

    #[test]
    fn test_decode_inverts_assignment() {
        let mut alloc = CodepointAllocator::new();
        for i in 0..200 {
            let value = format!("k{}", i);
            let code = alloc.assign(&value).unwrap();
            let index = CodepointAllocator::decode_index(code).unwrap();
            assert_eq!(alloc.key_order()[index], value);
        }
    }

    #[test]
    fn test_exhaustion_is_explicit() {
        // Drive the allocator to the end of the range and check it fails
        // with TooManyDistinctKeys instead of wrapping.
        let mut alloc = CodepointAllocator::new();
        let mut count = 0usize;
        loop {
            match alloc.assign(&format!("{}", count)) {
                Ok(_) => count += 1,
                Err(RenderError::TooManyDistinctKeys(_)) => break,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
        // 65536 - 32 control/low - 2 reserved - 2048 surrogates
        assert_eq!(count, 65536 - 32 - 2 - 2048);
    }
}
