//! Guarded 64-bit mask arithmetic shared by field extraction and merge.
//!
//! Shift amounts of 64 or more yield zero instead of tripping the debug
//! overflow checks, so a full-width range (`high = 63`, `low = 0`) behaves
//! like any other.

fn lshift(value: u64, shift: u32) -> u64 {
    if shift >= 64 { 0 } else { value << shift }
}

fn rshift(value: u64, shift: u32) -> u64 {
    if shift >= 64 { 0 } else { value >> shift }
}

/// Contiguous run of `high - low + 1` one-bits at the low end of the word.
/// Callers guarantee `high >= low`; both are bit indexes in `0..=63`.
pub fn mask(high: u8, low: u8) -> u64 {
    !lshift(u64::MAX, (high - low + 1) as u32)
}

/// Reads the field covering bits `low..=high` out of `full`.
pub fn extract(full: u64, high: u8, low: u8) -> u64 {
    rshift(full, low as u32) & mask(high, low)
}

/// Writes `field` into bits `low..=high` of `full`, leaving every other bit
/// untouched. Excess high bits of `field` are truncated to the span width.
pub fn merge(full: u64, high: u8, low: u8, field: u64) -> u64 {
    let span = lshift(mask(high, low), low as u32);
    (full & !span) | (lshift(field & mask(high, low), low as u32))
}
