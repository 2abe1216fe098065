//! Value-to-label enumeration tables.
//!
//! Entries keep their configuration order because the display index of a
//! choice widget is the entry's position. Keys parse as hexadecimal the way
//! `strtoull(_, _, 16)` reads them: optional leading whitespace, optional
//! `0x`, then a greedy digit run. A key with no digits at all is malformed
//! and joins the shared bad-value slot instead of being dropped, so the
//! entry stays selectable.

use ahash::AHashSet;
use smallvec::SmallVec;

use crate::panel::literal::scan_hex_u64;

/// Sentinel key used when every candidate in `0..=0xFFFE` is taken. Field
/// widths are at most 16 bits in practice, so this is not expected to be
/// reachable; builders flag it instead of failing.
pub const SENTINEL_FALLBACK: u64 = 0xFFFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub key: u64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumTable {
    entries: Vec<EnumEntry>,
    bad_index: Option<usize>,
    sentinel_fallback: bool,
}

impl EnumTable {
    /// Builds a table from `(key, label)` pairs in their given order.
    ///
    /// All malformed keys are remapped to one synthetic sentinel key (the
    /// smallest 16-bit value absent from the real keys); the first malformed
    /// entry's position becomes the canonical bad-value slot.
    pub fn from_pairs<I, K, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: AsRef<str>,
        L: Into<String>,
    {
        let mut entries = Vec::new();
        let mut real_keys = AHashSet::new();
        let mut bad_slots: SmallVec<[usize; 2]> = SmallVec::new();

        for (key, label) in pairs {
            match scan_hex_u64(key.as_ref()) {
                Some(parsed) => {
                    real_keys.insert(parsed);
                    entries.push(EnumEntry {
                        key: parsed,
                        label: label.into(),
                    });
                }
                None => {
                    bad_slots.push(entries.len());
                    entries.push(EnumEntry {
                        key: 0,
                        label: label.into(),
                    });
                }
            }
        }

        let bad_index = bad_slots.first().copied();
        let mut sentinel_fallback = false;
        if !bad_slots.is_empty() {
            let sentinel = (0..SENTINEL_FALLBACK)
                .find(|candidate| !real_keys.contains(candidate))
                .unwrap_or_else(|| {
                    sentinel_fallback = true;
                    SENTINEL_FALLBACK
                });
            for &slot in &bad_slots {
                entries[slot].key = sentinel;
            }
        }

        Self {
            entries,
            bad_index,
            sentinel_fallback,
        }
    }

    /// Two-entry table for `bool` fields.
    pub fn bool_table() -> Self {
        Self::from_pairs([("0", "false"), ("1", "true")])
    }

    /// Two-entry table for `invbool` fields.
    pub fn invbool_table() -> Self {
        Self::from_pairs([("0", "true"), ("1", "false")])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[EnumEntry] {
        &self.entries
    }

    /// Display index of the bad-value slot, if any malformed key existed.
    pub fn bad_index(&self) -> Option<usize> {
        self.bad_index
    }

    /// True when the sentinel search ran out of free 16-bit keys.
    pub fn sentinel_fallback(&self) -> bool {
        self.sentinel_fallback
    }

    /// Display index for a runtime field value: the first entry with a
    /// matching key, else the bad-value slot, else `None` (the caller keeps
    /// its current selection; the numeric storage stays authoritative).
    pub fn lookup(&self, value: u64) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.key == value)
            .or(self.bad_index)
    }

    pub fn key_at(&self, index: usize) -> Option<u64> {
        self.entries.get(index).map(|entry| entry.key)
    }

    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let table = EnumTable::from_pairs([("2", "two"), ("0", "zero"), ("1", "one")]);
        let keys: Vec<u64> = table.entries().iter().map(|e| e.key).collect();
        assert_eq!(keys, [2, 0, 1]);
        assert_eq!(table.lookup(0), Some(1), "display index follows order");
    }

    #[test]
    fn keys_are_hexadecimal() {
        let table = EnumTable::from_pairs([("10", "sixteen"), ("0x20", "thirty-two")]);
        assert_eq!(table.key_at(0), Some(0x10));
        assert_eq!(table.key_at(1), Some(0x20));
    }

    #[test]
    fn single_malformed_key_gets_smallest_free_sentinel() {
        let table = EnumTable::from_pairs([("0", "a"), ("1", "b"), ("xyz", "bad")]);
        assert_eq!(table.bad_index(), Some(2));
        assert_eq!(table.key_at(2), Some(2), "smallest unused 16-bit value");
        assert!(!table.sentinel_fallback());
    }

    #[test]
    fn multiple_malformed_keys_share_one_slot() {
        let table =
            EnumTable::from_pairs([("zzz", "first bad"), ("0", "a"), ("!!", "second bad")]);
        assert_eq!(table.bad_index(), Some(0), "first malformed entry wins");
        assert_eq!(table.key_at(0), table.key_at(2), "sentinel key is shared");
        assert_eq!(table.key_at(0), Some(1), "0 is taken, 1 is free");
    }

    #[test]
    fn lookup_falls_back_to_bad_slot() {
        let table = EnumTable::from_pairs([("0", "a"), ("1", "b"), ("xyz", "bad")]);
        assert_eq!(table.lookup(1), Some(1));
        assert_eq!(table.lookup(0x99), Some(2), "unknown value selects bad slot");
    }

    #[test]
    fn lookup_without_bad_slot_misses() {
        let table = EnumTable::from_pairs([("0", "a"), ("1", "b")]);
        assert_eq!(table.lookup(0x99), None);
    }

    #[test]
    fn bool_tables_invert_cleanly() {
        assert_eq!(EnumTable::bool_table().lookup(1), Some(1));
        assert_eq!(EnumTable::bool_table().label_at(1), Some("true"));
        assert_eq!(EnumTable::invbool_table().label_at(0), Some("true"));
        assert_eq!(EnumTable::invbool_table().lookup(1), Some(1));
    }

    #[test]
    fn exhausted_sentinel_space_uses_fallback() {
        let mut pairs: Vec<(String, String)> = (0..SENTINEL_FALLBACK)
            .map(|k| (format!("{k:x}"), format!("v{k}")))
            .collect();
        pairs.push(("not hex".to_string(), "bad".to_string()));
        let table = EnumTable::from_pairs(pairs);
        assert!(table.sentinel_fallback());
        assert_eq!(table.key_at(table.bad_index().expect("bad slot")), Some(SENTINEL_FALLBACK));
    }

    #[test]
    fn bare_0x_parses_as_zero() {
        // strtoull consumes the leading 0 of "0x" when no digit follows.
        let table = EnumTable::from_pairs([("0x", "zeroish")]);
        assert_eq!(table.key_at(0), Some(0));
        assert_eq!(table.bad_index(), None);
    }

    #[test]
    fn partial_parse_keeps_leading_digits() {
        let table = EnumTable::from_pairs([("1z", "one-ish")]);
        assert_eq!(table.key_at(0), Some(1));
        assert_eq!(table.bad_index(), None);
    }
}
