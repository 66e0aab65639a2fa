//! Sections discovered in a file, and the ordered index that holds them.
//!
//! # On-disk layout of one section
//!
//! | Offset | Size       | Field                                  |
//! |--------|------------|----------------------------------------|
//! | 0      | 8          | tag (u64 BE)                           |
//! | 8      | 8          | data size (u64 BE)                     |
//! | 16     | data size  | payload                                |
//! | …      | 0–15       | padding up to the next 16-byte boundary |

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Byte length of every section header (tag + data size).
pub const SECTION_HEADER_SIZE: u64 = 16;

/// Alignment of every section header within a file.
pub const SECTION_ALIGNMENT: u64 = 16;

// ── FileSection ──────────────────────────────────────────────────────────────

/// One section located by scanning a file.
///
/// Equality covers every field.  Ordering is by `offset` first; since no two
/// sections of one file share an offset, iteration order is file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FileSection {
    pub tag:       u64,
    pub offset:    u64,
    pub data_size: u64,
}

impl FileSection {
    pub const fn new(tag: u64, offset: u64, data_size: u64) -> Self {
        Self { tag, offset, data_size }
    }

    /// Absolute offset of the first payload byte.
    pub const fn data_offset(&self) -> u64 {
        self.offset + SECTION_HEADER_SIZE
    }
}

impl Ord for FileSection {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset
            .cmp(&other.offset)
            .then(self.tag.cmp(&other.tag))
            .then(self.data_size.cmp(&other.data_size))
    }
}

impl PartialOrd for FileSection {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ── SectionIndex ─────────────────────────────────────────────────────────────

/// The offset-ordered set of sections found in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionIndex {
    sections: BTreeSet<FileSection>,
}

impl SectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if an equal section was already present.
    pub(crate) fn insert(&mut self, section: FileSection) -> bool {
        self.sections.insert(section)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn contains(&self, section: &FileSection) -> bool {
        self.sections.contains(section)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &FileSection> + '_ {
        self.sections.iter()
    }

    /// Lowest-offset section.
    pub fn first(&self) -> Option<&FileSection> {
        self.sections.first()
    }

    /// Highest-offset section.  For a successfully opened file this is the
    /// end section.
    pub fn last(&self) -> Option<&FileSection> {
        self.sections.last()
    }

    /// The section immediately preceding the last one.
    pub fn last_before_end(&self) -> Option<&FileSection> {
        self.sections.iter().rev().nth(1)
    }

    /// All sections carrying `tag`, in file order.
    pub fn with_tag(&self, tag: u64) -> impl Iterator<Item = &FileSection> + '_ {
        self.sections.iter().filter(move |s| s.tag == tag)
    }

    pub fn count_of(&self, tag: u64) -> usize {
        self.with_tag(tag).count()
    }
}

impl<'a> IntoIterator for &'a SectionIndex {
    type Item     = &'a FileSection;
    type IntoIter = std::collections::btree_set::Iter<'a, FileSection>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(sections: &[(u64, u64, u64)]) -> SectionIndex {
        let mut index = SectionIndex::new();
        for &(tag, offset, size) in sections {
            index.insert(FileSection::new(tag, offset, size));
        }
        index
    }

    #[test]
    fn data_offset_follows_header() {
        assert_eq!(FileSection::new(1, 16, 0).data_offset(), 32);
        assert_eq!(FileSection::new(1, 112, 9).data_offset(), 128);
    }

    #[test]
    fn iteration_is_by_offset() {
        let index = index(&[(0xC, 80, 6), (0xA, 16, 12), (0xE, 112, 0), (0xB, 48, 4)]);
        let offsets: Vec<u64> = index.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![16, 48, 80, 112]);
        assert_eq!(index.first().map(|s| s.tag), Some(0xA));
        assert_eq!(index.last().map(|s| s.tag), Some(0xE));
        assert_eq!(index.last_before_end().map(|s| s.tag), Some(0xC));
    }

    #[test]
    fn membership_uses_every_field() {
        let index = index(&[(0xA, 16, 12)]);
        assert!(index.contains(&FileSection::new(0xA, 16, 12)));
        assert!(!index.contains(&FileSection::new(0xA, 16, 13)));
        assert!(!index.contains(&FileSection::new(0xB, 16, 12)));
        assert!(!index.contains(&FileSection::new(0, 0, 0)));
    }

    #[test]
    fn offsets_compare_unsigned() {
        let index = index(&[(0xA, u64::MAX - 15, 0), (0xB, 16, 0)]);
        assert_eq!(index.first().map(|s| s.tag), Some(0xB));
    }

    #[test]
    fn tag_counts() {
        let index = index(&[(0xA, 16, 0), (0xB, 32, 0), (0xA, 48, 0), (0xE, 64, 0)]);
        assert_eq!(index.count_of(0xA), 2);
        assert_eq!(index.count_of(0xC), 0);
        assert_eq!(index.with_tag(0xA).map(|s| s.offset).collect::<Vec<_>>(), vec![16, 48]);
    }

    #[test]
    fn single_entry_has_nothing_before_end() {
        let index = index(&[(0xE, 16, 0)]);
        assert!(index.last_before_end().is_none());
    }
}
