//! Declarative format descriptions.
//!
//! A [`FileDescription`] says which section tags one version of a format
//! allows, how many of each, and where they may appear.  A
//! [`FileVersionsDescription`] groups every supported version of one format
//! family.  Both are immutable and check their invariants on construction,
//! so holding one means holding a valid one.

pub mod config;

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::SchemaError;
use crate::tags;
use crate::version::Version;

// ── Rules ────────────────────────────────────────────────────────────────────

/// How many sections with a given tag a file may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    One,
    ZeroToOne,
    ZeroToN,
    OneToN,
}

impl Cardinality {
    /// Whether `count` sections satisfy this cardinality.
    pub fn permits(self, count: usize) -> bool {
        match self {
            Cardinality::One       => count == 1,
            Cardinality::ZeroToOne => count <= 1,
            Cardinality::ZeroToN   => true,
            Cardinality::OneToN    => count >= 1,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cardinality::One       => "ONE",
            Cardinality::ZeroToOne => "ZERO_TO_ONE",
            Cardinality::ZeroToN   => "ZERO_TO_N",
            Cardinality::OneToN    => "ONE_TO_N",
        })
    }
}

/// Where a section with a given tag must appear among the non-end sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionOrdering {
    #[default]
    AnyOrder,
    MustBeFirst,
    MustBeLast,
}

/// Whether sections with undeclared tags are tolerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
pub enum UnknownSections {
    #[serde(rename = "UNKNOWN_SECTIONS_PERMITTED")]
    Permitted,
    #[default]
    #[serde(rename = "UNKNOWN_SECTIONS_NOT_PERMITTED")]
    NotPermitted,
}

// ── FileSectionDescription ───────────────────────────────────────────────────

/// The rules for one section tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FileSectionDescription {
    pub tag:         u64,
    pub cardinality: Cardinality,
    pub ordering:    SectionOrdering,
}

impl FileSectionDescription {
    pub const fn new(tag: u64, cardinality: Cardinality, ordering: SectionOrdering) -> Self {
        Self { tag, cardinality, ordering }
    }

    /// A section that may appear anywhere.
    pub const fn any_order(tag: u64, cardinality: Cardinality) -> Self {
        Self::new(tag, cardinality, SectionOrdering::AnyOrder)
    }
}

// ── FileDescription ──────────────────────────────────────────────────────────

/// One version of a format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescription {
    file_tag:         u64,
    version_major:    u32,
    version_minor:    u32,
    end_tag:          u64,
    sections:         Vec<FileSectionDescription>,
    sections_unknown: UnknownSections,
    #[serde(skip)]
    by_tag:           BTreeMap<u64, usize>,
}

impl FileDescription {
    /// Build a description, checking that:
    /// - at most one section is `MustBeFirst` and at most one `MustBeLast`;
    /// - section tags are pairwise distinct;
    /// - neither the file tag nor the end tag is used as a section tag;
    /// - the file tag differs from the end tag.
    pub fn new(
        file_tag:         u64,
        version_major:    u32,
        version_minor:    u32,
        end_tag:          u64,
        sections:         Vec<FileSectionDescription>,
        sections_unknown: UnknownSections,
    ) -> Result<Self, SchemaError> {
        let firsts = sections.iter().filter(|s| s.ordering == SectionOrdering::MustBeFirst).count();
        if firsts > 1 {
            return Err(SchemaError::MultipleFirst);
        }
        let lasts = sections.iter().filter(|s| s.ordering == SectionOrdering::MustBeLast).count();
        if lasts > 1 {
            return Err(SchemaError::MultipleLast);
        }

        let mut by_tag = BTreeMap::new();
        for (i, section) in sections.iter().enumerate() {
            if by_tag.insert(section.tag, i).is_some() {
                return Err(SchemaError::DuplicateSectionTag(tags::to_hex(section.tag)));
            }
        }
        if by_tag.contains_key(&file_tag) {
            return Err(SchemaError::FileTagIsSectionTag);
        }
        if by_tag.contains_key(&end_tag) {
            return Err(SchemaError::EndTagIsSectionTag);
        }
        if file_tag == end_tag {
            return Err(SchemaError::FileTagEqualsEndTag);
        }

        Ok(Self {
            file_tag,
            version_major,
            version_minor,
            end_tag,
            sections,
            sections_unknown,
            by_tag,
        })
    }

    pub fn file_tag(&self) -> u64 {
        self.file_tag
    }

    pub fn end_tag(&self) -> u64 {
        self.end_tag
    }

    pub fn version_major(&self) -> u32 {
        self.version_major
    }

    pub fn version_minor(&self) -> u32 {
        self.version_minor
    }

    pub fn version(&self) -> Version {
        Version::of_file(self.version_major, self.version_minor)
    }

    /// Section rules in declaration order.
    pub fn sections(&self) -> &[FileSectionDescription] {
        &self.sections
    }

    pub fn sections_unknown(&self) -> UnknownSections {
        self.sections_unknown
    }

    pub fn section_by_tag(&self, tag: u64) -> Option<&FileSectionDescription> {
        self.by_tag.get(&tag).map(|&i| &self.sections[i])
    }

    /// Declared section tags in ascending order.
    pub fn section_tags(&self) -> impl Iterator<Item = u64> + '_ {
        self.by_tag.keys().copied()
    }
}

// ── FileVersionsDescription ──────────────────────────────────────────────────

/// Every supported version of one format family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileVersionsDescription {
    file_tag: u64,
    end_tag:  u64,
    versions: BTreeMap<Version, FileDescription>,
}

impl FileVersionsDescription {
    /// Build a family, checking that it is non-empty, that versions are
    /// pairwise distinct, and that every member shares one file tag and one
    /// end tag.
    pub fn new(descriptions: Vec<FileDescription>) -> Result<Self, SchemaError> {
        let first = descriptions.first().ok_or(SchemaError::NoVersions)?;
        let (file_tag, end_tag) = (first.file_tag, first.end_tag);

        let mut versions = BTreeMap::new();
        let mut file_tags = HashSet::new();
        let mut end_tags = HashSet::new();
        for description in descriptions {
            file_tags.insert(description.file_tag);
            end_tags.insert(description.end_tag);
            let version = description.version();
            if versions.insert(version, description).is_some() {
                return Err(SchemaError::DuplicateVersion(version.to_string()));
            }
        }
        if file_tags.len() != 1 {
            return Err(SchemaError::MixedFileTags);
        }
        if end_tags.len() != 1 {
            return Err(SchemaError::MixedEndTags);
        }
        Ok(Self { file_tag, end_tag, versions })
    }

    /// All members, ordered by version.
    pub fn versions(&self) -> &BTreeMap<Version, FileDescription> {
        &self.versions
    }

    pub fn file_tag(&self) -> u64 {
        self.file_tag
    }

    pub fn end_tag(&self) -> u64 {
        self.end_tag
    }

    /// The member with the greatest version sharing `version.major`.
    pub fn best_match(&self, version: Version) -> Option<&FileDescription> {
        let low = Version::new(version.major, 0, 0);
        let high = Version::new(version.major, u32::MAX, u32::MAX);
        self.versions.range(low..=high).next_back().map(|(_, d)| d)
    }
}
