//! Loading format descriptions from JSON.
//!
//! ```json
//! {
//!   "descriptions": [
//!     {
//!       "file_tag": "0x1010101020202020",
//!       "end_tag": "SECT_END",
//!       "version_major": 1,
//!       "version_minor": 0,
//!       "sections_unknown": "UNKNOWN_SECTIONS_PERMITTED",
//!       "sections": [
//!         { "tag": "HEADER!!", "cardinality": "ONE", "ordering": "MUST_BE_FIRST" },
//!         { "tag": 12297829382473034410, "cardinality": "ZERO_TO_N" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Tags may be JSON integers, `0x`-prefixed hex strings, or eight ASCII
//! characters.  `ordering` defaults to `ANY_ORDER`; `sections_unknown`
//! defaults to `UNKNOWN_SECTIONS_NOT_PERMITTED`.  Everything is routed
//! through the checking constructors, so a loaded description is valid.

use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

use super::{
    Cardinality, FileDescription, FileSectionDescription, FileVersionsDescription,
    SectionOrdering, UnknownSections,
};
use crate::error::SchemaError;
use crate::tags;

#[derive(Deserialize)]
#[serde(untagged)]
enum TagRaw {
    Number(u64),
    Text(String),
}

impl TagRaw {
    fn resolve(self) -> Result<u64, SchemaError> {
        match self {
            TagRaw::Number(n) => Ok(n),
            TagRaw::Text(t)   => tags::parse(&t),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSectionDescriptionRaw {
    tag:         TagRaw,
    cardinality: Cardinality,
    #[serde(default)]
    ordering:    SectionOrdering,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FileDescriptionRaw {
    file_tag:         TagRaw,
    end_tag:          TagRaw,
    version_major:    u32,
    version_minor:    u32,
    #[serde(default)]
    sections:         Vec<FileSectionDescriptionRaw>,
    #[serde(default)]
    sections_unknown: UnknownSections,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FileVersionsDescriptionRaw {
    descriptions: Vec<FileDescriptionRaw>,
}

impl FileDescriptionRaw {
    fn build(self) -> Result<FileDescription, SchemaError> {
        let sections = self
            .sections
            .into_iter()
            .map(|s| Ok(FileSectionDescription::new(s.tag.resolve()?, s.cardinality, s.ordering)))
            .collect::<Result<Vec<_>, SchemaError>>()?;
        FileDescription::new(
            self.file_tag.resolve()?,
            self.version_major,
            self.version_minor,
            self.end_tag.resolve()?,
            sections,
            self.sections_unknown,
        )
    }
}

impl<'de> Deserialize<'de> for FileDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        FileDescriptionRaw::deserialize(deserializer)?
            .build()
            .map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for FileVersionsDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = FileVersionsDescriptionRaw::deserialize(deserializer)?;
        let descriptions = raw
            .descriptions
            .into_iter()
            .map(FileDescriptionRaw::build)
            .collect::<Result<Vec<_>, SchemaError>>()
            .map_err(serde::de::Error::custom)?;
        FileVersionsDescription::new(descriptions).map_err(serde::de::Error::custom)
    }
}

impl FileVersionsDescription {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, SchemaError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let bytes = fs::read(path)?;
        Self::from_json_slice(&bytes)
    }
}
