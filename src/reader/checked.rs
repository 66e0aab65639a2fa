//! Validation of a parsed section index against a format description.
//!
//! Checks run in this order, each stopping at its first violation:
//!
//! 1. version: pick the highest `major.minor` sharing the file's major;
//! 2. unknown tags, when the description does not permit them;
//! 3. ordering: `MustBeFirst` against the first section, `MustBeLast`
//!    against the section just before the end section;
//! 4. cardinality of every declared tag.

use log::debug;
use std::collections::HashMap;

use crate::error::{ErrorCode, ReadError, Result};
use crate::schema::{
    Cardinality, FileDescription, FileSectionDescription, FileVersionsDescription,
    SectionOrdering, UnknownSections,
};
use crate::section::{FileSection, SectionIndex};
use crate::tags::to_hex;
use crate::version::Version;

pub struct Validator<'a> {
    file:     &'a str,
    sections: &'a SectionIndex,
}

impl<'a> Validator<'a> {
    pub fn new(file: &'a str, sections: &'a SectionIndex) -> Self {
        Self { file, sections }
    }

    /// Resolve the description for `version` and check the sections against
    /// it.  Returns the description that was used.
    pub fn validate<'v>(
        &self,
        version:  Version,
        versions: &'v FileVersionsDescription,
    ) -> Result<&'v FileDescription> {
        let description = versions
            .best_match(version)
            .ok_or_else(|| self.error_version_not_supported(version, versions))?;
        debug!("{}: validating version {} as {}", self.file, version, description.version());

        self.check_sections_known(description)?;
        self.check_section_ordering(description)?;
        self.check_section_cardinality(description)?;
        Ok(description)
    }

    fn check_sections_known(&self, description: &FileDescription) -> Result<()> {
        match description.sections_unknown() {
            UnknownSections::Permitted    => Ok(()),
            UnknownSections::NotPermitted => {
                let unknown = self.sections.iter().find(|s| {
                    s.tag != description.end_tag() && description.section_by_tag(s.tag).is_none()
                });
                match unknown {
                    Some(section) => Err(self.error_section_unknown(description, section)),
                    None          => Ok(()),
                }
            }
        }
    }

    fn check_section_ordering(&self, description: &FileDescription) -> Result<()> {
        for section in description.sections() {
            match section.ordering {
                SectionOrdering::AnyOrder    => {}
                SectionOrdering::MustBeFirst => {
                    let first = self.sections.first();
                    if first.map(|s| s.tag) != Some(section.tag) {
                        return Err(self.error_ordering(
                            ErrorCode::SectionNotFirst,
                            "The first section is not of the required tag.",
                            section,
                            first,
                        ));
                    }
                }
                SectionOrdering::MustBeLast  => {
                    // Only the end section present: it stands in as the last.
                    let last = self.sections.last_before_end().or_else(|| self.sections.last());
                    if last.map(|s| s.tag) != Some(section.tag) {
                        return Err(self.error_ordering(
                            ErrorCode::SectionNotLast,
                            "The last section is not of the required tag.",
                            section,
                            last,
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn check_section_cardinality(&self, description: &FileDescription) -> Result<()> {
        let mut counts: HashMap<u64, usize> = HashMap::new();
        for section in self.sections {
            *counts.entry(section.tag).or_insert(0) += 1;
        }

        for section in description.sections() {
            let count = counts.get(&section.tag).copied().unwrap_or(0);
            if !section.cardinality.permits(count) {
                return Err(self.error_cardinality(section.tag, section.cardinality, count));
            }
        }
        Ok(())
    }

    // ── Errors ───────────────────────────────────────────────────────────────

    fn error_version_not_supported(
        &self,
        received: Version,
        versions: &FileVersionsDescription,
    ) -> ReadError {
        let supported = versions
            .versions()
            .keys()
            .map(Version::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        ReadError::new(ErrorCode::VersionNotSupported, "File format version is not supported.")
            .with("File", self.file)
            .with("Version", received.to_string())
            .with("Supported", supported)
    }

    fn error_section_unknown(&self, description: &FileDescription, section: &FileSection) -> ReadError {
        let supported = description
            .sections()
            .iter()
            .map(|s| to_hex(s.tag))
            .collect::<Vec<_>>()
            .join(", ");
        ReadError::new(
            ErrorCode::SectionUnknown,
            "A section with an unknown tag was encountered, and unknown tags are not permitted.",
        )
        .with("File", self.file)
        .with("Offset", to_hex(section.offset))
        .with("Tag", to_hex(section.tag))
        .with("Supported", supported)
    }

    fn error_ordering(
        &self,
        code:     ErrorCode,
        message:  &'static str,
        required: &FileSectionDescription,
        received: Option<&FileSection>,
    ) -> ReadError {
        let error = ReadError::new(code, message)
            .with("File", self.file)
            .with("Required Tag", to_hex(required.tag));
        match received {
            Some(s) => error
                .with("Received Tag", to_hex(s.tag))
                .with("Offset", to_hex(s.offset)),
            None => error.with("Received Tag", "none"),
        }
    }

    fn error_cardinality(&self, tag: u64, cardinality: Cardinality, count: usize) -> ReadError {
        ReadError::new(
            ErrorCode::SectionCardinality,
            "Section cardinality violation; too many or too few sections with this tag.",
        )
        .with("File", self.file)
        .with("Tag", to_hex(tag))
        .with("Cardinality", cardinality.to_string())
        .with("Section Count", count.to_string())
    }
}
