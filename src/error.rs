//! Error types for section readers and format descriptions.
//!
//! Every reader failure is a [`ReadError`]: a human-readable message, a
//! stable machine-readable [`ErrorCode`], and an ordered set of named
//! diagnostic attributes (file name, offsets and tags in unsigned
//! hexadecimal, counts, supported values).  Lower-level I/O failures are
//! kept as the error's `source`.
//!
//! Format descriptions report invariant violations at construction time
//! through [`SchemaError`].

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use thiserror::Error;

// ── ErrorCode ────────────────────────────────────────────────────────────────

/// Stable discriminator for a [`ReadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The byte source could not be released cleanly.
    Resources,
    /// A lower-level I/O failure that is not an "insufficient data" condition.
    Io,
    /// The caller asked for identical file and end tags.
    FileTagEqualsEndTag,
    FileTagMissing,
    FileTagIncorrect,
    VersionMajorMissing,
    VersionMinorMissing,
    /// The stream ended before a section carrying the end tag was seen.
    FileEndMissing,
    SectionNotPresent,
    VersionNotSupported,
    SectionUnknown,
    SectionNotFirst,
    SectionNotLast,
    SectionCardinality,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Resources           => "error-resources",
            ErrorCode::Io                  => "error-io",
            ErrorCode::FileTagEqualsEndTag => "error-file-tag-equals-end-tag",
            ErrorCode::FileTagMissing      => "error-file-tag-missing",
            ErrorCode::FileTagIncorrect    => "error-file-tag-incorrect",
            ErrorCode::VersionMajorMissing => "error-file-version-major-missing",
            ErrorCode::VersionMinorMissing => "error-file-version-minor-missing",
            ErrorCode::FileEndMissing      => "error-file-end-missing",
            ErrorCode::SectionNotPresent   => "error-file-section-not-present",
            ErrorCode::VersionNotSupported => "error-file-version-not-supported",
            ErrorCode::SectionUnknown      => "error-section-tag-unknown",
            ErrorCode::SectionNotFirst     => "error-section-tag-first",
            ErrorCode::SectionNotLast      => "error-section-tag-last",
            ErrorCode::SectionCardinality  => "error-section-tag-cardinality",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ReadError ────────────────────────────────────────────────────────────────

/// The single structured error produced by readers.
#[derive(Error, Debug)]
pub struct ReadError {
    code:       ErrorCode,
    message:    &'static str,
    attributes: BTreeMap<&'static str, String>,
    #[source]
    source:     Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ReadError {
    pub fn new(code: ErrorCode, message: &'static str) -> Self {
        Self {
            code,
            message,
            attributes: BTreeMap::new(),
            source:     None,
        }
    }

    /// Attach a named diagnostic attribute.
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value.into());
        self
    }

    /// Attach the lower-level failure that caused this error.
    pub fn caused_by<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(cause));
        self
    }

    /// Wrap an I/O failure that has no more specific classification.
    pub fn io(file: &str, cause: io::Error) -> Self {
        Self::new(ErrorCode::Io, "I/O error.")
            .with("File", file)
            .caused_by(cause)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn attributes(&self) -> &BTreeMap<&'static str, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        for (name, value) in &self.attributes {
            write!(f, "\n  {name:<14} {value}")?;
        }
        if let Some(ref source) = self.source {
            write!(f, "\n  {:<14} {source}", "Cause")?;
        }
        Ok(())
    }
}

/// Convenience alias for reader results.
pub type Result<T> = std::result::Result<T, ReadError>;

// ── SchemaError ──────────────────────────────────────────────────────────────

/// Violations of format-description invariants, reported on construction.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("At most one section can be marked as being 'first'")]
    MultipleFirst,
    #[error("At most one section can be marked as being 'last'")]
    MultipleLast,
    #[error("Section tags must be unique ({0} is not)")]
    DuplicateSectionTag(String),
    #[error("The file tag cannot also be used as a section tag")]
    FileTagIsSectionTag,
    #[error("The end tag cannot also be used as a section tag")]
    EndTagIsSectionTag,
    #[error("The file tag and end tag must be different")]
    FileTagEqualsEndTag,
    #[error("Must specify at least one file version description")]
    NoVersions,
    #[error("File format versions must be unique ({0} is not)")]
    DuplicateVersion(String),
    #[error("All file format versions must use the same file tag")]
    MixedFileTags,
    #[error("All file format versions must use the same end tag")]
    MixedEndTags,
    #[error("Invalid tag text {text:?}: {reason}")]
    InvalidTag { text: String, reason: &'static str },
    #[error("Malformed format description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_attributes() {
        let err = ReadError::new(ErrorCode::FileTagIncorrect, "Incorrect file tag.")
            .with("Expected", "0x10")
            .with("Received", "0x23");
        let text = err.to_string();
        assert!(text.starts_with("error-file-tag-incorrect: Incorrect file tag."));
        assert!(text.contains("Expected"));
        assert!(text.contains("0x23"));
        assert_eq!(err.attribute("Received"), Some("0x23"));
    }

    #[test]
    fn io_errors_keep_their_cause() {
        use std::error::Error as _;
        let err = ReadError::io("urn:x", io::Error::new(io::ErrorKind::Other, "device gone"));
        assert_eq!(err.code(), ErrorCode::Io);
        assert!(err.source().is_some());
        assert_eq!(err.attribute("File"), Some("urn:x"));
    }
}
