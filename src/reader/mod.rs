//! Section readers.
//!
//! # Unchecked open
//! [`FileReader::open`] takes ownership of a [`ByteSource`], checks the
//! leading file tag, reads the `major.minor` version, then walks every
//! section from offset 16 until one carries the end tag.  Nothing about the
//! section tags themselves is interpreted.
//!
//! # Checked open
//! [`FileReader::open_checked`] does the same walk and then validates the
//! resulting index against the best-matching member of a
//! [`FileVersionsDescription`]; see [`checked`].
//!
//! # File layout
//!
//! | Offset | Size | Field                     |
//! |--------|------|---------------------------|
//! | 0      | 8    | file tag (u64 BE)         |
//! | 8      | 4    | version major (u32 BE)    |
//! | 12     | 4    | version minor (u32 BE)    |
//! | 16     | …    | sections, up to end tag   |
//!
//! Bytes after the first end section are never examined.
//!
//! # Resources
//! A failed open releases the source before returning the error.  A
//! successful open owns the source until [`FileReader::close`]; dropping an
//! unclosed reader releases it too, logging any failure instead of
//! reporting it.

pub mod checked;

use log::{debug, info, trace, warn};
use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::{ErrorCode, ReadError, Result};
use crate::io_stream::{BinaryCursor, ByteSource, SectionView};
use crate::schema::{FileDescription, FileVersionsDescription};
use crate::section::{FileSection, SectionIndex, SECTION_ALIGNMENT};
use crate::tags::to_hex;
use crate::version::Version;

/// Size of the fixed file header; the first section starts here.
pub const FILE_HEADER_SIZE: u64 = 16;

/// Diagnostic name used when the caller does not supply one.
pub const UNNAMED_SOURCE: &str = "<stream>";

// ── FileReader ───────────────────────────────────────────────────────────────

pub struct FileReader<S: ByteSource> {
    name:        String,
    file_tag:    u64,
    end_tag:     u64,
    cursor:      BinaryCursor<S>,
    sections:    SectionIndex,
    version:     Version,
    description: Option<FileDescription>,
    released:    bool,
}

impl<S: ByteSource> FileReader<S> {
    // ── Constructors ─────────────────────────────────────────────────────────

    pub fn open(source: S, file_tag: u64, end_tag: u64) -> Result<Self> {
        Self::open_named(UNNAMED_SOURCE, source, file_tag, end_tag)
    }

    /// Open with `name` used as the `File` attribute of every error.
    pub fn open_named(
        name:     impl Into<String>,
        source:   S,
        file_tag: u64,
        end_tag:  u64,
    ) -> Result<Self> {
        let mut reader = Self {
            name:        name.into(),
            file_tag,
            end_tag,
            cursor:      BinaryCursor::new(source),
            sections:    SectionIndex::new(),
            version:     Version::of_file(0, 0),
            description: None,
            released:    false,
        };

        match reader.start() {
            Ok(()) => {
                info!(
                    "Opened {}: version {}, {} section(s)",
                    reader.name,
                    reader.version,
                    reader.sections.len()
                );
                Ok(reader)
            }
            Err(e) => Err(reader.abandon(e)),
        }
    }

    /// Open, then validate the sections against the member of `versions`
    /// that best matches the file's version.
    pub fn open_checked(
        name:     impl Into<String>,
        source:   S,
        file_tag: u64,
        end_tag:  u64,
        versions: &FileVersionsDescription,
    ) -> Result<Self> {
        let mut reader = Self::open_named(name, source, file_tag, end_tag)?;
        let validated = checked::Validator::new(&reader.name, &reader.sections)
            .validate(reader.version, versions)
            .map(FileDescription::clone);

        match validated {
            Ok(description) => {
                reader.description = Some(description);
                Ok(reader)
            }
            Err(e) => Err(reader.abandon(e)),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    /// Sections in file order.  Never empty; the last one carries the end tag.
    pub fn sections(&self) -> &SectionIndex {
        &self.sections
    }

    pub fn file_tag(&self) -> u64 {
        self.file_tag
    }

    pub fn end_tag(&self) -> u64 {
        self.end_tag
    }

    /// The file's `major.minor` version (patch is always zero).
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The description the file was validated against, for checked readers.
    pub fn description(&self) -> Option<&FileDescription> {
        self.description.as_ref()
    }

    // ── Data access ──────────────────────────────────────────────────────────

    /// A bounded view of `section`'s payload.  `section` must be one of this
    /// reader's sections.
    pub fn data_channel(&mut self, section: &FileSection) -> Result<SectionView<'_, S>> {
        if !self.sections.contains(section) {
            return Err(self.error_no_such_section(section));
        }
        let name = &self.name;
        SectionView::new(self.cursor.get_mut(), section.data_offset(), section.data_size)
            .map_err(|e| ReadError::io(name, e).with("Offset", to_hex(section.data_offset())))
    }

    /// Read the whole payload of `section` into memory.
    pub fn read_section(&mut self, section: &FileSection) -> Result<Vec<u8>> {
        let tag = to_hex(section.tag);
        let offset = to_hex(section.offset);
        let name = self.name.clone();
        let mut view = self.data_channel(section)?;
        view.read_remaining().map_err(|e| {
            ReadError::io(&name, e)
                .with("Tag", tag)
                .with("Offset", offset)
        })
    }

    // ── Closing ──────────────────────────────────────────────────────────────

    /// Release the byte source.
    pub fn close(mut self) -> Result<()> {
        self.released = true;
        self.cursor.release().map_err(|e| self.error_resources(e))?;
        info!("Closed {}", self.name);
        Ok(())
    }

    /// Release after a failed open.  A release failure replaces `error`.
    fn abandon(mut self, error: ReadError) -> ReadError {
        self.released = true;
        debug!("Open of {} failed: {}", self.name, error.code());
        match self.cursor.release() {
            Ok(())   => error,
            Err(e) => {
                warn!("Failed to release {} after {}: {}", self.name, error.code(), e);
                self.error_resources(e)
                    .with("Suppressed", format!("{}: {}", error.code(), error.message()))
            }
        }
    }

    // ── Parsing ──────────────────────────────────────────────────────────────

    fn start(&mut self) -> Result<()> {
        if self.file_tag == self.end_tag {
            return Err(ReadError::new(
                ErrorCode::FileTagEqualsEndTag,
                "File tag cannot equal end tag.",
            )
            .with("File", self.name.as_str())
            .with("Tag", to_hex(self.file_tag)));
        }
        self.read_file_header()?;
        self.read_file_sections()
    }

    fn read_file_header(&mut self) -> Result<()> {
        self.cursor.seek_to(0);

        let received = self.cursor.read_u64_be().map_err(|e| {
            self.error_missing(e, ErrorCode::FileTagMissing, "Missing file tag.")
        })?;
        if received != self.file_tag {
            return Err(ReadError::new(ErrorCode::FileTagIncorrect, "Incorrect file tag.")
                .with("File", self.name.as_str())
                .with("Expected", to_hex(self.file_tag))
                .with("Received", to_hex(received)));
        }

        let major = self.cursor.read_u32_be().map_err(|e| {
            self.error_missing(e, ErrorCode::VersionMajorMissing, "Missing file major version.")
        })?;
        let minor = self.cursor.read_u32_be().map_err(|e| {
            self.error_missing(e, ErrorCode::VersionMinorMissing, "Missing file minor version.")
        })?;

        self.version = Version::of_file(major, minor);
        debug!("{}: file tag {}, version {}", self.name, to_hex(received), self.version);
        Ok(())
    }

    fn read_file_sections(&mut self) -> Result<()> {
        self.cursor.seek_to(FILE_HEADER_SIZE);
        while self.enumerate_file_section()? {}
        Ok(())
    }

    /// Record one section and move to the next aligned header.  Returns
    /// `false` once the end section has been recorded.
    fn enumerate_file_section(&mut self) -> Result<bool> {
        let offset = self.cursor.position();

        let tag = match self.cursor.read_u64_be() {
            Ok(tag) => tag,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(self.error_end_missing(e));
            }
            Err(e) => return Err(self.error_io(e)),
        };
        let data_size = self.cursor.read_u64_be().map_err(|e| {
            self.error_io(e)
                .with("Tag", to_hex(tag))
                .with("Section Offset", to_hex(offset))
        })?;

        self.cursor.skip(data_size).map_err(|e| {
            self.error_io(e)
                .with("Tag", to_hex(tag))
                .with("Size", data_size.to_string())
        })?;
        let pad = self.cursor.align_to(SECTION_ALIGNMENT).map_err(|e| self.error_io(e))?;
        if pad != 0 {
            trace!("{}: skipped {} padding byte(s) after {}", self.name, pad, to_hex(offset));
        }

        debug!(
            "{}: section {} at {} ({} byte(s))",
            self.name,
            to_hex(tag),
            to_hex(offset),
            data_size
        );
        self.sections.insert(FileSection::new(tag, offset, data_size));
        Ok(tag != self.end_tag)
    }

    // ── Errors ───────────────────────────────────────────────────────────────

    fn offset_text(&self) -> String {
        to_hex(self.cursor.position())
    }

    fn error_io(&self, e: io::Error) -> ReadError {
        ReadError::io(&self.name, e).with("Offset", self.offset_text())
    }

    /// `UnexpectedEof` means the field is absent; anything else is an I/O
    /// failure.
    fn error_missing(&self, e: io::Error, code: ErrorCode, message: &'static str) -> ReadError {
        if e.kind() != io::ErrorKind::UnexpectedEof {
            return self.error_io(e);
        }
        ReadError::new(code, message)
            .with("File", self.name.as_str())
            .with("Expected", to_hex(self.file_tag))
            .with("Offset", self.offset_text())
            .caused_by(e)
    }

    fn error_end_missing(&self, e: io::Error) -> ReadError {
        ReadError::new(ErrorCode::FileEndMissing, "File is missing an 'end' section.")
            .with("File", self.name.as_str())
            .with("Expected", to_hex(self.end_tag))
            .with("Offset", self.offset_text())
            .caused_by(e)
    }

    fn error_no_such_section(&self, section: &FileSection) -> ReadError {
        ReadError::new(ErrorCode::SectionNotPresent, "No such file section.")
            .with("File", self.name.as_str())
            .with("Tag", to_hex(section.tag))
            .with("Offset", to_hex(section.offset))
            .with("Size", section.data_size.to_string())
    }

    fn error_resources(&self, e: io::Error) -> ReadError {
        ReadError::new(ErrorCode::Resources, "One or more resources could not be closed.")
            .with("File", self.name.as_str())
            .caused_by(e)
    }
}

impl FileReader<File> {
    /// Open the file at `path`, using the path as the diagnostic name.
    pub fn open_path<P: AsRef<Path>>(path: P, file_tag: u64, end_tag: u64) -> Result<Self> {
        let (name, file) = open_file(path.as_ref())?;
        Self::open_named(name, file, file_tag, end_tag)
    }

    pub fn open_path_checked<P: AsRef<Path>>(
        path:     P,
        file_tag: u64,
        end_tag:  u64,
        versions: &FileVersionsDescription,
    ) -> Result<Self> {
        let (name, file) = open_file(path.as_ref())?;
        Self::open_checked(name, file, file_tag, end_tag, versions)
    }
}

fn open_file(path: &Path) -> Result<(String, File)> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(|e| ReadError::io(&name, e))?;
    Ok((name, file))
}

impl<S: ByteSource> Drop for FileReader<S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.cursor.release() {
            warn!("Failed to release {} on drop: {}", self.name, e);
        }
    }
}

impl<S: ByteSource> std::fmt::Debug for FileReader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileReader")
            .field("name", &self.name)
            .field("file_tag", &to_hex(self.file_tag))
            .field("end_tag", &to_hex(self.end_tag))
            .field("version", &self.version)
            .field("sections", &self.sections.len())
            .finish()
    }
}
