//! Reader for sectional binary containers: a 16-byte header (file tag and
//! `major.minor` version) followed by tagged, length-prefixed, 16-byte
//! aligned sections terminated by an end section.
//!
//! ```no_run
//! use sectional::{FileReader, tags};
//!
//! let file_tag = tags::png_style(b'S', b'E', b'C');
//! let end_tag  = tags::from_text("SECT_END")?;
//!
//! let mut reader = FileReader::open_path("data.bin", file_tag, end_tag)?;
//! let sections: Vec<_> = reader.sections().iter().copied().collect();
//! for section in &sections {
//!     let payload = reader.read_section(section)?;
//!     println!("{:#x}: {} bytes", section.tag, payload.len());
//! }
//! reader.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod io_stream;
pub mod reader;
pub mod schema;
pub mod section;
pub mod tags;
pub mod version;

pub use error::{ErrorCode, ReadError, Result, SchemaError};
pub use io_stream::{ByteSource, SectionView};
pub use reader::FileReader;
pub use schema::{
    Cardinality, FileDescription, FileSectionDescription, FileVersionsDescription,
    SectionOrdering, UnknownSections,
};
pub use section::{FileSection, SectionIndex};
pub use version::Version;
