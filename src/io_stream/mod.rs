//! Byte sources and the big-endian cursor used to scan them.
//!
//! A [`ByteSource`] is any seekable reader that the reader can take
//! ownership of.  [`BinaryCursor`] wraps one and tracks the absolute
//! position while reading fixed-width big-endian integers.
//!
//! # Insufficient data
//! Every read goes through `read_exact`, so a source that ends early
//! surfaces as `io::ErrorKind::UnexpectedEof`.  The reader uses that kind,
//! and only that kind, to decide that a field is *missing* rather than
//! unreadable.
//!
//! # Seeking past the end
//! `skip`, `align_to` and `seek_to` only move the logical position; the
//! source is seeked on the next read.  A target past the end of the source
//! therefore never fails by itself, and the next read reports
//! `UnexpectedEof`.  Positions beyond `i64::MAX` cannot exist in any source
//! and read as `UnexpectedEof` without touching it.

pub mod view;

use byteorder::{BigEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};

pub use view::SectionView;

// ── ByteSource ───────────────────────────────────────────────────────────────

/// A seekable byte source that a reader owns from open to close.
pub trait ByteSource: Read + Seek {
    /// Release any resources held by the source.
    ///
    /// Called exactly once, when the owning reader closes or fails to open.
    /// Dropping the source afterwards must not need to do anything that can
    /// fail.
    fn release(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ByteSource for File {}

impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {}

impl<R: ByteSource> ByteSource for BufReader<R> {
    fn release(&mut self) -> io::Result<()> {
        self.get_mut().release()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn release(&mut self) -> io::Result<()> {
        (**self).release()
    }
}

// ── BinaryCursor ─────────────────────────────────────────────────────────────

/// Position-tracking big-endian reader over a [`ByteSource`].
#[derive(Debug)]
pub struct BinaryCursor<S: ByteSource> {
    source:   S,
    position: u64,
    /// Whether the source is known to sit at `position`.
    synced:   bool,
}

impl<S: ByteSource> BinaryCursor<S> {
    pub fn new(source: S) -> Self {
        Self { source, position: 0, synced: false }
    }

    /// Current absolute offset.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The underlying source.  Its position is re-established before the
    /// next read through the cursor.
    pub fn get_mut(&mut self) -> &mut S {
        self.synced = false;
        &mut self.source
    }

    pub fn seek_to(&mut self, offset: u64) {
        if offset != self.position {
            self.synced = false;
        }
        self.position = offset;
    }

    /// Move forward `count` bytes without reading them.
    pub fn skip(&mut self, count: u64) -> io::Result<()> {
        let target = self.position.checked_add(count).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("skipping {count} bytes from offset {} overflows", self.position),
            )
        })?;
        self.seek_to(target);
        Ok(())
    }

    /// Skip forward to the next multiple of `alignment` unless already there.
    /// Returns the number of padding bytes skipped.
    pub fn align_to(&mut self, alignment: u64) -> io::Result<u64> {
        let rem = self.position % alignment;
        if rem == 0 {
            return Ok(0);
        }
        let pad = alignment - rem;
        self.skip(pad)?;
        Ok(pad)
    }

    pub fn read_u64_be(&mut self) -> io::Result<u64> {
        self.sync()?;
        let value = self.source.read_u64::<BigEndian>().map_err(|e| self.desync(e))?;
        self.position += 8;
        Ok(value)
    }

    pub fn read_u32_be(&mut self) -> io::Result<u32> {
        self.sync()?;
        let value = self.source.read_u32::<BigEndian>().map_err(|e| self.desync(e))?;
        self.position += 4;
        Ok(value)
    }

    pub fn release(&mut self) -> io::Result<()> {
        self.source.release()
    }

    fn desync(&mut self, e: io::Error) -> io::Error {
        self.synced = false;
        e
    }

    fn sync(&mut self) -> io::Result<()> {
        if self.synced {
            return Ok(());
        }
        if self.position > i64::MAX as u64 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("offset {} is beyond any readable source", self.position),
            ));
        }
        self.source.seek(SeekFrom::Start(self.position))?;
        self.synced = true;
        Ok(())
    }
}
