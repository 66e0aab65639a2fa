//! Bounded, read-only view over one section's payload.
//!
//! The view borrows the reader's source mutably for its lifetime.  Dropping
//! a view never releases the source; only the owning reader does that.

use std::io::{self, Read, Seek, SeekFrom};

/// A `Read + Seek` window of `len` bytes starting at absolute offset `start`
/// of the underlying source.  Positions are relative to `start`.
#[derive(Debug)]
pub struct SectionView<'a, S: Read + Seek + ?Sized> {
    source:   &'a mut S,
    start:    u64,
    len:      u64,
    position: u64,
}

impl<'a, S: Read + Seek + ?Sized> SectionView<'a, S> {
    /// Create a view and position the source at its first byte.
    pub fn new(source: &'a mut S, start: u64, len: u64) -> io::Result<Self> {
        start.checked_add(len).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "section view exceeds the addressable range")
        })?;
        source.seek(SeekFrom::Start(start))?;
        Ok(Self { source, start, len, position: 0 })
    }

    /// Size of the view in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current position relative to the start of the view.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn remaining(&self) -> u64 {
        self.len - self.position
    }

    /// Read every remaining byte of the view.  Fails with `UnexpectedEof` if
    /// the source ends before the view does.
    pub fn read_remaining(&mut self) -> io::Result<Vec<u8>> {
        // Grows with the bytes actually present, not the declared size.
        let expected = self.remaining();
        let mut out = Vec::new();
        self.read_to_end(&mut out)?;
        if (out.len() as u64) < expected {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("section ends after {} of {expected} bytes", out.len()),
            ));
        }
        Ok(out)
    }
}

impl<S: Read + Seek + ?Sized> Read for SectionView<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let want = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let n = self.source.read(&mut buf[..want])?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<S: Read + Seek + ?Sized> Seek for SectionView<'_, S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n)   => Some(n),
            SeekFrom::Current(d) => self.position.checked_add_signed(d),
            SeekFrom::End(d)     => self.len.checked_add_signed(d),
        };
        let target = match target {
            Some(t) if t <= self.len => t,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("seek outside section view of {} bytes", self.len),
                ))
            }
        };
        self.source.seek(SeekFrom::Start(self.start + target))?;
        self.position = target;
        Ok(target)
    }
}
