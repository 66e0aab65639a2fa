#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};
use sectional::ByteSource;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

pub const TAG_FILE: u64 = 0x1010101020202020;
pub const TAG_END:  u64 = 0x2020202030303030;
pub const TAG_A:    u64 = 0xAAAAAAAAAAAAAAAA;
pub const TAG_B:    u64 = 0xBBBBBBBBBBBBBBBB;
pub const TAG_C:    u64 = 0xCCCCCCCCCCCCCCCC;
pub const TAG_D:    u64 = 0xDDDDDDDDDDDDDDDD;

/// Writes file images byte-for-byte, padding like a real writer would.
#[derive(Default)]
pub struct StreamBuilder {
    bytes: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// File tag plus `major.minor`.
    pub fn header(tag: u64, major: u32, minor: u32) -> Self {
        Self::new().u64(tag).u32(major).u32(minor)
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.bytes.write_u64::<BigEndian>(value).unwrap();
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.bytes.write_u32::<BigEndian>(value).unwrap();
        self
    }

    pub fn raw(mut self, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(data);
        self
    }

    /// A section with its payload, padded to the next 16-byte boundary.
    pub fn section(self, tag: u64, data: &[u8]) -> Self {
        let mut this = self.u64(tag).u64(data.len() as u64).raw(data);
        while this.bytes.len() % 16 != 0 {
            this.bytes.push(0);
        }
        this
    }

    /// A section of `size` bytes, each byte set to `fill`.
    pub fn filled(self, tag: u64, size: usize, fill: u8) -> Self {
        self.section(tag, &vec![fill; size])
    }

    pub fn end(self) -> Self {
        self.section(TAG_END, &[])
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }

    pub fn cursor(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes)
    }
}

/// A source whose reads and release both fail.
pub struct BrokenSource;

impl Read for BrokenSource {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "broken read"))
    }
}

impl Seek for BrokenSource {
    fn seek(&mut self, _: SeekFrom) -> io::Result<u64> {
        Ok(0)
    }
}

impl ByteSource for BrokenSource {
    fn release(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "broken close"))
    }
}

/// Wraps a cursor and counts how often it has been released.
/// Release attempts are counted even when `fail_release` makes them fail.
pub struct TrackedSource {
    pub inner:        Cursor<Vec<u8>>,
    pub released:     std::rc::Rc<std::cell::Cell<u32>>,
    pub fail_release: bool,
}

impl TrackedSource {
    pub fn new(bytes: Vec<u8>) -> (Self, std::rc::Rc<std::cell::Cell<u32>>) {
        let released = std::rc::Rc::new(std::cell::Cell::new(0));
        let source = Self { inner: Cursor::new(bytes), released: released.clone(), fail_release: false };
        (source, released)
    }

    /// Reads normally; every release fails.
    pub fn failing_release(bytes: Vec<u8>) -> (Self, std::rc::Rc<std::cell::Cell<u32>>) {
        let (mut source, released) = Self::new(bytes);
        source.fail_release = true;
        (source, released)
    }
}

impl Read for TrackedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for TrackedSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl ByteSource for TrackedSource {
    fn release(&mut self) -> io::Result<()> {
        self.released.set(self.released.get() + 1);
        if self.fail_release {
            return Err(io::Error::new(io::ErrorKind::Other, "close failed"));
        }
        Ok(())
    }
}
