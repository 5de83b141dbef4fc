//! Bounds checked big-endian reading over a byte slice.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

/// A forward cursor over a borrowed buffer.
///
/// Every read is checked against the end of the buffer and fails with
/// [`Error::OutOfBounds`] instead of panicking. Both decoders read their
/// streams through it and the RARC parser resolves tables and names with it.
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteView<'a> {
    /// Create a view positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a view positioned at `position`
    pub fn at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    /// Borrow `len` bytes at an absolute `offset` without moving the cursor
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(Error::OutOfBounds {
                offset,
                len,
                size: self.data.len(),
            })
    }

    /// Read `len` bytes and advance
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = self.slice(self.position, len)?;
        self.position += len;
        Ok(bytes)
    }

    /// Read one byte and advance
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a big-endian u16 and advance
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read_bytes(2)?))
    }

    /// Read a big-endian u32 and advance
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read_bytes(4)?))
    }

    /// Read a big-endian u32 at an absolute offset without moving the cursor
    pub fn u32_at(&self, offset: usize) -> Result<u32> {
        ByteView::at(self.data, offset).read_u32()
    }

    /// Borrow the bytes from `offset` up to (not including) the next NUL.
    ///
    /// A missing terminator yields everything up to the end of the buffer.
    /// The offset itself must lie inside the buffer.
    pub fn c_str_at(&self, offset: usize) -> Result<&'a [u8]> {
        let tail = self
            .data
            .get(offset..)
            .filter(|tail| !tail.is_empty())
            .ok_or(Error::OutOfBounds {
                offset,
                len: 1,
                size: self.data.len(),
            })?;
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Ok(&tail[..end])
    }
}
