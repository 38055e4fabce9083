use crate::{Error, Result};
use bytes::BytesMut;
use std::ops::Range;


/// Writes data to a growable byte buffer.
///
/// Positions are absolute offsets into the underlying buffer, so a [`Serializer`] can be created
/// over a buffer which already holds data and everything it writes lands after that data.
pub struct Serializer<'a> {
    buffer: &'a mut BytesMut,
    origin: usize,
}

impl<'a> Serializer<'a> {
    /// Returns a new [`Serializer`] that appends to the given buffer.
    pub fn new(buffer: &'a mut BytesMut) -> Self {
        let origin = buffer.len();
        Self { buffer, origin }
    }

    /// Returns the current length of the buffer, which is where the next write will land.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::{BytesMut, codec::Serializer};
    ///
    /// let mut buffer = BytesMut::from(&[0xaa_u8][..]);
    /// let mut ser = Serializer::new(&mut buffer);
    /// assert_eq!(ser.position(), 1);
    /// ser.write(&[1, 2]);
    /// assert_eq!(ser.position(), 3);
    /// ```
    #[must_use]
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the amount of bytes written since this [`Serializer`] was created.
    #[must_use]
    pub fn written(&self) -> usize {
        self.buffer.len() - self.origin
    }

    /// Appends the contents of the source slice to the buffer.
    ///
    /// Returns the amount of bytes written.
    pub fn write(&mut self, src: &[u8]) -> usize {
        self.buffer.extend_from_slice(src);
        src.len()
    }

    /// Copies the contents of the source slice into the buffer, over the given range.
    ///
    /// Only bytes which have already been written can be overwritten, and the bytes after the
    /// range are left untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::{BytesMut, codec::Serializer};
    ///
    /// let mut buffer = BytesMut::new();
    /// let mut ser = Serializer::new(&mut buffer);
    /// let reserved = ser.skip(2);
    /// ser.write(&[3, 4]);
    /// assert_eq!(ser.write_to(reserved, &[1, 2]), Ok(2));
    /// assert_eq!(buffer[..], [1u8, 2, 3, 4]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the range reaches past the bytes written so far, or if its length
    /// differs from the length of the source slice. Nothing is written in either case.
    pub fn write_to(&mut self, range: Range<usize>, src: &[u8]) -> Result<usize> {
        if range.len() != src.len() || range.start < self.origin {
            return Err(Error::OutOfBounds {
                start: range.start,
                end: range.end,
                len: self.buffer.len(),
            });
        }
        let len = self.buffer.len();
        self.buffer
            .get_mut(range.clone())
            .map(|dst| {
                dst.copy_from_slice(src);
                range.len()
            })
            .ok_or(Error::OutOfBounds {
                start: range.start,
                end: range.end,
                len,
            })
    }

    /// Appends `len` zeroed bytes to the buffer, returning the range they occupy.
    ///
    /// The range can later be filled in with [`Serializer::write_to`].
    pub fn skip(&mut self, len: usize) -> Range<usize> {
        let start = self.buffer.len();
        self.buffer.resize(start + len, 0);
        start..start + len
    }

    /// Discards everything written after the given position.
    ///
    /// Data that was in the buffer before this [`Serializer`] was created is never discarded.
    pub fn truncate(&mut self, position: usize) {
        self.buffer.truncate(position.max(self.origin));
    }
}
