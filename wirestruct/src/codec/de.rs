use crate::{Error, Result};


/// Reads a byte slice front to back.
///
/// Fixed-size arrays are read with [`Deserializer::read`], and runs of bytes with
/// [`Deserializer::read_slice`] and [`Deserializer::read_until`]. Every read is bounds checked.
///
/// The region announced by a length prefix is enforced with [`Deserializer::push_limit`], and
/// released with [`Deserializer::pop_limit`]. Limits nest.
#[derive(Debug)]
pub struct Deserializer<'de> {
    buffer: &'de [u8],
    cursor: usize,
    limits: Vec<usize>,
}

impl<'de> Deserializer<'de> {
    /// Creates a [`Deserializer`] positioned at the start of `buffer`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::codec::Deserializer;
    ///
    /// let mut de = Deserializer::new(&[0xbe, 0xef]);
    /// assert_eq!(de.read().map(u16::from_be_bytes), Ok(0xbeef));
    /// assert!(de.is_empty());
    /// ```
    #[must_use]
    pub fn new(buffer: &'de [u8]) -> Self {
        Self {
            buffer,
            cursor: 0,
            limits: Vec::default(),
        }
    }

    /// Returns the amount of bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Returns the amount of bytes that can still be read, up to the innermost limit.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.end() - self.cursor
    }

    /// Returns `true` if no more bytes can be read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads `size_of::<T>()` bytes and converts them into a `T`, usually a byte array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::{Error, codec::Deserializer};
    ///
    /// let mut de = Deserializer::new(&[0x07, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02]);
    /// assert_eq!(de.read().map(u8::from_le_bytes), Ok(7));
    /// assert_eq!(de.read().map(u16::from_le_bytes), Ok(0x0100));
    /// assert_eq!(de.read().map(u32::from_be_bytes), Ok(2));
    /// assert_eq!(
    ///     de.read().map(u16::from_be_bytes),
    ///     Err(Error::Underflow { needed: 2, remaining: 0 })
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Deserializer::read_slice`], or if the
    /// conversion fails.
    pub fn read<T>(&mut self) -> Result<T>
    where
        T: for<'a> std::convert::TryFrom<&'a [u8]>,
    {
        self.read_slice(std::mem::size_of::<T>())
            .and_then(|v| T::try_from(v).map_err(|_| Error::custom("malformed value")))
    }

    /// Reads exactly `len` bytes from the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExceedsLimit`] if the read crosses the innermost limit, or
    /// [`Error::Underflow`] if fewer than `len` bytes are left in the buffer. The read position is
    /// not moved in either case.
    pub fn read_slice(&mut self, len: usize) -> Result<&'de [u8]> {
        self.check(len)?;
        let slice = &self.buffer[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(slice)
    }

    /// Reads every byte up to `delimiter`, consuming the delimiter but leaving it out of the
    /// returned slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::codec::Deserializer;
    ///
    /// let buffer = *b"ab\0c";
    /// let mut de = Deserializer::new(&buffer);
    /// assert_eq!(de.read_until(0x00), Ok(&b"ab"[..]));
    /// assert_eq!(de.remaining(), 1);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the delimiter does not appear before the innermost limit or the end
    /// of the buffer.
    pub fn read_until(&mut self, delimiter: u8) -> Result<&'de [u8]> {
        let available = &self.buffer[self.cursor..self.end()];
        match available.iter().position(|&byte| byte == delimiter) {
            Some(len) => {
                self.cursor += len + 1;
                Ok(&available[..len])
            }
            None if self.limits.is_empty() => Err(Error::Underflow {
                needed: available.len() + 1,
                remaining: available.len(),
            }),
            None => Err(Error::ExceedsLimit),
        }
    }

    /// Reads every byte up to the innermost limit, or the end of the buffer.
    pub fn read_remaining(&mut self) -> &'de [u8] {
        let end = self.end();
        let slice = &self.buffer[self.cursor..end];
        self.cursor = end;
        slice
    }

    /// Advances the read position by `len` bytes without reading them.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Deserializer::read_slice`].
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_slice(len).map(|_| ())
    }

    /// Confines reads to the next `limit` bytes until [`Deserializer::pop_limit`] is called.
    ///
    /// Reads which cross the limit fail with [`Error::ExceedsLimit`], even when the buffer holds
    /// more data.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::{Error, codec::Deserializer};
    ///
    /// let mut de = Deserializer::new(b"abcd");
    /// assert_eq!(de.push_limit(2), Ok(()));
    /// assert_eq!(de.read_slice(2), Ok(&b"ab"[..]));
    /// assert_eq!(de.read().map(u16::from_be_bytes), Err(Error::ExceedsLimit));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the limit reaches past the enclosing limit, or the end of the buffer.
    pub fn push_limit(&mut self, limit: usize) -> Result<()> {
        self.check(limit)?;
        self.limits.push(self.cursor + limit);
        Ok(())
    }

    /// Releases the innermost limit, restoring the one around it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirestruct::codec::Deserializer;
    ///
    /// let mut de = Deserializer::new(&[0x01, 0x02, 0x03, 0x04]);
    /// de.push_limit(2)?;
    /// assert_eq!(de.read_remaining(), &[0x01u8, 0x02][..]);
    /// assert_eq!(de.pop_limit(), Ok(()));
    /// assert_eq!(de.read().map(u16::from_be_bytes), Ok(0x0304));
    /// # Ok::<(), wirestruct::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if no limit is set.
    pub fn pop_limit(&mut self) -> Result<()> {
        self.limits
            .pop()
            .map(|_| ())
            .ok_or_else(|| Error::custom("no limit to remove"))
    }

    fn end(&self) -> usize {
        self.limits.last().copied().unwrap_or(self.buffer.len())
    }

    fn check(&self, len: usize) -> Result<()> {
        if len <= self.remaining() {
            return Ok(());
        }
        if self.limits.is_empty() {
            Err(Error::Underflow {
                needed: len,
                remaining: self.remaining(),
            })
        } else {
            Err(Error::ExceedsLimit)
        }
    }
}
