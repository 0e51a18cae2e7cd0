//! The data source the decoder reads from.
//!
//! This is an internal module. Nothing in here is part of the public API.

use bytes::Bytes;
use crate::error::Error;


//------------ Reader --------------------------------------------------------

/// A cursor over the input of a decoding operation.
///
/// The reader keeps the complete input and a current position. Taking data
/// hands out shared slices of the underlying buffer, so content octets of
/// decoded values alias the input rather than being copied. Running out of
/// data always produces [`Error::BufferUnderrun`] with the number of
/// octets missing, so a streaming caller can tell "feed me more" apart
/// from corruption.
#[derive(Clone, Debug)]
pub(crate) struct Reader {
    /// The complete input.
    data: Bytes,

    /// The position of the next octet to be read.
    pos: usize,
}

impl Reader {
    /// Creates a reader over the given data.
    pub fn new(data: Bytes) -> Self {
        Reader { data, pos: 0 }
    }

    /// Returns the current position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of octets left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns the next octet without advancing.
    pub fn peek(&self) -> Result<u8, Error> {
        self.data.get(self.pos).copied().ok_or(Error::BufferUnderrun(1))
    }

    /// Takes a single octet.
    pub fn take_u8(&mut self) -> Result<u8, Error> {
        let res = self.peek()?;
        self.pos += 1;
        Ok(res)
    }

    /// Takes the next `len` octets as a shared slice of the input.
    pub fn take(&mut self, len: usize) -> Result<Bytes, Error> {
        if len > self.remaining() {
            return Err(Error::BufferUnderrun(len - self.remaining()))
        }
        let res = self.data.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(res)
    }

    /// Advances over the next `len` octets.
    pub fn advance(&mut self, len: usize) -> Result<(), Error> {
        if len > self.remaining() {
            return Err(Error::BufferUnderrun(len - self.remaining()))
        }
        self.pos += len;
        Ok(())
    }

    /// Returns the octets between two earlier positions as a shared slice.
    pub fn window(&self, start: usize, end: usize) -> Bytes {
        self.data.slice(start..end)
    }

    /// Returns the not yet consumed rest of the input.
    pub fn rest(&self) -> Bytes {
        self.data.slice(self.pos..)
    }
}


//============ Tests =========================================================
