//! Bit strings.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use bytes::Bytes;
use crate::error::Error;


//------------ Bits ----------------------------------------------------------

/// An ordered sequence of bits.
///
/// Unlike an octet string, a bit string does not need to contain a
/// multiple of eight bits. The value keeps the bits packed into octets
/// with the first bit in the most significant position, plus the number
/// of unused bits in the final octet.
///
/// The stored form is canonical: the unused bits of the final octet are
/// always zero, so equality and hashing can work on the raw parts.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Bits {
    /// The packed bits, first bit in the most significant position.
    data: Bytes,

    /// The number of unused bits in the last octet.
    unused: u8,
}

impl Bits {
    /// Creates a bit string from packed octets.
    ///
    /// `unused` is the number of trailing bits of the final octet that
    /// are not part of the value. It must be at most seven and zero when
    /// `data` is empty. Unused bit positions are cleared.
    pub fn new(data: Bytes, unused: u8) -> Result<Self, Error> {
        if unused > 7 {
            return Err(Error::Malformed("more than seven unused bits"))
        }
        if data.is_empty() && unused != 0 {
            return Err(Error::Malformed("unused bits in empty bit string"))
        }
        if unused == 0 {
            return Ok(Bits { data, unused })
        }
        let mask = !0u8 << unused;
        if data.last().map(|x| x & !mask) == Some(0) {
            return Ok(Bits { data, unused })
        }
        let mut canonical = data.to_vec();
        if let Some(last) = canonical.last_mut() {
            *last &= mask;
        }
        Ok(Bits { data: canonical.into(), unused })
    }

    /// Creates a bit string from individual bits.
    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        let mut data = Vec::new();
        let mut len = 0usize;
        for bit in bits {
            if len % 8 == 0 {
                data.push(0);
            }
            if bit {
                data[len >> 3] |= 0x80 >> (len & 7);
            }
            len += 1;
        }
        let unused = (data.len() * 8 - len) as u8;
        Bits { data: data.into(), unused }
    }

    /// Returns the value of the given bit.
    ///
    /// Bits past the end of the string are reported as unset.
    pub fn bit(&self, bit: usize) -> bool {
        if bit >= self.bit_len() {
            return false
        }
        self.data[bit >> 3] & (0x80 >> (bit & 7)) != 0
    }

    /// Returns the number of bits in the bit string.
    pub fn bit_len(&self) -> usize {
        self.data.len() * 8 - usize::from(self.unused)
    }

    /// Returns the number of unused bits in the final octet.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the packed octets.
    pub fn octets(&self) -> &Bytes {
        &self.data
    }

    /// Returns an iterator over the individual bits.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bit_len()).map(move |i| self.bit(i))
    }

    /// Concatenates bit string fragments into one bit string.
    ///
    /// Every fragment but the last must end on an octet boundary, i.e.
    /// have no unused bits.
    pub(crate) fn concat(fragments: &[Bits]) -> Result<Self, Error> {
        match fragments {
            [] => Bits::new(Bytes::new(), 0),
            [single] => Ok(single.clone()),
            [head @ .., last] => {
                let mut data = Vec::new();
                for fragment in head {
                    if fragment.unused != 0 {
                        return Err(Error::Malformed(
                            "unused bits in non-final fragment"
                        ))
                    }
                    data.extend_from_slice(fragment.data.as_ref());
                }
                data.extend_from_slice(last.data.as_ref());
                Bits::new(data.into(), last.unused)
            }
        }
    }
}


//============ Tests =========================================================
