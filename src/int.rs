//! Arbitrary precision integers.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::{cmp, fmt};
use bytes::Bytes;
use crate::error::Error;


//------------ Int -----------------------------------------------------------

/// A signed integer of arbitrary precision.
///
/// INTEGER values are variable length on the wire, so this type simply
/// wraps the content octets: a big-endian two's complement byte sequence
/// with the most significant bit of the first octet as the sign bit. The
/// stored form is always minimal, i.e., it never starts with nine
/// identical bits. Since the minimal form is unique, equality and hashing
/// can work on the raw octets.
///
/// The type only exposes the operations this domain needs: construction
/// from native integers and from content octets, conversion back, and
/// ordering. It does not try to be a general big-number arithmetic type.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Int(Bytes);

impl Int {
    /// Creates a value from big-endian two's complement content octets.
    ///
    /// The octets must be the minimal encoding: non-empty, and without a
    /// redundant leading octet. An all-zero first octet followed by an
    /// octet with a clear sign bit, or an all-one first octet followed by
    /// an octet with a set sign bit, could be dropped and is therefore
    /// rejected.
    pub fn from_twos_complement(octets: Bytes) -> Result<Self, Error> {
        match (octets.first(), octets.get(1)) {
            (None, _) => Err(Error::Malformed("empty integer content")),
            (Some(0), Some(x)) if *x & 0x80 == 0 => {
                Err(Error::Malformed("redundant integer octets"))
            }
            (Some(0xFF), Some(x)) if *x & 0x80 != 0 => {
                Err(Error::Malformed("redundant integer octets"))
            }
            _ => Ok(Int(octets)),
        }
    }

    /// Returns the minimal two's complement content octets.
    pub fn as_twos_complement(&self) -> &[u8] {
        &self.0
    }

    /// Returns whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.as_ref() == [0]
    }

    /// Returns whether the value is negative.
    pub fn is_negative(&self) -> bool {
        self.0[0] & 0x80 != 0
    }

    /// Converts the value into an `i64` if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        if self.0.len() > 8 {
            return None
        }
        let mut res: i64 = if self.is_negative() { -1 } else { 0 };
        for octet in self.0.as_ref() {
            res = (res << 8) | i64::from(*octet);
        }
        Some(res)
    }

    /// Converts the value into an `i128` if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        if self.0.len() > 16 {
            return None
        }
        let mut res: i128 = if self.is_negative() { -1 } else { 0 };
        for octet in self.0.as_ref() {
            res = (res << 8) | i128::from(*octet);
        }
        Some(res)
    }

    /// Creates a value from a native signed integer.
    fn from_signed(value: i128) -> Self {
        let octets = value.to_be_bytes();
        let mut start = 0;
        while start + 1 < octets.len() {
            let redundant = (octets[start] == 0
                && octets[start + 1] & 0x80 == 0)
                || (octets[start] == 0xFF && octets[start + 1] & 0x80 != 0);
            if !redundant {
                break
            }
            start += 1;
        }
        Int(Bytes::copy_from_slice(&octets[start..]))
    }

    /// Creates a value from a native unsigned integer.
    ///
    /// A leading zero octet is inserted when the top bit of the leading
    /// content octet would otherwise flip the sign.
    fn from_unsigned(value: u128) -> Self {
        let octets = value.to_be_bytes();
        let mut start = 0;
        while start + 1 < octets.len() && octets[start] == 0
            && octets[start + 1] & 0x80 == 0
        {
            start += 1;
        }
        if octets[start] == 0 && value != 0 {
            start += 1;
            let mut res = Vec::with_capacity(octets.len() - start + 1);
            res.push(0);
            res.extend_from_slice(&octets[start..]);
            return Int(res.into())
        }
        Int(Bytes::copy_from_slice(&octets[start..]))
    }

    /// Returns the absolute value as big-endian magnitude octets.
    fn magnitude(&self) -> Vec<u8> {
        let mut res = self.0.to_vec();
        if self.is_negative() {
            // Two's complement negation: invert, then add one.
            for octet in res.iter_mut() {
                *octet = !*octet;
            }
            for octet in res.iter_mut().rev() {
                let (sum, carry) = octet.overflowing_add(1);
                *octet = sum;
                if !carry {
                    break
                }
            }
        }
        res
    }
}


//--- From

impl From<i64> for Int {
    fn from(value: i64) -> Self {
        Int::from_signed(i128::from(value))
    }
}

impl From<i32> for Int {
    fn from(value: i32) -> Self {
        Int::from_signed(i128::from(value))
    }
}

impl From<u64> for Int {
    fn from(value: u64) -> Self {
        Int::from_unsigned(u128::from(value))
    }
}

impl From<u32> for Int {
    fn from(value: u32) -> Self {
        Int::from_unsigned(u128::from(value))
    }
}

impl From<i128> for Int {
    fn from(value: i128) -> Self {
        Int::from_signed(value)
    }
}

impl From<u128> for Int {
    fn from(value: u128) -> Self {
        Int::from_unsigned(value)
    }
}


//--- PartialOrd, Ord

impl PartialOrd for Int {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Int {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => return cmp::Ordering::Less,
            (false, true) => return cmp::Ordering::Greater,
            (false, false) => {
                // More minimal octets means a larger value.
                self.0.len().cmp(&other.0.len())
                    .then_with(|| self.0.cmp(&other.0))
            }
            (true, true) => {
                // More minimal octets means more magnitude, i.e. smaller.
                other.0.len().cmp(&self.0.len())
                    .then_with(|| self.0.cmp(&other.0))
            }
        }
    }
}


//--- Display

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut magnitude = self.magnitude();
        let mut digits = Vec::new();
        loop {
            // One round of long division of the magnitude by ten.
            let mut rem: u16 = 0;
            let mut all_zero = true;
            for octet in magnitude.iter_mut() {
                let acc = (rem << 8) | u16::from(*octet);
                *octet = (acc / 10) as u8;
                rem = acc % 10;
                if *octet != 0 {
                    all_zero = false;
                }
            }
            digits.push(b'0' + rem as u8);
            if all_zero {
                break
            }
        }
        if self.is_negative() {
            f.write_str("-")?;
        }
        for digit in digits.iter().rev() {
            write!(f, "{}", char::from(*digit))?;
        }
        Ok(())
    }
}


//============ Tests =========================================================
