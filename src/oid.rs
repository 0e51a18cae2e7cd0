//! Object identifiers.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::fmt;
use std::str::FromStr;
use crate::error::Error;


//------------ Oid -----------------------------------------------------------

/// An object identifier.
///
/// Object identifiers are globally unique, hierarchical values used to
/// identify objects or their type. When written they are presented as a
/// sequence of integers separated by dots such as `1.3.6.1.5.5.7.1`.
///
/// A value holds the sequence of arcs. There are always at least two
/// arcs, the first one is 0, 1, or 2, and when it is 0 or 1 the second
/// one is at most 39. These bounds come from the content encoding, which
/// folds the first two arcs into a single number.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Oid(Vec<u64>);

impl Oid {
    /// Creates an object identifier from a sequence of arcs.
    pub fn new(arcs: impl Into<Vec<u64>>) -> Result<Self, Error> {
        let arcs = arcs.into();
        if arcs.len() < 2 {
            return Err(Error::Malformed("object identifier needs two arcs"))
        }
        if arcs[0] > 2 {
            return Err(Error::Malformed("first arc must be 0, 1, or 2"))
        }
        if arcs[0] < 2 && arcs[1] > 39 {
            return Err(Error::Malformed(
                "second arc must be at most 39 under arcs 0 and 1"
            ))
        }
        Ok(Oid(arcs))
    }

    /// Returns the arcs of the identifier.
    pub fn arcs(&self) -> &[u64] {
        &self.0
    }

    /// Returns whether `self` is a prefix of `other`.
    pub fn is_prefix_of(&self, other: &Oid) -> bool {
        other.0.len() >= self.0.len()
            && other.0[..self.0.len()] == self.0[..]
    }

    /// Parses the content octets of an encoded object identifier.
    ///
    /// The first subidentifier folds the first two arcs into `40·X+Y`;
    /// all subidentifiers are base 128 with the high bit of every octet
    /// but the last one set. A subidentifier must not start with the
    /// padding octet 0x80.
    pub(crate) fn from_content(content: &[u8]) -> Result<Self, Error> {
        if content.is_empty() {
            return Err(Error::Malformed("empty object identifier content"))
        }
        let mut arcs = Vec::new();
        let mut value: u64 = 0;
        let mut in_subid = false;
        for octet in content {
            if !in_subid && *octet == 0x80 {
                return Err(Error::Malformed(
                    "padded subidentifier in object identifier"
                ))
            }
            if value >> 57 != 0 {
                return Err(Error::Unsupported(
                    "object identifier arc exceeds 64 bits"
                ))
            }
            value = (value << 7) | u64::from(octet & 0x7f);
            in_subid = octet & 0x80 != 0;
            if !in_subid {
                arcs.push(value);
                value = 0;
            }
        }
        if in_subid {
            return Err(Error::Malformed(
                "truncated subidentifier in object identifier"
            ))
        }
        // Unfold the combined first subidentifier into the leading two
        // arcs.
        let combined = arcs[0];
        let (x, y) = match combined {
            n if n < 40 => (0, n),
            n if n < 80 => (1, n - 40),
            n => (2, n - 80),
        };
        let mut res = Vec::with_capacity(arcs.len() + 1);
        res.push(x);
        res.push(y);
        res.extend_from_slice(&arcs[1..]);
        Ok(Oid(res))
    }

    /// Appends the content octets of the identifier to `target`.
    pub(crate) fn append_content(&self, target: &mut Vec<u8>) {
        fn append_subid(value: u64, target: &mut Vec<u8>) {
            let mut septets = [0u8; 10];
            let mut idx = septets.len();
            let mut value = value;
            loop {
                idx -= 1;
                septets[idx] = (value & 0x7f) as u8;
                value >>= 7;
                if value == 0 {
                    break
                }
            }
            for (i, septet) in septets[idx..].iter().enumerate() {
                if i + 1 < septets.len() - idx {
                    target.push(septet | 0x80);
                }
                else {
                    target.push(*septet);
                }
            }
        }

        append_subid(self.0[0] * 40 + self.0[1], target);
        for arc in &self.0[2..] {
            append_subid(*arc, target);
        }
    }
}


//--- FromStr

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let arcs = s.split('.').map(|part| {
            part.parse::<u64>().map_err(|_| {
                Error::Malformed("invalid arc in object identifier")
            })
        }).collect::<Result<Vec<_>, _>>()?;
        Oid::new(arcs)
    }
}


//--- Display

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for arc in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}


//============ Tests =========================================================
