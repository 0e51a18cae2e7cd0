//! The length octets.
//!
//! This is a private module. The [`Length`] defined herein is not part of
//! the public API.

use crate::codec::source::Reader;
use crate::error::Error;
use crate::mode::Mode;


//------------ Length --------------------------------------------------------

/// The length octets of an encoded value.
///
/// A length is either definite, giving the actual number of content
/// octets, or indefinite, in which case the content is delimited by an
/// end-of-contents marker.
///
/// If the most significant bit of the first octet is clear, the remaining
/// bits are the definite length itself. Otherwise the remaining bits give
/// the number of following octets that hold the length in big-endian
/// form; zero following octets, i.e. a first octet of 0x80, signals the
/// indefinite form. The first octet 0xFF is reserved and always invalid.
///
/// Under CER and DER a definite length must use the shortest possible
/// form, so parsing takes the mode into account.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Length {
    /// The number of content octets is known up front.
    Definite(usize),

    /// The content is delimited by an end-of-contents marker.
    Indefinite,
}

impl Length {
    /// Parses a length from the beginning of a source.
    pub fn take_from(source: &mut Reader, mode: Mode) -> Result<Self, Error> {
        let first = source.take_u8()?;
        match first {
            n if n & 0x80 == 0 => Ok(Length::Definite(n as usize)),
            0x80 => Ok(Length::Indefinite),
            0xFF => Err(Error::MalformedLength),
            n => {
                let count = (n & 0x7F) as usize;
                if count > std::mem::size_of::<usize>() {
                    return Err(Error::Unsupported(
                        "length exceeds the platform's address size"
                    ))
                }
                let octets = source.take(count)?;
                if mode.is_restricted() {
                    // A shorter encoding must not exist: no leading zero
                    // octet and no value that would have fit the short
                    // form.
                    if octets[0] == 0
                        || (count == 1 && octets[0] < 0x80)
                    {
                        return Err(Error::MalformedLength)
                    }
                }
                let mut len = 0usize;
                for octet in octets.as_ref() {
                    len = (len << 8) | usize::from(*octet);
                }
                Ok(Length::Definite(len))
            }
        }
    }

    /// Returns the definite length or an error.
    ///
    /// Primitive values must not use the indefinite form.
    pub fn definite(self) -> Result<usize, Error> {
        match self {
            Length::Definite(len) => Ok(len),
            Length::Indefinite => Err(Error::MalformedLength),
        }
    }

    /// Returns whether the length is indefinite.
    pub fn is_indefinite(self) -> bool {
        matches!(self, Length::Indefinite)
    }

    /// Appends the encoded length to the end of `target`.
    ///
    /// Definite lengths always use the shortest valid form, which is what
    /// all three rule sets require of an encoder.
    pub fn append_encoded(self, target: &mut Vec<u8>) {
        match self {
            Length::Indefinite => target.push(0x80),
            Length::Definite(len) => {
                if len < 0x80 {
                    target.push(len as u8);
                }
                else {
                    let octets = len.to_be_bytes();
                    let skip = (len.leading_zeros() / 8) as usize;
                    target.push(0x80 | (octets.len() - skip) as u8);
                    target.extend_from_slice(&octets[skip..]);
                }
            }
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use super::*;

    fn take(data: &'static [u8], mode: Mode) -> Result<Length, Error> {
        Length::take_from(&mut Reader::new(Bytes::from_static(data)), mode)
    }

    #[test]
    fn ber_take_from() {
        assert_eq!(take(b"\x00", Mode::Ber), Ok(Length::Definite(0)));
        assert_eq!(take(b"\x12", Mode::Ber), Ok(Length::Definite(0x12)));
        assert_eq!(take(b"\x7f", Mode::Ber), Ok(Length::Definite(0x7f)));
        assert_eq!(take(b"\x80", Mode::Ber), Ok(Length::Indefinite));
        assert_eq!(take(b"\x81\x00", Mode::Ber), Ok(Length::Definite(0)));
        assert_eq!(take(b"\x81\xf0", Mode::Ber), Ok(Length::Definite(0xf0)));
        assert_eq!(
            take(b"\x82\xf0\x0e", Mode::Ber), Ok(Length::Definite(0xf00e))
        );
        assert_eq!(
            take(b"\x82\x00\x0e", Mode::Ber), Ok(Length::Definite(0x0e))
        );
        assert_eq!(take(b"\xff", Mode::Ber), Err(Error::MalformedLength));
        assert_eq!(take(b"\x82\x01", Mode::Ber), Err(Error::BufferUnderrun(1)));
    }

    #[test]
    fn der_take_from() {
        assert_eq!(take(b"\x7f", Mode::Der), Ok(Length::Definite(0x7f)));
        assert_eq!(take(b"\x80", Mode::Der), Ok(Length::Indefinite));
        assert_eq!(
            take(b"\x81\x80", Mode::Der), Ok(Length::Definite(0x80))
        );
        assert_eq!(take(b"\x81\x00", Mode::Der), Err(Error::MalformedLength));
        assert_eq!(take(b"\x81\x7f", Mode::Der), Err(Error::MalformedLength));
        assert_eq!(
            take(b"\x82\x00\x0e", Mode::Der), Err(Error::MalformedLength)
        );
        assert_eq!(
            take(b"\x82\xf0\x0e", Mode::Cer), Ok(Length::Definite(0xf00e))
        );
    }

    #[test]
    fn encode() {
        fn step(length: Length, expected: &[u8]) {
            let mut target = Vec::new();
            length.append_encoded(&mut target);
            assert_eq!(target.as_slice(), expected);
        }

        step(Length::Indefinite, b"\x80");
        step(Length::Definite(0), b"\x00");
        step(Length::Definite(0x12), b"\x12");
        step(Length::Definite(0x7f), b"\x7f");
        step(Length::Definite(0x80), b"\x81\x80");
        step(Length::Definite(0x3e8), b"\x82\x03\xe8");
        step(Length::Definite(0xdead), b"\x82\xde\xad");
    }
}
