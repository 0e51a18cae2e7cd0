//! The Canonical Encoding Rules.
//!
//! CER removes the encoder's choices in favor of the indefinite length
//! form: constructed values are always indefinite, and primitive string
//! content over 1000 octets is broken into chunks of exactly 1000
//! content octets inside an indefinite wrapper. Boolean true is always
//! encoded as 0xFF. Set members are emitted in ascending order of their
//! encoded identifier octets.
//!
//! Decoding accepts the full BER grammar with the restricted-mode
//! checks: canonical boolean content and minimal length octets.

use bytes::Bytes;
use crate::error::Error;
use crate::mode::Mode;
use crate::typ::AsnType;
use crate::value::Value;
use super::EncodeOptions;

/// Encodes a value under CER.
pub fn encode(value: &Value) -> Result<Bytes, Error> {
    super::encode(value, &EncodeOptions::cer())
}

/// Decodes one value from the beginning of the data under CER.
pub fn decode(data: impl Into<Bytes>) -> Result<(Value, Bytes), Error> {
    super::ber::decode_value(data.into(), None, Mode::Cer)
}

/// Decodes one value of the given type under CER.
pub fn decode_with(
    data: impl Into<Bytes>, spec: &AsnType
) -> Result<(Value, Bytes), Error> {
    super::ber::decode_value(data.into(), Some(spec), Mode::Cer)
}


//============ Tests =========================================================
