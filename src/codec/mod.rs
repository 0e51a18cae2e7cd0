//! Encoding and decoding of values.
//!
//! This module provides the top-level [`encode`] and [`decode`]
//! operations together with the per-rule-set convenience modules
//! [`ber`], [`cer`], and [`der`]. The BER engine implements the shared
//! tag-length-value grammar; the canonical rule sets are specializations
//! that remove the encoder's choices.

use bytes::Bytes;
use crate::error::Error;
use crate::mode::Mode;
use crate::typ::AsnType;
use crate::value::Value;

pub mod ber;
pub mod cer;
pub mod der;

pub(crate) mod source;

/// The maximum structural nesting depth accepted while decoding.
///
/// Wrappers, constructed values, and string fragments all count towards
/// this limit. It bounds the decoder's recursion on adversarial input.
pub(crate) const MAX_DEPTH: usize = 32;


//------------ EncodeOptions -------------------------------------------------

/// The configuration of an encoding operation.
///
/// The rule set determines most of the behavior. Under BER the caller
/// additionally chooses between definite and indefinite length encoding
/// of constructed values and may request that string values longer than
/// `max_chunk` octets be broken into chunks of at most that many octets.
/// The canonical rule sets leave no such freedom: CER always encodes
/// indefinite and chunks at exactly 1000 octets, DER always encodes
/// definite and never chunks. For those modes the two fields are ignored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncodeOptions {
    /// The rule set to encode under.
    pub mode: Mode,

    /// Whether constructed values use definite length encoding.
    ///
    /// Only consulted under [`Mode::Ber`].
    pub definite: bool,

    /// The maximum chunk size for string values, if chunking is wanted.
    ///
    /// Only consulted under [`Mode::Ber`].
    pub max_chunk: Option<usize>,
}

impl EncodeOptions {
    /// Returns the default BER options: definite length, no chunking.
    pub fn ber() -> Self {
        EncodeOptions { mode: Mode::Ber, definite: true, max_chunk: None }
    }

    /// Returns BER options using indefinite length encoding.
    pub fn ber_indefinite() -> Self {
        EncodeOptions { mode: Mode::Ber, definite: false, max_chunk: None }
    }

    /// Returns the CER options.
    pub fn cer() -> Self {
        EncodeOptions { mode: Mode::Cer, definite: false, max_chunk: None }
    }

    /// Returns the DER options.
    pub fn der() -> Self {
        EncodeOptions { mode: Mode::Der, definite: true, max_chunk: None }
    }

    /// Returns the options with the given maximum chunk size.
    pub fn with_max_chunk(mut self, max_chunk: usize) -> Self {
        self.max_chunk = Some(max_chunk);
        self
    }

    /// Returns whether constructed values are encoded with definite
    /// length under these options.
    pub(crate) fn effective_definite(&self) -> bool {
        match self.mode {
            Mode::Ber => self.definite,
            Mode::Cer => false,
            Mode::Der => true,
        }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions::ber()
    }
}


//------------ encode and decode ---------------------------------------------

/// Encodes a value under the given options.
///
/// Fails if the value is not encodable: a choice without a selected
/// alternative or a structure missing a required member.
pub fn encode(
    value: &Value, options: &EncodeOptions
) -> Result<Bytes, Error> {
    ber::encode_to_vec(value, options).map(Into::into)
}

/// Decodes one value from the beginning of the data.
///
/// If a type is given, the data must match it and the returned value is
/// bound to it. Without a type, universal-class values resolve through
/// the fixed universal tag table and values of the other classes come
/// back as opaque raw octets.
///
/// On success, the unconsumed rest of the input is returned alongside the
/// value; calling `decode` again on it streams subsequent values. On
/// failure no partial value is returned.
pub fn decode(
    data: impl Into<Bytes>, spec: Option<&AsnType>, mode: Mode
) -> Result<(Value, Bytes), Error> {
    ber::decode_value(data.into(), spec, mode)
}
