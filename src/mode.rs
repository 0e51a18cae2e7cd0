//! The encoding rule sets.
//!
//! This is a private module. Its public items are re-exported by the parent.


//------------ Mode ----------------------------------------------------------

/// The rule set used for encoding and decoding.
///
/// All three rule sets share one tag-length-value grammar. BER leaves
/// choices to the encoder, while CER and DER are canonical: they remove
/// every choice so that a given value has exactly one encoding. CER does
/// so by mandating indefinite length encoding for constructed values, DER
/// by mandating definite length encoding.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Basic Encoding Rules.
    ///
    /// These are the most flexible rules, allowing alternative encodings
    /// for some types as well as indefinite length values.
    #[default]
    Ber,

    /// Canonical Encoding Rules.
    ///
    /// These rules always employ indefinite length encoding for
    /// constructed values and break up large string values into chunks of
    /// exactly 1000 octets. There are additional restrictions for certain
    /// types.
    Cer,

    /// Distinguished Encoding Rules.
    ///
    /// These rules always employ definite length encoding and forbid the
    /// chunking of string values. Additional rules apply to some types.
    Der,
}

impl Mode {
    /// Returns whether the mode is CER or DER.
    ///
    /// The restricted modes share the minimal-length-octets requirement,
    /// the 0xFF encoding of boolean true, and the sorting of set members.
    pub fn is_restricted(self) -> bool {
        !matches!(self, Mode::Ber)
    }

    /// Returns whether the mode allows definite length constructed values.
    pub fn allows_definite(self) -> bool {
        !matches!(self, Mode::Cer)
    }

    /// Returns whether the mode allows indefinite length constructed
    /// values.
    pub fn allows_indefinite(self) -> bool {
        !matches!(self, Mode::Der)
    }
}
