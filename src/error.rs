//! The crate-wide error type.
//!
//! This is a private module. Its public items are re-exported by the parent.

use crate::tag::Tag;


//------------ Error ---------------------------------------------------------

/// An error happening while modeling, encoding, or decoding values.
///
/// All failures in this crate are synchronous and final: no operation
/// retries internally and a failed decode never returns a partial value.
/// The variants distinguish the cases a caller may want to react to
/// differently. In particular, [`Error::BufferUnderrun`] is kept separate
/// from the malformed-data variants so that a streaming caller can decide
/// to wait for more input instead of giving up.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// A value was rejected by its type's constraint at bind time.
    #[error("constraint violated: {0}")]
    ConstraintViolation(&'static str),

    /// Two members of a named type group share an effective tag.
    ///
    /// With duplicate tags, decode-time disambiguation is impossible. The
    /// error is raised when the group is constructed, never during decode.
    #[error("ambiguous members {0} and {1}: overlapping effective tags")]
    AmbiguousType(String, String),

    /// A tag could not be resolved to any type.
    ///
    /// Returned when decoding without a type and the tag is not in the
    /// resolvable universal set, or when a container member's tag matches
    /// none of the declared members.
    #[error("tag {0} does not resolve to a type")]
    UnknownTag(Tag),

    /// A decoded tag did not match the tag demanded by the type.
    #[error("expected tag {expected}, found {found}")]
    TagMismatch {
        /// The tag the type demands.
        expected: Tag,

        /// The tag found in the data.
        found: Tag,
    },

    /// The length octets are invalid.
    ///
    /// This covers the reserved first octet 0xFF, indefinite length on a
    /// primitive value, and non-minimal length forms under CER and DER.
    #[error("malformed length octets")]
    MalformedLength,

    /// The data ended before the end-of-contents marker of an indefinite
    /// length value was found.
    #[error("unterminated indefinite length value")]
    UnterminatedIndefinite,

    /// The data ended early: a declared length exceeds the remaining input.
    ///
    /// The value is the number of octets missing. A streaming caller can
    /// treat this as "wait for more data" rather than as corruption.
    #[error("unexpected end of data, {0} more octets needed")]
    BufferUnderrun(usize),

    /// A required member of a sequence or set is not present.
    #[error("required member '{0}' is missing")]
    MissingRequiredMember(String),

    /// A choice value without a selected alternative was encoded.
    #[error("choice has no selected alternative")]
    UnsetChoice,

    /// Set members were not in canonical order while decoding in DER mode.
    #[error("set members not in canonical tag order")]
    DerOrderingViolation,

    /// The content octets violate the grammar of their type.
    #[error("malformed content: {0}")]
    Malformed(&'static str),

    /// The data is well-formed but uses an encoding beyond the supported
    /// limits, such as a tag number wider than 32 bits.
    #[error("unsupported encoding: {0}")]
    Unsupported(&'static str),

    /// Structural nesting exceeded the decoder's depth limit.
    #[error("nesting depth limit exceeded")]
    NestingLimit,
}
