//! Typed modeling and encoding of data in BER, CER, and DER.
//!
//! This crate lets you describe structured data against type templates
//! and move it to and from the tag-length-value wire formats of the
//! ASN.1 Basic, Canonical, and Distinguished Encoding Rules.
//!
//! The pieces fit together like this:
//!
//! * [`AsnType`] is an immutable type template: a tag chain, an optional
//!   [`Constraint`], and a shape — scalar, structure over [`NamedTypes`],
//!   repetition, choice, or opaque. Templates derive from one another
//!   through [`AsnType::tagged_explicit`], [`AsnType::tagged_implicit`],
//!   and [`AsnType::constrained`]; deriving never touches the original,
//!   so templates can be shared freely, including across threads.
//! * [`Value`] is a payload bound to a template. Binding checks the
//!   shape and evaluates the constraint right away.
//! * [`codec`] turns values into octets and back. [`codec::encode`]
//!   walks a value bottom-up under [`codec::EncodeOptions`];
//!   [`codec::decode`] consumes exactly one value from the input and
//!   returns it together with the unconsumed remainder, optionally
//!   guided by a template. The rule sets are selected through [`Mode`]
//!   or the convenience modules [`codec::ber`], [`codec::cer`], and
//!   [`codec::der`].
//!
//! # Example
//!
//! Describe a structure, bind a value, and round-trip it through DER:
//!
//! ```
//! use tyber::{AsnType, NamedType, NamedTypes, Value, codec};
//!
//! let typ = AsnType::sequence(NamedTypes::new([
//!     NamedType::new("modulus", AsnType::integer()),
//!     NamedType::new("exponent", AsnType::integer()),
//! ])?);
//! let key = Value::sequence(&typ, [
//!     ("modulus", Value::integer(3233i64)),
//!     ("exponent", Value::integer(17i64)),
//! ])?;
//! let data = codec::der::encode(&key)?;
//! let (decoded, rest) = codec::der::decode_with(data, &typ)?;
//! assert!(rest.is_empty());
//! assert_eq!(decoded, key);
//! # Ok::<(), tyber::Error>(())
//! ```

pub use self::bits::Bits;
pub use self::constraint::Constraint;
pub use self::error::Error;
pub use self::int::Int;
pub use self::mode::Mode;
pub use self::named::{NamedType, NamedTypes, Role};
pub use self::oid::Oid;
pub use self::tag::{Tag, TagClass, TagForm, TagSet};
pub use self::typ::AsnType;
pub use self::value::{Value, ValueKind};

pub mod bits;
pub mod codec;
pub mod constraint;
pub mod error;
pub mod int;
pub mod mode;
pub mod named;
pub mod oid;
pub mod tag;
pub mod typ;
pub mod value;

mod length;
