//! The Distinguished Encoding Rules.
//!
//! DER removes the encoder's choices in favor of the definite length
//! form: indefinite lengths and chunked strings are forbidden, boolean
//! true is always 0xFF, defaulted members equal to their default are
//! omitted, and the members of a set are emitted in ascending order of
//! their encoded identifier octets. Given a value and its type, the DER
//! encoding is unique.
//!
//! Decoding is the strict subset of BER decoding that DER data can
//! contain: definite, minimally encoded lengths only, primitive strings
//! only. The decoder additionally validates that set members arrive in
//! canonical order.

use bytes::Bytes;
use crate::error::Error;
use crate::mode::Mode;
use crate::typ::AsnType;
use crate::value::Value;
use super::EncodeOptions;

/// Encodes a value under DER.
pub fn encode(value: &Value) -> Result<Bytes, Error> {
    super::encode(value, &EncodeOptions::der())
}

/// Decodes one value from the beginning of the data under DER.
pub fn decode(data: impl Into<Bytes>) -> Result<(Value, Bytes), Error> {
    super::ber::decode_value(data.into(), None, Mode::Der)
}

/// Decodes one value of the given type under DER.
pub fn decode_with(
    data: impl Into<Bytes>, spec: &AsnType
) -> Result<(Value, Bytes), Error> {
    super::ber::decode_value(data.into(), Some(spec), Mode::Der)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::bits::Bits;
    use crate::named::{NamedType, NamedTypes};
    use crate::tag::Tag;
    use super::*;

    fn der(value: &Value) -> Vec<u8> {
        encode(value).unwrap().to_vec()
    }

    #[test]
    fn strings_stay_primitive() {
        assert_eq!(
            der(&Value::octet_string(Bytes::from_static(
                b"Quick brown fox"
            ))),
            b"\x04\x0fQuick brown fox"
        );
        let value = Value::octet_string(Bytes::from(vec![b'Q'; 1001]));
        let data = der(&value);
        assert_eq!(&data[..4], b"\x04\x82\x03\xe9");
        assert_eq!(data.len(), 4 + 1001);
    }

    #[test]
    fn one_bit_bit_string() {
        assert_eq!(
            der(&Value::bit_string(Bits::from_bits([true]))),
            b"\x03\x02\x07\x80"
        );
    }

    #[test]
    fn boolean_true_is_ff() {
        assert_eq!(der(&Value::boolean(true)), b"\x01\x01\xff");
    }

    #[test]
    fn set_with_choice_is_tag_ordered() {
        let status = AsnType::choice(NamedTypes::new([
            NamedType::new("name", AsnType::octet_string()),
            NamedType::new("amount", AsnType::integer()),
        ]).unwrap());
        let typ = AsnType::set(NamedTypes::new([
            NamedType::new("place-holder", AsnType::null()),
            NamedType::new("status", status.clone()),
        ]).unwrap());
        let value = Value::set(&typ, [
            ("place-holder", Value::null()),
            (
                "status",
                Value::choice(
                    &status, "name",
                    Value::octet_string(Bytes::from_static(b"ann")),
                ).unwrap(),
            ),
        ]).unwrap();
        assert_eq!(der(&value), b"\x31\x07\x04\x03ann\x05\x00");

        // With the other alternative selected the order flips.
        let value = Value::set(&typ, [
            ("place-holder", Value::null()),
            (
                "status",
                Value::choice(&status, "amount", Value::integer(9i64))
                    .unwrap(),
            ),
        ]).unwrap();
        assert_eq!(der(&value), b"\x31\x06\x02\x01\x09\x05\x00");
    }

    #[test]
    fn set_of_sorts_by_encoding() {
        let typ = AsnType::set_of(AsnType::integer());
        let value = Value::set_of(&typ, [
            Value::integer(300i64),
            Value::integer(5i64),
            Value::integer(-2i64),
        ]).unwrap();
        // Shorter encodings sort before longer ones of the same tag,
        // and equal-length ones sort by content octets.
        assert_eq!(
            der(&value),
            b"\x31\x0a\x02\x01\x05\x02\x01\xfe\x02\x02\x01\x2c"
        );
    }

    #[test]
    fn indefinite_input_is_rejected() {
        assert_eq!(
            decode(Bytes::from_static(b"\x30\x80\x05\x00\x00\x00")),
            Err(Error::MalformedLength)
        );
    }

    #[test]
    fn non_minimal_lengths_are_rejected() {
        assert_eq!(
            decode(Bytes::from_static(b"\x04\x81\x03fox")),
            Err(Error::MalformedLength)
        );
    }

    #[test]
    fn constructed_strings_are_rejected() {
        assert_eq!(
            decode(Bytes::from_static(
                b"\x24\x08\x04\x02Qu\x04\x02ic"
            )),
            Err(Error::Malformed("constructed string value under DER"))
        );
    }

    #[test]
    fn set_ordering_is_validated() {
        let typ = AsnType::set(NamedTypes::new([
            NamedType::new("place-holder", AsnType::null()),
            NamedType::new("number", AsnType::integer()),
        ]).unwrap());
        let (value, _) = decode_with(
            Bytes::from_static(b"\x31\x05\x02\x01\x07\x05\x00"), &typ
        ).unwrap();
        assert!(value.member("place-holder").unwrap().is_null());
        assert_eq!(
            decode_with(
                Bytes::from_static(b"\x31\x05\x05\x00\x02\x01\x07"),
                &typ,
            ),
            Err(Error::DerOrderingViolation)
        );
    }

    #[test]
    fn canonical_re_encoding_is_stable() {
        let typ = AsnType::sequence(NamedTypes::new([
            NamedType::new("modulus", AsnType::integer()),
            NamedType::new("exponent", AsnType::integer()),
            NamedType::optional(
                "label",
                AsnType::octet_string()
                    .tagged_implicit(Tag::context(0)),
            ),
        ]).unwrap());
        let value = Value::sequence(&typ, [
            ("modulus", Value::integer(0x00c3_55f2u64)),
            ("exponent", Value::integer(65537i64)),
            ("label", Value::octet_string(Bytes::from_static(b"key"))),
        ]).unwrap();
        let first = encode(&value).unwrap();
        let (back, rest) = decode_with(first.clone(), &typ).unwrap();
        assert!(rest.is_empty());
        assert_eq!(back, value);
        let second = encode(&back).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn equal_values_encode_identically() {
        let typ = AsnType::sequence(NamedTypes::new([
            NamedType::new("place-holder", AsnType::null()),
            NamedType::defaulted(
                "age", AsnType::integer(), Value::integer(33i64)
            ),
        ]).unwrap());
        let absent = Value::sequence(
            &typ, [("place-holder", Value::null())]
        ).unwrap();
        let explicit = Value::sequence(&typ, [
            ("place-holder", Value::null()),
            ("age", Value::integer(33i64)),
        ]).unwrap();
        assert_eq!(encode(&absent).unwrap(), encode(&explicit).unwrap());
        assert_eq!(encode(&absent).unwrap().as_ref(), b"\x30\x02\x05\x00");
    }
}
