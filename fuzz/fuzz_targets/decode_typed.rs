#![no_main]

use libfuzzer_sys::fuzz_target;
use tyber::{AsnType, Mode, NamedType, NamedTypes, Tag, Value, codec};

fn spec() -> AsnType {
    AsnType::sequence(NamedTypes::new([
        NamedType::new("version", AsnType::integer()),
        NamedType::optional(
            "flags",
            AsnType::bit_string().tagged_implicit(Tag::context(0)),
        ),
        NamedType::defaulted(
            "count", AsnType::integer(), Value::integer(1i64)
        ),
        NamedType::new("payload", AsnType::octet_string()),
    ]).expect("unambiguous spec"))
}

fuzz_target!(|data: &[u8]| {
    let spec = spec();
    for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
        if let Ok((value, _)) = codec::decode(
            data.to_vec(), Some(&spec), mode
        ) {
            // A decoded value is complete: re-encoding must succeed and
            // decode back to an equal value.
            let encoded = codec::der::encode(&value).unwrap();
            let (again, rest) = codec::der::decode_with(encoded, &spec)
                .unwrap();
            assert!(rest.is_empty());
            assert_eq!(again, value);
        }
    }
});
