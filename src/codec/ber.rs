//! The Basic Encoding Rules engine.
//!
//! This module implements the shared tag-length-value grammar that all
//! three rule sets use. The restricted rule sets hook into it through
//! [`Mode`] and [`EncodeOptions`]: the [`cer`][super::cer] and
//! [`der`][super::der] modules are thin specializations of the functions
//! in here.

use bytes::Bytes;
use crate::bits::Bits;
use crate::error::Error;
use crate::int::Int;
use crate::length::Length;
use crate::mode::Mode;
use crate::named::{NamedTypes, Role};
use crate::oid::Oid;
use crate::tag::{Tag, TagForm};
use crate::typ::{AsnType, TypeVariant};
use crate::value::{Value, ValueKind};
use super::{EncodeOptions, MAX_DEPTH};
use super::source::Reader;


//============ Encoding ======================================================

/// Encodes a value under BER with the default options.
pub fn encode(value: &Value) -> Result<Bytes, Error> {
    super::encode(value, &EncodeOptions::ber())
}

/// Encodes a value under BER with the given options.
pub fn encode_with(
    value: &Value, options: &EncodeOptions
) -> Result<Bytes, Error> {
    super::encode(value, options)
}

/// Encodes a value into a byte vector.
pub(crate) fn encode_to_vec(
    value: &Value, opts: &EncodeOptions
) -> Result<Vec<u8>, Error> {
    let tags = value.typ().tags().as_slice();
    // A choice or opaque value has no tag of its own: every tag in the
    // chain is a wrapper around its natural encoding. For all other
    // shapes the last tag belongs to the value itself.
    let (wrappers, own) = match value.typ().variant() {
        TypeVariant::Choice(_) | TypeVariant::Any => (tags, None),
        _ => match tags.split_last() {
            Some((own, wrappers)) => (wrappers, Some(*own)),
            None => (tags, None),
        }
    };
    let mut body = encode_body(value, own, opts)?;
    for tag in wrappers.iter().rev() {
        body = wrap_tag(*tag, body, opts);
    }
    Ok(body)
}

/// Encodes the value proper, without any wrapper tags.
///
/// For plain shapes this produces the complete tag-length-value triplet
/// under `own`. For a choice it produces the selected alternative's
/// encoding, for an opaque value the raw octets as they are.
fn encode_body(
    value: &Value, own: Option<Tag>, opts: &EncodeOptions
) -> Result<Vec<u8>, Error> {
    match value.kind() {
        ValueKind::Boolean(val) => {
            let content = if !*val {
                0x00
            }
            else if opts.mode.is_restricted() {
                0xff
            }
            else {
                0x01
            };
            Ok(primitive_tlv(own_tag(own)?, &[content]))
        }
        ValueKind::Integer(val) => {
            Ok(primitive_tlv(own_tag(own)?, val.as_twos_complement()))
        }
        ValueKind::BitString(val) => {
            encode_bits(own_tag(own)?, val, opts)
        }
        ValueKind::OctetString(val) => {
            encode_octets(own_tag(own)?, val, opts)
        }
        ValueKind::Null => Ok(primitive_tlv(own_tag(own)?, b"")),
        ValueKind::Oid(val) => {
            let mut content = Vec::new();
            val.append_content(&mut content);
            Ok(primitive_tlv(own_tag(own)?, &content))
        }
        ValueKind::Sequence(slots) => {
            let parts = encode_members(value, slots, opts)?;
            Ok(constructed_tlv(
                own_tag(own)?, concat(parts), opts.effective_definite()
            ))
        }
        ValueKind::Set(slots) => {
            let mut parts = encode_members(value, slots, opts)?;
            if opts.mode.is_restricted() {
                // Canonical order: ascending encoded identifier octets.
                // Tag encodings are prefix free, so comparing the whole
                // encodings sorts by tag; it also canonicalizes repeated
                // components, which share a tag.
                parts.sort();
            }
            Ok(constructed_tlv(
                own_tag(own)?, concat(parts), opts.effective_definite()
            ))
        }
        ValueKind::SequenceOf(elements) => {
            let parts = elements.iter()
                .map(|element| encode_to_vec(element, opts))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(constructed_tlv(
                own_tag(own)?, concat(parts), opts.effective_definite()
            ))
        }
        ValueKind::SetOf(elements) => {
            let mut parts = elements.iter()
                .map(|element| encode_to_vec(element, opts))
                .collect::<Result<Vec<_>, _>>()?;
            if opts.mode.is_restricted() {
                parts.sort();
            }
            Ok(constructed_tlv(
                own_tag(own)?, concat(parts), opts.effective_definite()
            ))
        }
        ValueKind::Choice(selection) => {
            match selection {
                Some((_, inner)) => encode_to_vec(inner, opts),
                None => Err(Error::UnsetChoice),
            }
        }
        ValueKind::Any(raw) => Ok(raw.to_vec()),
    }
}

/// Returns the value's own tag.
fn own_tag(own: Option<Tag>) -> Result<Tag, Error> {
    own.ok_or(Error::Malformed("value without a tag"))
}

/// Encodes the present members of a structure in declaration order.
///
/// A defaulted member is emitted only when it is bound to something else
/// than its declared default; this holds under every rule set so that
/// equal values share their canonical encodings.
fn encode_members(
    value: &Value, slots: &[Option<Value>], opts: &EncodeOptions
) -> Result<Vec<Vec<u8>>, Error> {
    let members = match value.typ().variant() {
        TypeVariant::Sequence(members) => members,
        TypeVariant::Set(members) => members,
        _ => return Err(Error::Malformed("value does not fit the type")),
    };
    let mut parts = Vec::new();
    for (member, slot) in members.iter().zip(slots) {
        match (slot, member.role()) {
            (Some(bound), Role::Defaulted(default)) => {
                if bound != default {
                    parts.push(encode_to_vec(bound, opts)?);
                }
            }
            (Some(bound), _) => parts.push(encode_to_vec(bound, opts)?),
            (None, Role::Required) => {
                return Err(Error::MissingRequiredMember(
                    member.name().into()
                ))
            }
            (None, _) => { }
        }
    }
    Ok(parts)
}

/// Encodes an octet string, chunked if the options call for it.
fn encode_octets(
    tag: Tag, val: &Bytes, opts: &EncodeOptions
) -> Result<Vec<u8>, Error> {
    let Some(chunk) = octet_chunk_size(val.len(), opts) else {
        return Ok(primitive_tlv(tag, val))
    };
    let parts = val.chunks(chunk)
        .map(|part| primitive_tlv(Tag::OCTET_STRING, part))
        .collect();
    Ok(constructed_tlv(tag, concat(parts), opts.effective_definite()))
}

/// Encodes a bit string, chunked if the options call for it.
///
/// Each fragment carries its own unused-bits octet; only the final
/// fragment may leave bits unused.
fn encode_bits(
    tag: Tag, val: &Bits, opts: &EncodeOptions
) -> Result<Vec<u8>, Error> {
    let data = val.octets();
    let Some(chunk) = bit_chunk_size(data.len(), opts) else {
        let mut content = Vec::with_capacity(data.len() + 1);
        content.push(val.unused());
        content.extend_from_slice(data);
        return Ok(primitive_tlv(tag, &content))
    };
    let mut parts = Vec::new();
    let mut chunks = data.chunks(chunk).peekable();
    while let Some(part) = chunks.next() {
        let unused = if chunks.peek().is_some() { 0 } else { val.unused() };
        let mut content = Vec::with_capacity(part.len() + 1);
        content.push(unused);
        content.extend_from_slice(part);
        parts.push(primitive_tlv(Tag::BIT_STRING, &content));
    }
    Ok(constructed_tlv(tag, concat(parts), opts.effective_definite()))
}

/// Returns the chunk size for an octet string payload, if it is to be
/// chunked at all.
fn octet_chunk_size(len: usize, opts: &EncodeOptions) -> Option<usize> {
    match opts.mode {
        Mode::Ber => {
            opts.max_chunk.filter(|chunk| *chunk > 0 && len > *chunk)
        }
        Mode::Cer => (len > 1000).then_some(1000),
        Mode::Der => None,
    }
}

/// Returns the chunk size for a bit string payload, if it is to be
/// chunked at all.
///
/// Under CER the fragment's content octets must number exactly 1000,
/// one of which is the unused-bits octet.
fn bit_chunk_size(len: usize, opts: &EncodeOptions) -> Option<usize> {
    match opts.mode {
        Mode::Ber => {
            opts.max_chunk.filter(|chunk| *chunk > 0 && len > *chunk)
        }
        Mode::Cer => (len + 1 > 1000).then_some(999),
        Mode::Der => None,
    }
}

/// Builds a primitive tag-length-value triplet.
fn primitive_tlv(tag: Tag, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 12);
    tag.append_encoded(TagForm::Primitive, &mut out);
    Length::Definite(content.len()).append_encoded(&mut out);
    out.extend_from_slice(content);
    out
}

/// Builds a constructed tag-length-value triplet.
fn constructed_tlv(tag: Tag, inner: Vec<u8>, definite: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(inner.len() + 12);
    tag.append_encoded(TagForm::Constructed, &mut out);
    if definite {
        Length::Definite(inner.len()).append_encoded(&mut out);
        out.extend_from_slice(&inner);
    }
    else {
        Length::Indefinite.append_encoded(&mut out);
        out.extend_from_slice(&inner);
        out.extend_from_slice(&[0, 0]);
    }
    out
}

/// Wraps an encoded value in a tag.
///
/// Constructed-form wrappers follow the active length mode. A primitive
/// wrapper, which only occurs around opaque values with an implicit tag,
/// is always definite.
fn wrap_tag(tag: Tag, inner: Vec<u8>, opts: &EncodeOptions) -> Vec<u8> {
    match tag.form() {
        TagForm::Constructed => {
            constructed_tlv(tag, inner, opts.effective_definite())
        }
        TagForm::Primitive => primitive_tlv(tag, &inner),
    }
}

/// Concatenates encoded parts.
fn concat(parts: Vec<Vec<u8>>) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        parts.iter().map(Vec::len).sum()
    );
    for part in parts {
        out.extend_from_slice(&part);
    }
    out
}


//============ Decoding ======================================================

/// Decodes one value from the beginning of the data under BER.
pub fn decode(data: impl Into<Bytes>) -> Result<(Value, Bytes), Error> {
    decode_value(data.into(), None, Mode::Ber)
}

/// Decodes one value of the given type from the beginning of the data.
pub fn decode_with(
    data: impl Into<Bytes>, spec: &AsnType
) -> Result<(Value, Bytes), Error> {
    decode_value(data.into(), Some(spec), Mode::Ber)
}

/// Decodes one value, optionally guided by a type.
pub(crate) fn decode_value(
    data: Bytes, spec: Option<&AsnType>, mode: Mode
) -> Result<(Value, Bytes), Error> {
    let mut src = Reader::new(data);
    let value = match spec {
        Some(typ) => {
            let hdr = take_header(&mut src, mode)?;
            parse_typed(&mut src, hdr, typ, 0, mode, 0)?
        }
        None => {
            let hdr = take_header(&mut src, mode)?;
            parse_untyped(&mut src, hdr, mode, 0)?
        }
    };
    Ok((value, src.rest()))
}


//------------ Header --------------------------------------------------------

/// The parsed identifier and length octets of a value.
#[derive(Clone, Debug)]
struct Header {
    /// The position of the first identifier octet in the reader.
    start: usize,

    /// The tag, with the form as found in the data.
    tag: Tag,

    /// The length.
    length: Length,
}

impl Header {
    /// Returns whether the value is in constructed form.
    fn constructed(&self) -> bool {
        matches!(self.tag.form(), TagForm::Constructed)
    }
}

/// Takes the identifier and length octets from a source.
///
/// The indefinite form is only acceptable for constructed values and,
/// since DER data never contains it, only outside of DER mode.
fn take_header(src: &mut Reader, mode: Mode) -> Result<Header, Error> {
    let start = src.pos();
    let tag = Tag::take_from(src)?;
    let length = Length::take_from(src, mode)?;
    if length.is_indefinite()
        && (!matches!(tag.form(), TagForm::Constructed)
            || !mode.allows_indefinite())
    {
        return Err(Error::MalformedLength)
    }
    Ok(Header { start, tag, length })
}


//------------ Structural helpers --------------------------------------------

/// Takes the content octets of a primitive value.
fn take_primitive(src: &mut Reader, hdr: &Header) -> Result<Bytes, Error> {
    src.take(hdr.length.definite()?)
}

/// Parses the children of a constructed value.
///
/// For a definite length, children are parsed until the content octets
/// are exactly used up. For an indefinite length, children are parsed
/// until the end-of-contents marker, which is consumed but not handed to
/// the callback.
fn parse_children(
    src: &mut Reader, length: Length, mode: Mode,
    mut each: impl FnMut(&mut Reader, Header) -> Result<(), Error>,
) -> Result<(), Error> {
    match length {
        Length::Definite(len) => {
            if len > src.remaining() {
                return Err(Error::BufferUnderrun(len - src.remaining()))
            }
            let end = src.pos() + len;
            while src.pos() < end {
                let hdr = take_header(src, mode)?;
                each(src, hdr)?;
                if src.pos() > end {
                    return Err(Error::Malformed(
                        "nested value overruns its container"
                    ))
                }
            }
            Ok(())
        }
        Length::Indefinite => {
            loop {
                if src.remaining() == 0 {
                    return Err(Error::UnterminatedIndefinite)
                }
                if src.peek()? == 0 {
                    src.take_u8()?;
                    let second = src.take_u8()
                        .map_err(|_| Error::UnterminatedIndefinite)?;
                    if second != 0 {
                        return Err(Error::Malformed(
                            "malformed end-of-contents marker"
                        ))
                    }
                    return Ok(())
                }
                let hdr = take_header(src, mode)?;
                each(src, hdr)?;
            }
        }
    }
}

/// Parses exactly one nested value inside a wrapper.
fn parse_nested_one<T>(
    src: &mut Reader, length: Length, mode: Mode,
    f: impl FnOnce(&mut Reader, Header) -> Result<T, Error>,
) -> Result<T, Error> {
    match length {
        Length::Definite(len) => {
            let content = src.take(len)?;
            let mut sub = Reader::new(content);
            let hdr = take_header(&mut sub, mode)?;
            let res = f(&mut sub, hdr)?;
            if sub.remaining() != 0 {
                return Err(Error::Malformed(
                    "extra octets inside explicit tag"
                ))
            }
            Ok(res)
        }
        Length::Indefinite => {
            if src.remaining() == 0 {
                return Err(Error::UnterminatedIndefinite)
            }
            let hdr = take_header(src, mode)?;
            let res = f(src, hdr)?;
            let mut marker = [0u8; 2];
            for octet in marker.iter_mut() {
                *octet = src.take_u8()
                    .map_err(|_| Error::UnterminatedIndefinite)?;
            }
            if marker != [0, 0] {
                return Err(Error::Malformed(
                    "missing end-of-contents marker"
                ))
            }
            Ok(res)
        }
    }
}

/// Advances over one complete value without interpreting it.
fn skip_value(
    src: &mut Reader, hdr: &Header, mode: Mode, depth: usize
) -> Result<(), Error> {
    if depth >= MAX_DEPTH {
        return Err(Error::NestingLimit)
    }
    match hdr.length {
        Length::Definite(len) => src.advance(len),
        Length::Indefinite => {
            parse_children(src, Length::Indefinite, mode, |src, child| {
                skip_value(src, &child, mode, depth + 1)
            })
        }
    }
}


//------------ Content decoding ----------------------------------------------

/// Decodes boolean content octets.
///
/// The restricted modes allow exactly 0x00 and 0xFF.
fn decode_boolean(content: &[u8], mode: Mode) -> Result<bool, Error> {
    match content {
        [0x00] => Ok(false),
        [0xff] => Ok(true),
        [_] if !mode.is_restricted() => Ok(true),
        [_] => Err(Error::Malformed("boolean content not canonical")),
        _ => Err(Error::Malformed("boolean content must be one octet")),
    }
}

/// Decodes the primitive content octets of a bit string.
fn decode_bits_content(content: Bytes) -> Result<Bits, Error> {
    if content.is_empty() {
        return Err(Error::Malformed("empty bit string content"))
    }
    let unused = content[0];
    Bits::new(content.slice(1..), unused)
}

/// Parses octet string content, reassembling fragments if constructed.
fn parse_octets(
    src: &mut Reader, hdr: &Header, mode: Mode, depth: usize
) -> Result<Bytes, Error> {
    if !hdr.constructed() {
        return take_primitive(src, hdr)
    }
    if !mode.allows_indefinite() {
        return Err(Error::Malformed("constructed string value under DER"))
    }
    let mut out = Vec::new();
    collect_octet_fragments(src, hdr, mode, depth, &mut out)?;
    Ok(out.into())
}

/// Collects the fragments of a constructed octet string in order.
fn collect_octet_fragments(
    src: &mut Reader, hdr: &Header, mode: Mode, depth: usize,
    out: &mut Vec<u8>,
) -> Result<(), Error> {
    if depth >= MAX_DEPTH {
        return Err(Error::NestingLimit)
    }
    parse_children(src, hdr.length, mode, |src, child| {
        if child.tag != Tag::OCTET_STRING {
            return Err(Error::TagMismatch {
                expected: Tag::OCTET_STRING, found: child.tag,
            })
        }
        if child.constructed() {
            collect_octet_fragments(src, &child, mode, depth + 1, out)
        }
        else {
            out.extend_from_slice(take_primitive(src, &child)?.as_ref());
            Ok(())
        }
    })
}

/// Parses bit string content, reassembling fragments if constructed.
fn parse_bits(
    src: &mut Reader, hdr: &Header, mode: Mode, depth: usize
) -> Result<Bits, Error> {
    if !hdr.constructed() {
        return decode_bits_content(take_primitive(src, hdr)?)
    }
    if !mode.allows_indefinite() {
        return Err(Error::Malformed("constructed string value under DER"))
    }
    let mut fragments = Vec::new();
    collect_bit_fragments(src, hdr, mode, depth, &mut fragments)?;
    Bits::concat(&fragments)
}

/// Collects the fragments of a constructed bit string in order.
fn collect_bit_fragments(
    src: &mut Reader, hdr: &Header, mode: Mode, depth: usize,
    out: &mut Vec<Bits>,
) -> Result<(), Error> {
    if depth >= MAX_DEPTH {
        return Err(Error::NestingLimit)
    }
    parse_children(src, hdr.length, mode, |src, child| {
        if child.tag != Tag::BIT_STRING {
            return Err(Error::TagMismatch {
                expected: Tag::BIT_STRING, found: child.tag,
            })
        }
        if child.constructed() {
            collect_bit_fragments(src, &child, mode, depth + 1, out)
        }
        else {
            out.push(decode_bits_content(take_primitive(src, &child)?)?);
            Ok(())
        }
    })
}


//------------ Typed parsing -------------------------------------------------

/// Parses a value of the given type whose header is already read.
///
/// `tag_idx` is the index into the type's tag chain that `hdr` is to be
/// matched against; wrappers recurse with the next index until the chain
/// is used up.
fn parse_typed(
    src: &mut Reader, hdr: Header, typ: &AsnType, tag_idx: usize,
    mode: Mode, depth: usize,
) -> Result<Value, Error> {
    if depth >= MAX_DEPTH {
        return Err(Error::NestingLimit)
    }
    let tags = typ.tags().as_slice();
    if let Some(expected) = tags.get(tag_idx) {
        if hdr.tag != *expected {
            return Err(Error::TagMismatch {
                expected: *expected, found: hdr.tag,
            })
        }
        if tag_idx + 1 < tags.len() {
            // An explicit wrapper with more of the chain inside.
            if !hdr.constructed() {
                return Err(Error::Malformed(
                    "explicit tag in primitive form"
                ))
            }
            return parse_nested_one(
                src, hdr.length, mode,
                |src, inner| {
                    parse_typed(src, inner, typ, tag_idx + 1, mode, depth + 1)
                }
            )
        }
    }
    let kind = parse_typed_body(src, &hdr, typ, mode, depth)?;
    Value::bind_decoded(typ, kind)
}

/// Parses the body of a typed value.
///
/// `hdr` is the innermost header: for plain shapes the value's own tag,
/// for a tagged choice or opaque value the final wrapper, and for an
/// untagged choice or opaque value the header of whatever the content
/// starts with.
fn parse_typed_body(
    src: &mut Reader, hdr: &Header, typ: &AsnType, mode: Mode, depth: usize,
) -> Result<ValueKind, Error> {
    match typ.variant() {
        TypeVariant::Boolean => {
            let content = primitive_content(src, hdr)?;
            Ok(ValueKind::Boolean(decode_boolean(content.as_ref(), mode)?))
        }
        TypeVariant::Integer => {
            let content = primitive_content(src, hdr)?;
            Ok(ValueKind::Integer(Int::from_twos_complement(content)?))
        }
        TypeVariant::BitString => {
            Ok(ValueKind::BitString(parse_bits(src, hdr, mode, depth)?))
        }
        TypeVariant::OctetString => {
            Ok(ValueKind::OctetString(parse_octets(src, hdr, mode, depth)?))
        }
        TypeVariant::Null => {
            let content = primitive_content(src, hdr)?;
            if !content.is_empty() {
                return Err(Error::Malformed("null value with content"))
            }
            Ok(ValueKind::Null)
        }
        TypeVariant::ObjectIdentifier => {
            let content = primitive_content(src, hdr)?;
            Ok(ValueKind::Oid(Oid::from_content(content.as_ref())?))
        }
        TypeVariant::Sequence(members) => {
            require_constructed(hdr)?;
            Ok(ValueKind::Sequence(
                parse_sequence_members(src, hdr, members, mode, depth)?
            ))
        }
        TypeVariant::Set(members) => {
            require_constructed(hdr)?;
            Ok(ValueKind::Set(
                parse_set_members(src, hdr, members, mode, depth)?
            ))
        }
        TypeVariant::SequenceOf(component) => {
            require_constructed(hdr)?;
            Ok(ValueKind::SequenceOf(
                parse_elements(src, hdr, component, mode, depth)?
            ))
        }
        TypeVariant::SetOf(component) => {
            require_constructed(hdr)?;
            Ok(ValueKind::SetOf(
                parse_elements(src, hdr, component, mode, depth)?
            ))
        }
        TypeVariant::Choice(alternatives) => {
            if typ.tags().is_empty() {
                // Untagged: the header belongs to the alternative.
                parse_choice_alternative(
                    src, hdr.clone(), alternatives, mode, depth
                )
            }
            else {
                // Tagged: the header is the wrapper around it.
                require_constructed(hdr)?;
                parse_nested_one(src, hdr.length, mode, |src, inner| {
                    parse_choice_alternative(
                        src, inner, alternatives, mode, depth
                    )
                })
            }
        }
        TypeVariant::Any => {
            if typ.tags().is_empty() {
                // Untagged: capture the complete encoding.
                skip_value(src, hdr, mode, depth)?;
                Ok(ValueKind::Any(src.window(hdr.start, src.pos())))
            }
            else {
                // Tagged: the wrapper's content octets are the raw value.
                match hdr.length {
                    Length::Definite(len) => {
                        Ok(ValueKind::Any(src.take(len)?))
                    }
                    Length::Indefinite => {
                        let start = src.pos();
                        parse_children(
                            src, Length::Indefinite, mode,
                            |src, child| {
                                skip_value(src, &child, mode, depth + 1)
                            }
                        )?;
                        // The end-of-contents marker is not content.
                        Ok(ValueKind::Any(
                            src.window(start, src.pos() - 2)
                        ))
                    }
                }
            }
        }
    }
}

/// Takes the content of a value that must be primitive.
fn primitive_content(
    src: &mut Reader, hdr: &Header
) -> Result<Bytes, Error> {
    if hdr.constructed() {
        return Err(Error::Malformed(
            "constructed form of a primitive type"
        ))
    }
    take_primitive(src, hdr)
}

/// Rejects primitive encodings of constructed types.
fn require_constructed(hdr: &Header) -> Result<(), Error> {
    if hdr.constructed() {
        Ok(())
    }
    else {
        Err(Error::Malformed("primitive form of a constructed type"))
    }
}

/// Parses the members of a sequence against its declarations.
///
/// Members are matched in declaration order; optional and defaulted
/// members that do not claim the encoded tag are passed over. After the
/// content ends, unfilled defaulted slots take their default and an
/// unfilled required slot is an error.
fn parse_sequence_members(
    src: &mut Reader, hdr: &Header, members: &NamedTypes,
    mode: Mode, depth: usize,
) -> Result<Vec<Option<Value>>, Error> {
    let mut slots: Vec<Option<Value>> = vec![None; members.len()];
    let mut pos = 0;
    parse_children(src, hdr.length, mode, |src, child| {
        let found = members.position_of_tag_near(pos, child.tag)
            .ok_or(Error::UnknownTag(child.tag))?;
        let member = members.get(found)
            .ok_or(Error::UnknownTag(child.tag))?;
        slots[found] = Some(
            parse_typed(src, child, member.typ(), 0, mode, depth + 1)?
        );
        pos = found + 1;
        Ok(())
    })?;
    fill_absent_members(members, &mut slots)?;
    Ok(slots)
}

/// Parses the members of a set against its declarations.
///
/// Members may arrive in any order and are classified by tag. In DER
/// mode the encounter order is additionally validated to be ascending.
fn parse_set_members(
    src: &mut Reader, hdr: &Header, members: &NamedTypes,
    mode: Mode, depth: usize,
) -> Result<Vec<Option<Value>>, Error> {
    let mut slots: Vec<Option<Value>> = vec![None; members.len()];
    let mut previous: Option<Tag> = None;
    parse_children(src, hdr.length, mode, |src, child| {
        if matches!(mode, Mode::Der) {
            if previous.map_or(false, |prev| child.tag <= prev) {
                return Err(Error::DerOrderingViolation)
            }
            previous = Some(child.tag);
        }
        let found = members.position_of_tag(child.tag)
            .ok_or(Error::UnknownTag(child.tag))?;
        let member = members.get(found)
            .ok_or(Error::UnknownTag(child.tag))?;
        if slots[found].is_some() {
            return Err(Error::Malformed("duplicate set member"))
        }
        slots[found] = Some(
            parse_typed(src, child, member.typ(), 0, mode, depth + 1)?
        );
        Ok(())
    })?;
    fill_absent_members(members, &mut slots)?;
    Ok(slots)
}

/// Fills defaults into absent slots and checks required members.
fn fill_absent_members(
    members: &NamedTypes, slots: &mut [Option<Value>]
) -> Result<(), Error> {
    for (pos, slot) in slots.iter_mut().enumerate() {
        if slot.is_some() {
            continue
        }
        let Some(member) = members.get(pos) else { continue };
        match member.role() {
            Role::Required => {
                return Err(Error::MissingRequiredMember(
                    member.name().into()
                ))
            }
            Role::Optional => { }
            Role::Defaulted(default) => {
                *slot = Some(default.clone());
            }
        }
    }
    Ok(())
}

/// Parses the elements of a repeated value.
fn parse_elements(
    src: &mut Reader, hdr: &Header, component: &AsnType,
    mode: Mode, depth: usize,
) -> Result<Vec<Value>, Error> {
    let mut elements = Vec::new();
    parse_children(src, hdr.length, mode, |src, child| {
        elements.push(
            parse_typed(src, child, component, 0, mode, depth + 1)?
        );
        Ok(())
    })?;
    Ok(elements)
}

/// Dispatches a choice to the alternative claiming the header's tag.
fn parse_choice_alternative(
    src: &mut Reader, hdr: Header, alternatives: &NamedTypes,
    mode: Mode, depth: usize,
) -> Result<ValueKind, Error> {
    let pos = alternatives.position_of_tag(hdr.tag)
        .ok_or(Error::UnknownTag(hdr.tag))?;
    let alternative = alternatives.get(pos)
        .ok_or(Error::UnknownTag(hdr.tag))?;
    let value = parse_typed(
        src, hdr, alternative.typ(), 0, mode, depth + 1
    )?;
    Ok(ValueKind::Choice(Some((pos, Box::new(value)))))
}


//------------ Untyped parsing -----------------------------------------------

/// Parses a value without a guiding type.
///
/// Universal-class tags resolve through the fixed universal table.
/// Values of the other classes come back as opaque raw octets. An
/// unrecognized universal tag is an error, since its content cannot be
/// interpreted.
fn parse_untyped(
    src: &mut Reader, hdr: Header, mode: Mode, depth: usize
) -> Result<Value, Error> {
    if depth >= MAX_DEPTH {
        return Err(Error::NestingLimit)
    }
    if !hdr.tag.is_universal() {
        skip_value(src, &hdr, mode, depth)?;
        return Value::bind_decoded(
            &AsnType::any(),
            ValueKind::Any(src.window(hdr.start, src.pos())),
        )
    }
    match hdr.tag.number() {
        1 => {
            let content = primitive_content(src, &hdr)?;
            Value::bind_decoded(
                &AsnType::boolean(),
                ValueKind::Boolean(decode_boolean(content.as_ref(), mode)?),
            )
        }
        2 => {
            let content = primitive_content(src, &hdr)?;
            Value::bind_decoded(
                &AsnType::integer(),
                ValueKind::Integer(Int::from_twos_complement(content)?),
            )
        }
        3 => {
            Value::bind_decoded(
                &AsnType::bit_string(),
                ValueKind::BitString(parse_bits(src, &hdr, mode, depth)?),
            )
        }
        4 => {
            Value::bind_decoded(
                &AsnType::octet_string(),
                ValueKind::OctetString(
                    parse_octets(src, &hdr, mode, depth)?
                ),
            )
        }
        5 => {
            let content = primitive_content(src, &hdr)?;
            if !content.is_empty() {
                return Err(Error::Malformed("null value with content"))
            }
            Value::bind_decoded(&AsnType::null(), ValueKind::Null)
        }
        6 => {
            let content = primitive_content(src, &hdr)?;
            Value::bind_decoded(
                &AsnType::object_identifier(),
                ValueKind::Oid(Oid::from_content(content.as_ref())?),
            )
        }
        16 | 17 => {
            require_constructed(&hdr)?;
            let mut elements = Vec::new();
            parse_children(src, hdr.length, mode, |src, child| {
                elements.push(parse_untyped(src, child, mode, depth + 1)?);
                Ok(())
            })?;
            if hdr.tag.number() == 16 {
                Value::bind_decoded(
                    &AsnType::sequence_of(AsnType::any()),
                    ValueKind::SequenceOf(elements),
                )
            }
            else {
                Value::bind_decoded(
                    &AsnType::set_of(AsnType::any()),
                    ValueKind::SetOf(elements),
                )
            }
        }
        _ => Err(Error::UnknownTag(hdr.tag)),
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::named::{NamedType, NamedTypes};
    use super::*;

    fn ber(value: &Value) -> Vec<u8> {
        encode(value).unwrap().to_vec()
    }

    fn ber_indef(value: &Value) -> Vec<u8> {
        encode_with(value, &EncodeOptions::ber_indefinite())
            .unwrap().to_vec()
    }

    fn ber_chunked(value: &Value, definite: bool, chunk: usize) -> Vec<u8> {
        let opts = if definite {
            EncodeOptions::ber().with_max_chunk(chunk)
        }
        else {
            EncodeOptions::ber_indefinite().with_max_chunk(chunk)
        };
        encode_with(value, &opts).unwrap().to_vec()
    }

    fn decoded(data: &'static [u8]) -> Value {
        let (value, rest) = decode(Bytes::from_static(data)).unwrap();
        assert!(rest.is_empty());
        value
    }

    fn decoded_with(data: &'static [u8], spec: &AsnType) -> Value {
        let (value, rest) = decode_with(
            Bytes::from_static(data), spec
        ).unwrap();
        assert!(rest.is_empty());
        value
    }

    //-------- Integers

    #[test]
    fn encode_integers() {
        assert_eq!(ber(&Value::integer(12i64)), b"\x02\x01\x0c");
        assert_eq!(ber(&Value::integer(-12i64)), b"\x02\x01\xf4");
        assert_eq!(ber(&Value::integer(0i64)), b"\x02\x01\x00");
        assert_eq!(ber(&Value::integer(-1i64)), b"\x02\x01\xff");
        assert_eq!(
            ber(&Value::integer(0xffff_ffff_ffff_ffffu64)),
            b"\x02\x09\x00\xff\xff\xff\xff\xff\xff\xff\xff"
        );
        assert_eq!(
            ber(&Value::integer(-0xffff_ffff_ffff_ffffi128)),
            b"\x02\x09\xff\x00\x00\x00\x00\x00\x00\x00\x01"
        );
    }

    #[test]
    fn decode_integers() {
        assert_eq!(decoded(b"\x02\x01\x0c"), Value::integer(12i64));
        assert_eq!(decoded(b"\x02\x01\xf4"), Value::integer(-12i64));
        assert_eq!(
            decoded(b"\x02\x09\x00\xff\xff\xff\xff\xff\xff\xff\xff"),
            Value::integer(0xffff_ffff_ffff_ffffu64)
        );
        assert_eq!(
            decoded(b"\x02\x09\xff\x00\x00\x00\x00\x00\x00\x00\x01"),
            Value::integer(-0xffff_ffff_ffff_ffffi128)
        );
        // A template of the wrong type must be rejected.
        assert_eq!(
            decode_with(
                Bytes::from_static(b"\x02\x01\x0c"), &AsnType::null()
            ),
            Err(Error::TagMismatch {
                expected: Tag::NULL, found: Tag::INTEGER,
            })
        );
        assert_eq!(
            decoded_with(b"\x02\x01\x0c", &AsnType::integer()),
            Value::integer(12i64)
        );
    }

    //-------- Booleans

    #[test]
    fn booleans() {
        assert_eq!(ber(&Value::boolean(true)), b"\x01\x01\x01");
        assert_eq!(ber(&Value::boolean(false)), b"\x01\x01\x00");
        assert_eq!(decoded(b"\x01\x01\x01"), Value::boolean(true));
        assert_eq!(decoded(b"\x01\x01\xa5"), Value::boolean(true));
        assert_eq!(decoded(b"\x01\x01\x00"), Value::boolean(false));
    }

    #[test]
    fn decode_keeps_the_remainder() {
        let (value, rest) = decode(
            Bytes::from_static(b"\x01\x01\x01\x00\x78\x32\x32")
        ).unwrap();
        assert_eq!(value, Value::boolean(true));
        assert_eq!(rest.as_ref(), b"\x00\x78\x32\x32");
    }

    //-------- Bit strings

    fn sample_bits() -> Value {
        Value::bit_string(Bits::from_bits(
            [1u8, 0, 1, 0, 1, 0, 0, 1, 1, 0, 0, 0, 1, 0, 1]
                .iter().map(|bit| *bit != 0)
        ))
    }

    #[test]
    fn encode_bit_strings() {
        assert_eq!(ber(&sample_bits()), b"\x03\x03\x01\xa9\x8a");
        // A full sixteen bits leave no unused positions.
        let full = Value::bit_string(Bits::from_bits(
            [1u8, 0, 1, 0, 1, 0, 0, 1, 1, 0, 0, 0, 1, 0, 1, 0]
                .iter().map(|bit| *bit != 0)
        ));
        assert_eq!(ber(&full), b"\x03\x03\x00\xa9\x8a");
        assert_eq!(ber_indef(&sample_bits()), b"\x03\x03\x01\xa9\x8a");
        assert_eq!(
            ber_chunked(&sample_bits(), true, 1),
            b"\x23\x08\x03\x02\x00\xa9\x03\x02\x01\x8a"
        );
        assert_eq!(
            ber_chunked(&sample_bits(), false, 1),
            b"\x23\x80\x03\x02\x00\xa9\x03\x02\x01\x8a\x00\x00"
        );
    }

    #[test]
    fn decode_bit_strings() {
        assert_eq!(decoded(b"\x03\x03\x01\xa9\x8a"), sample_bits());
        assert_eq!(
            decoded(b"\x23\x08\x03\x02\x00\xa9\x03\x02\x01\x8a"),
            sample_bits()
        );
        assert_eq!(
            decoded(b"\x23\x80\x03\x02\x00\xa9\x03\x02\x01\x8a\x00\x00"),
            sample_bits()
        );
    }

    //-------- Octet strings

    fn fox() -> Value {
        Value::octet_string(Bytes::from_static(b"Quick brown fox"))
    }

    #[test]
    fn encode_octet_strings() {
        assert_eq!(ber(&fox()), b"\x04\x0fQuick brown fox");
        assert_eq!(ber_indef(&fox()), b"\x04\x0fQuick brown fox");
        assert_eq!(
            ber_chunked(&fox(), true, 4),
            b"\x24\x17\x04\x04Quic\x04\x04k br\x04\x04own \x04\x03fox"
        );
        assert_eq!(
            ber_chunked(&fox(), false, 4),
            b"\x24\x80\x04\x04Quic\x04\x04k br\x04\x04own \x04\x03fox\
              \x00\x00"
        );
    }

    #[test]
    fn decode_octet_strings() {
        assert_eq!(decoded(b"\x04\x0fQuick brown fox"), fox());
        assert_eq!(
            decoded(b"\x24\x80\x04\x0fQuick brown fox\x00\x00"), fox()
        );
        assert_eq!(
            decoded(
                b"\x24\x17\x04\x04Quic\x04\x04k br\x04\x04own \x04\x03fox"
            ),
            fox()
        );
        assert_eq!(
            decoded(
                b"\x24\x80\x04\x04Quic\x04\x04k br\x04\x04own \
                  \x04\x03fox\x00\x00"
            ),
            fox()
        );
    }

    //-------- Explicitly tagged values

    fn tagged_fox() -> Value {
        AsnType::octet_string()
            .tagged_explicit(Tag::application(5))
            .bind(ValueKind::OctetString(Bytes::from_static(
                b"Quick brown fox"
            )))
            .unwrap()
    }

    #[test]
    fn encode_explicitly_tagged() {
        assert_eq!(
            ber(&tagged_fox()), b"\x65\x11\x04\x0fQuick brown fox"
        );
        assert_eq!(
            ber_indef(&tagged_fox()),
            b"\x65\x80\x04\x0fQuick brown fox\x00\x00"
        );
        assert_eq!(
            ber_chunked(&tagged_fox(), true, 4),
            b"\x65\x19\x24\x17\x04\x04Quic\x04\x04k br\x04\x04own \
              \x04\x03fox"
        );
        assert_eq!(
            ber_chunked(&tagged_fox(), false, 4),
            b"\x65\x80\x24\x80\x04\x04Quic\x04\x04k br\x04\x04own \
              \x04\x03fox\x00\x00\x00\x00"
        );
    }

    #[test]
    fn decode_explicitly_tagged() {
        let spec = AsnType::octet_string()
            .tagged_explicit(Tag::application(5));
        for data in [
            b"\x65\x11\x04\x0fQuick brown fox".as_ref(),
            b"\x65\x80\x24\x80\x04\x0fQuick brown fox\x00\x00\x00\x00",
            b"\x65\x19\x24\x17\x04\x04Quic\x04\x04k br\x04\x04own \
              \x04\x03fox",
            b"\x65\x80\x24\x80\x04\x04Quic\x04\x04k br\x04\x04own \
              \x04\x03fox\x00\x00\x00\x00",
        ] {
            let (value, rest) = decode_with(
                Bytes::copy_from_slice(data), &spec
            ).unwrap();
            assert!(rest.is_empty());
            assert_eq!(
                value.as_octet_string().unwrap().as_ref(),
                b"Quick brown fox"
            );
        }
    }

    //-------- Null and object identifiers

    #[test]
    fn null_values() {
        assert_eq!(ber(&Value::null()), b"\x05\x00");
        assert_eq!(decoded(b"\x05\x00"), Value::null());
        assert_eq!(
            decode(Bytes::from_static(b"\x05\x01\x00")),
            Err(Error::Malformed("null value with content"))
        );
    }

    #[test]
    fn object_identifiers() {
        let value = Value::oid(Oid::new([1, 3, 6, 0, 0xffffe]).unwrap());
        assert_eq!(ber(&value), b"\x06\x06\x2b\x06\x00\xbf\xff\x7e");
        assert_eq!(decoded(b"\x06\x06\x2b\x06\x00\xbf\xff\x7e"), value);
    }

    //-------- Sequences

    fn person_type() -> AsnType {
        AsnType::sequence(NamedTypes::new([
            NamedType::new("place-holder", AsnType::null()),
            NamedType::optional("first-name", AsnType::octet_string()),
            NamedType::defaulted(
                "age", AsnType::integer(), Value::integer(33i64)
            ),
        ]).unwrap())
    }

    fn person(
        first_name: Option<&'static [u8]>, age: Option<i64>
    ) -> Value {
        let mut members = vec![("place-holder", Value::null())];
        if let Some(name) = first_name {
            members.push(("first-name", Value::octet_string(name)));
        }
        if let Some(age) = age {
            members.push(("age", Value::integer(age)));
        }
        Value::sequence(&person_type(), members).unwrap()
    }

    #[test]
    fn encode_sequences() {
        assert_eq!(ber(&person(None, None)), b"\x30\x02\x05\x00");
        assert_eq!(
            ber_indef(&person(None, None)), b"\x30\x80\x05\x00\x00\x00"
        );
        assert_eq!(
            ber(&person(Some(b"quick brown"), None)),
            b"\x30\x0f\x05\x00\x04\x0bquick brown"
        );
        assert_eq!(
            ber_indef(&person(Some(b"quick brown"), None)),
            b"\x30\x80\x05\x00\x04\x0bquick brown\x00\x00"
        );
        assert_eq!(
            ber_chunked(&person(Some(b"quick brown"), None), true, 4),
            b"\x30\x15\x05\x00\x24\x11\x04\x04quic\x04\x04k br\x04\x03own"
        );
        assert_eq!(
            ber_chunked(&person(Some(b"quick brown"), None), false, 4),
            b"\x30\x80\x05\x00\x24\x80\x04\x04quic\x04\x04k br\x04\x03own\
              \x00\x00\x00\x00"
        );
        assert_eq!(
            ber(&person(None, Some(1))), b"\x30\x05\x05\x00\x02\x01\x01"
        );
        assert_eq!(
            ber(&person(Some(b"quick brown"), Some(1))),
            b"\x30\x12\x05\x00\x04\x0bquick brown\x02\x01\x01"
        );
    }

    #[test]
    fn defaulted_member_is_omitted_when_equal() {
        assert_eq!(ber(&person(None, Some(33))), b"\x30\x02\x05\x00");
        assert_eq!(
            ber(&person(Some(b"quick brown"), Some(33))),
            b"\x30\x0f\x05\x00\x04\x0bquick brown"
        );
    }

    #[test]
    fn missing_required_member_fails() {
        let empty = Value::sequence(&person_type(), []).unwrap();
        assert_eq!(
            encode(&empty),
            Err(Error::MissingRequiredMember("place-holder".into()))
        );
    }

    #[test]
    fn decode_sequences_guided() {
        let spec = person_type();
        for (data, expected) in [
            (b"\x30\x02\x05\x00".as_ref(), person(None, None)),
            (b"\x30\x80\x05\x00\x00\x00", person(None, None)),
            (
                b"\x30\x0f\x05\x00\x04\x0bquick brown",
                person(Some(b"quick brown"), None),
            ),
            (
                b"\x30\x80\x05\x00\x24\x80\x04\x0bquick brown\x00\x00\
                  \x00\x00",
                person(Some(b"quick brown"), None),
            ),
            (
                b"\x30\x15\x05\x00\x24\x11\x04\x04quic\x04\x04k br\
                  \x04\x03own",
                person(Some(b"quick brown"), None),
            ),
            (b"\x30\x05\x05\x00\x02\x01\x01", person(None, Some(1))),
            (
                b"\x30\x80\x05\x00\x02\x01\x01\x00\x00",
                person(None, Some(1)),
            ),
            (
                b"\x30\x12\x05\x00\x04\x0bquick brown\x02\x01\x01",
                person(Some(b"quick brown"), Some(1)),
            ),
            (
                b"\x30\x80\x05\x00\x24\x80\x04\x04quic\x04\x04k br\
                  \x04\x03own\x00\x00\x02\x01\x01\x00\x00",
                person(Some(b"quick brown"), Some(1)),
            ),
        ] {
            let (value, rest) = decode_with(
                Bytes::copy_from_slice(data), &spec
            ).unwrap();
            assert!(rest.is_empty(), "remainder for {:02x?}", data);
            assert_eq!(value, expected, "mismatch for {:02x?}", data);
        }
    }

    #[test]
    fn absent_defaulted_member_decodes_to_default() {
        let value = decoded_with(b"\x30\x02\x05\x00", &person_type());
        assert_eq!(
            value.member("age").unwrap().as_integer(),
            Some(&Int::from(33i64))
        );
        assert!(value.member("first-name").is_none());
    }

    #[test]
    fn decode_sequences_untyped() {
        let value = decoded(
            b"\x30\x12\x05\x00\x04\x0bquick brown\x02\x01\x01"
        );
        let elements = value.elements().unwrap();
        assert_eq!(elements.len(), 3);
        assert!(elements[0].is_null());
        assert_eq!(
            elements[1].as_octet_string().unwrap().as_ref(),
            b"quick brown"
        );
        assert_eq!(elements[2].as_integer(), Some(&Int::from(1i64)));
    }

    //-------- Choice

    fn choice_type() -> AsnType {
        AsnType::choice(NamedTypes::new([
            NamedType::new("place-holder", AsnType::null()),
            NamedType::new("number", AsnType::integer()),
        ]).unwrap())
    }

    #[test]
    fn encode_choice() {
        let value = Value::choice(
            &choice_type(), "place-holder", Value::null()
        ).unwrap();
        assert_eq!(ber(&value), b"\x05\x00");

        let unset = Value::empty_choice(&choice_type()).unwrap();
        assert_eq!(encode(&unset), Err(Error::UnsetChoice));
    }

    #[test]
    fn decode_choice_guided() {
        let value = decoded_with(b"\x05\x00", &choice_type());
        let (name, inner) = value.selected().unwrap();
        assert_eq!(name, "place-holder");
        assert!(inner.is_null());

        let value = decoded_with(b"\x02\x01\x07", &choice_type());
        assert_eq!(value.selected().unwrap().0, "number");
        assert_eq!(
            decode_with(
                Bytes::from_static(b"\x04\x01x"), &choice_type()
            ),
            Err(Error::UnknownTag(Tag::OCTET_STRING))
        );
    }

    #[test]
    fn decode_tagged_choice() {
        let spec = choice_type().tagged_explicit(Tag::context(2));
        let value = decoded_with(b"\xa2\x02\x05\x00", &spec);
        assert_eq!(value.selected().unwrap().0, "place-holder");
    }

    //-------- Opaque values

    #[test]
    fn decode_any_untagged() {
        let value = decoded_with(b"\x04\x03fox", &AsnType::any());
        assert_eq!(value.as_any().unwrap().as_ref(), b"\x04\x03fox");
    }

    #[test]
    fn decode_any_explicitly_tagged() {
        let spec = AsnType::any().tagged_explicit(Tag::context(4));
        let value = decoded_with(b"\xa4\x05\x04\x03fox", &spec);
        assert_eq!(value.as_any().unwrap().as_ref(), b"\x04\x03fox");
    }

    #[test]
    fn decode_any_implicitly_tagged() {
        let spec = AsnType::any().tagged_implicit(Tag::context(4));
        let value = decoded_with(b"\x84\x05\x04\x03fox", &spec);
        assert_eq!(value.as_any().unwrap().as_ref(), b"\x04\x03fox");
    }

    #[test]
    fn encode_tagged_any_round_trip() {
        let implicit = AsnType::any().tagged_implicit(Tag::context(4));
        let value = implicit.bind(
            ValueKind::Any(Bytes::from_static(b"\x04\x03fox"))
        ).unwrap();
        assert_eq!(ber(&value), b"\x84\x05\x04\x03fox");

        let explicit = AsnType::any().tagged_explicit(Tag::context(4));
        let value = explicit.bind(
            ValueKind::Any(Bytes::from_static(b"\x04\x03fox"))
        ).unwrap();
        assert_eq!(ber(&value), b"\xa4\x05\x04\x03fox");
    }

    #[test]
    fn unknown_classes_decode_as_opaque() {
        // A large tag number spanning five continuation octets.
        let data = b"\x7f\x8d\xf5\xb6\xfd\x2f\x03\x02\x01\x01";
        let value = decoded(data);
        assert_eq!(value.as_any().unwrap().as_ref(), data);
    }

    #[test]
    fn unknown_universal_tags_fail() {
        assert_eq!(
            decode(Bytes::from_static(b"\x0c\x01x")),
            Err(Error::UnknownTag(Tag::universal(12)))
        );
    }

    //-------- Malformed input

    #[test]
    fn truncated_input() {
        assert_eq!(
            decode(Bytes::from_static(b"\x04\x10Quick")),
            Err(Error::BufferUnderrun(11))
        );
        assert_eq!(
            decode(Bytes::from_static(b"\x30\x80\x05\x00")),
            Err(Error::UnterminatedIndefinite)
        );
    }

    #[test]
    fn reserved_length_octet() {
        assert_eq!(
            decode(Bytes::from_static(b"\x04\xffxx")),
            Err(Error::MalformedLength)
        );
    }

    #[test]
    fn indefinite_primitive_is_rejected() {
        assert_eq!(
            decode(Bytes::from_static(b"\x04\x80\x00\x00")),
            Err(Error::MalformedLength)
        );
    }

    #[test]
    fn nesting_limit() {
        // Deeply nested indefinite constructed octet strings.
        let mut data = Vec::new();
        for _ in 0..40 {
            data.extend_from_slice(b"\x24\x80");
        }
        data.extend_from_slice(b"\x04\x00");
        for _ in 0..40 {
            data.extend_from_slice(b"\x00\x00");
        }
        assert_eq!(
            decode(Bytes::from(data)),
            Err(Error::NestingLimit)
        );
    }

    //-------- Streaming round trips

    #[test]
    fn round_trips() {
        let values = [
            Value::boolean(true),
            Value::integer(-129i64),
            sample_bits(),
            fox(),
            Value::null(),
            Value::oid(Oid::new([1, 3, 6]).unwrap()),
            person(Some(b"quick brown"), Some(1)),
            tagged_fox(),
        ];
        for value in values {
            for opts in [
                EncodeOptions::ber(),
                EncodeOptions::ber_indefinite(),
                EncodeOptions::ber().with_max_chunk(4),
                EncodeOptions::ber_indefinite().with_max_chunk(4),
            ] {
                let data = encode_with(&value, &opts).unwrap();
                let (back, rest) = decode_value(
                    data, Some(value.typ()), Mode::Ber
                ).unwrap();
                assert!(rest.is_empty());
                assert_eq!(back, value);
            }
        }
    }
}
