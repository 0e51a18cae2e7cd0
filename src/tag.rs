//! The identifier octets of an encoded value.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use smallvec::SmallVec;
use crate::codec::source::Reader;
use crate::error::Error;


//------------ TagClass ------------------------------------------------------

/// The class of a tag.
///
/// The two most significant bits of the first identifier octet carry the
/// class. Universal tags are assigned by the standard itself, the other
/// three classes are available to applications.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TagClass {
    /// The universal class, first octet bits `00`.
    Universal,

    /// The application class, first octet bits `01`.
    Application,

    /// The context-specific class, first octet bits `10`.
    Context,

    /// The private class, first octet bits `11`.
    Private,
}

impl TagClass {
    /// Returns the class bits positioned in the two top bits of an octet.
    fn bits(self) -> u8 {
        match self {
            TagClass::Universal => 0x00,
            TagClass::Application => 0x40,
            TagClass::Context => 0x80,
            TagClass::Private => 0xc0,
        }
    }

    /// Extracts the class from the first identifier octet.
    fn from_bits(octet: u8) -> Self {
        match octet & 0xc0 {
            0x00 => TagClass::Universal,
            0x40 => TagClass::Application,
            0x80 => TagClass::Context,
            _ => TagClass::Private,
        }
    }
}


//------------ TagForm -------------------------------------------------------

/// The encoding form of a tag.
///
/// Bit 6 of the first identifier octet states whether the content octets
/// contain the value itself (primitive) or a sequence of further encoded
/// values (constructed). The form is part of the data model's `Tag` but
/// does not take part in tag identity: a chunked string arrives with the
/// constructed bit set yet is the same type as its primitive sibling.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TagForm {
    /// The content octets are the value itself.
    #[default]
    Primitive,

    /// The content octets are a sequence of encoded values.
    Constructed,
}


//------------ Tag -----------------------------------------------------------

/// The tag of an encoded value.
///
/// Each encoded value starts with one or more identifier octets encoding
/// the class, form, and number of its tag.
///
/// Equality, ordering, and hashing consider class and number only. The
/// form is carried along because re-tagging needs to preserve it, but it
/// never distinguishes two tags: the decoder matches a constructed
/// OCTET STRING fragment wrapper against the same tag as the primitive
/// encoding. Ordering by `(class, number)` coincides with ordering by
/// encoded identifier octets, which is what the restricted modes sort set
/// members by.
///
/// # Limitations
///
/// Tag numbers are limited to 32 bits, that is, at most five continuation
/// octets. Decoding a larger number fails with [`Error::Unsupported`].
#[derive(Clone, Copy, Debug)]
pub struct Tag {
    /// The class of the tag.
    class: TagClass,

    /// The encoding form.
    form: TagForm,

    /// The tag number.
    number: u32,
}

/// # Constants for Often Used Tags
///
impl Tag {
    /// The largest tag number that fits the first identifier octet.
    const MAX_LOW_NUMBER: u32 = 0x1e;

    /// The first-octet number field marking a multi-octet tag number.
    ///
    /// (5 bits, `0b0001_1111`.)
    const HIGH_NUMBER_MARKER: u8 = 0x1f;

    /// The mask for the payload bits of a continuation octet.
    ///
    /// (7 bits, `0b0111_1111`.)
    const CONTINUATION_MASK: u8 = 0x7f;

    /// The constructed bit of the first identifier octet.
    const CONSTRUCTED_MASK: u8 = 0x20;

    /// The tag of the end-of-contents marker, UNIVERSAL 0.
    pub const END_OF_CONTENTS: Self = Tag::universal(0);

    /// The tag of the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Tag::universal(1);

    /// The tag of the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Tag::universal(2);

    /// The tag of the BIT STRING type, UNIVERSAL 3.
    pub const BIT_STRING: Self = Tag::universal(3);

    /// The tag of the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Tag::universal(4);

    /// The tag of the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Tag::universal(5);

    /// The tag of the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Tag::universal(6);

    /// The tag of the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Tag::new(
        TagClass::Universal, TagForm::Constructed, 16
    );

    /// The tag of the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Tag::new(
        TagClass::Universal, TagForm::Constructed, 17
    );
}

impl Tag {
    /// Creates a new tag from its parts.
    pub const fn new(class: TagClass, form: TagForm, number: u32) -> Self {
        Tag { class, form, number }
    }

    /// Creates a primitive-form tag in the universal class.
    pub const fn universal(number: u32) -> Self {
        Tag::new(TagClass::Universal, TagForm::Primitive, number)
    }

    /// Creates a primitive-form tag in the application class.
    pub const fn application(number: u32) -> Self {
        Tag::new(TagClass::Application, TagForm::Primitive, number)
    }

    /// Creates a primitive-form tag in the context-specific class.
    pub const fn context(number: u32) -> Self {
        Tag::new(TagClass::Context, TagForm::Primitive, number)
    }

    /// Creates a primitive-form tag in the private class.
    pub const fn private(number: u32) -> Self {
        Tag::new(TagClass::Private, TagForm::Primitive, number)
    }

    /// Returns the same tag in constructed form.
    pub const fn constructed(self) -> Self {
        Tag::new(self.class, TagForm::Constructed, self.number)
    }

    /// Returns the class of the tag.
    pub fn class(self) -> TagClass {
        self.class
    }

    /// Returns the encoding form of the tag.
    pub fn form(self) -> TagForm {
        self.form
    }

    /// Returns the number of the tag.
    pub fn number(self) -> u32 {
        self.number
    }

    /// Returns whether the tag is of the universal class.
    pub fn is_universal(self) -> bool {
        self.class == TagClass::Universal
    }

    /// Takes a tag from the beginning of a source.
    ///
    /// The returned tag's form reflects the constructed bit found in the
    /// data. Tag numbers beyond 32 bits produce [`Error::Unsupported`].
    pub(crate) fn take_from(source: &mut Reader) -> Result<Self, Error> {
        let first = source.take_u8()?;
        let class = TagClass::from_bits(first);
        let form = if first & Tag::CONSTRUCTED_MASK != 0 {
            TagForm::Constructed
        }
        else {
            TagForm::Primitive
        };
        if first & Tag::HIGH_NUMBER_MARKER != Tag::HIGH_NUMBER_MARKER {
            return Ok(Tag::new(
                class, form, u32::from(first & Tag::HIGH_NUMBER_MARKER)
            ))
        }
        let mut number: u64 = 0;
        loop {
            let octet = source.take_u8()?;
            number = (number << 7) | u64::from(octet & Tag::CONTINUATION_MASK);
            if number > u64::from(u32::MAX) {
                return Err(Error::Unsupported("tag number exceeds 32 bits"))
            }
            if octet & 0x80 == 0 {
                return Ok(Tag::new(class, form, number as u32))
            }
        }
    }

    /// Returns the number of octets of the encoded form of the tag.
    pub(crate) fn encoded_len(self) -> usize {
        match self.number {
            n if n <= Tag::MAX_LOW_NUMBER => 1,
            n if n < 1 << 7 => 2,
            n if n < 1 << 14 => 3,
            n if n < 1 << 21 => 4,
            n if n < 1 << 28 => 5,
            _ => 6,
        }
    }

    /// Appends the identifier octets to the end of `target`.
    ///
    /// The constructed bit is taken from `form`, not from the tag itself,
    /// since the wire form depends on how the content ends up encoded.
    pub(crate) fn append_encoded(
        self, form: TagForm, target: &mut Vec<u8>
    ) {
        let mut first = self.class.bits();
        if matches!(form, TagForm::Constructed) {
            first |= Tag::CONSTRUCTED_MASK;
        }
        if self.number <= Tag::MAX_LOW_NUMBER {
            target.push(first | self.number as u8);
            return
        }
        target.push(first | Tag::HIGH_NUMBER_MARKER);
        let septets = self.encoded_len() - 1;
        for i in (0..septets).rev() {
            let mut octet = ((self.number >> (7 * i)) as u8)
                & Tag::CONTINUATION_MASK;
            if i > 0 {
                octet |= 0x80;
            }
            target.push(octet);
        }
    }
}


//--- PartialEq, Eq, Hash, PartialOrd, Ord
//
//    All of these ignore the form.

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.number == other.number
    }
}

impl Eq for Tag { }

impl std::hash::Hash for Tag {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.class.hash(state);
        self.number.hash(state);
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.class, self.number).cmp(&(other.class, other.number))
    }
}


//--- Display

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tag = *self;
        if tag == Tag::BOOLEAN {
            write!(f, "BOOLEAN")
        }
        else if tag == Tag::INTEGER {
            write!(f, "INTEGER")
        }
        else if tag == Tag::BIT_STRING {
            write!(f, "BIT STRING")
        }
        else if tag == Tag::OCTET_STRING {
            write!(f, "OCTET STRING")
        }
        else if tag == Tag::NULL {
            write!(f, "NULL")
        }
        else if tag == Tag::OID {
            write!(f, "OBJECT IDENTIFIER")
        }
        else if tag == Tag::SEQUENCE {
            write!(f, "SEQUENCE")
        }
        else if tag == Tag::SET {
            write!(f, "SET")
        }
        else {
            match tag.class {
                TagClass::Universal => write!(f, "[UNIVERSAL ")?,
                TagClass::Application => write!(f, "[APPLICATION ")?,
                TagClass::Context => write!(f, "[")?,
                TagClass::Private => write!(f, "[PRIVATE ")?,
            }
            write!(f, "{}]", tag.number)
        }
    }
}


//------------ TagSet --------------------------------------------------------

/// The ordered tag chain of a type.
///
/// A type carries zero or more outer tags followed by one base tag, with
/// the outermost tag first. Plain types start out with their single
/// universal base tag. A choice or an opaque "any" type starts out with an
/// empty chain: its effective tag is whatever its content provides.
///
/// Re-tagging never mutates a chain, it produces a new one. Explicit
/// re-tagging prepends an outer tag whose wrapper is constructed on the
/// wire. Implicit re-tagging replaces the leading tag while preserving its
/// form; applied to an empty chain it inserts the tag as given, which is
/// how a tagged "any" value gets its primitive wrapper.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct TagSet {
    /// The tags, outermost first. The last one is the base tag.
    tags: SmallVec<[Tag; 2]>,
}

impl TagSet {
    /// Creates an empty tag chain.
    pub fn empty() -> Self {
        TagSet::default()
    }

    /// Creates a chain of a single base tag.
    pub fn of(tag: Tag) -> Self {
        TagSet { tags: SmallVec::from_slice(&[tag]) }
    }

    /// Returns a new chain with an explicit outer tag prepended.
    pub fn explicit(&self, tag: Tag) -> Self {
        let mut tags = SmallVec::with_capacity(self.tags.len() + 1);
        tags.push(tag.constructed());
        tags.extend_from_slice(&self.tags);
        TagSet { tags }
    }

    /// Returns a new chain with the leading tag replaced.
    ///
    /// The replacement keeps the form of the tag it replaces. On an empty
    /// chain the tag is inserted as given.
    pub fn implicit(&self, tag: Tag) -> Self {
        let mut tags = self.tags.clone();
        match tags.first_mut() {
            Some(first) => {
                *first = Tag::new(tag.class(), first.form(), tag.number());
            }
            None => tags.push(tag),
        }
        TagSet { tags }
    }

    /// Returns whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the number of tags in the chain.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns the outermost tag, if any.
    pub fn outer(&self) -> Option<Tag> {
        self.tags.first().copied()
    }

    /// Returns the base tag, if any.
    pub fn base(&self) -> Option<Tag> {
        self.tags.last().copied()
    }

    /// Returns the tags as a slice, outermost first.
    pub fn as_slice(&self) -> &[Tag] {
        &self.tags
    }
}


//============ Tests =========================================================
