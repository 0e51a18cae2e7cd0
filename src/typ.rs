//! Type templates.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::sync::Arc;
use crate::constraint::Constraint;
use crate::error::Error;
use crate::named::NamedTypes;
use crate::tag::{Tag, TagSet};
use crate::value::{Value, ValueKind};


//------------ AsnType -------------------------------------------------------

/// A type template.
///
/// A template describes a type: its tag chain, an optional constraint,
/// and its shape, which for structured types includes the member
/// declarations. A template holds no value; binding a value against it
/// produces a [`Value`].
///
/// Templates are immutable. The builder methods
/// [`tagged_explicit`][Self::tagged_explicit],
/// [`tagged_implicit`][Self::tagged_implicit], and
/// [`constrained`][Self::constrained] each return a new template and
/// leave the original untouched. Since the inner data is shared behind an
/// `Arc`, cloning a template is cheap and a template can be used from
/// multiple threads at once without any locking.
#[derive(Clone, Debug)]
pub struct AsnType(Arc<TypeInner>);

/// The shared inner data of a type template.
#[derive(Debug)]
struct TypeInner {
    /// The tag chain.
    tags: TagSet,

    /// The constraint checked on every bind, if any.
    constraint: Option<Constraint>,

    /// The shape of the type.
    variant: TypeVariant,
}

/// The shape of a type.
#[derive(Debug)]
pub(crate) enum TypeVariant {
    /// A truth value.
    Boolean,

    /// A signed integer of arbitrary precision.
    Integer,

    /// An ordered sequence of bits.
    BitString,

    /// An ordered sequence of octets.
    OctetString,

    /// The type with no content.
    Null,

    /// An object identifier.
    ObjectIdentifier,

    /// An ordered structure of heterogeneous members.
    Sequence(NamedTypes),

    /// An unordered structure of heterogeneous members.
    Set(NamedTypes),

    /// An ordered repetition of one component type.
    SequenceOf(AsnType),

    /// An unordered repetition of one component type.
    SetOf(AsnType),

    /// Exactly one of several named alternatives.
    Choice(NamedTypes),

    /// An opaque value holding raw encoded octets.
    Any,
}

/// The set of tags a type can start with on the wire.
#[derive(Clone, Debug)]
pub(crate) enum TagScope {
    /// Any of the given tags.
    Tags(Vec<Tag>),

    /// Any tag at all.
    Wildcard,
}

/// # Creating Base Templates
///
impl AsnType {
    /// Creates a template from its parts.
    fn new(tags: TagSet, variant: TypeVariant) -> Self {
        AsnType(Arc::new(TypeInner { tags, constraint: None, variant }))
    }

    /// Creates a boolean template.
    pub fn boolean() -> Self {
        Self::new(TagSet::of(Tag::BOOLEAN), TypeVariant::Boolean)
    }

    /// Creates an integer template.
    pub fn integer() -> Self {
        Self::new(TagSet::of(Tag::INTEGER), TypeVariant::Integer)
    }

    /// Creates a bit string template.
    pub fn bit_string() -> Self {
        Self::new(TagSet::of(Tag::BIT_STRING), TypeVariant::BitString)
    }

    /// Creates an octet string template.
    pub fn octet_string() -> Self {
        Self::new(TagSet::of(Tag::OCTET_STRING), TypeVariant::OctetString)
    }

    /// Creates a null template.
    pub fn null() -> Self {
        Self::new(TagSet::of(Tag::NULL), TypeVariant::Null)
    }

    /// Creates an object identifier template.
    pub fn object_identifier() -> Self {
        Self::new(TagSet::of(Tag::OID), TypeVariant::ObjectIdentifier)
    }

    /// Creates a sequence template over the given members.
    pub fn sequence(members: NamedTypes) -> Self {
        Self::new(TagSet::of(Tag::SEQUENCE), TypeVariant::Sequence(members))
    }

    /// Creates a set template over the given members.
    pub fn set(members: NamedTypes) -> Self {
        Self::new(TagSet::of(Tag::SET), TypeVariant::Set(members))
    }

    /// Creates a template for a sequence of one repeated component.
    pub fn sequence_of(component: AsnType) -> Self {
        Self::new(
            TagSet::of(Tag::SEQUENCE), TypeVariant::SequenceOf(component)
        )
    }

    /// Creates a template for a set of one repeated component.
    pub fn set_of(component: AsnType) -> Self {
        Self::new(TagSet::of(Tag::SET), TypeVariant::SetOf(component))
    }

    /// Creates a choice template over the given alternatives.
    ///
    /// A choice starts out untagged: its effective tag is the tag of
    /// whatever alternative is selected.
    pub fn choice(alternatives: NamedTypes) -> Self {
        Self::new(TagSet::empty(), TypeVariant::Choice(alternatives))
    }

    /// Creates a template for an opaque value of raw encoded octets.
    ///
    /// An opaque value starts out untagged and matches any tag when
    /// decoded.
    pub fn any() -> Self {
        Self::new(TagSet::empty(), TypeVariant::Any)
    }
}

/// # Deriving Templates
///
impl AsnType {
    /// Returns a new template wrapped in an explicit tag.
    pub fn tagged_explicit(&self, tag: Tag) -> Self {
        AsnType(Arc::new(TypeInner {
            tags: self.0.tags.explicit(tag),
            constraint: self.0.constraint.clone(),
            variant: self.0.variant.shallow_clone(),
        }))
    }

    /// Returns a new template with the leading tag replaced.
    ///
    /// A choice cannot be implicitly tagged since it has no tag of its
    /// own to replace; implicit tagging of a choice therefore degrades to
    /// explicit tagging.
    pub fn tagged_implicit(&self, tag: Tag) -> Self {
        if matches!(self.0.variant, TypeVariant::Choice(_))
            && self.0.tags.is_empty()
        {
            return self.tagged_explicit(tag)
        }
        AsnType(Arc::new(TypeInner {
            tags: self.0.tags.implicit(tag),
            constraint: self.0.constraint.clone(),
            variant: self.0.variant.shallow_clone(),
        }))
    }

    /// Returns a new template with the given constraint attached.
    ///
    /// If the template already carries a constraint, the new one is
    /// intersected with it.
    pub fn constrained(&self, constraint: Constraint) -> Self {
        let constraint = match self.0.constraint.clone() {
            Some(existing) => {
                Constraint::intersection([existing, constraint])
            }
            None => constraint,
        };
        AsnType(Arc::new(TypeInner {
            tags: self.0.tags.clone(),
            constraint: Some(constraint),
            variant: self.0.variant.shallow_clone(),
        }))
    }
}

/// # Access to the Parts
///
impl AsnType {
    /// Returns the tag chain of the type.
    pub fn tags(&self) -> &TagSet {
        &self.0.tags
    }

    /// Returns the constraint of the type, if any.
    pub fn constraint(&self) -> Option<&Constraint> {
        self.0.constraint.as_ref()
    }

    /// Returns the shape of the type.
    pub(crate) fn variant(&self) -> &TypeVariant {
        &self.0.variant
    }

    /// Returns the set of tags a value of this type can start with.
    pub(crate) fn outer_scope(&self) -> TagScope {
        if let Some(outer) = self.0.tags.outer() {
            return TagScope::Tags(vec![outer])
        }
        match self.0.variant {
            TypeVariant::Choice(ref alternatives) => {
                let mut tags = Vec::new();
                for alternative in alternatives.iter() {
                    match alternative.typ().outer_scope() {
                        TagScope::Tags(alt) => tags.extend(alt),
                        TagScope::Wildcard => return TagScope::Wildcard,
                    }
                }
                TagScope::Tags(tags)
            }
            TypeVariant::Any => TagScope::Wildcard,
            // Every other shape always carries a base tag.
            _ => TagScope::Tags(Vec::new()),
        }
    }

    /// Binds a value to the type.
    ///
    /// Checks that the value fits the type's shape, evaluates the
    /// constraint, and returns the bound instance. Values nested in a
    /// structured kind are re-bound against the respective member types.
    pub fn bind(&self, kind: ValueKind) -> Result<Value, Error> {
        Value::bind(self, kind)
    }
}


impl TypeVariant {
    /// Clones the variant.
    ///
    /// The member groups and component types are themselves cheap to
    /// clone, this only exists because the derive would demand `Clone`
    /// of the whole inner type.
    fn shallow_clone(&self) -> Self {
        match self {
            TypeVariant::Boolean => TypeVariant::Boolean,
            TypeVariant::Integer => TypeVariant::Integer,
            TypeVariant::BitString => TypeVariant::BitString,
            TypeVariant::OctetString => TypeVariant::OctetString,
            TypeVariant::Null => TypeVariant::Null,
            TypeVariant::ObjectIdentifier => TypeVariant::ObjectIdentifier,
            TypeVariant::Sequence(members) => {
                TypeVariant::Sequence(members.clone())
            }
            TypeVariant::Set(members) => TypeVariant::Set(members.clone()),
            TypeVariant::SequenceOf(component) => {
                TypeVariant::SequenceOf(component.clone())
            }
            TypeVariant::SetOf(component) => {
                TypeVariant::SetOf(component.clone())
            }
            TypeVariant::Choice(alternatives) => {
                TypeVariant::Choice(alternatives.clone())
            }
            TypeVariant::Any => TypeVariant::Any,
        }
    }
}


//============ Tests =========================================================
