//! Bound values.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use bytes::Bytes;
use crate::bits::Bits;
use crate::error::Error;
use crate::int::Int;
use crate::oid::Oid;
use crate::typ::{AsnType, TypeVariant};


//------------ ValueKind -----------------------------------------------------

/// The payload of a bound value.
///
/// This is the closed set of shapes a value can take. Structured kinds
/// hold their members as bound values again; a sequence or set keeps one
/// slot per declared member so that absent optional and defaulted members
/// stay distinguishable from present ones.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    /// A truth value.
    Boolean(bool),

    /// A signed integer of arbitrary precision.
    Integer(Int),

    /// An ordered sequence of bits.
    BitString(Bits),

    /// An ordered sequence of octets.
    OctetString(Bytes),

    /// The value with no content.
    Null,

    /// An object identifier.
    Oid(Oid),

    /// The members of a sequence, one slot per declared member.
    Sequence(Vec<Option<Value>>),

    /// The members of a set, one slot per declared member.
    Set(Vec<Option<Value>>),

    /// The elements of a sequence of one repeated component.
    SequenceOf(Vec<Value>),

    /// The elements of a set of one repeated component.
    SetOf(Vec<Value>),

    /// The selected alternative of a choice, if one is selected.
    ///
    /// A choice without a selected alternative exists as a value but
    /// cannot be encoded.
    Choice(Option<(usize, Box<Value>)>),

    /// Raw encoded octets of an opaque value.
    Any(Bytes),
}

impl ValueKind {
    /// Returns the size of the value for size constraints.
    ///
    /// Values without a natural size notion return `None`.
    pub(crate) fn size(&self) -> Option<usize> {
        match self {
            ValueKind::OctetString(octets) => Some(octets.len()),
            ValueKind::BitString(bits) => Some(bits.bit_len()),
            ValueKind::SequenceOf(elements) => Some(elements.len()),
            ValueKind::SetOf(elements) => Some(elements.len()),
            ValueKind::Any(octets) => Some(octets.len()),
            _ => None,
        }
    }
}


//------------ Value ---------------------------------------------------------

/// A value bound to a type.
///
/// A value pairs a payload with the template it was bound against. It is
/// produced either by binding a payload to a template or by decoding, and
/// it is immutable: deriving a different value means binding a new one.
///
/// Equality is structural over the payloads, with one refinement for
/// structures: an absent defaulted member compares equal to a present
/// member holding the declared default, since both decode from and encode
/// to the same octets.
#[derive(Clone, Debug)]
pub struct Value {
    /// The template the value is bound to.
    typ: AsnType,

    /// The payload.
    kind: ValueKind,
}

/// # Creating Values
///
impl Value {
    /// Binds a payload to a template.
    ///
    /// Checks the payload against the template's shape, re-binds nested
    /// values against the respective member templates, and evaluates the
    /// template's constraint.
    pub(crate) fn bind(typ: &AsnType, kind: ValueKind) -> Result<Self, Error> {
        let kind = Self::conform(typ, kind)?;
        if let Some(constraint) = typ.constraint() {
            constraint.check(&kind)?;
        }
        Ok(Value { typ: typ.clone(), kind })
    }

    /// Creates a value from parts the decoder has already validated.
    ///
    /// Skips the recursive re-binding of members but still evaluates the
    /// constraint, which has to hold for decoded values too.
    pub(crate) fn bind_decoded(
        typ: &AsnType, kind: ValueKind
    ) -> Result<Self, Error> {
        if let Some(constraint) = typ.constraint() {
            constraint.check(&kind)?;
        }
        Ok(Value { typ: typ.clone(), kind })
    }

    /// Checks a payload against a template's shape.
    fn conform(typ: &AsnType, kind: ValueKind) -> Result<ValueKind, Error> {
        match (typ.variant(), kind) {
            (TypeVariant::Boolean, kind @ ValueKind::Boolean(_)) => Ok(kind),
            (TypeVariant::Integer, kind @ ValueKind::Integer(_)) => Ok(kind),
            (TypeVariant::BitString, kind @ ValueKind::BitString(_)) => {
                Ok(kind)
            }
            (TypeVariant::OctetString, kind @ ValueKind::OctetString(_)) => {
                Ok(kind)
            }
            (TypeVariant::Null, ValueKind::Null) => Ok(ValueKind::Null),
            (TypeVariant::ObjectIdentifier, kind @ ValueKind::Oid(_)) => {
                Ok(kind)
            }
            (TypeVariant::Any, kind @ ValueKind::Any(_)) => Ok(kind),
            (TypeVariant::Sequence(members), ValueKind::Sequence(slots)) => {
                Ok(ValueKind::Sequence(
                    Self::conform_slots(members, slots)?
                ))
            }
            (TypeVariant::Set(members), ValueKind::Set(slots)) => {
                Ok(ValueKind::Set(Self::conform_slots(members, slots)?))
            }
            (
                TypeVariant::SequenceOf(component),
                ValueKind::SequenceOf(elements)
            ) => {
                Ok(ValueKind::SequenceOf(
                    Self::conform_elements(component, elements)?
                ))
            }
            (TypeVariant::SetOf(component), ValueKind::SetOf(elements)) => {
                Ok(ValueKind::SetOf(
                    Self::conform_elements(component, elements)?
                ))
            }
            (
                TypeVariant::Choice(alternatives),
                ValueKind::Choice(selection)
            ) => {
                match selection {
                    None => Ok(ValueKind::Choice(None)),
                    Some((pos, value)) => {
                        let alternative = alternatives.get(pos).ok_or(
                            Error::Malformed("no such choice alternative")
                        )?;
                        let value = alternative.typ().bind(
                            value.into_kind()
                        )?;
                        Ok(ValueKind::Choice(Some((pos, Box::new(value)))))
                    }
                }
            }
            _ => Err(Error::Malformed("value does not fit the type")),
        }
    }

    /// Re-binds structure member slots against their member templates.
    fn conform_slots(
        members: &crate::named::NamedTypes, slots: Vec<Option<Value>>
    ) -> Result<Vec<Option<Value>>, Error> {
        if slots.len() != members.len() {
            return Err(Error::Malformed("wrong number of member slots"))
        }
        slots.into_iter().enumerate().map(|(pos, slot)| {
            match slot {
                None => Ok(None),
                Some(value) => {
                    let member = members.get(pos)
                        .ok_or(Error::Malformed("wrong number of member slots"))?;
                    member.typ().bind(value.into_kind()).map(Some)
                }
            }
        }).collect()
    }

    /// Re-binds repeated elements against the component template.
    fn conform_elements(
        component: &AsnType, elements: Vec<Value>
    ) -> Result<Vec<Value>, Error> {
        elements.into_iter().map(|element| {
            component.bind(element.into_kind())
        }).collect()
    }
}

/// # Convenience Constructors
///
impl Value {
    /// Creates a boolean value bound to the plain boolean template.
    pub fn boolean(value: bool) -> Self {
        Value {
            typ: AsnType::boolean(),
            kind: ValueKind::Boolean(value),
        }
    }

    /// Creates an integer value bound to the plain integer template.
    pub fn integer(value: impl Into<Int>) -> Self {
        Value {
            typ: AsnType::integer(),
            kind: ValueKind::Integer(value.into()),
        }
    }

    /// Creates a bit string value bound to the plain bit string template.
    pub fn bit_string(value: Bits) -> Self {
        Value {
            typ: AsnType::bit_string(),
            kind: ValueKind::BitString(value),
        }
    }

    /// Creates an octet string value bound to the plain octet string
    /// template.
    pub fn octet_string(value: impl Into<Bytes>) -> Self {
        Value {
            typ: AsnType::octet_string(),
            kind: ValueKind::OctetString(value.into()),
        }
    }

    /// Creates the null value bound to the plain null template.
    pub fn null() -> Self {
        Value { typ: AsnType::null(), kind: ValueKind::Null }
    }

    /// Creates an object identifier value bound to the plain template.
    pub fn oid(value: Oid) -> Self {
        Value {
            typ: AsnType::object_identifier(),
            kind: ValueKind::Oid(value),
        }
    }

    /// Creates an opaque value holding complete raw encoded octets.
    pub fn any(raw: impl Into<Bytes>) -> Self {
        Value { typ: AsnType::any(), kind: ValueKind::Any(raw.into()) }
    }

    /// Creates a sequence value with the given members bound by name.
    ///
    /// Members not mentioned stay absent. Each given value is re-bound
    /// against the declared member type.
    pub fn sequence<'a>(
        typ: &AsnType,
        members: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<Self, Error> {
        let TypeVariant::Sequence(declared) = typ.variant() else {
            return Err(Error::Malformed("type is not a sequence"))
        };
        let slots = Self::assign_slots(declared, members)?;
        Self::bind_decoded(typ, ValueKind::Sequence(slots))
    }

    /// Creates a set value with the given members bound by name.
    pub fn set<'a>(
        typ: &AsnType,
        members: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<Self, Error> {
        let TypeVariant::Set(declared) = typ.variant() else {
            return Err(Error::Malformed("type is not a set"))
        };
        let slots = Self::assign_slots(declared, members)?;
        Self::bind_decoded(typ, ValueKind::Set(slots))
    }

    /// Creates a repeated sequence value from its elements.
    pub fn sequence_of(
        typ: &AsnType, elements: impl IntoIterator<Item = Value>
    ) -> Result<Self, Error> {
        let TypeVariant::SequenceOf(component) = typ.variant() else {
            return Err(Error::Malformed("type is not a sequence-of"))
        };
        let elements = Self::conform_elements(
            component, elements.into_iter().collect()
        )?;
        Self::bind_decoded(typ, ValueKind::SequenceOf(elements))
    }

    /// Creates a repeated set value from its elements.
    pub fn set_of(
        typ: &AsnType, elements: impl IntoIterator<Item = Value>
    ) -> Result<Self, Error> {
        let TypeVariant::SetOf(component) = typ.variant() else {
            return Err(Error::Malformed("type is not a set-of"))
        };
        let elements = Self::conform_elements(
            component, elements.into_iter().collect()
        )?;
        Self::bind_decoded(typ, ValueKind::SetOf(elements))
    }

    /// Creates a choice value with the named alternative selected.
    pub fn choice(
        typ: &AsnType, name: &str, value: Value
    ) -> Result<Self, Error> {
        let TypeVariant::Choice(alternatives) = typ.variant() else {
            return Err(Error::Malformed("type is not a choice"))
        };
        let pos = alternatives.position_of(name).ok_or(
            Error::Malformed("no such choice alternative")
        )?;
        let value = alternatives.get(pos)
            .ok_or(Error::Malformed("no such choice alternative"))?
            .typ().bind(value.into_kind())?;
        Self::bind_decoded(
            typ, ValueKind::Choice(Some((pos, Box::new(value))))
        )
    }

    /// Creates a choice value with no alternative selected.
    ///
    /// Such a value exists but cannot be encoded; trying to fails with
    /// [`Error::UnsetChoice`].
    pub fn empty_choice(typ: &AsnType) -> Result<Self, Error> {
        if !matches!(typ.variant(), TypeVariant::Choice(_)) {
            return Err(Error::Malformed("type is not a choice"))
        }
        Self::bind_decoded(typ, ValueKind::Choice(None))
    }

    /// Distributes named member values over the declared slots.
    fn assign_slots<'a>(
        declared: &crate::named::NamedTypes,
        members: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<Vec<Option<Value>>, Error> {
        let mut slots: Vec<Option<Value>> = vec![None; declared.len()];
        for (name, value) in members {
            let pos = declared.position_of(name).ok_or(
                Error::Malformed("no such member")
            )?;
            let member = declared.get(pos)
                .ok_or(Error::Malformed("no such member"))?;
            slots[pos] = Some(member.typ().bind(value.into_kind())?);
        }
        Ok(slots)
    }
}

/// # Access to the Parts
///
impl Value {
    /// Returns the template the value is bound to.
    pub fn typ(&self) -> &AsnType {
        &self.typ
    }

    /// Returns the payload of the value.
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Converts the value into its payload.
    pub fn into_kind(self) -> ValueKind {
        self.kind
    }

    /// Returns the boolean payload if this is a boolean value.
    pub fn as_boolean(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Boolean(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer payload if this is an integer value.
    pub fn as_integer(&self) -> Option<&Int> {
        match self.kind {
            ValueKind::Integer(ref value) => Some(value),
            _ => None,
        }
    }

    /// Returns the bits if this is a bit string value.
    pub fn as_bit_string(&self) -> Option<&Bits> {
        match self.kind {
            ValueKind::BitString(ref value) => Some(value),
            _ => None,
        }
    }

    /// Returns the octets if this is an octet string value.
    pub fn as_octet_string(&self) -> Option<&Bytes> {
        match self.kind {
            ValueKind::OctetString(ref value) => Some(value),
            _ => None,
        }
    }

    /// Returns whether this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    /// Returns the object identifier if this is one.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self.kind {
            ValueKind::Oid(ref value) => Some(value),
            _ => None,
        }
    }

    /// Returns the raw octets if this is an opaque value.
    pub fn as_any(&self) -> Option<&Bytes> {
        match self.kind {
            ValueKind::Any(ref value) => Some(value),
            _ => None,
        }
    }

    /// Returns the member with the given name of a sequence or set.
    ///
    /// An absent defaulted member is reported as its declared default.
    /// Absent optional members and unknown names return `None`.
    pub fn member(&self, name: &str) -> Option<&Value> {
        let (members, slots) = match (self.typ.variant(), &self.kind) {
            (TypeVariant::Sequence(members), ValueKind::Sequence(slots)) => {
                (members, slots)
            }
            (TypeVariant::Set(members), ValueKind::Set(slots)) => {
                (members, slots)
            }
            _ => return None,
        };
        let pos = members.position_of(name)?;
        match slots.get(pos)? {
            Some(value) => Some(value),
            None => members.get(pos)?.default(),
        }
    }

    /// Returns the elements of a repeated value.
    pub fn elements(&self) -> Option<&[Value]> {
        match self.kind {
            ValueKind::SequenceOf(ref elements) => Some(elements),
            ValueKind::SetOf(ref elements) => Some(elements),
            _ => None,
        }
    }

    /// Returns the selected alternative of a choice value.
    pub fn selected(&self) -> Option<(&str, &Value)> {
        let TypeVariant::Choice(alternatives) = self.typ.variant() else {
            return None
        };
        match self.kind {
            ValueKind::Choice(Some((pos, ref value))) => {
                Some((alternatives.get(pos)?.name(), value))
            }
            _ => None,
        }
    }
}


//--- PartialEq

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (ValueKind::Sequence(left), ValueKind::Sequence(right)) => {
                self.slots_eq(left, right)
            }
            (ValueKind::Set(left), ValueKind::Set(right)) => {
                self.slots_eq(left, right)
            }
            (left, right) => left == right,
        }
    }
}

impl Value {
    /// Compares member slots, treating an absent defaulted member as its
    /// declared default.
    fn slots_eq(
        &self, left: &[Option<Value>], right: &[Option<Value>]
    ) -> bool {
        if left.len() != right.len() {
            return false
        }
        let members = match self.typ.variant() {
            TypeVariant::Sequence(members) => Some(members),
            TypeVariant::Set(members) => Some(members),
            _ => None,
        };
        left.iter().zip(right).enumerate().all(|(pos, slots)| {
            match slots {
                (Some(left), Some(right)) => left == right,
                (None, None) => true,
                (Some(present), None) | (None, Some(present)) => {
                    members
                        .and_then(|members| members.get(pos))
                        .and_then(|member| member.default())
                        .map(|default| present == default)
                        .unwrap_or(false)
                }
            }
        })
    }
}


//============ Tests =========================================================
