//! Named member declarations of structured types.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::collections::HashMap;
use crate::error::Error;
use crate::tag::Tag;
use crate::typ::{AsnType, TagScope};
use crate::value::Value;


//------------ Role ----------------------------------------------------------

/// The presence rule of a structure member.
#[derive(Clone, Debug)]
pub enum Role {
    /// The member must be present.
    Required,

    /// The member may be absent.
    Optional,

    /// The member may be absent, in which case it takes the given value.
    Defaulted(Value),
}

impl Role {
    /// Returns whether a member with this role may be skipped while
    /// scanning encoded members.
    pub fn is_skippable(&self) -> bool {
        !matches!(self, Role::Required)
    }
}


//------------ NamedType -----------------------------------------------------

/// A single named member declaration.
///
/// A named type gives a structure member its name, its type, and its
/// presence rule. The declaration itself is inert; building a
/// [`NamedTypes`] group from declarations is what establishes the lookup
/// tables and checks the group for ambiguity.
#[derive(Clone, Debug)]
pub struct NamedType {
    /// The member name.
    name: String,

    /// The member type.
    typ: AsnType,

    /// The presence rule.
    role: Role,
}

impl NamedType {
    /// Creates a required member declaration.
    pub fn new(name: impl Into<String>, typ: AsnType) -> Self {
        NamedType { name: name.into(), typ, role: Role::Required }
    }

    /// Creates an optional member declaration.
    pub fn optional(name: impl Into<String>, typ: AsnType) -> Self {
        NamedType { name: name.into(), typ, role: Role::Optional }
    }

    /// Creates a defaulted member declaration.
    ///
    /// The default is validated against the member type when the group is
    /// built.
    pub fn defaulted(
        name: impl Into<String>, typ: AsnType, default: Value
    ) -> Self {
        NamedType { name: name.into(), typ, role: Role::Defaulted(default) }
    }

    /// Returns the member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the member type.
    pub fn typ(&self) -> &AsnType {
        &self.typ
    }

    /// Returns the presence rule.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Returns the default value for a defaulted member.
    pub fn default(&self) -> Option<&Value> {
        match self.role {
            Role::Defaulted(ref value) => Some(value),
            _ => None,
        }
    }

    /// Returns whether the member's type claims the given tag.
    fn claims(&self, tag: Tag) -> bool {
        match self.typ.outer_scope() {
            TagScope::Tags(tags) => tags.contains(&tag),
            TagScope::Wildcard => true,
        }
    }
}


//------------ NamedTypes ----------------------------------------------------

/// An ordered group of named member declarations.
///
/// The group provides the lookups a decoder needs to classify encoded
/// members: by position, by name, and by tag. Because sequence members
/// with the optional and defaulted roles may be absent from the encoded
/// data, the tag lookup also comes in a positional flavor that only
/// considers the members an encoded value could correspond to at a given
/// point of the scan.
///
/// Building a group fails with [`Error::AmbiguousType`] if two members
/// could claim the same tag, since such a group could never be decoded
/// deterministically. A member of an untagged choice type claims every
/// alternative's tag, recursively; an untagged opaque member claims any
/// tag at all and is only allowed once.
#[derive(Clone, Debug)]
pub struct NamedTypes {
    /// The member declarations in declaration order.
    members: Vec<NamedType>,

    /// The effective outermost tag to member position map.
    by_tag: HashMap<Tag, usize>,

    /// The position of the member matching any tag, if there is one.
    wildcard: Option<usize>,
}

impl NamedTypes {
    /// Creates a group from member declarations.
    pub fn new(
        members: impl IntoIterator<Item = NamedType>
    ) -> Result<Self, Error> {
        let mut validated: Vec<NamedType> = Vec::new();
        let mut by_tag = HashMap::new();
        let mut wildcard: Option<usize> = None;
        for (pos, mut member) in members.into_iter().enumerate() {
            // Re-bind the default against the member type so a bad
            // default surfaces here and not at encode time.
            if let Role::Defaulted(default) = member.role {
                member.role = Role::Defaulted(
                    member.typ.bind(default.into_kind())?
                );
            }
            match member.typ.outer_scope() {
                TagScope::Tags(tags) => {
                    for tag in tags {
                        if let Some(other) = by_tag.insert(tag, pos) {
                            return Err(Error::AmbiguousType(
                                validated[other].name.clone(),
                                member.name,
                            ))
                        }
                    }
                }
                TagScope::Wildcard => {
                    if let Some(other) = wildcard.replace(pos) {
                        return Err(Error::AmbiguousType(
                            validated[other].name.clone(),
                            member.name,
                        ))
                    }
                }
            }
            validated.push(member);
        }
        Ok(NamedTypes { members: validated, by_tag, wildcard })
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the member at the given position.
    pub fn get(&self, pos: usize) -> Option<&NamedType> {
        self.members.get(pos)
    }

    /// Returns an iterator over the members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &NamedType> {
        self.members.iter()
    }

    /// Returns the position of the member with the given name.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|member| member.name == name)
    }

    /// Returns the position of the member claiming the given tag.
    ///
    /// This consults the full group and is what decoding a set or a
    /// choice uses, since their members can appear in any position.
    pub fn position_of_tag(&self, tag: Tag) -> Option<usize> {
        self.by_tag.get(&tag).copied().or(self.wildcard)
    }

    /// Returns the position of the member claiming `tag` at or after
    /// `pos`.
    ///
    /// This is the sequence decoder's scan: starting at `pos`, skippable
    /// members that do not claim the tag are passed over; the scan ends
    /// with the first required member, which either claims the tag or
    /// leaves it unresolved.
    pub fn position_of_tag_near(
        &self, pos: usize, tag: Tag
    ) -> Option<usize> {
        for (offset, member) in self.members[pos.min(self.members.len())..]
            .iter().enumerate()
        {
            if member.claims(tag) {
                return Some(pos + offset)
            }
            if !member.role.is_skippable() {
                return None
            }
        }
        None
    }

    /// Returns the tag to position map applicable when scanning at `pos`.
    ///
    /// The map covers the members from `pos` up to and including the
    /// first one that cannot be skipped.
    pub fn tag_map_near(&self, pos: usize) -> HashMap<Tag, usize> {
        let mut res = HashMap::new();
        for (offset, member) in self.members[pos.min(self.members.len())..]
            .iter().enumerate()
        {
            if let TagScope::Tags(tags) = member.typ.outer_scope() {
                for tag in tags {
                    res.entry(tag).or_insert(pos + offset);
                }
            }
            if !member.role.is_skippable() {
                break
            }
        }
        res
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::typ::AsnType;
    use crate::value::Value;
    use super::*;

    fn group() -> NamedTypes {
        NamedTypes::new([
            NamedType::new("first-name", AsnType::octet_string()),
            NamedType::optional("age", AsnType::integer()),
            NamedType::new("family-name", AsnType::octet_string()
                .tagged_implicit(Tag::context(0))),
        ]).unwrap()
    }

    #[test]
    fn position_lookups() {
        let group = group();
        assert_eq!(group.position_of("first-name"), Some(0));
        assert_eq!(group.position_of("family-name"), Some(2));
        assert_eq!(group.position_of("nick"), None);
        assert_eq!(group.get(1).unwrap().name(), "age");
        assert_eq!(group.position_of_tag(Tag::INTEGER), Some(1));
        assert_eq!(group.position_of_tag(Tag::BOOLEAN), None);
    }

    #[test]
    fn near_position_lookups() {
        let group = group();
        assert_eq!(
            group.position_of_tag_near(0, Tag::OCTET_STRING), Some(0)
        );
        // The scan must not run past the required first member.
        assert_eq!(group.position_of_tag_near(0, Tag::INTEGER), None);
        assert_eq!(group.position_of_tag_near(1, Tag::INTEGER), Some(1));
        // The optional member may be skipped over.
        assert_eq!(group.position_of_tag_near(1, Tag::context(0)), Some(2));
        assert_eq!(group.position_of_tag_near(3, Tag::INTEGER), None);

        let near = group.tag_map_near(1);
        assert_eq!(near.len(), 2);
        assert_eq!(near.get(&Tag::INTEGER), Some(&1));
        assert_eq!(near.get(&Tag::context(0)), Some(&2));
        assert_eq!(group.tag_map_near(0).len(), 1);
    }

    #[test]
    fn duplicate_tags_rejected() {
        assert!(matches!(
            NamedTypes::new([
                NamedType::new("a", AsnType::octet_string()),
                NamedType::new("b", AsnType::octet_string()),
            ]),
            Err(Error::AmbiguousType(..))
        ));
        assert!(
            NamedTypes::new([
                NamedType::new("a", AsnType::octet_string()),
                NamedType::new(
                    "b",
                    AsnType::octet_string()
                        .tagged_implicit(Tag::context(0))
                ),
            ]).is_ok()
        );
    }

    #[test]
    fn choice_member_claims_alternative_tags() {
        let choice = AsnType::choice(NamedTypes::new([
            NamedType::new("num", AsnType::integer()),
            NamedType::new("flag", AsnType::boolean()),
        ]).unwrap());
        let group = NamedTypes::new([
            NamedType::new("id", choice.clone()),
            NamedType::new("data", AsnType::octet_string()),
        ]).unwrap();
        assert_eq!(group.position_of_tag(Tag::INTEGER), Some(0));
        assert_eq!(group.position_of_tag(Tag::BOOLEAN), Some(0));
        assert_eq!(group.position_of_tag(Tag::OCTET_STRING), Some(1));

        // An alternative overlapping a sibling member is ambiguous.
        assert!(NamedTypes::new([
            NamedType::new("id", choice),
            NamedType::new("num2", AsnType::integer()),
        ]).is_err());
    }

    #[test]
    fn single_wildcard_only() {
        assert!(NamedTypes::new([
            NamedType::new("blob", AsnType::any()),
            NamedType::new("num", AsnType::integer()),
        ]).is_ok());
        assert!(NamedTypes::new([
            NamedType::new("blob", AsnType::any()),
            NamedType::new("blob2", AsnType::any()),
        ]).is_err());
    }

    #[test]
    fn bad_default_rejected() {
        assert!(NamedTypes::new([
            NamedType::defaulted(
                "age", AsnType::integer(), Value::boolean(true)
            ),
        ]).is_err());
        let group = NamedTypes::new([
            NamedType::defaulted(
                "age", AsnType::integer(), Value::integer(33i64)
            ),
        ]).unwrap();
        assert_eq!(
            group.get(0).unwrap().default().unwrap(),
            &Value::integer(33i64)
        );
    }
}
