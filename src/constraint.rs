//! Value and size constraints.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use crate::error::Error;
use crate::int::Int;
use crate::value::ValueKind;


//------------ Constraint ----------------------------------------------------

/// A predicate over candidate values of a type.
///
/// Constraints are attached to a type and evaluated every time a value is
/// bound to it, both when a caller constructs a value and when the
/// decoder produces one. A failing check surfaces immediately as
/// [`Error::ConstraintViolation`]; a value is never silently adjusted to
/// fit.
///
/// The primitive predicates are membership in a fixed set of values, a
/// closed numeric range, and a closed size range. Predicates compose with
/// [`union`][Self::union] (any must hold) and
/// [`intersection`][Self::intersection] (all must hold).
#[derive(Clone, Debug, PartialEq)]
pub enum Constraint {
    /// The value must be equal to one of the given values.
    SingleValue(Vec<ValueKind>),

    /// The value must be an integer within the closed range.
    ValueRange(Int, Int),

    /// The size of the value must be within the closed range.
    ///
    /// The size of an octet string is its octet count, of a bit string
    /// its bit count, of a repeated container its element count, and of
    /// an opaque value its raw octet count. Other values have no size and
    /// never satisfy a size constraint.
    Size(usize, usize),

    /// At least one of the constraints must hold.
    Union(Vec<Constraint>),

    /// All of the constraints must hold.
    Intersection(Vec<Constraint>),
}

impl Constraint {
    /// Creates a membership constraint over the given values.
    pub fn single_value(
        values: impl IntoIterator<Item = ValueKind>
    ) -> Self {
        Constraint::SingleValue(values.into_iter().collect())
    }

    /// Creates a closed numeric range constraint.
    pub fn value_range(min: impl Into<Int>, max: impl Into<Int>) -> Self {
        Constraint::ValueRange(min.into(), max.into())
    }

    /// Creates a closed size range constraint.
    pub fn size(min: usize, max: usize) -> Self {
        Constraint::Size(min, max)
    }

    /// Combines constraints so that any one of them must hold.
    pub fn union(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        Constraint::Union(constraints.into_iter().collect())
    }

    /// Combines constraints so that all of them must hold.
    pub fn intersection(
        constraints: impl IntoIterator<Item = Constraint>
    ) -> Self {
        Constraint::Intersection(constraints.into_iter().collect())
    }

    /// Checks a candidate value against the constraint.
    pub fn check(&self, kind: &ValueKind) -> Result<(), Error> {
        if self.matches(kind) {
            Ok(())
        }
        else {
            Err(Error::ConstraintViolation(self.describe()))
        }
    }

    /// Returns whether a candidate value satisfies the constraint.
    pub fn matches(&self, kind: &ValueKind) -> bool {
        match self {
            Constraint::SingleValue(values) => {
                values.iter().any(|v| v == kind)
            }
            Constraint::ValueRange(min, max) => {
                match kind {
                    ValueKind::Integer(int) => int >= min && int <= max,
                    _ => false,
                }
            }
            Constraint::Size(min, max) => {
                match kind.size() {
                    Some(size) => size >= *min && size <= *max,
                    None => false,
                }
            }
            Constraint::Union(constraints) => {
                constraints.iter().any(|c| c.matches(kind))
            }
            Constraint::Intersection(constraints) => {
                constraints.iter().all(|c| c.matches(kind))
            }
        }
    }

    /// Returns a short description of the failed predicate.
    fn describe(&self) -> &'static str {
        match self {
            Constraint::SingleValue(_) => "value not in permitted set",
            Constraint::ValueRange(..) => "integer out of range",
            Constraint::Size(..) => "size out of range",
            Constraint::Union(_) => "no alternative constraint satisfied",
            Constraint::Intersection(_) => "constraint not satisfied",
        }
    }
}


//============ Tests =========================================================
