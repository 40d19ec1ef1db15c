//! Signature keys.
//!
//! A `SignatureKey` is the exact-match lookup key of the method table: one
//! tag per parameter position. Two keys are equal iff every position is.

use std::fmt;

use smallvec::SmallVec;

use crate::{Specificity, TypeTag};

/// Per-position tag tuple used to store and look up handlers.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SignatureKey {
    tags: SmallVec<[TypeTag; 4]>,
}

impl SignatureKey {
    /// Build a key from anything that yields tags.
    ///
    /// No validation happens here; the registration layer rejects empty keys
    /// and blank tags before a key ever reaches the method table.
    pub fn new<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        SignatureKey {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of parameter positions.
    #[inline]
    pub fn arity(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[inline]
    pub fn tags(&self) -> &[TypeTag] {
        &self.tags
    }

    /// Whether every position is the wildcard.
    pub fn is_all_wildcard(&self) -> bool {
        !self.tags.is_empty() && self.tags.iter().all(TypeTag::is_wildcard)
    }

    /// Index of the first blank tag, if any.
    pub fn first_blank(&self) -> Option<usize> {
        self.tags.iter().position(TypeTag::is_blank)
    }
}

impl FromIterator<TypeTag> for SignatureKey {
    fn from_iter<I: IntoIterator<Item = TypeTag>>(iter: I) -> Self {
        SignatureKey {
            tags: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for SignatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}")?;
        }
        f.write_str(")")
    }
}

/// Per-position specificity of a matched candidate key.
///
/// Two candidates compete as equals only when their profiles are identical.
pub type SpecificityProfile = SmallVec<[Specificity; 4]>;
