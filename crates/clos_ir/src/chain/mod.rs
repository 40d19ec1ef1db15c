//! Specificity chains.
//!
//! A `TypeChain` lists every tag a single argument can be matched under,
//! most specific first. Each link also records its specificity level, which
//! the dispatcher uses to decide whether two matches are comparable.
//!
//! Ancestor levels are inheritance distances, not chain positions: two direct
//! parents of a class both sit at `Ancestor(1)` even though one of them is
//! listed first.
//!
//! # Invariants
//!
//! - never empty
//! - the last link is always the wildcard
//! - no tag appears twice (first occurrence wins)

use std::fmt;

use smallvec::SmallVec;

use crate::{PrimitiveType, TypeTag};

/// Specificity level of one chain link.
///
/// Ordered from most to least specific. All interface links share one level,
/// so two interfaces of the same type are always comparable.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Specificity {
    /// The value's own concrete type.
    Exact,
    /// An ancestor at the given inheritance distance (1 for a direct parent).
    Ancestor(u32),
    /// Any directly or transitively implemented interface.
    Interface,
    /// The universal wildcard.
    Wildcard,
}

/// One entry of a `TypeChain`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ChainLink {
    pub tag: TypeTag,
    pub specificity: Specificity,
}

/// Ordered, deduplicated tags for one argument, ending in the wildcard.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeChain {
    links: SmallVec<[ChainLink; 4]>,
}

impl TypeChain {
    /// Chain for a value that cannot be classified: `[*]`.
    pub fn wildcard_only() -> Self {
        let mut links = SmallVec::new();
        links.push(ChainLink {
            tag: TypeTag::Wildcard,
            specificity: Specificity::Wildcard,
        });
        TypeChain { links }
    }

    /// Chain for a built-in value: `[primitive, *]`.
    pub fn primitive(primitive: PrimitiveType) -> Self {
        let mut chain = ChainBuilder::default();
        chain.push(TypeTag::Primitive(primitive), Specificity::Exact);
        chain.finish()
    }

    /// Chain for a nominal value: `[name, ancestors.., interfaces.., *]`.
    ///
    /// `ancestors` is a single inheritance line, nearest first: the n-th
    /// accepted tag sits at distance n. Repeated tags keep their first
    /// position. Wildcards and blank names in the input are dropped. A
    /// wildcard or blank concrete name degrades the whole chain to `[*]`.
    pub fn nominal<A, I>(name: TypeTag, ancestors: A, interfaces: I) -> Self
    where
        A: IntoIterator<Item = TypeTag>,
        I: IntoIterator<Item = TypeTag>,
    {
        let line = ancestors
            .into_iter()
            .filter(|tag| !tag.is_wildcard() && !tag.is_blank())
            .zip(1..);
        Self::nominal_ranked(name, line, interfaces)
    }

    /// Like `nominal`, with each ancestor paired with its inheritance
    /// distance. Distances below 1 are raised to 1.
    ///
    /// Chain order follows the input order; the distances only decide which
    /// links share a specificity level.
    pub fn nominal_ranked<A, I>(name: TypeTag, ancestors: A, interfaces: I) -> Self
    where
        A: IntoIterator<Item = (TypeTag, u32)>,
        I: IntoIterator<Item = TypeTag>,
    {
        if name.is_wildcard() || name.is_blank() {
            return Self::wildcard_only();
        }

        let mut chain = ChainBuilder::default();
        chain.push(name, Specificity::Exact);

        for (ancestor, distance) in ancestors {
            if chain.accepts(&ancestor) {
                chain.push(ancestor, Specificity::Ancestor(distance.max(1)));
            }
        }
        for interface in interfaces {
            if chain.accepts(&interface) {
                chain.push(interface, Specificity::Interface);
            }
        }
        chain.finish()
    }

    /// Number of links, wildcard included.
    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[inline]
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    #[inline]
    pub fn link(&self, index: usize) -> Option<&ChainLink> {
        self.links.get(index)
    }

    pub fn tags(&self) -> impl Iterator<Item = &TypeTag> + '_ {
        self.links.iter().map(|link| &link.tag)
    }

    /// The most specific tag: the concrete type name, or `*` when unclassified.
    pub fn most_specific(&self) -> &TypeTag {
        self.links.first().map_or(&TypeTag::Wildcard, |link| &link.tag)
    }

    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.links.iter().any(|link| &link.tag == tag)
    }

    /// Position of `tag` in this chain, 0 being most specific.
    pub fn position(&self, tag: &TypeTag) -> Option<usize> {
        self.links.iter().position(|link| &link.tag == tag)
    }
}

impl fmt::Display for TypeChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, link) in self.links.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", link.tag)?;
        }
        f.write_str("]")
    }
}

/// Accumulates links while upholding the chain invariants.
#[derive(Default)]
struct ChainBuilder {
    links: SmallVec<[ChainLink; 4]>,
}

impl ChainBuilder {
    fn accepts(&self, tag: &TypeTag) -> bool {
        !tag.is_wildcard() && !tag.is_blank() && !self.links.iter().any(|l| &l.tag == tag)
    }

    fn push(&mut self, tag: TypeTag, specificity: Specificity) {
        self.links.push(ChainLink { tag, specificity });
    }

    fn finish(mut self) -> TypeChain {
        self.push(TypeTag::Wildcard, Specificity::Wildcard);
        TypeChain { links: self.links }
    }
}
