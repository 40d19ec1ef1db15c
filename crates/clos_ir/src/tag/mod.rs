//! Type tags: opaque identifiers for runtime types.
//!
//! A tag is one of three things: the universal wildcard `*`, one of the
//! fixed primitive type names, or a nominal name (class, ancestor, interface).
//! Parsing text through `TypeTag::from` normalizes the reserved spellings,
//! so `TypeTag::from("int")` and `TypeTag::Primitive(PrimitiveType::Int)`
//! are the same tag.

use std::fmt;
use std::sync::Arc;

/// Spelling of the wildcard tag.
const WILDCARD: &str = "*";

/// Built-in runtime types that never consult the type introspector.
///
/// Their specificity chain is always `[primitive, *]`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimitiveType {
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
    /// UTF-8 string
    String,
    /// Ordered sequence of values
    List,
    /// String-keyed map of values
    Map,
    /// Absence of a value
    Void,
    /// Opaque host resource handle
    Resource,
}

impl PrimitiveType {
    /// Every primitive, in declaration order.
    pub const ALL: [PrimitiveType; 8] = [
        Self::Int,
        Self::Float,
        Self::Bool,
        Self::String,
        Self::List,
        Self::Map,
        Self::Void,
        Self::Resource,
    ];

    /// Canonical spelling used in signatures and diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
            Self::List => "list",
            Self::Map => "map",
            Self::Void => "void",
            Self::Resource => "resource",
        }
    }

    /// Look a primitive up by its canonical spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier for a runtime type.
///
/// Cloning is cheap: nominal names are reference counted.
#[derive(Clone, Eq, PartialEq, Hash)]
pub enum TypeTag {
    /// Matches every value; always the last link of a chain.
    Wildcard,
    /// A built-in type.
    Primitive(PrimitiveType),
    /// A class, ancestor or interface name.
    Named(Arc<str>),
}

impl TypeTag {
    /// The universal wildcard tag.
    #[inline]
    pub const fn wildcard() -> Self {
        TypeTag::Wildcard
    }

    /// Build a tag from text, normalizing `*` and primitive spellings.
    pub fn parse(text: &str) -> Self {
        if text == WILDCARD {
            return TypeTag::Wildcard;
        }
        match PrimitiveType::from_name(text) {
            Some(primitive) => TypeTag::Primitive(primitive),
            None => TypeTag::Named(Arc::from(text)),
        }
    }

    /// A nominal tag, taken verbatim: `"int"` stays a class name here.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        TypeTag::Named(name.into())
    }

    /// Reinterpret a primitive tag as the nominal name of the same spelling.
    ///
    /// Used for class names, which live in their own namespace. The wildcard
    /// and nominal tags are returned unchanged.
    #[must_use]
    pub fn into_nominal(self) -> Self {
        match self {
            TypeTag::Primitive(primitive) => TypeTag::Named(Arc::from(primitive.name())),
            other => other,
        }
    }

    #[inline]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, TypeTag::Wildcard)
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeTag::Primitive(_))
    }

    /// Text of this tag as written in signatures.
    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::Wildcard => WILDCARD,
            TypeTag::Primitive(p) => p.name(),
            TypeTag::Named(name) => name,
        }
    }

    /// A nominal tag with an empty name is malformed.
    ///
    /// The registration layer rejects such tags; chains never contain them.
    pub fn is_blank(&self) -> bool {
        matches!(self, TypeTag::Named(name) if name.trim().is_empty())
    }
}

impl From<&str> for TypeTag {
    fn from(text: &str) -> Self {
        TypeTag::parse(text)
    }
}

impl From<String> for TypeTag {
    fn from(text: String) -> Self {
        TypeTag::parse(&text)
    }
}

impl From<&String> for TypeTag {
    fn from(text: &String) -> Self {
        TypeTag::parse(text)
    }
}

impl From<&TypeTag> for TypeTag {
    fn from(tag: &TypeTag) -> Self {
        tag.clone()
    }
}

impl From<PrimitiveType> for TypeTag {
    fn from(primitive: PrimitiveType) -> Self {
        TypeTag::Primitive(primitive)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.as_str())
    }
}
