//! Nominal instances and opaque resources.

use std::collections::BTreeMap;
use std::fmt;

use clos_ir::TypeTag;

use super::Value;

/// An instance of a nominal class.
///
/// Only the class tag takes part in dispatch; fields are payload for handlers.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    class: TypeTag,
    fields: BTreeMap<String, Value>,
}

impl Instance {
    pub(super) fn new<K, I>(class: TypeTag, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            class,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    #[inline]
    pub fn class(&self) -> &TypeTag {
        &self.class
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class)?;
        if self.fields.is_empty() {
            return Ok(());
        }
        f.write_str(" { ")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str(" }")
    }
}

/// Opaque handle to a host resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Resource {
    pub kind: String,
    pub id: u64,
}

impl Resource {
    pub fn new(kind: impl Into<String>, id: u64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{}>", self.kind, self.id)
    }
}
