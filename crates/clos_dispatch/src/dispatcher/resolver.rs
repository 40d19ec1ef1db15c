//! Per-argument type chain resolution.

use std::fmt;
use std::sync::Arc;

use crate::introspect::TypeIntrospector;
use crate::{TypeChain, Value};

/// Computes the `TypeChain` of a runtime value.
///
/// - primitives: `[primitive, *]`, introspector never consulted
/// - described values: `[name, ancestors.., interfaces.., *]`, ancestor
///   levels taken from the described inheritance distances
/// - unclassified values: `[*]`
#[derive(Clone)]
pub struct TypeChainResolver {
    introspector: Arc<dyn TypeIntrospector>,
}

impl TypeChainResolver {
    pub fn new(introspector: Arc<dyn TypeIntrospector>) -> Self {
        TypeChainResolver { introspector }
    }

    pub fn introspector(&self) -> &Arc<dyn TypeIntrospector> {
        &self.introspector
    }

    pub fn chain_for(&self, value: &Value) -> TypeChain {
        if let Some(primitive) = value.primitive_type() {
            return TypeChain::primitive(primitive);
        }
        match self.introspector.describe(value) {
            Some(description) => TypeChain::nominal_ranked(
                description.name,
                description.ancestors,
                description.interfaces,
            ),
            None => TypeChain::wildcard_only(),
        }
    }
}

impl fmt::Debug for TypeChainResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeChainResolver(..)")
    }
}
