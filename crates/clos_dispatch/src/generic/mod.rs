//! Named generic functions.
//!
//! A `GenericTable` maps function names to independent dispatchers that
//! share one introspector, one default policy and one depth limit. Each name
//! owns its own method table, so `(int)` under `"area"` and `(int)` under
//! `"render"` never interfere.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use clos_value::undefined_generic;

use crate::dispatcher::Dispatcher;
use crate::introspect::{ShallowIntrospector, TypeIntrospector};
use crate::{DispatchPolicy, DispatchResult, Value};

/// Registry of named dispatchers.
pub struct GenericTable {
    functions: FxHashMap<String, Arc<Dispatcher>>,
    introspector: Arc<dyn TypeIntrospector>,
    policy: DispatchPolicy,
    max_depth: Option<usize>,
}

impl Default for GenericTable {
    fn default() -> Self {
        Self::new()
    }
}

impl GenericTable {
    /// Table whose functions classify objects with `ShallowIntrospector`.
    pub fn new() -> Self {
        Self::with_introspector(Arc::new(ShallowIntrospector))
    }

    pub fn with_introspector(introspector: Arc<dyn TypeIntrospector>) -> Self {
        GenericTable {
            functions: FxHashMap::default(),
            introspector,
            policy: DispatchPolicy::default(),
            max_depth: None,
        }
    }

    /// Policy for functions defined from now on.
    #[must_use]
    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Depth limit for functions defined from now on.
    #[must_use]
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    /// The dispatcher named `name`, creating it on first use.
    pub fn define(&mut self, name: &str) -> Arc<Dispatcher> {
        if let Some(existing) = self.functions.get(name) {
            return Arc::clone(existing);
        }
        debug!(function = name, "define generic function");
        let mut builder = Dispatcher::builder()
            .name(name)
            .policy(self.policy)
            .shared_introspector(Arc::clone(&self.introspector));
        if let Some(limit) = self.max_depth {
            builder = builder.max_depth(limit);
        }
        let dispatcher = Arc::new(builder.build());
        self.functions
            .insert(name.to_string(), Arc::clone(&dispatcher));
        dispatcher
    }

    pub fn get(&self, name: &str) -> Option<Arc<Dispatcher>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Forget `name`. Clones of its dispatcher stay usable.
    pub fn remove(&mut self, name: &str) -> Option<Arc<Dispatcher>> {
        self.functions.remove(name)
    }

    /// Defined names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Dispatch `args` through the function named `name`.
    pub fn call(&self, name: &str, args: &[Value]) -> DispatchResult {
        match self.functions.get(name) {
            Some(dispatcher) => dispatcher.dispatch(args),
            None => Err(undefined_generic(name)),
        }
    }
}
