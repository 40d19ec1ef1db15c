//! `DispatcherBuilder` for creating dispatchers with non-default settings.

use std::sync::Arc;

use parking_lot::RwLock;

use super::{DispatchState, Dispatcher, TypeChainResolver};
use crate::introspect::{ShallowIntrospector, TypeIntrospector};
use crate::table::MethodTable;
use crate::DispatchPolicy;

/// Builder for `Dispatcher`.
///
/// Defaults: anonymous, `FirstWins`, `ShallowIntrospector`, no depth limit.
#[derive(Default)]
pub struct DispatcherBuilder {
    name: Option<String>,
    policy: DispatchPolicy,
    introspector: Option<Arc<dyn TypeIntrospector>>,
    max_depth: Option<usize>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name used in `UnresolvedDispatch` messages and tracing spans.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the introspector for non-primitive values.
    #[must_use]
    pub fn introspector(mut self, introspector: impl TypeIntrospector + 'static) -> Self {
        self.introspector = Some(Arc::new(introspector));
        self
    }

    /// Share an introspector with other dispatchers.
    #[must_use]
    pub fn shared_introspector(mut self, introspector: Arc<dyn TypeIntrospector>) -> Self {
        self.introspector = Some(introspector);
        self
    }

    /// Limit nested dispatch depth.
    ///
    /// A dispatch started at depth `limit` or deeper fails with
    /// `DepthExceeded`; top-level calls run at depth 0.
    #[must_use]
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    pub fn build(self) -> Dispatcher {
        let introspector: Arc<dyn TypeIntrospector> = match self.introspector {
            Some(introspector) => introspector,
            None => Arc::new(ShallowIntrospector),
        };
        Dispatcher {
            name: self.name,
            state: RwLock::new(DispatchState {
                table: MethodTable::new(),
                policy: self.policy,
            }),
            resolver: TypeChainResolver::new(introspector),
            max_depth: self.max_depth,
        }
    }
}
