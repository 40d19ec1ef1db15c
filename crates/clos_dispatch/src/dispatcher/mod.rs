//! The dispatcher: one method table, one policy, one introspector.
//!
//! # Locking
//!
//! Table and policy live behind a `parking_lot::RwLock`. A dispatch holds the
//! read lock only while resolving; the resulting plan owns clones of its
//! handlers, so handlers run with no lock held and may freely register,
//! unregister or dispatch again.
//!
//! Registrations made while a dispatch is in flight are visible to the next
//! resolution, never to a plan that is already executing.

mod builder;
mod resolver;

pub use builder::DispatcherBuilder;
pub use resolver::TypeChainResolver;

use std::fmt;

use parking_lot::RwLock;
use smallvec::SmallVec;
use tracing::debug;

use clos_value::{depth_exceeded, invalid_registration, unresolved_dispatch};

use crate::candidates::Candidates;
use crate::compose::{self, CallContext};
use crate::method::Method;
use crate::resolve::{self, ResolvedPlan};
use crate::stack::ensure_sufficient_stack;
use crate::table::MethodTable;
use crate::{
    DispatchError, DispatchPolicy, DispatchResult, Role, SignatureKey, TypeChain, TypeTag,
    UnknownKeyword, Value,
};

struct DispatchState {
    table: MethodTable,
    policy: DispatchPolicy,
}

/// Runtime multiple-dispatch engine.
///
/// `Dispatcher` is `Send + Sync`; share it with `Arc` to dispatch from
/// several threads.
pub struct Dispatcher {
    name: Option<String>,
    state: RwLock<DispatchState>,
    resolver: TypeChainResolver,
    max_depth: Option<usize>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Anonymous dispatcher with default settings.
    pub fn new() -> Self {
        DispatcherBuilder::new().build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    // Registration

    /// Register `method` under `signature` for `role`.
    ///
    /// Tags are parsed with `TypeTag::parse`: `"*"` is the wildcard and
    /// primitive names map to primitive tags.
    pub fn register<I, T>(
        &self,
        signature: I,
        role: Role,
        method: Method,
    ) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        self.state
            .write()
            .table
            .register(SignatureKey::new(signature), role, method)
            .map(|_| ())
    }

    /// Register with the role given as a keyword (`"before"`, `":around"`, ...).
    pub fn register_keyword<I, T>(
        &self,
        signature: I,
        role: &str,
        method: Method,
    ) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        let role: Role = role
            .parse()
            .map_err(|err: UnknownKeyword| invalid_registration(err.to_string()))?;
        self.register(signature, role, method)
    }

    /// Remove every handler registered under `signature`.
    ///
    /// Returns whether anything was removed.
    pub fn unregister<I, T>(&self, signature: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        let key = SignatureKey::new(signature);
        self.state.write().table.unregister(&key).is_some()
    }

    /// Whether any handler is registered under exactly `signature`.
    pub fn exists<I, T>(&self, signature: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        let key = SignatureKey::new(signature);
        self.state.read().table.exists(&key)
    }

    /// Remove every handler.
    pub fn clear(&self) {
        self.state.write().table.clear();
    }

    // Configuration

    pub fn policy(&self) -> DispatchPolicy {
        self.state.read().policy
    }

    /// Change the tie-break policy; affects subsequent dispatches only.
    pub fn set_policy(&self, policy: DispatchPolicy) {
        debug!(%policy, "set dispatch policy");
        self.state.write().policy = policy;
    }

    // Inspection

    /// Registered signatures, sorted by their rendering.
    pub fn signatures(&self) -> Vec<SignatureKey> {
        let mut keys: Vec<SignatureKey> =
            self.state.read().table.signatures().cloned().collect();
        keys.sort_by_cached_key(ToString::to_string);
        keys
    }

    /// Type chain of one value.
    pub fn chain_for(&self, value: &Value) -> TypeChain {
        self.resolver.chain_for(value)
    }

    /// Every candidate signature for `args`, most specific first.
    pub fn candidates(&self, args: &[Value]) -> Vec<SignatureKey> {
        let chains = self.chains(args);
        Candidates::new(&chains).map(|candidate| candidate.key).collect()
    }

    /// Resolve `args` to a plan without running it.
    pub fn resolve(&self, args: &[Value]) -> Result<ResolvedPlan, DispatchError> {
        let chains = self.chains(args);
        let plan = {
            let state = self.state.read();
            resolve::resolve(&state.table, state.policy, &chains)
        };
        plan.ok_or_else(|| self.unresolved(args, &chains))
    }

    // Dispatch

    /// Select and run every applicable handler for `args`.
    ///
    /// Returns the value produced by the outermost around handler, or the
    /// primary's value when no around handler applies.
    pub fn dispatch(&self, args: &[Value]) -> DispatchResult {
        self.dispatch_at(args, 0)
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(
            function = self.name.as_deref().unwrap_or("<anonymous>"),
            arity = args.len(),
            depth = depth
        )
    )]
    pub(crate) fn dispatch_at(&self, args: &[Value], depth: usize) -> DispatchResult {
        if let Some(limit) = self.max_depth {
            if depth >= limit {
                return Err(depth_exceeded(limit));
            }
        }
        ensure_sufficient_stack(|| {
            let plan = self.resolve(args)?;
            let ctx = CallContext::new(self, depth);
            compose::invoke(&plan, &ctx, args)
        })
    }

    fn chains(&self, args: &[Value]) -> SmallVec<[TypeChain; 4]> {
        args.iter().map(|arg| self.resolver.chain_for(arg)).collect()
    }

    #[cold]
    fn unresolved(&self, args: &[Value], chains: &[TypeChain]) -> DispatchError {
        let arg_types: Vec<String> = args
            .iter()
            .zip(chains)
            .map(|(arg, chain)| {
                let tag = chain.most_specific();
                if tag.is_wildcard() {
                    arg.type_name()
                } else {
                    tag.to_string()
                }
            })
            .collect();
        debug!(types = ?arg_types, "no applicable primary method");
        unresolved_dispatch(self.name(), arg_types)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("policy", &state.policy)
            .field("signatures", &state.table.len())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}
