//! Clos Dispatch - runtime multiple dispatch with method combination.
//!
//! Given a call with N arguments, the dispatcher selects every applicable
//! handler across all argument types and composes them the way the CLOS
//! standard method combination does:
//!
//! ```text
//! around(outermost) → … → around(innermost) → before* → primary → after*
//! ```
//!
//! # Architecture
//!
//! - `TypeChainResolver`: per-argument specificity chain (`[Dog, Animal, IPet, *]`)
//! - `MethodTable`: `SignatureKey` → `RoleBucket` storage
//! - `Candidates`: cross product of chains, first parameter varying slowest
//! - `resolve`: walks candidates, collects role buckets, applies `DispatchPolicy`
//! - `compose`: runs a `ResolvedPlan`, threading `Next` continuations through
//!   `around` handlers
//! - `Dispatcher`: owns one table and one policy behind a lock
//!
//! # Reentrancy
//!
//! Every piece of per-call state lives in the stack frame of the call that
//! owns it. Handlers may dispatch again (same or another dispatcher), and may
//! even register methods; the table lock is never held while handlers run.
//!
//! # Debugging
//!
//! - `RUST_LOG=clos_dispatch=debug`: registrations and dispatch spans
//! - `RUST_LOG=clos_dispatch=trace`: every matched candidate signature

mod candidates;
mod compose;
mod dispatcher;
mod generic;
mod introspect;
mod method;
mod resolve;
mod stack;
mod table;

pub use candidates::{Candidate, Candidates};
pub use compose::{CallContext, Next};
pub use dispatcher::{Dispatcher, DispatcherBuilder, TypeChainResolver};
pub use generic::GenericTable;
pub use introspect::{
    ClassDef, ClassHierarchy, ClassKind, ShallowIntrospector, TypeDescription, TypeIntrospector,
};
pub use method::{Arity, AroundFn, Method, PlainFn};
pub use resolve::ResolvedPlan;
pub use stack::ensure_sufficient_stack;
pub use table::{HandlerEntry, MethodTable, RoleBucket};

pub use clos_ir::{
    ChainLink, DispatchPolicy, PrimitiveType, Role, SignatureKey, Specificity, SpecificityProfile,
    TypeChain, TypeTag, UnknownKeyword,
};
pub use clos_value::{DispatchError, DispatchErrorKind, DispatchResult, Value};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Only the first call does anything. Without a valid `RUST_LOG` no
/// subscriber is installed, and an already-installed global subscriber is
/// left in place.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(filter) = EnvFilter::try_from_default_env() else {
            return;
        };
        let installed = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_test_writer())
            .with(filter)
            .try_init();
        if installed.is_ok() {
            tracing::debug!("dispatch tracing enabled");
        }
    });
}
