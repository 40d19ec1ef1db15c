//! Method combination: running a `ResolvedPlan`.
//!
//! ```text
//! around[0](next₁) → around[1](next₂) → … → core
//! core = before* → primary → after*
//! ```
//!
//! Each around handler receives a `Next` bound to the layer below it.
//! Calling it zero times short-circuits everything beneath; calling it more
//! than once re-runs everything beneath. The result of the core is the
//! primary's result; before and after results are discarded.
//!
//! Errors from any handler stop the chain immediately and travel outward
//! unchanged.

use clos_value::arity_mismatch;

use crate::dispatcher::Dispatcher;
use crate::method::Body;
use crate::resolve::ResolvedPlan;
use crate::table::HandlerEntry;
use crate::{DispatchError, DispatchResult, Value};

/// Ambient context handed to plain handlers.
///
/// Lets a handler dispatch again without capturing the dispatcher.
#[derive(Clone, Copy, Debug)]
pub struct CallContext<'d> {
    dispatcher: &'d Dispatcher,
    depth: usize,
}

impl<'d> CallContext<'d> {
    pub(crate) fn new(dispatcher: &'d Dispatcher, depth: usize) -> Self {
        CallContext { dispatcher, depth }
    }

    /// The dispatcher running the current call.
    pub fn dispatcher(&self) -> &'d Dispatcher {
        self.dispatcher
    }

    /// Nesting depth of the current call; top-level dispatches are 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Re-enter the current dispatcher one level deeper.
    pub fn dispatch(&self, args: &[Value]) -> DispatchResult {
        self.dispatcher.dispatch_at(args, self.depth + 1)
    }

    /// Enter another dispatcher one level deeper.
    pub fn dispatch_on(&self, other: &Dispatcher, args: &[Value]) -> DispatchResult {
        other.dispatch_at(args, self.depth + 1)
    }
}

/// Continuation handed to an around handler.
pub struct Next<'a> {
    chain: &'a Chain<'a>,
    layer: usize,
}

impl Next<'_> {
    /// Run the rest of the chain with `args`.
    pub fn call(&self, args: &[Value]) -> DispatchResult {
        self.chain.run(self.layer, args)
    }

    /// Context of the call this continuation belongs to.
    pub fn context(&self) -> &CallContext<'_> {
        self.chain.ctx
    }

    /// Whether another around handler sits below this one.
    pub fn has_next_around(&self) -> bool {
        self.layer < self.chain.plan.arounds.len()
    }
}

/// One in-flight execution of a plan.
struct Chain<'a> {
    plan: &'a ResolvedPlan,
    ctx: &'a CallContext<'a>,
}

impl Chain<'_> {
    fn run(&self, layer: usize, args: &[Value]) -> DispatchResult {
        match self.plan.arounds.get(layer) {
            Some(entry) => {
                let next = Next {
                    chain: self,
                    layer: layer + 1,
                };
                entry.call_around(&next, args)
            }
            None => self.run_core(args),
        }
    }

    fn run_core(&self, args: &[Value]) -> DispatchResult {
        for entry in &self.plan.befores {
            entry.call_plain(self.ctx, args)?;
        }
        let result = self.plan.primary.call_plain(self.ctx, args)?;
        for entry in &self.plan.afters {
            entry.call_plain(self.ctx, args)?;
        }
        Ok(result)
    }
}

/// Execute `plan` with `args`.
pub(crate) fn invoke(plan: &ResolvedPlan, ctx: &CallContext<'_>, args: &[Value]) -> DispatchResult {
    Chain { plan, ctx }.run(0, args)
}

impl HandlerEntry {
    fn call_plain(&self, ctx: &CallContext<'_>, args: &[Value]) -> DispatchResult {
        let arity = self.method.arity();
        match &self.method.body {
            Body::Plain(f) if arity.accepts(args.len()) => f(ctx, args),
            Body::Plain(_) => Err(self.mismatch(arity.or(args.len()), args.len())),
            Body::Around(_) => Err(self.mismatch(arity.or(args.len() + 1), args.len())),
        }
    }

    fn call_around(&self, next: &Next<'_>, args: &[Value]) -> DispatchResult {
        let arity = self.method.arity();
        let supplied = args.len() + 1;
        match &self.method.body {
            Body::Around(f) if arity.accepts(supplied) => f(next, args),
            Body::Around(_) => Err(self.mismatch(arity.or(supplied), supplied)),
            // The continuation has nowhere to go.
            Body::Plain(_) => Err(self.mismatch(arity.or(args.len()), supplied)),
        }
    }

    #[cold]
    fn mismatch(&self, expected: usize, got: usize) -> DispatchError {
        arity_mismatch(format!("{} method {}", self.role, self.key), expected, got)
    }
}
