//! Registered handler callables.
//!
//! A `Method` comes in one of two calling conventions:
//!
//! - plain: `fn(&CallContext, &[Value]) -> DispatchResult`, used for
//!   `primary`, `before` and `after`
//! - around-form: `fn(&Next, &[Value]) -> DispatchResult`, receiving the
//!   continuation as its leading parameter
//!
//! The calling convention is checked when the handler actually runs, not at
//! registration, so a plain method registered as `around` (or the reverse)
//! fails with `ArityMismatch` only on the dispatches that reach it.

use std::fmt;
use std::sync::Arc;

use crate::compose::{CallContext, Next};
use crate::{DispatchResult, Value};

/// Plain handler signature.
pub type PlainFn = dyn Fn(&CallContext<'_>, &[Value]) -> DispatchResult + Send + Sync;

/// Around handler signature; the `Next` is the injected continuation.
pub type AroundFn = dyn Fn(&Next<'_>, &[Value]) -> DispatchResult + Send + Sync;

/// Declared parameter count of a handler.
///
/// For around-form handlers the count includes the continuation.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum Arity {
    /// Accepts any number of arguments.
    #[default]
    Variadic,
    /// Accepts exactly this many parameters.
    Exact(usize),
}

impl Arity {
    /// Whether `count` parameters are acceptable.
    #[inline]
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Variadic => true,
            Arity::Exact(n) => n == count,
        }
    }

    /// The declared count, or `fallback` when variadic.
    #[inline]
    pub fn or(self, fallback: usize) -> usize {
        match self {
            Arity::Variadic => fallback,
            Arity::Exact(n) => n,
        }
    }
}

#[derive(Clone)]
pub(crate) enum Body {
    Plain(Arc<PlainFn>),
    Around(Arc<AroundFn>),
}

/// A registered callable plus its declared arity.
///
/// Cloning is cheap (reference-counted).
#[derive(Clone)]
pub struct Method {
    pub(crate) body: Body,
    arity: Arity,
}

impl Method {
    /// Plain handler.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CallContext<'_>, &[Value]) -> DispatchResult + Send + Sync + 'static,
    {
        Method {
            body: Body::Plain(Arc::new(f)),
            arity: Arity::Variadic,
        }
    }

    /// Handler taking a continuation as its first parameter.
    pub fn around<F>(f: F) -> Self
    where
        F: Fn(&Next<'_>, &[Value]) -> DispatchResult + Send + Sync + 'static,
    {
        Method {
            body: Body::Around(Arc::new(f)),
            arity: Arity::Variadic,
        }
    }

    /// Plain handler that always returns `value`.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(move |_, _| Ok(value.clone()))
    }

    /// Declare an exact parameter count.
    #[must_use]
    pub fn with_arity(mut self, params: usize) -> Self {
        self.arity = Arity::Exact(params);
        self
    }

    #[inline]
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Whether this method takes a continuation.
    #[inline]
    pub fn is_around_form(&self) -> bool {
        matches!(self.body, Body::Around(_))
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let form = if self.is_around_form() {
            "around-form"
        } else {
            "plain"
        };
        f.debug_struct("Method")
            .field("form", &form)
            .field("arity", &self.arity)
            .finish()
    }
}
