//! Error types for registration and dispatch.
//!
//! # Structured Error Categories
//!
//! `DispatchErrorKind` names every failure the engine itself produces, plus
//! `Raised` for failures produced by handlers. Factory functions (e.g.
//! `unresolved_dispatch()`) are the public constructors.
//!
//! Handler errors are never rewrapped: whatever a handler returns as `Err`
//! reaches the caller of `dispatch` as-is.

use thiserror::Error;

use crate::Value;

/// Result of running a handler or a whole dispatch.
pub type DispatchResult = Result<Value, DispatchError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DispatchErrorKind {
    /// Malformed signature or unknown role at registration time.
    #[error("invalid registration: {reason}")]
    InvalidRegistration { reason: String },

    /// No primary handler matched any candidate signature.
    #[error(
        "no applicable primary method for {}({})",
        .function.as_deref().unwrap_or("<anonymous>"),
        .arg_types.join(", ")
    )]
    UnresolvedDispatch {
        function: Option<String>,
        arg_types: Vec<String>,
    },

    /// A handler was invoked with a parameter count it does not declare.
    #[error("{handler} expects {expected} {}, got {got}", argument_word(.expected))]
    ArityMismatch {
        handler: String,
        expected: usize,
        got: usize,
    },

    /// Nested dispatch went deeper than the configured limit.
    #[error("maximum dispatch depth exceeded (limit: {limit})")]
    DepthExceeded { limit: usize },

    /// A generic-function table was asked for a name it does not hold.
    #[error("undefined generic function: {name}")]
    UndefinedGeneric { name: String },

    /// Failure produced by a handler.
    #[error("{message}")]
    Raised { message: String },
}

fn argument_word(count: &usize) -> &'static str {
    if *count == 1 {
        "argument"
    } else {
        "arguments"
    }
}

/// Dispatch error.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{kind}")]
pub struct DispatchError {
    /// Structured error category.
    pub kind: DispatchErrorKind,
    /// Value raised alongside the error, if a handler supplied one.
    pub payload: Option<Value>,
}

impl DispatchError {
    fn from_kind(kind: DispatchErrorKind) -> Self {
        Self {
            kind,
            payload: None,
        }
    }

    /// Raise a handler failure with a message.
    #[cold]
    pub fn raise(message: impl Into<String>) -> Self {
        Self::from_kind(DispatchErrorKind::Raised {
            message: message.into(),
        })
    }

    /// Raise a handler failure carrying a value (a condition object).
    #[cold]
    pub fn raise_with(payload: Value, message: impl Into<String>) -> Self {
        Self {
            kind: DispatchErrorKind::Raised {
                message: message.into(),
            },
            payload: Some(payload),
        }
    }

    #[inline]
    pub fn is_unresolved(&self) -> bool {
        matches!(self.kind, DispatchErrorKind::UnresolvedDispatch { .. })
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        matches!(self.kind, DispatchErrorKind::Raised { .. })
    }
}

impl From<DispatchErrorKind> for DispatchError {
    fn from(kind: DispatchErrorKind) -> Self {
        Self::from_kind(kind)
    }
}

// Registration Errors

/// Malformed signature or unknown role.
#[cold]
pub fn invalid_registration(reason: impl Into<String>) -> DispatchError {
    DispatchError::from_kind(DispatchErrorKind::InvalidRegistration {
        reason: reason.into(),
    })
}

// Dispatch Errors

/// No primary handler for the given concrete argument types.
#[cold]
pub fn unresolved_dispatch(function: Option<&str>, arg_types: Vec<String>) -> DispatchError {
    DispatchError::from_kind(DispatchErrorKind::UnresolvedDispatch {
        function: function.map(str::to_string),
        arg_types,
    })
}

/// Handler declared `expected` parameters but was called with `got`.
#[cold]
pub fn arity_mismatch(handler: impl Into<String>, expected: usize, got: usize) -> DispatchError {
    DispatchError::from_kind(DispatchErrorKind::ArityMismatch {
        handler: handler.into(),
        expected,
        got,
    })
}

/// Nested dispatch exceeded the configured depth.
#[cold]
pub fn depth_exceeded(limit: usize) -> DispatchError {
    DispatchError::from_kind(DispatchErrorKind::DepthExceeded { limit })
}

/// Unknown generic function name.
#[cold]
pub fn undefined_generic(name: &str) -> DispatchError {
    DispatchError::from_kind(DispatchErrorKind::UndefinedGeneric {
        name: name.to_string(),
    })
}
