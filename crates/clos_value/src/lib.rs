//! Clos Value - runtime values and the dispatch error taxonomy.
//!
//! Dispatch arguments, handler results and raised conditions are all
//! `Value`s. Handlers return `DispatchResult`, so an error produced anywhere
//! in a composed method chain travels to the caller of `dispatch` unchanged.
//!
//! # Re-exports
//!
//! The vocabulary types of `clos_ir` are re-exported for convenience.

pub mod errors;
mod value;

pub use clos_ir::{PrimitiveType, TypeTag};
pub use errors::{
    arity_mismatch, depth_exceeded, invalid_registration, undefined_generic, unresolved_dispatch,
    DispatchError, DispatchErrorKind, DispatchResult,
};
pub use value::{Heap, Instance, Resource, Value};
