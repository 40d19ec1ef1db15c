//! Clos IR - vocabulary types for the multiple-dispatch engine.
//!
//! This crate contains the plain data the dispatcher reasons about:
//! - `TypeTag` and `PrimitiveType` for naming runtime types
//! - `TypeChain` for one argument's most-to-least specific tags
//! - `SignatureKey` for per-position lookup keys
//! - `Role` and `DispatchPolicy` for method combination
//!
//! Nothing here executes handlers or touches runtime values; that lives in
//! `clos_value` and `clos_dispatch`.
//!
//! # Equality
//!
//! Tags compare by identity only. Ordering between tags never comes from the
//! tags themselves, only from their position in a `TypeChain`.

mod chain;
mod role;
mod signature;
mod tag;

pub use chain::{ChainLink, Specificity, TypeChain};
pub use role::{DispatchPolicy, Role, UnknownKeyword};
pub use signature::{SignatureKey, SpecificityProfile};
pub use tag::{PrimitiveType, TypeTag};
