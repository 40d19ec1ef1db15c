//! Method table: signature keys to per-role handler buckets.
//!
//! Lookup is exact-match on `SignatureKey`. Ordering between keys never comes
//! from the table; it comes from the order in which the candidate walk visits
//! them.
//!
//! # Role Semantics
//!
//! - `primary`: at most one per key; re-registering replaces it
//! - `before`, `after`, `around`: accumulate in registration order

use rustc_hash::FxHashMap;
use tracing::debug;

use clos_value::invalid_registration;

use crate::method::Method;
use crate::{DispatchError, Role, SignatureKey};

/// One registered handler.
#[derive(Clone, Debug)]
pub struct HandlerEntry {
    pub(crate) method: Method,
    pub(crate) role: Role,
    pub(crate) seq: u64,
    pub(crate) key: SignatureKey,
}

impl HandlerEntry {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Registration order across the whole table.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Signature the handler was registered under.
    pub fn key(&self) -> &SignatureKey {
        &self.key
    }
}

/// Handlers registered under one signature, grouped by role.
#[derive(Clone, Default, Debug)]
pub struct RoleBucket {
    primary: Option<HandlerEntry>,
    before: Vec<HandlerEntry>,
    after: Vec<HandlerEntry>,
    around: Vec<HandlerEntry>,
}

impl RoleBucket {
    pub fn primary(&self) -> Option<&HandlerEntry> {
        self.primary.as_ref()
    }

    pub fn before(&self) -> &[HandlerEntry] {
        &self.before
    }

    pub fn after(&self) -> &[HandlerEntry] {
        &self.after
    }

    pub fn around(&self) -> &[HandlerEntry] {
        &self.around
    }

    /// Handlers of one role, in registration order.
    pub fn handlers(&self, role: Role) -> &[HandlerEntry] {
        match role {
            Role::Primary => self.primary.as_slice(),
            Role::Before => &self.before,
            Role::After => &self.after,
            Role::Around => &self.around,
        }
    }

    /// Total handler count across roles.
    pub fn len(&self) -> usize {
        usize::from(self.primary.is_some())
            + self.before.len()
            + self.after.len()
            + self.around.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, entry: HandlerEntry) {
        match entry.role {
            Role::Primary => self.primary = Some(entry),
            Role::Before => self.before.push(entry),
            Role::After => self.after.push(entry),
            Role::Around => self.around.push(entry),
        }
    }
}

/// Mapping from signature to role bucket.
#[derive(Clone, Default, Debug)]
pub struct MethodTable {
    buckets: FxHashMap<SignatureKey, RoleBucket>,
    next_seq: u64,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `method` under `key` for `role`.
    ///
    /// Rejects empty signatures and blank tags. Returns the handler's
    /// registration sequence number.
    pub fn register(
        &mut self,
        key: SignatureKey,
        role: Role,
        method: Method,
    ) -> Result<u64, DispatchError> {
        validate(&key)?;

        let seq = self.next_seq;
        self.next_seq += 1;

        debug!(signature = %key, %role, seq, "register method");
        let entry = HandlerEntry {
            method,
            role,
            seq,
            key: key.clone(),
        };
        self.buckets.entry(key).or_default().insert(entry);
        Ok(seq)
    }

    /// Drop every handler of every role under `key`.
    ///
    /// Returns the removed bucket; unknown keys are a no-op.
    pub fn unregister(&mut self, key: &SignatureKey) -> Option<RoleBucket> {
        let removed = self.buckets.remove(key);
        if removed.is_some() {
            debug!(signature = %key, "unregister signature");
        }
        removed
    }

    /// Whether any handler is registered under `key`.
    pub fn exists(&self, key: &SignatureKey) -> bool {
        self.buckets.get(key).is_some_and(|bucket| !bucket.is_empty())
    }

    #[inline]
    pub fn get(&self, key: &SignatureKey) -> Option<&RoleBucket> {
        self.buckets.get(key)
    }

    /// Number of registered signatures.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Registered signatures, in no particular order.
    pub fn signatures(&self) -> impl Iterator<Item = &SignatureKey> + '_ {
        self.buckets.keys()
    }

    /// Remove everything. Sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

fn validate(key: &SignatureKey) -> Result<(), DispatchError> {
    if key.is_empty() {
        return Err(invalid_registration(
            "signature must name at least one parameter type",
        ));
    }
    if let Some(position) = key.first_blank() {
        return Err(invalid_registration(format!(
            "parameter {position} of {key} has an empty type tag"
        )));
    }
    Ok(())
}
