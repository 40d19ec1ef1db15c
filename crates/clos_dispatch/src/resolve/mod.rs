//! Candidate walk: from type chains to an executable plan.
//!
//! # Algorithm
//!
//! 1. Enumerate candidate keys (most specific first).
//! 2. For each key present in the table, collect its before, after and
//!    around handlers as one group each, and offer its primary to the policy.
//! 3. Reverse the before and around groups so the least specific match runs
//!    first (before) or outermost (around). After groups keep walk order.
//!
//! Reversal is per group: handlers registered under the same key keep their
//! registration order.
//!
//! # Primary Selection
//!
//! - `FirstWins`: the first primary met on the walk is kept.
//! - `LastWins`: a later primary replaces the held one only when its
//!   specificity profile is identical, so a more specific match is never
//!   displaced by a less specific one.

use smallvec::SmallVec;
use tracing::trace;

use clos_ir::SpecificityProfile;

use crate::candidates::Candidates;
use crate::table::{HandlerEntry, MethodTable};
use crate::{DispatchPolicy, TypeChain};

/// Handlers selected for one call, in execution order.
#[derive(Clone, Debug)]
pub struct ResolvedPlan {
    pub primary: HandlerEntry,
    /// Least specific first.
    pub befores: Vec<HandlerEntry>,
    /// Most specific first.
    pub afters: Vec<HandlerEntry>,
    /// Outermost first.
    pub arounds: Vec<HandlerEntry>,
}

impl ResolvedPlan {
    /// Total number of handlers in the plan.
    pub fn len(&self) -> usize {
        1 + self.befores.len() + self.afters.len() + self.arounds.len()
    }

    /// Always false: a plan has a primary.
    pub fn is_empty(&self) -> bool {
        false
    }
}

type Groups<'t> = SmallVec<[&'t [HandlerEntry]; 4]>;

/// Walk the candidates of `chains` against `table`.
///
/// Returns `None` when no candidate key carries a primary handler.
pub(crate) fn resolve(
    table: &MethodTable,
    policy: DispatchPolicy,
    chains: &[TypeChain],
) -> Option<ResolvedPlan> {
    let mut primary: Option<(&HandlerEntry, SpecificityProfile)> = None;
    let mut befores: Groups<'_> = SmallVec::new();
    let mut afters: Groups<'_> = SmallVec::new();
    let mut arounds: Groups<'_> = SmallVec::new();

    for candidate in Candidates::new(chains) {
        let Some(bucket) = table.get(&candidate.key) else {
            continue;
        };
        trace!(signature = %candidate.key, "candidate matched");

        push_group(&mut befores, bucket.before());
        push_group(&mut afters, bucket.after());
        push_group(&mut arounds, bucket.around());

        if let Some(entry) = bucket.primary() {
            let replace = match (&primary, policy) {
                (None, _) => true,
                (Some(_), DispatchPolicy::FirstWins) => false,
                (Some((_, held)), DispatchPolicy::LastWins) => *held == candidate.profile,
            };
            if replace {
                primary = Some((entry, candidate.profile));
            }
        }
    }

    let (primary, _) = primary?;
    Some(ResolvedPlan {
        primary: primary.clone(),
        befores: flatten(befores.iter().rev()),
        afters: flatten(afters.iter()),
        arounds: flatten(arounds.iter().rev()),
    })
}

#[inline]
fn push_group<'t>(groups: &mut Groups<'t>, group: &'t [HandlerEntry]) {
    if !group.is_empty() {
        groups.push(group);
    }
}

fn flatten<'a, 't: 'a>(groups: impl Iterator<Item = &'a &'t [HandlerEntry]>) -> Vec<HandlerEntry> {
    groups.flat_map(|group| group.iter().cloned()).collect()
}
