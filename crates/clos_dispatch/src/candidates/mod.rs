//! Candidate signature enumeration.
//!
//! The candidates for a call are the cross product of the arguments' type
//! chains, visited in lexicographic order of chain positions: the first
//! parameter varies slowest, the last fastest.
//!
//! ```text
//! chains: [Dog, Animal, *] × [int, *]
//! order:  (Dog, int) (Dog, *) (Animal, int) (Animal, *) (*, int) (*, *)
//! ```
//!
//! The iterator is lazy; its state is one cursor per argument.

use smallvec::SmallVec;

use clos_ir::SpecificityProfile;

use crate::{SignatureKey, TypeChain};

/// One candidate key together with the specificity of each position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub key: SignatureKey,
    pub profile: SpecificityProfile,
}

/// Lazy odometer over the cross product of type chains.
#[derive(Clone, Debug)]
pub struct Candidates<'c> {
    chains: &'c [TypeChain],
    cursor: SmallVec<[usize; 4]>,
    exhausted: bool,
}

impl<'c> Candidates<'c> {
    /// Enumerate candidates for `chains`. No chains yields no candidates.
    pub fn new(chains: &'c [TypeChain]) -> Self {
        Candidates {
            chains,
            cursor: SmallVec::from_elem(0, chains.len()),
            exhausted: chains.is_empty(),
        }
    }

    /// Total number of candidates, saturating on overflow.
    pub fn total(&self) -> usize {
        if self.chains.is_empty() {
            return 0;
        }
        self.chains
            .iter()
            .fold(1usize, |acc, chain| acc.saturating_mul(chain.len()))
    }

    fn current(&self) -> Candidate {
        let mut profile = SpecificityProfile::with_capacity(self.chains.len());
        let key = self
            .chains
            .iter()
            .zip(&self.cursor)
            .filter_map(|(chain, &index)| chain.link(index))
            .map(|link| {
                profile.push(link.specificity);
                link.tag.clone()
            })
            .collect();
        Candidate { key, profile }
    }

    fn advance(&mut self) {
        for position in (0..self.chains.len()).rev() {
            self.cursor[position] += 1;
            if self.cursor[position] < self.chains[position].len() {
                return;
            }
            self.cursor[position] = 0;
        }
        self.exhausted = true;
    }
}

impl Iterator for Candidates<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.exhausted {
            return None;
        }
        let candidate = self.current();
        self.advance();
        Some(candidate)
    }
}
