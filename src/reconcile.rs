//! Split a filtered paired-end library into retained pairs and singletons.

use crate::filter::FilterDecision;
use crate::read::Read;
use crate::read_pair::{ReadPair, WhichRead};

/// Outcome of filtering a paired library. Every input pair ends up in
/// exactly one of `pairs`, `fwd_singletons`, `rev_singletons`, or is
/// counted in `dropped_pairs`. Input order is preserved within each output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconciledOutput {
    pub pairs: Vec<ReadPair>,
    pub fwd_singletons: Vec<Read>,
    pub rev_singletons: Vec<Read>,
    pub dropped_pairs: usize,
}

impl ReconciledOutput {
    /// Route each pair according to the decisions for its forward and
    /// reverse mate.
    pub fn reconcile(pairs: Vec<ReadPair>, fwd: &FilterDecision, rev: &FilterDecision) -> ReconciledOutput {
        assert_eq!(pairs.len(), fwd.len(), "forward decisions do not match pair count");
        assert_eq!(pairs.len(), rev.len(), "reverse decisions do not match pair count");

        let mut out = ReconciledOutput::default();
        for ((pair, keep_fwd), keep_rev) in pairs.into_iter().zip(fwd.iter()).zip(rev.iter()) {
            match (keep_fwd, keep_rev) {
                (true, true) => out.pairs.push(pair),
                (true, false) => out.fwd_singletons.push(pair.into_read(WhichRead::R1)),
                (false, true) => out.rev_singletons.push(pair.into_read(WhichRead::R2)),
                (false, false) => out.dropped_pairs += 1,
            }
        }
        out
    }

    /// Number of input pairs accounted for.
    pub fn total_pairs(&self) -> usize {
        self.pairs.len() + self.fwd_singletons.len() + self.rev_singletons.len() + self.dropped_pairs
    }

    pub fn singletons(&self, which: WhichRead) -> &[Read] {
        match which {
            WhichRead::R1 => &self.fwd_singletons,
            WhichRead::R2 => &self.rev_singletons,
        }
    }

    /// True if nothing survived filtering.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.fwd_singletons.is_empty() && self.rev_singletons.is_empty()
    }
}
