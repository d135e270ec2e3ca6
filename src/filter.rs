//! Turn complexity scores into keep/discard decisions.

use crate::complexity::ScoreResult;
use crate::read::Read;
use crate::threshold::LcThreshold;

/// One keep flag per scored read, in read order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FilterDecision {
    keep: Vec<bool>,
}

impl FilterDecision {
    /// Apply `threshold` to every score. The scores must have been computed
    /// with the threshold's method.
    pub fn from_scores(scores: &ScoreResult, threshold: &LcThreshold) -> FilterDecision {
        assert_eq!(
            scores.method, threshold.method,
            "scores and threshold use different methods"
        );
        FilterDecision {
            keep: scores.scores.iter().map(|&s| threshold.keeps(s)).collect(),
        }
    }

    /// Score `reads` with the threshold's method and apply the threshold.
    pub fn compute(reads: &[Read], threshold: &LcThreshold) -> FilterDecision {
        let scores = ScoreResult::compute(threshold.method, reads);
        Self::from_scores(&scores, threshold)
    }

    #[inline]
    pub fn keeps(&self, idx: usize) -> bool {
        self.keep[idx]
    }

    pub fn len(&self) -> usize {
        self.keep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keep.is_empty()
    }

    pub fn kept(&self) -> usize {
        self.keep.iter().filter(|&&k| k).count()
    }

    pub fn discarded(&self) -> usize {
        self.len() - self.kept()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.keep.iter().copied()
    }

    /// Keep the reads this decision retains, preserving order.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        assert_eq!(items.len(), self.len());
        items
            .into_iter()
            .zip(self.iter())
            .filter_map(|(item, keep)| if keep { Some(item) } else { None })
            .collect()
    }
}

impl From<Vec<bool>> for FilterDecision {
    fn from(keep: Vec<bool>) -> Self {
        FilterDecision { keep }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_iter::ReadIter;
    use crate::threshold::LcMethod;
    use proptest::prelude::*;

    fn fixture_reads() -> Vec<Read> {
        ReadIter::new("tests/data/pe_fwd.fastq")
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn decide(method: LcMethod, value: f64) -> FilterDecision {
        FilterDecision::compute(&fixture_reads(), &LcThreshold { method, value })
    }

    #[test]
    fn test_dust_fixture() {
        assert_eq!(decide(LcMethod::Dust, 100.0).kept(), 8);
        assert_eq!(decide(LcMethod::Dust, 40.0).kept(), 5);

        let d = decide(LcMethod::Dust, 2.0);
        assert_eq!(d.iter().collect::<Vec<_>>(), vec![true, false, false, true, false, true, false, true]);
        assert_eq!(d.kept(), 4);
        assert_eq!(d.discarded(), 4);

        // only the read without repeated triplets survives
        let d = decide(LcMethod::Dust, 0.0);
        assert_eq!(d.kept(), 1);
        assert!(d.keeps(5));
    }

    #[test]
    fn test_entropy_fixture() {
        assert_eq!(decide(LcMethod::Entropy, 0.0).kept(), 8);
        assert_eq!(decide(LcMethod::Entropy, 50.0).kept(), 5);
        assert_eq!(decide(LcMethod::Entropy, 70.0).kept(), 5);
        assert_eq!(decide(LcMethod::Entropy, 89.0).kept(), 2);
        assert_eq!(decide(LcMethod::Entropy, 100.0).kept(), 0);
    }

    #[test]
    fn test_apply() {
        let reads = fixture_reads();
        let d = decide(LcMethod::Dust, 2.0);
        let kept = d.apply(reads);
        let ids: Vec<&[u8]> = kept.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![&b"read1/1"[..], b"read4/1", b"read6/1", b"read8/1"]);
    }

    #[test]
    #[should_panic]
    fn test_method_mismatch() {
        let scores = ScoreResult {
            method: LcMethod::Dust,
            scores: vec![1.0],
        };
        let _ = FilterDecision::from_scores(&scores, &LcThreshold { method: LcMethod::Entropy, value: 1.0 });
    }

    proptest! {
        #[test]
        fn prop_test_partition(ref keep in proptest::collection::vec(any::<bool>(), 0..100)) {
            let d = FilterDecision::from(keep.clone());
            prop_assert_eq!(d.kept() + d.discarded(), keep.len());
            let items: Vec<usize> = (0..keep.len()).collect();
            prop_assert_eq!(d.apply(items).len(), d.kept());
        }
    }
}
