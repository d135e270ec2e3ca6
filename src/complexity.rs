//! Low-complexity scores for reads, in the style of PRINSEQ.
//!
//! Both scores are computed from triplet (3-mer) counts over windows of the
//! read:
//! * Windows are 64 bases long and advance by 32 bases. The last window
//! (between 33 and 64 bases, or the whole read if it is at most 64 bases)
//! starts on a 32 base boundary and runs to the end of the read.
//! * A trailing window is weighted by `(l - 1) / 61`, where `l` is its number
//! of triplet positions, so a full 64 base window has weight 1.
//! * Trailing windows shorter than 6 bases are not scored. A read with no
//! scored window gets a score of 0.
//! * Triplets containing anything other than `ACGT` (case-insensitive) are
//! not counted.
//!
//! Scores are reported on a 0-100 scale, rounded to two decimals.
//!
//! | Method    | Window score                      | 100 means                |
//! |-----------|-----------------------------------|--------------------------|
//! | `Dust`    | `sum(c * (c - 1) / 2) / (l - 1)`  | homopolymer (repetitive) |
//! | `Entropy` | `-sum(p * ln p) / ln(min(l, 64))` | all triplets distinct    |

use rayon::prelude::*;

use crate::read::Read;
use crate::threshold::LcMethod;

//------------------ CONSTANTS -----------------------//
const WINDOW_SIZE: usize = 64;
const WINDOW_STEP: usize = 32;
const WORD_SIZE: usize = 3;

// Trailing windows this short or shorter are skipped
const MIN_TRAILING_WINDOW: usize = 5;

// Number of distinct triplets over ACGT
const N_WORDS: usize = 64;

// Maximum raw dust score of a window: a 64 base homopolymer has 62 equal
// triplets, 62 * 61 / 2 / 61 = 31
const MAX_DUST: f64 = 31.0;
//----------------END OF CONSTANTS--------------------//

/// A complexity score over a nucleotide sequence. Implementations are pure
/// functions of the sequence.
pub trait ComplexityScorer: Sync {
    fn score(&self, seq: &[u8]) -> f64;
}

/// PRINSEQ DUST score. 0 for sequences without repeated triplets, 100 for
/// homopolymers.
#[derive(Debug, Default, Copy, Clone)]
pub struct Dust;

/// PRINSEQ entropy score. 100 when no triplet repeats within a window,
/// 0 for homopolymers.
#[derive(Debug, Default, Copy, Clone)]
pub struct Entropy;

impl ComplexityScorer for Dust {
    fn score(&self, seq: &[u8]) -> f64 {
        weighted_mean(seq, |counts, l| {
            let pairs: u32 = counts.iter().map(|&c| c * c.saturating_sub(1) / 2).sum();
            pairs as f64 / (l - 1) as f64
        })
        .map_or(0.0, |m| round2(m * 100.0 / MAX_DUST))
    }
}

impl ComplexityScorer for Entropy {
    fn score(&self, seq: &[u8]) -> f64 {
        weighted_mean(seq, |counts, l| {
            let l = l as f64;
            let h: f64 = counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / l;
                    -p * p.ln()
                })
                .sum();
            h / l.min(N_WORDS as f64).ln()
        })
        .map_or(0.0, |m| round2(m * 100.0))
    }
}

impl LcMethod {
    pub fn scorer(self) -> &'static dyn ComplexityScorer {
        match self {
            LcMethod::Dust => &Dust,
            LcMethod::Entropy => &Entropy,
        }
    }

    /// Score one sequence with this method.
    pub fn score(self, seq: &[u8]) -> f64 {
        self.scorer().score(seq)
    }
}

/// One score per read, in the same order as the reads that were scored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub method: LcMethod,
    pub scores: Vec<f64>,
}

impl ScoreResult {
    /// Score every read in parallel. The result is independent of the
    /// number of threads.
    pub fn compute<'a, I>(method: LcMethod, reads: I) -> ScoreResult
    where
        I: IntoParallelIterator<Item = &'a Read>,
    {
        let scorer = method.scorer();
        let scores = reads
            .into_par_iter()
            .map(|r| scorer.score(r.seq()))
            .collect();
        ScoreResult { method, scores }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Pair each score with the identifier of the read it belongs to.
    pub fn by_id<'a>(&'a self, reads: &'a [Read]) -> impl Iterator<Item = (&'a [u8], f64)> + 'a {
        reads.iter().map(Read::id).zip(self.scores.iter().copied())
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 2-bit code of an upper or lower case ACGT base.
#[inline]
fn base_code(b: u8) -> Option<usize> {
    match b {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

fn count_words(window: &[u8], counts: &mut [u32; N_WORDS]) {
    counts.iter_mut().for_each(|c| *c = 0);
    for w in window.windows(WORD_SIZE) {
        if let (Some(a), Some(b), Some(c)) = (base_code(w[0]), base_code(w[1]), base_code(w[2])) {
            counts[(a << 4) | (b << 2) | c] += 1;
        }
    }
}

/// Split `len` bases into `(full_windows, trailing_window_len)`.
fn layout(len: usize) -> (usize, usize) {
    if len <= WINDOW_SIZE {
        return (0, len);
    }
    let mut steps = (len - WINDOW_SIZE) / WINDOW_STEP + 1;
    let mut rest = len - steps * WINDOW_STEP;
    if rest <= WINDOW_STEP {
        rest += WINDOW_STEP;
        steps -= 1;
    }
    (steps, rest)
}

/// Weighted mean of `window_score(counts, l)` over the windows of `seq`,
/// or `None` if no window can be scored.
fn weighted_mean<F>(seq: &[u8], window_score: F) -> Option<f64>
where
    F: Fn(&[u32; N_WORDS], usize) -> f64,
{
    let (steps, rest) = layout(seq.len());
    let full_positions = WINDOW_SIZE - WORD_SIZE + 1;
    let mut counts = [0u32; N_WORDS];
    let mut total = 0.0;
    let mut weight = 0.0;

    for i in 0..steps {
        let start = i * WINDOW_STEP;
        count_words(&seq[start..start + WINDOW_SIZE], &mut counts);
        total += window_score(&counts, full_positions);
        weight += 1.0;
    }

    if rest > MIN_TRAILING_WINDOW {
        let start = steps * WINDOW_STEP;
        let l = rest - WORD_SIZE + 1;
        let w = (l - 1) as f64 / (full_positions - 1) as f64;
        count_words(&seq[start..start + rest], &mut counts);
        total += window_score(&counts, l) * w;
        weight += w;
    }

    if weight > 0.0 {
        Some(total / weight)
    } else {
        None
    }
}
