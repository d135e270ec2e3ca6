// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Low-complexity filtering of a stored reads library.
//!
//! `exec_read_library_lc_filter` runs one request end to end: it validates
//! the parameters, fetches the input library, scores and filters every
//! read, splits paired-end mates into pairs and singletons and saves every
//! non-empty result as a new library. Invalid parameters are rejected
//! before anything is fetched or saved.
//!
//! ```no_run
//! use lc_filter::{exec_read_library_lc_filter, DirStore, FilterParams, LcMethod};
//!
//! let store = DirStore::new("/data/store").unwrap();
//! let params = FilterParams {
//!     input_reads_ref: "my_ws/reads".to_string(),
//!     output_ws: "my_ws".to_string(),
//!     output_reads_name: "reads_dust_2".to_string(),
//!     lc_method: LcMethod::Dust,
//!     lc_dust_threshold: Some(2.0),
//!     lc_entropy_threshold: None,
//! };
//! let outcome = exec_read_library_lc_filter(&store, &params).unwrap();
//! println!("{}", outcome.report);
//! ```

use std::fmt;

use itertools::Itertools;
use rayon::prelude::*;

use crate::complexity::ScoreResult;
use crate::error::LcError;
use crate::filter::FilterDecision;
use crate::library::{LibraryKind, ReadLibrary, Reads};
use crate::materialize::{MaterializedRefs, OutputMaterializer};
use crate::read_pair::ReadPair;
use crate::reconcile::ReconciledOutput;
use crate::store::{is_valid_name, ObjectRef, ReadsStore};
use crate::threshold::{LcMethod, LcThreshold};

/// Parameters of one filtering request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FilterParams {
    /// Library to filter, `workspace/name[/version]`.
    pub input_reads_ref: String,
    pub output_ws: String,
    pub output_reads_name: String,
    pub lc_method: LcMethod,
    #[serde(default)]
    pub lc_dust_threshold: Option<f64>,
    #[serde(default)]
    pub lc_entropy_threshold: Option<f64>,
}

impl FilterParams {
    /// Check every parameter, returning the parsed input reference and the
    /// threshold for the selected method.
    pub fn validate(&self) -> Result<(ObjectRef, LcThreshold), LcError> {
        if self.output_ws.is_empty() {
            return Err(LcError::invalid("Parameter output_ws is required"));
        }
        if !is_valid_name(&self.output_reads_name) {
            return Err(LcError::invalid(format!(
                "Parameter output_reads_name is not a valid object name: {:?}",
                self.output_reads_name
            )));
        }
        let input: ObjectRef = self.input_reads_ref.parse()?;
        let threshold = LcThreshold::validate(self.lc_method, self.lc_dust_threshold, self.lc_entropy_threshold)?;
        Ok((input, threshold))
    }
}

/// Counts from one filtering run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FilterReport {
    pub input_ref: ObjectRef,
    pub kind: LibraryKind,
    pub method: LcMethod,
    pub threshold: f64,
    /// Reads in the input, counting both mates of a pair.
    pub input_reads: usize,
    pub kept_reads: usize,
    pub discarded_reads: usize,
    /// Paired-end input only.
    pub pairs: Option<PairCounts>,
}

/// How the mates of a paired-end library were split.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PairCounts {
    pub input_pairs: usize,
    pub kept_pairs: usize,
    pub fwd_singletons: usize,
    pub rev_singletons: usize,
    pub dropped_pairs: usize,
}

impl PairCounts {
    fn from_reconciled(out: &ReconciledOutput) -> PairCounts {
        PairCounts {
            input_pairs: out.total_pairs(),
            kept_pairs: out.pairs.len(),
            fwd_singletons: out.fwd_singletons.len(),
            rev_singletons: out.rev_singletons.len(),
            dropped_pairs: out.dropped_pairs,
        }
    }

    fn kept_reads(&self) -> usize {
        2 * self.kept_pairs + self.fwd_singletons + self.rev_singletons
    }
}

impl fmt::Display for FilterReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Input library: {} ({:?})", self.input_ref, self.kind)?;
        writeln!(f, "Method: {}, threshold: {}", self.method, self.threshold)?;
        writeln!(f, "Input reads: {}", self.input_reads)?;
        writeln!(f, "Kept reads: {}", self.kept_reads)?;
        write!(f, "Discarded reads: {}", self.discarded_reads)?;
        if let Some(ref p) = self.pairs {
            writeln!(f)?;
            writeln!(f, "Input pairs: {}", p.input_pairs)?;
            writeln!(f, "Retained pairs: {}", p.kept_pairs)?;
            writeln!(f, "Forward singletons: {}", p.fwd_singletons)?;
            writeln!(f, "Reverse singletons: {}", p.rev_singletons)?;
            write!(f, "Pairs with both mates discarded: {}", p.dropped_pairs)?;
        }
        Ok(())
    }
}

/// Result of a successful run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FilterOutcome {
    pub created_object_refs: Vec<ObjectRef>,
    pub output_filtered_ref: Option<ObjectRef>,
    pub output_unpaired_fwd_ref: Option<ObjectRef>,
    pub output_unpaired_rev_ref: Option<ObjectRef>,
    pub report: FilterReport,
}

impl FilterOutcome {
    fn new(refs: MaterializedRefs, report: FilterReport) -> FilterOutcome {
        FilterOutcome {
            created_object_refs: refs.created(),
            output_filtered_ref: refs.filtered,
            output_unpaired_fwd_ref: refs.fwd_singletons,
            output_unpaired_rev_ref: refs.rev_singletons,
            report,
        }
    }
}

impl fmt::Display for FilterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.report)?;
        if self.created_object_refs.is_empty() {
            write!(f, "No objects created: every read was filtered out")
        } else {
            write!(f, "Created objects: {}", self.created_object_refs.iter().join(", "))
        }
    }
}

/// Filter the library `params.input_reads_ref` and save the results into
/// `params.output_ws`.
pub fn exec_read_library_lc_filter<S: ReadsStore + ?Sized>(
    store: &S,
    params: &FilterParams,
) -> Result<FilterOutcome, LcError> {
    let (input_ref, threshold) = params.validate()?;
    info!(
        "filtering {} with {} threshold {}",
        input_ref, threshold.method, threshold.value
    );

    let ReadLibrary { info, reads } = store.fetch_library(&input_ref)?;
    let materializer = OutputMaterializer::new(store, &params.output_ws, &params.output_reads_name);

    let (refs, report) = match reads {
        Reads::Single(reads) => {
            let decision = FilterDecision::compute(&reads, &threshold);
            let report = FilterReport {
                input_ref,
                kind: LibraryKind::SingleEnd,
                method: threshold.method,
                threshold: threshold.value,
                input_reads: decision.len(),
                kept_reads: decision.kept(),
                discarded_reads: decision.discarded(),
                pairs: None,
            };
            let kept = decision.apply(reads);
            (materializer.materialize_single(&info, kept)?, report)
        }
        Reads::Paired(pairs) => {
            let fwd = ScoreResult::compute(threshold.method, pairs.par_iter().map(ReadPair::r1));
            let rev = ScoreResult::compute(threshold.method, pairs.par_iter().map(ReadPair::r2));
            let fwd = FilterDecision::from_scores(&fwd, &threshold);
            let rev = FilterDecision::from_scores(&rev, &threshold);
            debug!(
                "forward mates kept: {}/{}, reverse mates kept: {}/{}",
                fwd.kept(),
                fwd.len(),
                rev.kept(),
                rev.len()
            );

            let out = ReconciledOutput::reconcile(pairs, &fwd, &rev);
            let counts = PairCounts::from_reconciled(&out);
            let input_reads = 2 * counts.input_pairs;
            let report = FilterReport {
                input_ref,
                kind: LibraryKind::PairedEnd,
                method: threshold.method,
                threshold: threshold.value,
                input_reads,
                kept_reads: counts.kept_reads(),
                discarded_reads: input_reads - counts.kept_reads(),
                pairs: Some(counts),
            };
            (materializer.materialize_paired(&info, out)?, report)
        }
    };

    info!(
        "kept {} of {} reads, created {} objects",
        report.kept_reads,
        report.input_reads,
        refs.created().len()
    );
    Ok(FilterOutcome::new(refs, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{upload_reads, DirStore, UploadParams};
    use pretty_assertions::assert_eq;

    fn params(method: LcMethod, dust: Option<f64>, entropy: Option<f64>) -> FilterParams {
        FilterParams {
            input_reads_ref: "ws/pe".to_string(),
            output_ws: "ws".to_string(),
            output_reads_name: "out".to_string(),
            lc_method: method,
            lc_dust_threshold: dust,
            lc_entropy_threshold: entropy,
        }
    }

    fn setup() -> (tempfile::TempDir, DirStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path()).unwrap();
        store.create_workspace("ws").unwrap();
        let upload = UploadParams {
            fwd_file: "tests/data/pe_fwd.fastq".to_string(),
            rev_file: Some("tests/data/pe_rev.fastq".to_string()),
            interleaved: false,
            wsname: "ws".to_string(),
            name: "pe".to_string(),
            sequencing_tech: "Illumina".to_string(),
            insert_size_mean: Some(42.0),
            insert_size_std_dev: Some(10.0),
            single_genome: None,
        };
        upload_reads(&store, &upload).unwrap();
        (dir, store)
    }

    #[test]
    fn test_params_from_json() {
        let json = r#"{
            "input_reads_ref": "ws/pe/1",
            "output_ws": "ws",
            "output_reads_name": "PE_entropy_60",
            "lc_method": "entropy",
            "lc_entropy_threshold": 60
        }"#;
        let p: FilterParams = serde_json::from_str(json).unwrap();
        assert_eq!(p.lc_method, LcMethod::Entropy);
        assert_eq!(p.lc_dust_threshold, None);

        let (input, threshold) = p.validate().unwrap();
        assert_eq!(input, ObjectRef::new("ws", "pe").with_version(1));
        assert_eq!(threshold.value, 60.0);
    }

    #[test]
    fn test_invalid_params() {
        let mut p = params(LcMethod::Dust, Some(2.0), None);
        p.output_reads_name = "bad name".to_string();
        assert!(p.validate().unwrap_err().is_invalid_input());

        let mut p = params(LcMethod::Dust, Some(2.0), None);
        p.output_ws = String::new();
        assert!(p.validate().unwrap_err().is_invalid_input());

        let mut p = params(LcMethod::Dust, Some(2.0), None);
        p.input_reads_ref = "pe".to_string();
        assert!(p.validate().unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_rejected_before_fetch() {
        let (_dir, store) = setup();
        let mut p = params(LcMethod::Dust, Some(200.0), None);
        // the input does not exist, so a fetch would fail with NotFound
        p.input_reads_ref = "ws/missing".to_string();
        let err = exec_read_library_lc_filter(&store, &p).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(store.list_objects("ws").unwrap(), vec!["pe"]);
    }

    #[test]
    fn test_paired_report() {
        let (_dir, store) = setup();
        let outcome = exec_read_library_lc_filter(&store, &params(LcMethod::Dust, Some(2.0), None)).unwrap();

        let counts = outcome.report.pairs.unwrap();
        assert_eq!(
            counts,
            PairCounts {
                input_pairs: 8,
                kept_pairs: 1,
                fwd_singletons: 3,
                rev_singletons: 3,
                dropped_pairs: 1,
            }
        );
        assert_eq!(outcome.report.input_reads, 16);
        assert_eq!(outcome.report.kept_reads, 8);
        assert_eq!(outcome.report.discarded_reads, 8);
        assert_eq!(outcome.created_object_refs.len(), 3);

        let text = outcome.to_string();
        assert!(text.contains("Retained pairs: 1"));
        assert!(text.contains("ws/out_fwd_singletons/1"));
    }

    #[test]
    fn test_nothing_kept() {
        let (_dir, store) = setup();
        let outcome = exec_read_library_lc_filter(&store, &params(LcMethod::Entropy, None, Some(100.0))).unwrap();
        assert!(outcome.created_object_refs.is_empty());
        assert_eq!(outcome.output_filtered_ref, None);
        assert_eq!(outcome.report.kept_reads, 0);
        assert!(outcome.to_string().contains("No objects created"));
    }

    #[test]
    fn test_missing_input() {
        let (_dir, store) = setup();
        let mut p = params(LcMethod::Dust, Some(2.0), None);
        p.input_reads_ref = "ws/missing".to_string();
        assert!(exec_read_library_lc_filter(&store, &p).unwrap_err().is_not_found());
    }
}
