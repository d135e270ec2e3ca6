// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Filter sequencing read libraries by low-complexity score.
//!
//! Reads are scored with the PRINSEQ DUST or entropy method
//! (see [`complexity`]), reads failing the threshold are discarded, and the
//! mates of paired-end libraries are split into retained pairs and
//! forward/reverse singletons. Each non-empty result is saved as a new
//! library in a [`ReadsStore`].

#[macro_use]
extern crate serde_derive;

#[macro_use]
extern crate log;

pub mod error;
pub mod read;
pub mod read_pair;
pub mod library;

pub mod read_iter;
pub mod read_pair_iter;
pub mod read_pair_writer;
pub mod utils;

pub mod complexity;
pub mod filter;
pub mod reconcile;
pub mod threshold;

pub mod lc_filter;
pub mod materialize;
pub mod store;

pub use crate::complexity::{ComplexityScorer, Dust, Entropy, ScoreResult};
pub use crate::error::LcError;
pub use crate::filter::FilterDecision;
pub use crate::lc_filter::{exec_read_library_lc_filter, FilterOutcome, FilterParams, FilterReport};
pub use crate::library::{LibraryInfo, ReadLibrary};
pub use crate::read::Read;
pub use crate::read_pair::{ReadPair, WhichRead};
pub use crate::read_pair_iter::InputFastqs;
pub use crate::reconcile::ReconciledOutput;
pub use crate::store::{upload_reads, DirStore, ObjectRef, ReadsStore, UploadParams};
pub use crate::threshold::{LcMethod, LcThreshold};
