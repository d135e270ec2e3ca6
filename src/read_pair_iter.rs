// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Read a set of FASTQs, convert into an Iterator over ReadPairs.

use anyhow::{format_err, Error};
use std::path::Path;

use crate::read::Read;
use crate::read_iter::ReadIter;
use crate::read_pair::ReadPair;

/// The forward and (optional) reverse sequence files of a library.
/// A paired library is described either by `r1` and `r2`, or by a single
/// interleaved `r1` file with `r1_interleaved = true`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InputFastqs {
    pub r1: String,
    pub r2: Option<String>,
    #[serde(default)]
    pub r1_interleaved: bool,
}

impl InputFastqs {
    pub fn single(r1: impl ToString) -> InputFastqs {
        InputFastqs {
            r1: r1.to_string(),
            r2: None,
            r1_interleaved: false,
        }
    }

    pub fn paired(r1: impl ToString, r2: impl ToString) -> InputFastqs {
        InputFastqs {
            r1: r1.to_string(),
            r2: Some(r2.to_string()),
            r1_interleaved: false,
        }
    }

    pub fn interleaved(r1: impl ToString) -> InputFastqs {
        InputFastqs {
            r1: r1.to_string(),
            r2: None,
            r1_interleaved: true,
        }
    }

    pub fn is_paired(&self) -> bool {
        self.r2.is_some() || self.r1_interleaved
    }
}

/// Read mate pairs from a parallel pair of FASTQ files, or from one
/// interleaved FASTQ file. The two mates must be index-aligned: running out
/// of one mate before the other is an error.
pub struct ReadPairIter {
    r1: ReadIter,
    r2: Option<ReadIter>,
    done: bool,
}

impl ReadPairIter {
    /// Open a `ReadPairIter` given a `InputFastqs` describing a pair of
    /// files or an interleaved file.
    pub fn from_fastq_files(input_fastqs: &InputFastqs) -> Result<ReadPairIter, Error> {
        match (&input_fastqs.r2, input_fastqs.r1_interleaved) {
            (Some(r2), false) => Self::new(input_fastqs.r1.as_str(), Some(r2.as_str())),
            (None, true) => Self::new(input_fastqs.r1.as_str(), None),
            (Some(_), true) => Err(format_err!(
                "interleaved input {} cannot also have a separate R2 file",
                input_fastqs.r1
            )),
            (None, false) => Err(format_err!(
                "input {} is single-end, cannot iterate over read pairs",
                input_fastqs.r1
            )),
        }
    }

    /// For interleaved R1/R2 files, set `r2 = None`.
    pub fn new<P: AsRef<Path>>(r1: P, r2: Option<P>) -> Result<ReadPairIter, Error> {
        let r1 = ReadIter::new(r1)?;
        let r2 = match r2 {
            Some(p) => Some(ReadIter::new(p)?),
            None => None,
        };
        Ok(ReadPairIter { r1, r2, done: false })
    }

    fn get_next(&mut self) -> Result<Option<ReadPair>, Error> {
        let first = self.r1.next().transpose()?;
        let second = match self.r2 {
            Some(ref mut r2) => r2.next().transpose()?,
            // If R1 is interleaved, read another entry and store it as R2
            None => self.r1.next().transpose()?,
        };

        match (first, second) {
            (Some(r1), Some(r2)) => Ok(Some(ReadPair::new(r1, r2))),
            (None, None) => Ok(None),
            (Some(r), None) | (None, Some(r)) => Err(self.ended_early(&r)),
        }
    }

    fn ended_early(&self, unpaired: &Read) -> Error {
        match self.r2 {
            Some(ref r2) => format_err!(
                "fastq ended early: {:?} and {:?} have different numbers of reads (unpaired read {})",
                self.r1.path(),
                r2.path(),
                String::from_utf8_lossy(unpaired.id())
            ),
            None => format_err!(
                "fastq ended early: interleaved file {:?} has an odd number of reads (unpaired read {})",
                self.r1.path(),
                String::from_utf8_lossy(unpaired.id())
            ),
        }
    }
}

impl Iterator for ReadPairIter {
    type Item = Result<ReadPair, Error>;

    /// Iterate over ReadPair objects
    fn next(&mut self) -> Option<Result<ReadPair, Error>> {
        if self.done {
            return None;
        }
        match self.get_next() {
            Ok(Some(v)) => Some(Ok(v)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(v) => {
                self.done = true;
                Some(Err(v))
            }
        }
    }
}
