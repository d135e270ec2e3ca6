// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! A reads library: metadata plus the single-end reads or paired-end
//! mates that make it up.

use anyhow::Error;

use crate::read::Read;
use crate::read_iter::ReadIter;
use crate::read_pair::ReadPair;
use crate::read_pair_iter::{InputFastqs, ReadPairIter};

/// Library-level metadata carried along from the input to the filtered
/// outputs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct LibraryInfo {
    pub sequencing_tech: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_size_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_size_std_dev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_genome: Option<bool>,
}

impl LibraryInfo {
    pub fn new(sequencing_tech: impl ToString) -> LibraryInfo {
        LibraryInfo {
            sequencing_tech: sequencing_tech.to_string(),
            ..LibraryInfo::default()
        }
    }

    /// Metadata for a single-end library derived from this one. Insert size
    /// is a property of mate pairs and is not carried over.
    pub fn to_single_end(&self) -> LibraryInfo {
        LibraryInfo {
            insert_size_mean: None,
            insert_size_std_dev: None,
            ..self.clone()
        }
    }
}

/// Whether a library holds single reads or mate pairs.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LibraryKind {
    SingleEnd,
    PairedEnd,
}

/// The reads of a library, in file order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Reads {
    Single(Vec<Read>),
    Paired(Vec<ReadPair>),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReadLibrary {
    pub info: LibraryInfo,
    pub reads: Reads,
}

impl ReadLibrary {
    pub fn single(info: LibraryInfo, reads: Vec<Read>) -> ReadLibrary {
        ReadLibrary {
            info,
            reads: Reads::Single(reads),
        }
    }

    pub fn paired(info: LibraryInfo, pairs: Vec<ReadPair>) -> ReadLibrary {
        ReadLibrary {
            info,
            reads: Reads::Paired(pairs),
        }
    }

    /// Load a library from sequence files. Paired-end input (two files or
    /// one interleaved file) must have the same number of forward and
    /// reverse reads.
    pub fn from_fastq_files(input: &InputFastqs, info: LibraryInfo) -> Result<ReadLibrary, Error> {
        if input.is_paired() {
            let pairs = ReadPairIter::from_fastq_files(input)?.collect::<Result<Vec<_>, _>>()?;
            Ok(ReadLibrary::paired(info, pairs))
        } else {
            let reads = ReadIter::new(&input.r1)?.collect::<Result<Vec<_>, _>>()?;
            Ok(ReadLibrary::single(info, reads))
        }
    }

    pub fn kind(&self) -> LibraryKind {
        match self.reads {
            Reads::Single(_) => LibraryKind::SingleEnd,
            Reads::Paired(_) => LibraryKind::PairedEnd,
        }
    }

    pub fn is_paired(&self) -> bool {
        self.kind() == LibraryKind::PairedEnd
    }

    /// Number of reads, counting both mates of a pair.
    pub fn read_count(&self) -> usize {
        match self.reads {
            Reads::Single(ref reads) => reads.len(),
            Reads::Paired(ref pairs) => 2 * pairs.len(),
        }
    }

    /// Number of single reads, or of pairs.
    pub fn len(&self) -> usize {
        match self.reads {
            Reads::Single(ref reads) => reads.len(),
            Reads::Paired(ref pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if every read carries quality values.
    pub fn has_quals(&self) -> bool {
        match self.reads {
            Reads::Single(ref reads) => reads.iter().all(Read::has_qual),
            Reads::Paired(ref pairs) => pairs.iter().all(|p| p.r1().has_qual() && p.r2().has_qual()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_count() {
        let info = LibraryInfo::new("Illumina");
        let se = ReadLibrary::from_fastq_files(&InputFastqs::single("tests/data/pe_fwd.fastq"), info.clone()).unwrap();
        assert_eq!(se.kind(), LibraryKind::SingleEnd);
        assert_eq!(se.read_count(), 8);

        let pe = ReadLibrary::from_fastq_files(
            &InputFastqs::paired("tests/data/pe_fwd.fastq", "tests/data/pe_rev.fastq"),
            info,
        )
        .unwrap();
        assert!(pe.is_paired());
        assert_eq!(pe.len(), 8);
        assert_eq!(pe.read_count(), 16);
        assert!(pe.has_quals());
    }

    #[test]
    fn test_single_end_info_drops_insert_size() {
        let info = LibraryInfo {
            sequencing_tech: "Illumina".to_string(),
            insert_size_mean: Some(42.0),
            insert_size_std_dev: Some(10.0),
            single_genome: Some(true),
        };
        let se = info.to_single_end();
        assert_eq!(se.sequencing_tech, "Illumina");
        assert_eq!(se.insert_size_mean, None);
        assert_eq!(se.insert_size_std_dev, None);
        assert_eq!(se.single_genome, Some(true));

        let json = serde_json::to_string(&se).unwrap();
        assert!(!json.contains("insert_size_mean"));
    }
}
