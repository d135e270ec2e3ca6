//! Write `Read` and `ReadPair` objects to FASTQ (or FASTA) files.

use anyhow::{Context, Error};
use std::path::{Path, PathBuf};

use crate::read::Read;
use crate::read_pair::{ReadPair, WhichRead};
use crate::utils::{self, OutputStream, SeqFormat};

/// Write reads to a single sequence file. Gzip compression is selected by a
/// `.gz` filename extension. The writer must be closed with `finish()`.
pub struct ReadWriter {
    writer: OutputStream,
    path: PathBuf,
    format: SeqFormat,
    n: usize,
}

impl ReadWriter {
    pub fn new<P: AsRef<Path>>(p: P, format: SeqFormat) -> Result<ReadWriter, Error> {
        Ok(ReadWriter {
            writer: utils::write_with_gz(p.as_ref())?,
            path: p.as_ref().to_path_buf(),
            format,
            n: 0,
        })
    }

    pub fn write(&mut self, read: &Read) -> Result<(), Error> {
        let path = &self.path;
        match self.format {
            SeqFormat::Fastq => read.write_fastq(&mut self.writer),
            SeqFormat::Fasta => read.write_fasta(&mut self.writer),
        }
        .with_context(|| format!("error writing record to file: {:?}", path))?;
        self.n += 1;
        Ok(())
    }

    /// Flush and close the file, returning the number of records written.
    pub fn finish(self) -> Result<usize, Error> {
        self.writer
            .finish()
            .with_context(|| format!("error closing file: {:?}", self.path))?;
        Ok(self.n)
    }
}

/// Write `ReadPair`s to a parallel pair of files, R1 to the first and R2 to
/// the second.
pub struct ReadPairWriter {
    writers: [ReadWriter; 2],
}

impl ReadPairWriter {
    pub fn new<P: AsRef<Path>>(r1: P, r2: P, format: SeqFormat) -> Result<ReadPairWriter, Error> {
        Ok(ReadPairWriter {
            writers: [ReadWriter::new(r1, format)?, ReadWriter::new(r2, format)?],
        })
    }

    pub fn write(&mut self, rec: &ReadPair) -> Result<(), Error> {
        for (writer, which) in self.writers.iter_mut().zip(WhichRead::read_types()) {
            writer.write(rec.get(which))?;
        }
        Ok(())
    }

    /// Flush and close both files, returning the number of pairs written.
    pub fn finish(self) -> Result<usize, Error> {
        let [w1, w2] = self.writers;
        let n = w1.finish()?;
        w2.finish()?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_pair_iter::{InputFastqs, ReadPairIter};
    use file_diff::diff;

    #[test]
    fn test_rewrite_pairs_identical() {
        let dir = tempfile::tempdir().unwrap();
        let out1 = dir.path().join("r1.fastq");
        let out2 = dir.path().join("r2.fastq");

        let input = InputFastqs::paired("tests/data/pe_fwd.fastq", "tests/data/pe_rev.fastq");
        let mut writer = ReadPairWriter::new(&out1, &out2, SeqFormat::Fastq).unwrap();
        for rp in ReadPairIter::from_fastq_files(&input).unwrap() {
            writer.write(&rp.unwrap()).unwrap();
        }
        assert_eq!(writer.finish().unwrap(), 8);

        assert!(diff("tests/data/pe_fwd.fastq", out1.to_str().unwrap()));
        assert!(diff("tests/data/pe_rev.fastq", out2.to_str().unwrap()));
    }

    #[test]
    fn test_write_fasta_gz() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reads.fasta.gz");

        let mut writer = ReadWriter::new(&out, SeqFormat::Fasta).unwrap();
        writer.write(&Read::new(b"a", b"ACGT", None)).unwrap();
        writer.write(&Read::new(b"b desc", b"TTTT", Some(&b"IIII"[..]))).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let reads: Vec<Read> = crate::read_iter::ReadIter::new(&out)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(reads.len(), 2);
        assert_eq!(reads[1].header(), b"b desc");
        assert_eq!(reads[1].seq(), b"TTTT");
    }

    #[test]
    fn test_fastq_requires_quals() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ReadWriter::new(dir.path().join("x.fastq"), SeqFormat::Fastq).unwrap();
        let err = writer.write(&Read::new(b"a", b"ACGT", None)).unwrap_err();
        assert!(format!("{:#}", err).contains("no quality values"));
    }
}
