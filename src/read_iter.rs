// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Read a FASTQ or FASTA file, convert into an Iterator over `Read`s.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use bio::io::fasta;
use fastq::{self, RecordRefIter};

use crate::read::Read;
use crate::utils::{self, SeqFormat};

enum Records {
    Fastq(RecordRefIter<Box<dyn BufRead>>),
    Fasta(Box<dyn Iterator<Item = io::Result<fasta::Record>>>),
}

/// Iterate over the reads of a single sequence file. Plain, gzipped and
/// lz4 files are supported, FASTQ or FASTA as detected from the filename.
pub struct ReadIter {
    records: Records,
    path: PathBuf,
    n: usize,
    done: bool,
}

impl ReadIter {
    pub fn new<P: AsRef<Path>>(p: P) -> Result<ReadIter, Error> {
        let format = SeqFormat::from_path(p.as_ref());
        Self::with_format(p, format)
    }

    pub fn with_format<P: AsRef<Path>>(p: P, format: SeqFormat) -> Result<ReadIter, Error> {
        let rdr = utils::open_with_gz(p.as_ref())?;
        let records = match format {
            SeqFormat::Fastq => Records::Fastq(fastq::Parser::new(rdr).ref_iter()),
            SeqFormat::Fasta => Records::Fasta(Box::new(fasta::Reader::new(rdr).records())),
        };

        Ok(ReadIter {
            records,
            path: p.as_ref().to_path_buf(),
            n: 0,
            done: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_next(&mut self) -> Result<Option<Read>, Error> {
        let read = match self.records {
            Records::Fastq(ref mut iter) => {
                iter.advance()
                    .with_context(|| format!("error parsing FASTQ record {} of {:?}", self.n + 1, self.path))?;
                iter.get().map(|r| Read::from_record(&r))
            }
            Records::Fasta(ref mut iter) => match iter.next() {
                Some(rec) => {
                    let rec = rec.with_context(|| {
                        format!("error parsing FASTA record {} of {:?}", self.n + 1, self.path)
                    })?;
                    let head = match rec.desc() {
                        Some(desc) => format!("{} {}", rec.id(), desc),
                        None => rec.id().to_string(),
                    };
                    Some(Read::new(head.as_bytes(), rec.seq(), None))
                }
                None => None,
            },
        };

        if read.is_some() {
            self.n += 1;
        }
        Ok(read)
    }
}

impl Iterator for ReadIter {
    type Item = Result<Read, Error>;

    fn next(&mut self) -> Option<Result<Read, Error>> {
        if self.done {
            return None;
        }
        // Convert Result<Option<_>, Error> to Option<Result<_, Error>>
        match self.get_next() {
            Ok(Some(v)) => Some(Ok(v)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                // a parse error leaves the underlying parser in an unknown state
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
