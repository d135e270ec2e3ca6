// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Container for a single sequencing read: header, bases and optional
//! quality values, packed into one buffer.

use anyhow::Error;
use fastq::{OwnedRecord, Record};
use std::fmt;
use std::io::Write;

/// Pointers into a buffer that identify the positions of lines from a FASTQ record
/// header exists at buf[0 .. head], seq exists at buf[head .. seq], etc.
#[derive(Deserialize, Serialize, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
struct ReadOffset {
    head: u32,
    seq: u32,
    qual: u32,
    has_qual: bool,
}

/// Components of a FASTQ record.
#[derive(Debug, Copy, Clone)]
pub enum ReadPart {
    Header,
    Seq,
    Qual,
}

/// One read from a library. Immutable once built; created by the
/// read iterators or by `Read::new`.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct Read {
    offsets: ReadOffset,

    // Single vector with all the raw record data
    data: Vec<u8>,
}

impl Read {
    /// Build a read from its header line (without the leading `@`/`>`),
    /// its bases and, for FASTQ data, its quality string. Panics if the
    /// quality string is present with a length different from the sequence.
    pub fn new(head: &[u8], seq: &[u8], qual: Option<&[u8]>) -> Read {
        if let Some(q) = qual {
            assert_eq!(
                q.len(),
                seq.len(),
                "quality length does not match sequence length"
            );
        }

        let mut data = Vec::with_capacity(head.len() + 2 * seq.len());
        data.extend_from_slice(head);
        let h = data.len() as u32;
        data.extend_from_slice(seq);
        let s = data.len() as u32;
        if let Some(q) = qual {
            data.extend_from_slice(q);
        }
        let offsets = ReadOffset {
            head: h,
            seq: s,
            qual: data.len() as u32,
            has_qual: qual.is_some(),
        };
        Read { offsets, data }
    }

    /// Convert a parsed FASTQ record.
    pub fn from_record<R: Record>(rec: &R) -> Read {
        Read::new(rec.head(), rec.seq(), Some(rec.qual()))
    }

    #[inline]
    /// Get a ReadPart `part` from this read. `Qual` is `None` for reads
    /// without quality values.
    pub fn get(&self, part: ReadPart) -> Option<&[u8]> {
        let w = self.offsets;
        match part {
            ReadPart::Header => Some(&self.data[..w.head as usize]),
            ReadPart::Seq => Some(&self.data[w.head as usize..w.seq as usize]),
            ReadPart::Qual if w.has_qual => Some(&self.data[w.seq as usize..w.qual as usize]),
            ReadPart::Qual => None,
        }
    }

    /// Full header line
    pub fn header(&self) -> &[u8] {
        &self.data[..self.offsets.head as usize]
    }

    /// Read identifier: the header up to the first whitespace.
    pub fn id(&self) -> &[u8] {
        let head = self.header();
        let end = head
            .iter()
            .position(|c| c.is_ascii_whitespace())
            .unwrap_or(head.len());
        &head[..end]
    }

    pub fn seq(&self) -> &[u8] {
        &self.data[self.offsets.head as usize..self.offsets.seq as usize]
    }

    pub fn qual(&self) -> Option<&[u8]> {
        self.get(ReadPart::Qual)
    }

    pub fn has_qual(&self) -> bool {
        self.offsets.has_qual
    }

    pub fn len(&self) -> usize {
        (self.offsets.seq - self.offsets.head) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write this read as a 4-line FASTQ record.
    pub fn write_fastq<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        let qual = match self.qual() {
            Some(q) => q,
            None => anyhow::bail!(
                "read {} has no quality values and cannot be written as FASTQ",
                String::from_utf8_lossy(self.id())
            ),
        };
        w.write_all(b"@")?;
        w.write_all(self.header())?;
        w.write_all(b"\n")?;
        w.write_all(self.seq())?;
        w.write_all(b"\n+\n")?;
        w.write_all(qual)?;
        w.write_all(b"\n")?;
        Ok(())
    }

    /// Write this read as a 2-line FASTA record, dropping qualities.
    pub fn write_fasta<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        w.write_all(b">")?;
        w.write_all(self.header())?;
        w.write_all(b"\n")?;
        w.write_all(self.seq())?;
        w.write_all(b"\n")?;
        Ok(())
    }

    pub fn to_owned_record(&self) -> OwnedRecord {
        OwnedRecord {
            head: self.header().to_vec(),
            seq: self.seq().to_vec(),
            sep: None,
            qual: self.qual().map(|q| q.to_vec()).unwrap_or_default(),
        }
    }
}

impl fmt::Debug for Read {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Read {{ id: {}, seq: {} }}",
            String::from_utf8_lossy(self.id()),
            String::from_utf8_lossy(self.seq())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parts() {
        let read = Read::new(b"read1/1 extra", b"ACGTN", Some(&b"IIII#"[..]));
        assert_eq!(read.header(), b"read1/1 extra");
        assert_eq!(read.id(), b"read1/1");
        assert_eq!(read.seq(), b"ACGTN");
        assert_eq!(read.qual(), Some(&b"IIII#"[..]));
        assert_eq!(read.get(ReadPart::Seq), Some(&b"ACGTN"[..]));
        assert_eq!(read.len(), 5);
    }

    #[test]
    fn test_no_qual() {
        let read = Read::new(b"r", b"ACGT", None);
        assert!(!read.has_qual());
        assert_eq!(read.get(ReadPart::Qual), None);
        assert!(read.write_fastq(&mut Vec::new()).is_err());

        let mut buf = Vec::new();
        read.write_fasta(&mut buf).unwrap();
        assert_eq!(buf, b">r\nACGT\n");
    }

    #[test]
    fn test_write_fastq() {
        let read = Read::new(b"read7/2", b"GGA", Some(&b"FFI"[..]));
        let mut buf = Vec::new();
        read.write_fastq(&mut buf).unwrap();
        assert_eq!(buf, b"@read7/2\nGGA\n+\nFFI\n");
    }

    #[test]
    #[should_panic]
    fn test_qual_length_mismatch() {
        let _ = Read::new(b"r", b"ACGT", Some(&b"II"[..]));
    }

    proptest! {
        #[test]
        fn prop_test_parts(
            ref head in "[!-~]{1,40}",
            ref seq in "[ACGTN]{0,300}",
        ) {
            let qual = vec![b'I'; seq.len()];
            let read = Read::new(head.as_bytes(), seq.as_bytes(), Some(&qual[..]));
            prop_assert_eq!(read.header(), head.as_bytes());
            prop_assert_eq!(read.seq(), seq.as_bytes());
            prop_assert_eq!(read.qual(), Some(&qual[..]));
            prop_assert_eq!(read.to_owned_record().seq, seq.as_bytes().to_vec());
        }
    }
}
