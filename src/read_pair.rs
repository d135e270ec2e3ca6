// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Container for the two mates of a paired-end sequencing 'cluster'.

use crate::read::Read;

/// The two mates of a paired-end read. R1 is the forward read and R2 the
/// reverse read.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum WhichRead {
    R1 = 0,
    R2 = 1,
}

impl WhichRead {
    pub fn read_types() -> [WhichRead; 2] {
        [WhichRead::R1, WhichRead::R2]
    }

    /// Suffix appended to an output name for this mate's singletons.
    pub fn singleton_suffix(self) -> &'static str {
        match self {
            WhichRead::R1 => "_fwd_singletons",
            WhichRead::R2 => "_rev_singletons",
        }
    }
}

/// Forward and reverse mate at the same index of a paired library.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Clone, Debug)]
pub struct ReadPair {
    reads: [Read; 2],
}

impl ReadPair {
    pub fn new(r1: Read, r2: Read) -> ReadPair {
        ReadPair { reads: [r1, r2] }
    }

    #[inline]
    /// Get the mate `which` of this pair
    pub fn get(&self, which: WhichRead) -> &Read {
        &self.reads[which as usize]
    }

    pub fn r1(&self) -> &Read {
        self.get(WhichRead::R1)
    }

    pub fn r2(&self) -> &Read {
        self.get(WhichRead::R2)
    }

    /// Split into `(r1, r2)`
    pub fn into_reads(self) -> (Read, Read) {
        let [r1, r2] = self.reads;
        (r1, r2)
    }

    /// Take mate `which`, dropping the other one.
    pub fn into_read(self, which: WhichRead) -> Read {
        let (r1, r2) = self.into_reads();
        match which {
            WhichRead::R1 => r1,
            WhichRead::R2 => r2,
        }
    }

    pub fn len(&self, which: WhichRead) -> usize {
        self.get(which).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> ReadPair {
        ReadPair::new(
            Read::new(b"p1/1", b"ACGT", Some(&b"IIII"[..])),
            Read::new(b"p1/2", b"TTGCA", Some(&b"IIIII"[..])),
        )
    }

    #[test]
    fn test_mates() {
        let rp = pair();
        assert_eq!(rp.r1().seq(), b"ACGT");
        assert_eq!(rp.get(WhichRead::R2).seq(), b"TTGCA");
        assert_eq!(rp.len(WhichRead::R1), 4);
        assert_eq!(rp.len(WhichRead::R2), 5);
    }

    #[test]
    fn test_into_read() {
        assert_eq!(pair().into_read(WhichRead::R1).id(), b"p1/1");
        assert_eq!(pair().into_read(WhichRead::R2).id(), b"p1/2");
    }

    #[test]
    fn test_singleton_suffix() {
        assert_eq!(WhichRead::R1.singleton_suffix(), "_fwd_singletons");
        assert_eq!(WhichRead::R2.singleton_suffix(), "_rev_singletons");
    }
}
