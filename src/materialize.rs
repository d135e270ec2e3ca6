// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Persist the non-empty results of a filtering run as new libraries.

use crate::error::LcError;
use crate::library::{LibraryInfo, ReadLibrary};
use crate::read::Read;
use crate::read_pair::{ReadPair, WhichRead};
use crate::reconcile::ReconciledOutput;
use crate::store::{ObjectRef, ReadsStore};

/// References to the objects created for one run. `None` means the
/// corresponding partition was empty and nothing was saved.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MaterializedRefs {
    pub filtered: Option<ObjectRef>,
    pub fwd_singletons: Option<ObjectRef>,
    pub rev_singletons: Option<ObjectRef>,
}

impl MaterializedRefs {
    /// Every created object, filtered library first.
    pub fn created(&self) -> Vec<ObjectRef> {
        [&self.filtered, &self.fwd_singletons, &self.rev_singletons]
            .iter()
            .filter_map(|r| (*r).clone())
            .collect()
    }
}

/// Saves filtering results to a store under `workspace`, deriving the
/// names of singleton libraries from `name`.
pub struct OutputMaterializer<'a, S: ReadsStore + ?Sized> {
    store: &'a S,
    workspace: &'a str,
    name: &'a str,
}

impl<'a, S: ReadsStore + ?Sized> OutputMaterializer<'a, S> {
    pub fn new(store: &'a S, workspace: &'a str, name: &'a str) -> Self {
        OutputMaterializer { store, workspace, name }
    }

    /// Name of the library holding the singletons of one side.
    pub fn singleton_name(&self, which: WhichRead) -> String {
        format!("{}{}", self.name, which.singleton_suffix())
    }

    /// Save the reads kept from a single-end library.
    pub fn materialize_single(&self, info: &LibraryInfo, kept: Vec<Read>) -> Result<MaterializedRefs, LcError> {
        let filtered = self.save_reads(self.name, info, kept)?;
        Ok(MaterializedRefs {
            filtered,
            ..MaterializedRefs::default()
        })
    }

    /// Save the pairs and the singletons of each side. Singleton libraries
    /// are single-end and lose the insert size of the input.
    pub fn materialize_paired(&self, info: &LibraryInfo, out: ReconciledOutput) -> Result<MaterializedRefs, LcError> {
        let filtered = self.save_pairs(info, out.pairs)?;

        let se_info = info.to_single_end();
        let fwd_singletons = self.save_reads(&self.singleton_name(WhichRead::R1), &se_info, out.fwd_singletons)?;
        let rev_singletons = self.save_reads(&self.singleton_name(WhichRead::R2), &se_info, out.rev_singletons)?;

        Ok(MaterializedRefs {
            filtered,
            fwd_singletons,
            rev_singletons,
        })
    }

    fn save_reads(&self, name: &str, info: &LibraryInfo, reads: Vec<Read>) -> Result<Option<ObjectRef>, LcError> {
        if reads.is_empty() {
            debug!("no reads for {}, not saving", name);
            return Ok(None);
        }
        let library = ReadLibrary::single(info.clone(), reads);
        self.store.save_library(self.workspace, name, &library).map(Some)
    }

    fn save_pairs(&self, info: &LibraryInfo, pairs: Vec<ReadPair>) -> Result<Option<ObjectRef>, LcError> {
        if pairs.is_empty() {
            debug!("no pairs for {}, not saving", self.name);
            return Ok(None);
        }
        let library = ReadLibrary::paired(info.clone(), pairs);
        self.store.save_library(self.workspace, self.name, &library).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::LibraryKind;
    use crate::store::StoredObject;
    use std::cell::RefCell;

    /// Store that remembers what it was asked to save.
    #[derive(Default)]
    struct RecordingStore {
        saved: RefCell<Vec<(String, ReadLibrary)>>,
    }

    impl ReadsStore for RecordingStore {
        fn fetch_library(&self, obj: &ObjectRef) -> Result<ReadLibrary, LcError> {
            Err(LcError::not_found(&obj.workspace, &obj.name))
        }

        fn save_library(&self, workspace: &str, name: &str, library: &ReadLibrary) -> Result<ObjectRef, LcError> {
            self.saved.borrow_mut().push((name.to_string(), library.clone()));
            Ok(ObjectRef::new(workspace, name).with_version(1))
        }

        fn library_info(&self, obj: &ObjectRef) -> Result<StoredObject, LcError> {
            Err(LcError::not_found(&obj.workspace, &obj.name))
        }
    }

    fn read(id: &str) -> Read {
        Read::new(id.as_bytes(), b"ACGTACGT", Some(&b"IIIIIIII"[..]))
    }

    fn pe_info() -> LibraryInfo {
        LibraryInfo {
            insert_size_mean: Some(42.0),
            insert_size_std_dev: Some(10.0),
            ..LibraryInfo::new("Illumina")
        }
    }

    #[test]
    fn test_paired_outputs() {
        let store = RecordingStore::default();
        let m = OutputMaterializer::new(&store, "ws", "PE_dust_2");
        let out = ReconciledOutput {
            pairs: vec![ReadPair::new(read("p1/1"), read("p1/2"))],
            fwd_singletons: vec![read("p2/1"), read("p3/1")],
            rev_singletons: vec![read("p4/2")],
            dropped_pairs: 1,
        };

        let refs = m.materialize_paired(&pe_info(), out).unwrap();
        assert_eq!(refs.filtered, Some(ObjectRef::new("ws", "PE_dust_2").with_version(1)));
        assert_eq!(refs.created().len(), 3);

        let saved = store.saved.borrow();
        let names: Vec<&str> = saved.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["PE_dust_2", "PE_dust_2_fwd_singletons", "PE_dust_2_rev_singletons"]);

        let (_, pairs) = &saved[0];
        assert_eq!(pairs.kind(), LibraryKind::PairedEnd);
        assert_eq!(pairs.read_count(), 2);
        assert_eq!(pairs.info.insert_size_mean, Some(42.0));

        let (_, fwd) = &saved[1];
        assert_eq!(fwd.kind(), LibraryKind::SingleEnd);
        assert_eq!(fwd.read_count(), 2);
        assert_eq!(fwd.info.insert_size_mean, None);
        assert_eq!(fwd.info.sequencing_tech, "Illumina");
    }

    #[test]
    fn test_empty_partitions_not_saved() {
        let store = RecordingStore::default();
        let m = OutputMaterializer::new(&store, "ws", "PE_dust_0");
        let out = ReconciledOutput {
            fwd_singletons: vec![read("p6/1")],
            dropped_pairs: 7,
            ..ReconciledOutput::default()
        };

        let refs = m.materialize_paired(&pe_info(), out).unwrap();
        assert_eq!(refs.filtered, None);
        assert_eq!(refs.rev_singletons, None);
        assert_eq!(refs.created(), vec![ObjectRef::new("ws", "PE_dust_0_fwd_singletons").with_version(1)]);
        assert_eq!(store.saved.borrow().len(), 1);
    }

    #[test]
    fn test_single() {
        let store = RecordingStore::default();
        let m = OutputMaterializer::new(&store, "ws", "SE_dust_2");

        let refs = m.materialize_single(&LibraryInfo::new("Illumina"), vec![]).unwrap();
        assert!(refs.created().is_empty());
        assert!(store.saved.borrow().is_empty());

        let refs = m
            .materialize_single(&LibraryInfo::new("Illumina"), vec![read("r1"), read("r2")])
            .unwrap();
        assert_eq!(refs.created().len(), 1);
        assert_eq!(store.saved.borrow()[0].1.read_count(), 2);
    }
}
