// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Persistence of reads libraries.
//!
//! `ReadsStore` is the seam between the filtering pipeline and wherever
//! libraries live. `DirStore` keeps them on disk, one directory per
//! workspace and one sub-directory per object:
//!
//! ```text
//! {root}/{workspace}/{name}/object.json
//! {root}/{workspace}/{name}/reads.fastq.gz            (single-end)
//! {root}/{workspace}/{name}/reads_1.fastq.gz          (paired-end)
//! {root}/{workspace}/{name}/reads_2.fastq.gz
//! ```
//!
//! Libraries without quality values are stored as FASTA.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::LcError;
use crate::library::{LibraryInfo, LibraryKind, ReadLibrary, Reads};
use crate::read_iter::ReadIter;
use crate::read_pair_iter::{InputFastqs, ReadPairIter};
use crate::read_pair_writer::{ReadPairWriter, ReadWriter};
use crate::utils::{self, SeqFormat};

const OBJECT_FILE: &str = "object.json";

lazy_static! {
    static ref OBJECT_NAME: Regex = Regex::new(r"^[A-Za-z0-9|._-]+$").unwrap();
    static ref NUMERIC: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

/// True if `name` can be used as an object or workspace name: letters,
/// digits and `|._-`, not starting with `.` and not a bare number (those
/// are reserved for ids).
pub fn is_valid_name(name: &str) -> bool {
    OBJECT_NAME.is_match(name) && !NUMERIC.is_match(name) && !name.starts_with('.')
}

/// Reference to a stored object, written `workspace/name` or
/// `workspace/name/version`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub workspace: String,
    pub name: String,
    pub version: Option<u32>,
}

impl ObjectRef {
    pub fn new(workspace: impl ToString, name: impl ToString) -> ObjectRef {
        ObjectRef {
            workspace: workspace.to_string(),
            name: name.to_string(),
            version: None,
        }
    }

    pub fn with_version(self, version: u32) -> ObjectRef {
        ObjectRef {
            version: Some(version),
            ..self
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.workspace, self.name)?;
        if let Some(v) = self.version {
            write!(f, "/{}", v)?;
        }
        Ok(())
    }
}

impl FromStr for ObjectRef {
    type Err = LcError;

    fn from_str(s: &str) -> Result<ObjectRef, LcError> {
        let bad = || LcError::invalid(format!("Invalid object reference: {:?}", s));
        let parts: Vec<&str> = s.split('/').collect();

        let (workspace, name, version) = match parts.as_slice() {
            [ws, name] => (*ws, *name, None),
            [ws, name, ver] => (*ws, *name, Some(ver.parse::<u32>().map_err(|_| bad())?)),
            _ => return Err(bad()),
        };

        if !is_valid_name(workspace) || !is_valid_name(name) {
            return Err(bad());
        }

        Ok(ObjectRef {
            workspace: workspace.to_string(),
            name: name.to_string(),
            version,
        })
    }
}

/// Metadata of a stored library, readable without loading its reads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StoredObject {
    pub workspace: String,
    pub name: String,
    pub version: u32,
    pub kind: LibraryKind,
    pub info: LibraryInfo,
    pub read_count: usize,
    pub format: SeqFormat,
    /// Sequence files, relative to the object directory. One for single-end
    /// libraries, forward then reverse for paired-end ones.
    pub files: Vec<String>,
}

impl StoredObject {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(&self.workspace, &self.name).with_version(self.version)
    }
}

/// Where reads libraries are fetched from and saved to.
pub trait ReadsStore {
    /// Load a library with all its reads.
    fn fetch_library(&self, obj: &ObjectRef) -> Result<ReadLibrary, LcError>;

    /// Save `library` as `workspace/name`, replacing an existing object of
    /// that name with a new version.
    fn save_library(&self, workspace: &str, name: &str, library: &ReadLibrary) -> Result<ObjectRef, LcError>;

    /// Metadata and read count of a stored library.
    fn library_info(&self, obj: &ObjectRef) -> Result<StoredObject, LcError>;
}

/// A `ReadsStore` backed by a directory tree.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Use `root` as the store directory, creating it if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<DirStore, LcError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(DirStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn create_workspace(&self, workspace: &str) -> Result<PathBuf, LcError> {
        if !is_valid_name(workspace) {
            return Err(LcError::invalid(format!("Invalid workspace name: {:?}", workspace)));
        }
        let path = self.root.join(workspace);
        fs::create_dir_all(&path)?;
        debug!("created workspace {:?}", path);
        Ok(path)
    }

    /// Remove a workspace and every object in it.
    pub fn delete_workspace(&self, workspace: &str) -> Result<(), LcError> {
        let path = self.workspace_dir(workspace)?;
        fs::remove_dir_all(&path)?;
        debug!("deleted workspace {:?}", path);
        Ok(())
    }

    /// Names of the objects in `workspace`, sorted.
    pub fn list_objects(&self, workspace: &str) -> Result<Vec<String>, LcError> {
        let ws_dir = self.workspace_dir(workspace)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&ws_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // skips saves in progress
            if is_valid_name(&name) && entry.path().join(OBJECT_FILE).is_file() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn workspace_dir(&self, workspace: &str) -> Result<PathBuf, LcError> {
        let path = self.root.join(workspace);
        if is_valid_name(workspace) && path.is_dir() {
            Ok(path)
        } else {
            Err(LcError::workspace_not_found(workspace))
        }
    }

    fn object_dir(&self, obj: &ObjectRef) -> Result<PathBuf, LcError> {
        let not_found = || LcError::not_found(&obj.workspace, &obj.name);
        if !is_valid_name(&obj.name) {
            return Err(not_found());
        }
        let ws_dir = self.workspace_dir(&obj.workspace).map_err(|_| not_found())?;
        let dir = ws_dir.join(&obj.name);
        if dir.join(OBJECT_FILE).is_file() {
            Ok(dir)
        } else {
            Err(not_found())
        }
    }

    fn read_object(&self, obj: &ObjectRef) -> Result<(PathBuf, StoredObject), LcError> {
        let dir = self.object_dir(obj)?;
        let stored: StoredObject = utils::read_json(dir.join(OBJECT_FILE))?;
        match obj.version {
            Some(v) if v != stored.version => Err(LcError::not_found(&obj.workspace, format!("{}/{}", obj.name, v))),
            _ => Ok((dir, stored)),
        }
    }
}

/// Write the sequence files of `library` into `dir`, returning the file
/// names and the format used.
fn write_reads(dir: &Path, library: &ReadLibrary) -> Result<(Vec<String>, SeqFormat), anyhow::Error> {
    let format = if library.has_quals() {
        SeqFormat::Fastq
    } else {
        SeqFormat::Fasta
    };
    let ext = format.extension();

    let files = match library.reads {
        Reads::Single(ref reads) => {
            let f = format!("reads.{}.gz", ext);
            let mut w = ReadWriter::new(dir.join(&f), format)?;
            for r in reads {
                w.write(r)?;
            }
            w.finish()?;
            vec![f]
        }
        Reads::Paired(ref pairs) => {
            let f1 = format!("reads_1.{}.gz", ext);
            let f2 = format!("reads_2.{}.gz", ext);
            let mut w = ReadPairWriter::new(dir.join(&f1), dir.join(&f2), format)?;
            for p in pairs {
                w.write(p)?;
            }
            w.finish()?;
            vec![f1, f2]
        }
    };
    Ok((files, format))
}

impl ReadsStore for DirStore {
    fn fetch_library(&self, obj: &ObjectRef) -> Result<ReadLibrary, LcError> {
        let (dir, stored) = self.read_object(obj)?;
        let paths: Vec<PathBuf> = stored.files.iter().map(|f| dir.join(f)).collect();

        let library = match (stored.kind, paths.as_slice()) {
            (LibraryKind::SingleEnd, [p]) => {
                let reads = ReadIter::with_format(p, stored.format)?.collect::<Result<Vec<_>, _>>()?;
                ReadLibrary::single(stored.info, reads)
            }
            (LibraryKind::PairedEnd, [p1, p2]) => {
                let pairs = ReadPairIter::new(p1, Some(p2))?.collect::<Result<Vec<_>, _>>()?;
                ReadLibrary::paired(stored.info, pairs)
            }
            _ => {
                return Err(anyhow::format_err!(
                    "object {} lists {} files for a {:?} library",
                    obj,
                    paths.len(),
                    stored.kind
                )
                .into())
            }
        };

        debug!("fetched {} ({} reads)", obj, library.read_count());
        Ok(library)
    }

    fn save_library(&self, workspace: &str, name: &str, library: &ReadLibrary) -> Result<ObjectRef, LcError> {
        if !is_valid_name(name) {
            return Err(LcError::invalid(format!("Invalid object name: {:?}", name)));
        }
        let ws_dir = self
            .workspace_dir(workspace)
            .map_err(|_| LcError::not_found(workspace, name))?;
        let dest = ws_dir.join(name);

        let previous = dest.join(OBJECT_FILE);
        let version = if previous.is_file() {
            let old: StoredObject = utils::read_json(&previous)?;
            old.version + 1
        } else {
            1
        };

        // the temp dir is removed on drop unless it was renamed into place
        let tmp = tempfile::Builder::new()
            .prefix(".saving-")
            .tempdir_in(&ws_dir)?;
        let (files, format) = write_reads(tmp.path(), library)?;

        let stored = StoredObject {
            workspace: workspace.to_string(),
            name: name.to_string(),
            version,
            kind: library.kind(),
            info: library.info.clone(),
            read_count: library.read_count(),
            format,
            files,
        };
        utils::write_json(&stored, tmp.path().join(OBJECT_FILE))?;

        if dest.exists() {
            fs::remove_dir_all(&dest).with_context(|| format!("couldn't replace {:?}", dest))?;
        }
        fs::rename(tmp.path(), &dest).with_context(|| format!("couldn't move object into {:?}", dest))?;

        info!(
            "saved {}/{} version {} ({} reads)",
            workspace, name, version, stored.read_count
        );
        Ok(stored.object_ref())
    }

    fn library_info(&self, obj: &ObjectRef) -> Result<StoredObject, LcError> {
        Ok(self.read_object(obj)?.1)
    }
}

/// Upload request for a library of FASTQ or FASTA files.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UploadParams {
    pub fwd_file: String,
    #[serde(default)]
    pub rev_file: Option<String>,
    /// `fwd_file` holds both mates, alternating forward and reverse.
    #[serde(default)]
    pub interleaved: bool,
    pub wsname: String,
    pub name: String,
    pub sequencing_tech: String,
    #[serde(default)]
    pub insert_size_mean: Option<f64>,
    #[serde(default)]
    pub insert_size_std_dev: Option<f64>,
    #[serde(default)]
    pub single_genome: Option<bool>,
}

impl UploadParams {
    fn input_fastqs(&self) -> Result<InputFastqs, LcError> {
        match (&self.rev_file, self.interleaved) {
            (None, false) => Ok(InputFastqs::single(&self.fwd_file)),
            (None, true) => Ok(InputFastqs::interleaved(&self.fwd_file)),
            (Some(rev), false) => Ok(InputFastqs::paired(&self.fwd_file, rev)),
            (Some(_), true) => Err(LcError::invalid(
                "An interleaved upload cannot also have a reverse file",
            )),
        }
    }
}

/// Read sequence files from disk and save them as a new library.
pub fn upload_reads<S: ReadsStore + ?Sized>(store: &S, params: &UploadParams) -> Result<ObjectRef, LcError> {
    let input = params.input_fastqs()?;
    let info = LibraryInfo {
        sequencing_tech: params.sequencing_tech.clone(),
        insert_size_mean: params.insert_size_mean,
        insert_size_std_dev: params.insert_size_std_dev,
        single_genome: params.single_genome,
    };
    let library = ReadLibrary::from_fastq_files(&input, info)?;
    store.save_library(&params.wsname, &params.name, &library)
}
