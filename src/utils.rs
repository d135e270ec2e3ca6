// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Utility methods.

use std::boxed::Box;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Error};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

const GZ_BUF_SIZE: usize = 1 << 22;

/// Open a (possibly gzipped or lz4 compressed) file into a BufReader.
/// Compression is detected from the filename extension.
pub fn open_with_gz<P: AsRef<Path>>(p: P) -> Result<Box<dyn BufRead>, Error> {
    let p = p.as_ref();
    let r = File::open(p).with_context(|| format!("couldn't open file {:?}", p))?;

    let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");

    if ext == "gz" {
        let gz = MultiGzDecoder::new(r);
        let buf_reader = BufReader::with_capacity(GZ_BUF_SIZE, gz);
        Ok(Box::new(buf_reader))
    } else if ext == "lz4" {
        let lz = lz4::Decoder::new(r)?;
        let buf_reader = BufReader::with_capacity(GZ_BUF_SIZE, lz);
        Ok(Box::new(buf_reader))
    } else {
        let buf_reader = BufReader::with_capacity(32 * 1024, r);
        Ok(Box::new(buf_reader))
    }
}

/// Sequence file formats understood by the readers and writers.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeqFormat {
    Fastq,
    Fasta,
}

impl SeqFormat {
    /// Guess the format from a filename, looking through a trailing
    /// `.gz` or `.lz4`. Anything that is not recognizably FASTA is
    /// treated as FASTQ.
    pub fn from_path(p: impl AsRef<Path>) -> SeqFormat {
        let name = p
            .as_ref()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let name = name
            .strip_suffix(".gz")
            .or_else(|| name.strip_suffix(".lz4"))
            .unwrap_or(&name);

        if [".fa", ".fasta", ".fna"].iter().any(|ext| name.ends_with(ext)) {
            SeqFormat::Fasta
        } else {
            SeqFormat::Fastq
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SeqFormat::Fastq => "fastq",
            SeqFormat::Fasta => "fasta",
        }
    }
}

/// A plain or gzipped output file. Must be closed with `finish()`:
/// dropping it without finishing may lose buffered data silently.
pub enum OutputStream {
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>),
}

impl OutputStream {
    pub fn finish(self) -> io::Result<()> {
        match self {
            OutputStream::Plain(mut w) => w.flush(),
            OutputStream::Gz(gz) => gz.finish()?.flush(),
        }
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputStream::Plain(w) => w.write(buf),
            OutputStream::Gz(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputStream::Plain(w) => w.flush(),
            OutputStream::Gz(w) => w.flush(),
        }
    }
}

/// Create a file for writing, gzip-compressed if the filename ends in `.gz`.
pub fn write_with_gz<P: AsRef<Path>>(p: P) -> Result<OutputStream, Error> {
    let p = p.as_ref();
    let f = File::create(p).with_context(|| format!("couldn't create file {:?}", p))?;
    let writer = BufWriter::new(f);

    if p.extension().map_or(false, |e| e == "gz") {
        Ok(OutputStream::Gz(GzEncoder::new(writer, Compression::default())))
    } else {
        Ok(OutputStream::Plain(writer))
    }
}

/// Serialize object `obj` of type `T` as JSON to the file `filename`
pub fn write_json<T: Serialize, P: AsRef<Path>>(obj: &T, filename: P) -> Result<(), Error> {
    let filename = filename.as_ref();
    let f = File::create(filename).with_context(|| format!("couldn't create file {:?}", filename))?;
    let mut writer = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut writer, obj)?;
    writer.flush()?;
    Ok(())
}

/// Deserialize a JSON object of type `T` from the file `filename`
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(filename: P) -> Result<T, Error> {
    let filename = filename.as_ref();
    let f = File::open(filename).with_context(|| format!("couldn't open file {:?}", filename))?;
    let obj = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("couldn't parse JSON from {:?}", filename))?;
    Ok(obj)
}
