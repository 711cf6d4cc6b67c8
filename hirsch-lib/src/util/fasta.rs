use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use anyhow::{ensure, Context, Result};
use fgoxide::io::Io;
use flate2::bufread::MultiGzDecoder;
use itertools::Itertools;
use seq_io::fasta::{Reader as FastaReader, Record as FastaRecord};

use crate::util::io::is_gzip_path;

/// 128 KB default buffer size, same as pigz.
pub const BUFFER_SIZE: usize = 64 * (1 << 10) * 2;

/// A single named sequence read from a FASTA file.  The sequence is stored
/// uppercased with any line wrapping removed.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct FastaSeq {
    pub name: String,
    pub seq: Vec<u8>,
}

impl FastaSeq {
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

/// Converts the FASTA header (which may contain whitespaces) to a sequence name.
fn header_to_name(header: &[u8]) -> Result<String> {
    let header: std::borrow::Cow<str> = String::from_utf8_lossy(header);
    header
        .split_whitespace()
        .next()
        .map(std::string::ToString::to_string)
        .context("empty sequence name")
}

/// Opens the file for buffered reading, decompressing GZIP input based on the
/// file extension.
fn new_reader(file: &PathBuf) -> Result<Box<dyn BufRead + Send>> {
    if is_gzip_path(file) {
        let handle =
            File::open(file).with_context(|| format!("Could not open {}", file.display()))?;
        let decoder = MultiGzDecoder::new(BufReader::with_capacity(BUFFER_SIZE, handle));
        Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, decoder)))
    } else {
        let fg_io: Io = Io::new(5, BUFFER_SIZE);
        Ok(fg_io.new_reader(file)?)
    }
}

/// Reads all records from a FASTA file (plain or GZIP compressed).
pub fn read_fasta(file: &PathBuf) -> Result<Vec<FastaSeq>> {
    let source: FastaReader<Box<dyn BufRead + Send>> =
        FastaReader::with_capacity(new_reader(file)?, BUFFER_SIZE);

    let mut seqs = Vec::new();
    for record in source.into_records() {
        let record =
            record.with_context(|| format!("Error reading FASTA from {}", file.display()))?;
        let seq = record.seq().iter().map(u8::to_ascii_uppercase).collect_vec();
        let name = header_to_name(record.head())?;
        seqs.push(FastaSeq { name, seq });
    }

    ensure!(
        !seqs.is_empty(),
        "Found no sequences in the FASTA: {}",
        file.display()
    );

    Ok(seqs)
}
