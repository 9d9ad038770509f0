//! Append-only JSONL persistence for command journals.
//! This module exists so a session can be audited, replayed, or resumed after a crash.
//! It does not apply commands; see `replay`.
//!
//! Line 1 is a header (`format_version`, `build_id`, `content_hash`, `seed`). Every
//! later line is one `InputRecord` plus `prev_sha256_hex` and `sha256_hex`, where
//! `sha256_hex = hex(SHA-256(record_json || prev_sha256_hex))`. Each append is
//! flushed before returning.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::journal::{InputJournal, InputRecord, JOURNAL_FORMAT_VERSION};
use crate::types::Command;

/// `prev_sha256_hex` of the first record.
pub const CHAIN_ROOT: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    format_version: u16,
    build_id: String,
    content_hash: u64,
    seed: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChainedRecord {
    #[serde(flatten)]
    record: InputRecord,
    prev_sha256_hex: String,
    sha256_hex: String,
}

/// Head of the hash chain and the sequence number it expects next.
#[derive(Clone, Debug)]
struct Chain {
    head: String,
    next_seq: u64,
}

impl Chain {
    fn root() -> Self {
        Self { head: CHAIN_ROOT.to_string(), next_seq: 0 }
    }

    fn link(&self, record: &InputRecord) -> serde_json::Result<String> {
        let json = serde_json::to_string(record)?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        hasher.update(self.head.as_bytes());
        Ok(format!("{:064x}", hasher.finalize()))
    }

    fn advance(&mut self, sha256_hex: String) {
        self.head = sha256_hex;
        self.next_seq += 1;
    }
}

pub struct JournalWriter {
    out: BufWriter<File>,
    chain: Chain,
}

impl JournalWriter {
    /// Creates (or truncates) `path` and writes the header line.
    pub fn create(path: &Path, seed: u64, build_id: &str, content_hash: u64) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(path)?);
        let header = Header {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: build_id.to_string(),
            content_hash,
            seed,
        };
        write_line(&mut out, &header)?;
        Ok(Self { out, chain: Chain::root() })
    }

    /// Reopens a journal for appending, continuing from a previous load.
    pub fn resume(path: &Path, last_sha256_hex: String, next_seq: u64) -> io::Result<Self> {
        let out = BufWriter::new(OpenOptions::new().append(true).open(path)?);
        Ok(Self { out, chain: Chain { head: last_sha256_hex, next_seq } })
    }

    pub fn append(&mut self, tick_boundary: u64, command: Command) -> io::Result<()> {
        let record = InputRecord { seq: self.chain.next_seq, tick_boundary, command };
        let sha256_hex = self.chain.link(&record).map_err(io::Error::other)?;
        let line = ChainedRecord {
            record,
            prev_sha256_hex: self.chain.head.clone(),
            sha256_hex: sha256_hex.clone(),
        };
        write_line(&mut self.out, &line)?;
        self.chain.advance(sha256_hex);
        Ok(())
    }

    pub fn next_seq(&self) -> u64 {
        self.chain.next_seq
    }
}

fn write_line(out: &mut BufWriter<File>, value: &impl Serialize) -> io::Result<()> {
    let json = serde_json::to_string(value).map_err(io::Error::other)?;
    writeln!(out, "{json}")?;
    out.flush()
}

/// A validated journal plus what `JournalWriter::resume` needs.
#[derive(Debug)]
pub struct LoadedJournal {
    pub journal: InputJournal,
    pub last_sha256_hex: String,
    pub next_seq: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum JournalLoadError {
    #[error("journal I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("journal file is empty")]
    EmptyFile,
    #[error("invalid journal header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },
    #[error("invalid journal record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
    /// The file does not end with a newline.
    #[error("incomplete journal line at line {line}")]
    IncompleteLine { line: usize },
    #[error("SHA-256 hash chain broken at line {line}")]
    HashChainBroken { line: usize },
}

/// Reads and verifies a journal, failing on the first bad line.
pub fn load_journal_from_file(path: &Path) -> Result<LoadedJournal, JournalLoadError> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines();
    let Some(first) = lines.next() else {
        return Err(JournalLoadError::EmptyFile);
    };
    if !content.ends_with('\n') {
        return Err(JournalLoadError::IncompleteLine { line: content.lines().count() });
    }

    let header: Header = serde_json::from_str(first)
        .map_err(|e| JournalLoadError::InvalidHeader { line: 1, message: e.to_string() })?;
    let mut journal = InputJournal {
        format_version: header.format_version,
        build_id: header.build_id,
        content_hash: header.content_hash,
        seed: header.seed,
        inputs: Vec::new(),
    };

    let mut chain = Chain::root();
    for (index, text) in lines.enumerate() {
        let record = verify_line(&mut chain, index + 2, text, journal.inputs.last())?;
        journal.inputs.push(record);
    }
    Ok(LoadedJournal { journal, last_sha256_hex: chain.head, next_seq: chain.next_seq })
}

fn verify_line(
    chain: &mut Chain,
    line: usize,
    text: &str,
    previous: Option<&InputRecord>,
) -> Result<InputRecord, JournalLoadError> {
    let invalid = |message: String| JournalLoadError::InvalidRecord { line, message };
    let parsed: ChainedRecord = serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?;
    let record = parsed.record;

    if record.seq != chain.next_seq {
        return Err(invalid(format!("expected seq {}, found {}", chain.next_seq, record.seq)));
    }
    if let Some(previous) = previous
        && record.tick_boundary < previous.tick_boundary
    {
        let (tick, before) = (record.tick_boundary, previous.tick_boundary);
        return Err(invalid(format!("tick boundary {tick} precedes {before}")));
    }
    if parsed.prev_sha256_hex != chain.head {
        return Err(JournalLoadError::HashChainBroken { line });
    }
    if parsed.sha256_hex != chain.link(&record).map_err(|e| invalid(e.to_string()))? {
        return Err(JournalLoadError::HashChainBroken { line });
    }

    chain.advance(parsed.sha256_hex);
    Ok(record)
}

#[cfg(test)]
mod tests;
