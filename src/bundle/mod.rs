//! Bundle format: the portable memory snapshot
//!
//! A bundle is the self-describing, write-once serialization of a counter
//! memory plus the index of ingested files. It stores no address table at
//! all: addresses are re-derived from the recorded seed and strategy
//! identifier, so a bundle carries only the seed, dimensions, the packed
//! counter blob, and per-file lists of encoded chunk keys.
//!
//! Two physical encodings round-trip the same logical fields: pretty JSON
//! for a portable, inspectable artifact, and bincode for a compact binary
//! one. File records live in a `BTreeMap` so JSON output is stable across
//! runs.

pub mod pack;
pub mod reader;
pub mod rle;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::address::STRATEGY_CHACHA8_INDEX;
use crate::error::{SdmError, SdmResult};
use crate::memory::TieBreak;

/// Current bundle format version.
pub const BUNDLE_VERSION: u32 = 1;

/// Index entry for one ingested payload.
///
/// Created once at ingestion and immutable afterwards; reconstruction
/// walks `chunk_keys` in order and truncates to `bit_len`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Base64-framed RLE key per chunk, in payload order.
    pub chunk_keys: Vec<String>,
    /// Exact payload length in bits, before chunk padding.
    pub bit_len: usize,
}

impl FileRecord {
    /// Payload size in whole bytes.
    pub fn byte_len(&self) -> usize {
        self.bit_len / 8
    }
}

/// Serialized snapshot of a counter memory and its file index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bundle {
    /// Format version; readers reject versions they do not know.
    pub version: u32,
    /// Address-generation rule, e.g. `chacha8-index/1`.
    pub strategy: String,
    /// Seed the address space derives from.
    pub seed: u64,
    /// Number of hard locations (`p`).
    pub addresses: usize,
    /// Vector length in bits (`n`).
    pub dim: usize,
    /// Neighborhood cutoff in bit positions.
    pub radius: usize,
    /// Chunk size in bits (equals `dim` for this writer).
    pub chunk_size: usize,
    /// Threshold policy the writer used.
    pub tie_break: TieBreak,
    /// Base64 two's-complement counter blob, row-major `p × n`.
    pub counters: String,
    /// File name → record, ordered for stable serialization.
    pub files: BTreeMap<String, FileRecord>,
}

impl Bundle {
    /// Check version and strategy before any decoding is attempted.
    pub fn validate(&self) -> SdmResult<()> {
        if self.version != BUNDLE_VERSION {
            return Err(SdmError::MalformedEncoding {
                reason: format!(
                    "bundle version {} is not supported (expected {})",
                    self.version, BUNDLE_VERSION
                ),
            });
        }
        if self.strategy != STRATEGY_CHACHA8_INDEX {
            return Err(SdmError::UnsupportedStrategy {
                strategy: self.strategy.clone(),
            });
        }
        Ok(())
    }

    /// Names of the files this bundle can reconstruct, in index order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }

    /// Save as pretty JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> SdmResult<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| SdmError::MalformedEncoding {
            reason: format!("bundle JSON serialization failed: {}", e),
        })
    }

    /// Load from JSON and validate.
    pub fn load_json<P: AsRef<Path>>(path: P) -> SdmResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let bundle: Bundle =
            serde_json::from_reader(reader).map_err(|e| SdmError::MalformedEncoding {
                reason: format!("bundle JSON parse failed: {}", e),
            })?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Save as compact bincode.
    pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> SdmResult<()> {
        let encoded = bincode::serialize(self).map_err(|e| SdmError::MalformedEncoding {
            reason: format!("bundle binary serialization failed: {}", e),
        })?;
        std::fs::write(path, encoded)?;
        Ok(())
    }

    /// Load from bincode and validate.
    pub fn load_binary<P: AsRef<Path>>(path: P) -> SdmResult<Self> {
        let data = std::fs::read(path)?;
        let bundle: Bundle =
            bincode::deserialize(&data).map_err(|e| SdmError::MalformedEncoding {
                reason: format!("bundle binary parse failed: {}", e),
            })?;
        bundle.validate()?;
        Ok(bundle)
    }
}
