//! Ingestion pipeline
//!
//! [`SdmArchive`] owns one memory engine for the lifetime of an ingestion
//! session. Each payload is expanded to bits, split into chunks, and
//! written into the memory under a fresh deterministic key per chunk; the
//! per-file key list and original bit length go into the file index. The
//! session then serializes to a [`Bundle`] that the standalone reader can
//! reconstruct from, with no access to this writer's state.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path};

use walkdir::WalkDir;

use crate::address;
use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::bundle::{pack, rle, Bundle, FileRecord, BUNDLE_VERSION};
use crate::chunk;
use crate::error::{SdmError, SdmResult};
use crate::memory::{
    BackendKind, ChecksumMemory, CounterMemory, MemoryBackend, SdmConfig,
};

// Offsets the chunk-key streams away from the address streams derived
// from the same user-facing seed.
const KEY_STREAM_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

enum Backend {
    Counter(CounterMemory),
    Checksum(ChecksumMemory),
}

impl Backend {
    fn write(&mut self, key: &[u8], pattern: &[u8]) -> SdmResult<usize> {
        match self {
            Backend::Counter(m) => m.write(key, pattern),
            Backend::Checksum(m) => m.write(key, pattern),
        }
    }

    fn read(&self, key: &[u8]) -> SdmResult<Vec<u8>> {
        match self {
            Backend::Counter(m) => m.read(key),
            Backend::Checksum(m) => m.read(key),
        }
    }
}

/// One ingestion session: a memory engine plus the file index it fills.
pub struct SdmArchive {
    config: SdmConfig,
    radius: usize,
    key_seed: u64,
    next_chunk: usize,
    backend: Backend,
    files: BTreeMap<String, FileRecord>,
}

impl SdmArchive {
    /// Validate `config` and build the selected backend.
    pub fn new(config: SdmConfig) -> SdmResult<Self> {
        let radius = config.radius()?;
        let backend = match config.backend {
            BackendKind::Counter => Backend::Counter(CounterMemory::new(&config)?),
            BackendKind::Checksum => Backend::Checksum(ChecksumMemory::new(&config)?),
        };
        Ok(Self {
            key_seed: config.seed ^ KEY_STREAM_SALT,
            radius,
            next_chunk: 0,
            backend,
            files: BTreeMap::new(),
            config,
        })
    }

    /// The configuration this session was built with.
    pub fn config(&self) -> &SdmConfig {
        &self.config
    }

    /// File index accumulated so far.
    pub fn files(&self) -> &BTreeMap<String, FileRecord> {
        &self.files
    }

    /// Ingest one payload under `name`.
    ///
    /// Splits the payload into `dim`-bit chunks, writes each under a fresh
    /// key, and records the key list. Records are immutable, so an already
    /// ingested name is rejected. Writes that activate zero hard locations
    /// are counted and surfaced in verbose output; sustained no-ops mean
    /// the address count or radius is tuned too small.
    pub fn ingest_bytes(&mut self, name: &str, data: &[u8], verbose: bool) -> SdmResult<()> {
        if self.files.contains_key(name) {
            return Err(SdmError::InvalidConfig {
                reason: format!("file {:?} is already in the archive", name),
            });
        }

        let bits = bytes_to_bits(data);
        let (chunks, bit_len) = chunk::split(&bits, self.config.dim)?;

        if verbose {
            println!(
                "Ingesting {}: {} bytes ({} chunks)",
                name,
                data.len(),
                chunks.len()
            );
        }

        let mut chunk_keys = Vec::with_capacity(chunks.len());
        let mut dead_writes = 0usize;
        for chunk_bits in &chunks {
            let key = address::generate_one(self.key_seed, self.next_chunk, self.config.dim);
            self.next_chunk += 1;

            let activated = self.backend.write(&key, chunk_bits)?;
            if activated == 0 {
                dead_writes += 1;
            }
            chunk_keys.push(rle::encode_key(&key));
        }

        if verbose && dead_writes > 0 {
            println!(
                "  warning: {} of {} chunk writes activated no locations",
                dead_writes,
                chunks.len()
            );
        }

        self.files
            .insert(name.to_string(), FileRecord { chunk_keys, bit_len });
        Ok(())
    }

    /// Ingest a file from disk under `logical_name`.
    pub fn ingest_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        logical_name: &str,
        verbose: bool,
    ) -> SdmResult<()> {
        let data = fs::read(path)?;
        self.ingest_bytes(logical_name, &data, verbose)
    }

    /// Ingest every file under `dir`, in sorted order.
    ///
    /// Logical names are forward-slash paths relative to `dir`. A file
    /// that cannot be read is reported and skipped; the batch continues.
    /// Returns the number of files ingested.
    pub fn ingest_directory<P: AsRef<Path>>(&mut self, dir: P, verbose: bool) -> SdmResult<usize> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry.map_err(|e| SdmError::Io(io::Error::other(e)))?;
            if entry.file_type().is_file() {
                paths.push(entry.path().to_path_buf());
            }
        }
        paths.sort();

        let mut ingested = 0;
        for path in paths {
            let relative = path.strip_prefix(dir).unwrap_or(path.as_path());
            let logical = path_to_forward_slash(relative);
            match self.ingest_file(&path, &logical, verbose) {
                Ok(()) => ingested += 1,
                Err(e) => eprintln!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(ingested)
    }

    /// Reconstruct a payload through the live backend.
    ///
    /// Works for both storage policies; this is the in-session counterpart
    /// of [`crate::bundle::reader::reconstruct`].
    pub fn read_back(&self, name: &str) -> SdmResult<Vec<u8>> {
        let record = self.files.get(name).ok_or_else(|| SdmError::UnknownFile {
            name: name.to_string(),
        })?;

        let mut chunks = Vec::with_capacity(record.chunk_keys.len());
        for encoded in &record.chunk_keys {
            let key = rle::decode_key(encoded)?;
            chunks.push(self.backend.read(&key)?);
        }

        let bits = chunk::join(&chunks, record.bit_len)?;
        Ok(bits_to_bytes(&bits))
    }

    /// Serialize the session into a portable bundle.
    ///
    /// Only the counter backend has a bundle representation. Counter
    /// packing enforces the signed-byte range; an overflow fails the
    /// encode and leaves the in-memory state untouched.
    pub fn to_bundle(&self) -> SdmResult<Bundle> {
        let memory = match &self.backend {
            Backend::Counter(m) => m,
            Backend::Checksum(_) => {
                return Err(SdmError::InvalidConfig {
                    reason: "checksum backend has no bundle representation".to_string(),
                })
            }
        };

        Ok(Bundle {
            version: BUNDLE_VERSION,
            strategy: address::STRATEGY_CHACHA8_INDEX.to_string(),
            seed: self.config.seed,
            addresses: self.config.addresses,
            dim: self.config.dim,
            radius: self.radius,
            chunk_size: self.config.dim,
            tie_break: self.config.tie_break,
            counters: pack::pack_counters(memory.counters())?,
            files: self.files.clone(),
        })
    }
}

fn path_to_forward_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str().map(|v| v.to_string()),
            _ => None,
        })
        .collect::<Vec<String>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::TieBreak;

    fn test_config() -> SdmConfig {
        SdmConfig {
            addresses: 2048,
            dim: 128,
            seed: 42,
            radius_fraction: 0.42,
            tie_break: TieBreak::Zero,
            backend: BackendKind::Counter,
        }
    }

    #[test]
    fn test_ingest_and_read_back() {
        let mut archive = SdmArchive::new(test_config()).unwrap();
        let payload = b"The quick brown fox jumps over the lazy dog".to_vec();
        archive.ingest_bytes("fox.txt", &payload, false).unwrap();
        assert_eq!(archive.read_back("fox.txt").unwrap(), payload);
    }

    #[test]
    fn test_non_aligned_payload_round_trip() {
        // 43 bytes = 344 bits, not a multiple of the 128-bit chunk size
        let mut archive = SdmArchive::new(test_config()).unwrap();
        let payload: Vec<u8> = (0..43).map(|i| (i * 7 + 3) as u8).collect();
        archive.ingest_bytes("odd.bin", &payload, false).unwrap();
        assert_eq!(archive.read_back("odd.bin").unwrap(), payload);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut archive = SdmArchive::new(test_config()).unwrap();
        archive.ingest_bytes("a", b"one", false).unwrap();
        assert!(matches!(
            archive.ingest_bytes("a", b"two", false),
            Err(SdmError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_read_back_unknown_name() {
        let archive = SdmArchive::new(test_config()).unwrap();
        assert!(matches!(
            archive.read_back("nope"),
            Err(SdmError::UnknownFile { .. })
        ));
    }

    #[test]
    fn test_missing_source_file_is_io_error() {
        let mut archive = SdmArchive::new(test_config()).unwrap();
        let err = archive
            .ingest_file("/definitely/not/a/real/path", "x", false)
            .unwrap_err();
        assert!(matches!(err, SdmError::Io(_)));
    }

    #[test]
    fn test_counter_overflow_surfaces_at_encode() {
        // One location with full-coverage radius: every write of an
        // all-ones pattern increments every counter, so 130 writes push
        // the counters past the signed-byte range.
        let config = SdmConfig {
            addresses: 1,
            dim: 8,
            seed: 1,
            radius_fraction: 1.0,
            tie_break: TieBreak::Zero,
            backend: BackendKind::Counter,
        };
        let mut archive = SdmArchive::new(config).unwrap();
        for i in 0..130 {
            archive
                .ingest_bytes(&format!("f{}", i), &[0xFF], false)
                .unwrap();
        }

        let err = archive.to_bundle().unwrap_err();
        assert!(matches!(err, SdmError::CounterOverflow { .. }));
    }

    #[test]
    fn test_checksum_backend_round_trip_but_no_bundle() {
        let config = SdmConfig {
            backend: BackendKind::Checksum,
            ..test_config()
        };
        let mut archive = SdmArchive::new(config).unwrap();
        let payload = b"exact block storage".to_vec();
        archive.ingest_bytes("b.txt", &payload, false).unwrap();
        assert_eq!(archive.read_back("b.txt").unwrap(), payload);

        assert!(matches!(
            archive.to_bundle(),
            Err(SdmError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_multiple_files_stay_separate() {
        let mut archive = SdmArchive::new(test_config()).unwrap();
        let a = b"first payload contents".to_vec();
        let b = b"second, different contents".to_vec();
        archive.ingest_bytes("a.txt", &a, false).unwrap();
        archive.ingest_bytes("b.txt", &b, false).unwrap();

        assert_eq!(archive.read_back("a.txt").unwrap(), a);
        assert_eq!(archive.read_back("b.txt").unwrap(), b);
    }
}
