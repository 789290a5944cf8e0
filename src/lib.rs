//! # sdm-archive
//!
//! Sparse distributed memory with chunked file storage and a portable,
//! self-describing bundle format.
//!
//! Payloads are split into fixed-size bit chunks, each chunk is written
//! into a fixed set of pseudorandom hard locations under its own key, and
//! the whole memory plus a file → chunk-key index serializes into a
//! [`bundle::Bundle`]. Reconstruction re-derives the address space from
//! the recorded seed alone, so bundles never carry an address table.
//!
//! ```
//! use sdm_archive::{SdmArchive, SdmConfig};
//!
//! let mut archive = SdmArchive::new(SdmConfig::default())?;
//! archive.ingest_bytes("greeting.txt", b"hello, sparse memory", false)?;
//!
//! let bundle = archive.to_bundle()?;
//! let restored = sdm_archive::bundle::reader::reconstruct(&bundle, "greeting.txt")?;
//! assert_eq!(restored, b"hello, sparse memory");
//! # Ok::<(), sdm_archive::SdmError>(())
//! ```

pub mod address;
pub mod archive;
pub mod bits;
pub mod bundle;
pub mod chunk;
pub mod error;
pub mod memory;

pub use archive::SdmArchive;
pub use bundle::{Bundle, FileRecord};
pub use error::{SdmError, SdmResult};
pub use memory::{
    BackendKind, ChecksumMemory, CounterMemory, MemoryBackend, SdmConfig, TieBreak,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_loads() {
        let archive = SdmArchive::new(SdmConfig::default()).unwrap();
        assert!(archive.files().is_empty());
    }
}
