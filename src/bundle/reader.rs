//! Standalone reconstruction from a bundle
//!
//! The reader rebuilds a named payload from nothing but the bundle: it
//! re-derives the address space from `(seed, addresses, dim, strategy)`,
//! reloads the counter matrix from its blob, reads each chunk through the
//! memory, and reassembles the original bytes. It shares no state with the
//! writer that produced the bundle and never needs an address table.

use crate::address;
use crate::bits::bits_to_bytes;
use crate::bundle::{pack, rle, Bundle};
use crate::chunk;
use crate::error::{SdmError, SdmResult};
use crate::memory::{CounterMemory, MemoryBackend};

/// Rebuild the counter memory a bundle describes.
///
/// Shared by every reconstruction in a session; building it once and
/// reusing it amortizes the counter unpacking across files.
pub fn rebuild_memory(bundle: &Bundle) -> SdmResult<CounterMemory> {
    bundle.validate()?;
    let addresses = address::generate(bundle.seed, bundle.addresses, bundle.dim);
    let counters = pack::unpack_counters(&bundle.counters, bundle.addresses, bundle.dim)?;
    Ok(CounterMemory::from_parts(
        addresses,
        counters,
        bundle.radius,
        bundle.tie_break,
    ))
}

/// Reconstruct one named payload through an already-rebuilt memory.
pub fn reconstruct_with(
    bundle: &Bundle,
    memory: &CounterMemory,
    name: &str,
) -> SdmResult<Vec<u8>> {
    let record = bundle.files.get(name).ok_or_else(|| SdmError::UnknownFile {
        name: name.to_string(),
    })?;

    let mut chunks = Vec::with_capacity(record.chunk_keys.len());
    for encoded in &record.chunk_keys {
        let key = rle::decode_key(encoded)?;
        chunks.push(memory.read(&key)?);
    }

    let bits = chunk::join(&chunks, record.bit_len)?;
    Ok(bits_to_bytes(&bits))
}

/// Reconstruct one named payload from a bundle alone.
///
/// Fails with `UnknownFile` before any decoding if `name` is absent from
/// the index; no partial output is produced on any error path.
pub fn reconstruct(bundle: &Bundle, name: &str) -> SdmResult<Vec<u8>> {
    if !bundle.files.contains_key(name) {
        return Err(SdmError::UnknownFile {
            name: name.to_string(),
        });
    }
    let memory = rebuild_memory(bundle)?;
    reconstruct_with(bundle, &memory, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::SdmArchive;
    use crate::memory::SdmConfig;

    fn small_config() -> SdmConfig {
        SdmConfig {
            addresses: 2048,
            dim: 128,
            seed: 7,
            radius_fraction: 0.42,
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_file_rejected() {
        let mut archive = SdmArchive::new(small_config()).unwrap();
        archive.ingest_bytes("a.bin", b"payload", false).unwrap();
        let bundle = archive.to_bundle().unwrap();

        let err = reconstruct(&bundle, "missing.bin").unwrap_err();
        assert!(matches!(err, SdmError::UnknownFile { .. }));
    }

    #[test]
    fn test_reconstruct_matches_session_read_back() {
        let mut archive = SdmArchive::new(small_config()).unwrap();
        let payload = b"sparse distributed memory".to_vec();
        archive.ingest_bytes("m.txt", &payload, false).unwrap();

        let bundle = archive.to_bundle().unwrap();
        let from_bundle = reconstruct(&bundle, "m.txt").unwrap();
        let from_session = archive.read_back("m.txt").unwrap();

        assert_eq!(from_bundle, payload);
        assert_eq!(from_bundle, from_session);
    }

    #[test]
    fn test_truncated_key_list_is_length_mismatch() {
        let mut archive = SdmArchive::new(small_config()).unwrap();
        archive
            .ingest_bytes("t.bin", &[0xAB; 100], false)
            .unwrap();
        let mut bundle = archive.to_bundle().unwrap();

        let record = bundle.files.get_mut("t.bin").unwrap();
        record.chunk_keys.pop();

        let err = reconstruct(&bundle, "t.bin").unwrap_err();
        assert!(matches!(err, SdmError::LengthMismatch { .. }));
    }
}
