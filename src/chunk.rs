//! Chunk codec: fixed-size splitting and exact-length reassembly
//!
//! Payload bit sequences are split into `chunk_size`-aligned windows before
//! storage; the final window is zero-padded. The exact original bit length
//! travels separately (in the file record) so reassembly can discard the
//! padding and return the payload bit-for-bit.

use crate::error::{SdmError, SdmResult};

/// Split a bit sequence into consecutive `chunk_size` windows.
///
/// The last chunk, if short, is padded on the right with zero bits.
/// Returns the chunks and the exact original bit length, which `join`
/// needs to truncate the padding away.
pub fn split(bits: &[u8], chunk_size: usize) -> SdmResult<(Vec<Vec<u8>>, usize)> {
    if chunk_size == 0 {
        return Err(SdmError::InvalidConfig {
            reason: "chunk size must be non-zero".to_string(),
        });
    }

    let mut chunks = Vec::with_capacity(bits.len().div_ceil(chunk_size));
    for window in bits.chunks(chunk_size) {
        let mut chunk = window.to_vec();
        chunk.resize(chunk_size, 0);
        chunks.push(chunk);
    }

    Ok((chunks, bits.len()))
}

/// Concatenate chunks in order and truncate to `original_len` bits.
///
/// Fails with `LengthMismatch` if `original_len` exceeds the concatenated
/// length; that means the chunk list is incomplete for the recorded size.
pub fn join(chunks: &[Vec<u8>], original_len: usize) -> SdmResult<Vec<u8>> {
    let total: usize = chunks.iter().map(|c| c.len()).sum();
    if original_len > total {
        return Err(SdmError::LengthMismatch {
            expected: original_len,
            actual: total,
        });
    }

    let mut bits = Vec::with_capacity(original_len);
    for chunk in chunks {
        if bits.len() >= original_len {
            break;
        }
        let take = chunk.len().min(original_len - bits.len());
        bits.extend_from_slice(&chunk[..take]);
    }
    Ok(bits)
}
