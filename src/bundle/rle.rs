//! Run-length key codec
//!
//! Chunk keys are binary vectors with long same-value runs once encoded,
//! so they travel in the bundle as alternating `(count, value)` byte pairs
//! wrapped in base64. Counts are capped at 255 to stay within a byte; a
//! longer run splits into multiple pairs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{SdmError, SdmResult};

/// Run-length encode a bit sequence into flat `(count, value)` byte pairs.
pub fn encode_pairs(bits: &[u8]) -> Vec<u8> {
    let mut pairs = Vec::new();
    let Some(&first) = bits.first() else {
        return pairs;
    };

    let mut current = first;
    let mut count = 1u8;
    for &bit in &bits[1..] {
        if bit == current && count < 255 {
            count += 1;
        } else {
            pairs.extend_from_slice(&[count, current]);
            current = bit;
            count = 1;
        }
    }
    pairs.extend_from_slice(&[count, current]);
    pairs
}

/// Expand flat `(count, value)` byte pairs back into a bit sequence.
pub fn decode_pairs(pairs: &[u8]) -> SdmResult<Vec<u8>> {
    if pairs.len() % 2 != 0 {
        return Err(SdmError::MalformedEncoding {
            reason: format!("RLE data has odd length {}", pairs.len()),
        });
    }

    let mut bits = Vec::new();
    for pair in pairs.chunks_exact(2) {
        let (count, value) = (pair[0], pair[1]);
        if value > 1 {
            return Err(SdmError::MalformedEncoding {
                reason: format!("RLE value {} is not a bit", value),
            });
        }
        if count == 0 {
            return Err(SdmError::MalformedEncoding {
                reason: "RLE run with zero count".to_string(),
            });
        }
        bits.extend(std::iter::repeat(value).take(count as usize));
    }
    Ok(bits)
}

/// Encode a key vector as base64-framed RLE pairs.
pub fn encode_key(bits: &[u8]) -> String {
    BASE64.encode(encode_pairs(bits))
}

/// Decode a base64-framed RLE key back into a bit vector.
pub fn decode_key(encoded: &str) -> SdmResult<Vec<u8>> {
    let pairs = BASE64
        .decode(encoded)
        .map_err(|e| SdmError::MalformedEncoding {
            reason: format!("key is not valid base64: {}", e),
        })?;
    decode_pairs(&pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_pair_sequence() {
        assert_eq!(encode_pairs(&[0, 0, 0, 1, 1]), vec![3, 0, 2, 1]);
        assert_eq!(decode_pairs(&[3, 0, 2, 1]).unwrap(), vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_long_run_splits_at_255() {
        let bits = vec![1u8; 300];
        assert_eq!(encode_pairs(&bits), vec![255, 1, 45, 1]);
        assert_eq!(decode_pairs(&[255, 1, 45, 1]).unwrap(), bits);
    }

    #[test]
    fn test_round_trip_alternating_and_random() {
        let alternating: Vec<u8> = (0..10_000).map(|i| (i % 2) as u8).collect();
        assert_eq!(decode_pairs(&encode_pairs(&alternating)).unwrap(), alternating);

        // Deterministic pseudo-random pattern with mixed run lengths
        let mixed: Vec<u8> = (0..10_000u32)
            .map(|i| ((i.wrapping_mul(2654435761) >> 13) & 1) as u8)
            .collect();
        assert_eq!(decode_pairs(&encode_pairs(&mixed)).unwrap(), mixed);
    }

    #[test]
    fn test_empty() {
        assert!(encode_pairs(&[]).is_empty());
        assert!(decode_pairs(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_odd_length_rejected() {
        assert!(matches!(
            decode_pairs(&[3, 0, 2]),
            Err(SdmError::MalformedEncoding { .. })
        ));
    }

    #[test]
    fn test_non_bit_value_rejected() {
        assert!(decode_pairs(&[3, 2]).is_err());
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(decode_pairs(&[0, 1]).is_err());
    }

    #[test]
    fn test_key_framing_round_trip() {
        let bits = vec![0, 0, 1, 1, 1, 0, 1];
        let encoded = encode_key(&bits);
        assert_eq!(decode_key(&encoded).unwrap(), bits);
    }

    #[test]
    fn test_bad_base64_rejected() {
        assert!(decode_key("not-base64!!!").is_err());
    }
}
