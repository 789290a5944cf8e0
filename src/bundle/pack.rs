//! Signed counter packing
//!
//! The counter matrix travels in the bundle as one byte per counter:
//! two's-complement within the signed-byte range, base64-framed. A counter
//! outside [-128, 127] cannot be represented and packing fails with
//! `CounterOverflow` — clamping or wrapping would silently corrupt every
//! file whose chunks route through the affected location.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{SdmError, SdmResult};

/// Flatten the counter matrix row-major into a base64 blob.
pub fn pack_counters(counters: &[Vec<i32>]) -> SdmResult<String> {
    let total: usize = counters.iter().map(|row| row.len()).sum();
    let mut bytes = Vec::with_capacity(total);

    for (address, row) in counters.iter().enumerate() {
        for (bit, &value) in row.iter().enumerate() {
            if !(-128..=127).contains(&value) {
                return Err(SdmError::CounterOverflow {
                    address,
                    bit,
                    value,
                });
            }
            bytes.push(value as i8 as u8);
        }
    }

    Ok(BASE64.encode(bytes))
}

/// Reload a `p × n` counter matrix from its base64 blob.
pub fn unpack_counters(encoded: &str, p: usize, n: usize) -> SdmResult<Vec<Vec<i32>>> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| SdmError::MalformedEncoding {
            reason: format!("counter blob is not valid base64: {}", e),
        })?;

    if bytes.len() != p * n {
        return Err(SdmError::MalformedEncoding {
            reason: format!(
                "counter blob holds {} counters, expected {} ({} x {})",
                bytes.len(),
                p * n,
                p,
                n
            ),
        });
    }

    if n == 0 {
        return Ok(vec![Vec::new(); p]);
    }

    Ok(bytes
        .chunks_exact(n)
        .map(|row| row.iter().map(|&b| b as i8 as i32).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_signed_values() {
        let counters = vec![vec![-128, -1, 0, 1, 127], vec![5, -5, 64, -64, 100]];
        let blob = pack_counters(&counters).unwrap();
        assert_eq!(unpack_counters(&blob, 2, 5).unwrap(), counters);
    }

    #[test]
    fn test_overflow_rejected_not_clamped() {
        let counters = vec![vec![0, 130, 0]];
        let err = pack_counters(&counters).unwrap_err();
        assert!(matches!(
            err,
            SdmError::CounterOverflow {
                address: 0,
                bit: 1,
                value: 130
            }
        ));

        let negative = vec![vec![-200]];
        assert!(pack_counters(&negative).is_err());
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let blob = pack_counters(&[vec![1, 2, 3]]).unwrap();
        assert!(matches!(
            unpack_counters(&blob, 2, 3),
            Err(SdmError::MalformedEncoding { .. })
        ));
    }

    #[test]
    fn test_empty_matrix() {
        let blob = pack_counters(&[]).unwrap();
        assert!(unpack_counters(&blob, 0, 0).unwrap().is_empty());
    }
}
