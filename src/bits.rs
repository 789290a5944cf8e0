//! Byte ↔ bit-sequence conversion
//!
//! Memory vectors and chunk payloads are sequences of individual bits,
//! represented as `Vec<u8>` holding only `0` or `1`. Bytes expand MSB-first
//! so that bit order matches the natural big-endian reading of a hex dump.

/// Expand bytes into a bit sequence, most significant bit first.
pub fn bytes_to_bits(data: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(data.len() * 8);
    for &byte in data {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Pack a bit sequence back into bytes.
///
/// A trailing group of fewer than 8 bits is padded with zero bits on the
/// right, matching the zero padding applied at chunk boundaries.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bits.len().div_ceil(8));
    for group in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in group.iter().enumerate() {
            byte |= (bit & 1) << (7 - i);
        }
        bytes.push(byte);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_bits_msb_first() {
        assert_eq!(bytes_to_bits(&[0b1010_0001]), vec![1, 0, 1, 0, 0, 0, 0, 1]);
        assert_eq!(bytes_to_bits(&[0x00]), vec![0; 8]);
        assert_eq!(bytes_to_bits(&[0xFF]), vec![1; 8]);
    }

    #[test]
    fn test_round_trip() {
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(bits_to_bytes(&bytes_to_bits(&data)), data);
    }

    #[test]
    fn test_partial_trailing_group() {
        // 4 bits pack into one byte with zero padding on the right
        assert_eq!(bits_to_bytes(&[1, 0, 1, 1]), vec![0b1011_0000]);
    }

    #[test]
    fn test_empty() {
        assert!(bytes_to_bits(&[]).is_empty());
        assert!(bits_to_bytes(&[]).is_empty());
    }
}
