//! Error types for SDM operations
//!
//! # Why Custom Error Types?
//!
//! Memory operations can fail in many ways: malformed bundle blobs, counter
//! overflow at encode time, dimension mismatches, missing files. A unified
//! error type with specific variants tells callers exactly what went wrong
//! and which operation to abort (one decode, one file) without touching
//! already-written memory state.

use std::fmt;
use std::io;

/// Result type for SDM operations
pub type SdmResult<T> = Result<T, SdmError>;

/// Errors that can occur during memory, codec, or bundle operations
#[derive(Debug)]
pub enum SdmError {
    /// I/O error reading a source file or writing a bundle
    ///
    /// # Common Causes
    /// - Source file missing during ingestion
    /// - Permission denied
    /// - Disk full (for writes)
    Io(io::Error),

    /// Encoded data does not match the bundle format
    ///
    /// # Common Causes
    /// - RLE byte sequence with odd length
    /// - RLE value outside {0, 1}
    /// - Counter blob whose size disagrees with the declared dimensions
    /// - Invalid base64 framing
    MalformedEncoding { reason: String },

    /// A counter left the signed-byte range at bundle-encode time
    ///
    /// # Why This Exists
    /// Bundle counters are stored as single signed bytes. A counter outside
    /// [-128, 127] cannot be represented, and clamping it would silently
    /// corrupt every file routed through that location. Encoding fails
    /// instead; the in-memory state stays intact.
    CounterOverflow {
        address: usize,
        bit: usize,
        value: i32,
    },

    /// Recorded original length exceeds the reconstructed chunk data
    ///
    /// # Common Causes
    /// - Truncated chunk-key list in a hand-edited bundle
    /// - A bundle whose chunk size disagrees with its file records
    LengthMismatch { expected: usize, actual: usize },

    /// Requested file name is absent from the bundle's file index
    UnknownFile { name: String },

    /// Key or pattern length does not match the memory's vector length
    ///
    /// # Why This Happens
    /// Usually a caller mixing vectors from memories with different
    /// dimensions. Failing fast here prevents partial counter updates.
    DimensionMismatch { expected: usize, actual: usize },

    /// Configuration rejected at construction or encode time
    InvalidConfig { reason: String },

    /// Bundle names an address-generation strategy this build cannot replay
    ///
    /// # Why This Exists
    /// Reconstruction re-derives the address space from a seed and a
    /// strategy identifier. Guessing at an unknown strategy would decode
    /// garbage with no error, so it is rejected up front.
    UnsupportedStrategy { strategy: String },
}

impl fmt::Display for SdmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdmError::Io(e) => write!(f, "I/O error: {}", e),
            SdmError::MalformedEncoding { reason } => {
                write!(f, "Malformed encoding: {}", reason)
            }
            SdmError::CounterOverflow {
                address,
                bit,
                value,
            } => {
                write!(
                    f,
                    "Counter overflow at address {} bit {}: {} is outside [-128, 127]",
                    address, bit, value
                )
            }
            SdmError::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Length mismatch: recorded length {} exceeds available {} bits",
                    expected, actual
                )
            }
            SdmError::UnknownFile { name } => {
                write!(f, "File {:?} is not present in the bundle index", name)
            }
            SdmError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Dimension mismatch: memory uses {}-bit vectors, got {}",
                    expected, actual
                )
            }
            SdmError::InvalidConfig { reason } => {
                write!(f, "Invalid configuration: {}", reason)
            }
            SdmError::UnsupportedStrategy { strategy } => {
                write!(f, "Unsupported address-generation strategy: {:?}", strategy)
            }
        }
    }
}

impl std::error::Error for SdmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SdmError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SdmError {
    fn from(err: io::Error) -> Self {
        SdmError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_counter_overflow() {
        let err = SdmError::CounterOverflow {
            address: 3,
            bit: 17,
            value: 200,
        };
        let msg = err.to_string();
        assert!(msg.contains("address 3"));
        assert!(msg.contains("200"));
    }

    #[test]
    fn test_io_source_preserved() {
        let err: SdmError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
