//! Sparse distributed memory engine
//!
//! A memory owns a fixed set of pseudorandom hard locations (addresses) and
//! routes every operation to the neighborhood of addresses within Hamming
//! `radius` of the supplied key. Writes superimpose into shared state;
//! reads recover an approximate pattern by majority over the neighborhood.
//!
//! Two storage policies implement the same [`MemoryBackend`] contract:
//!
//! - [`counter::CounterMemory`] — signed per-bit counters, the canonical
//!   policy and the only one the bundle format serializes;
//! - [`checksum::ChecksumMemory`] — exact-block storage keyed by content
//!   digest, resolved by majority vote at read time.
//!
//! # Concurrency
//!
//! Operations are synchronous and CPU-bound (an O(p·n) scan). `read` takes
//! `&self` and `write` takes `&mut self`, so the borrow checker enforces
//! the intended policy directly: any number of concurrent readers, or one
//! writer, never both.

pub mod checksum;
pub mod counter;

pub use checksum::ChecksumMemory;
pub use counter::CounterMemory;

use serde::{Deserialize, Serialize};

use crate::error::{SdmError, SdmResult};

/// Default number of hard locations.
pub const DEFAULT_ADDRESSES: usize = 1024;

/// Default vector length (and chunk size) in bits.
pub const DEFAULT_DIM: usize = 256;

/// Default neighborhood radius as a fraction of the vector length.
///
/// 0.451 gives wide neighborhoods with heavy superposition; values down
/// around 0.1 trade noise tolerance for less crosstalk between keys.
pub const DEFAULT_RADIUS_FRACTION: f64 = 0.451;

/// Threshold policy for a zero-sum accumulator.
///
/// Implementations of this memory model disagree on whether a tied bit
/// resolves to 0 or 1, so the cutoff is an explicit policy recorded in the
/// bundle rather than a silent choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// `sum > 0` maps to 1; ties map to 0. The canonical default.
    #[default]
    Zero,
    /// `sum >= 0` maps to 1; ties map to 1.
    One,
}

impl TieBreak {
    /// Resolve an accumulated counter sum to an output bit.
    #[inline]
    pub fn resolve(self, sum: i64) -> u8 {
        let one = match self {
            TieBreak::Zero => sum > 0,
            TieBreak::One => sum >= 0,
        };
        one as u8
    }
}

/// Which storage policy backs a memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Counter superposition (bundle-serializable).
    #[default]
    Counter,
    /// Checksum-dictionary majority vote.
    Checksum,
}

/// Construction parameters for a memory engine.
#[derive(Clone, Debug)]
pub struct SdmConfig {
    /// Number of hard locations (`p`).
    pub addresses: usize,
    /// Vector length in bits (`n`); also the chunk size.
    pub dim: usize,
    /// Seed for deterministic address generation.
    pub seed: u64,
    /// Neighborhood radius as a fraction of `dim`; `radius = floor(f * n)`.
    pub radius_fraction: f64,
    /// Threshold policy for tied accumulator sums.
    pub tie_break: TieBreak,
    /// Storage policy.
    pub backend: BackendKind,
}

impl Default for SdmConfig {
    fn default() -> Self {
        Self {
            addresses: DEFAULT_ADDRESSES,
            dim: DEFAULT_DIM,
            seed: 42,
            radius_fraction: DEFAULT_RADIUS_FRACTION,
            tie_break: TieBreak::Zero,
            backend: BackendKind::Counter,
        }
    }
}

impl SdmConfig {
    /// Validate parameters and compute the integer radius.
    pub fn radius(&self) -> SdmResult<usize> {
        if self.addresses == 0 {
            return Err(SdmError::InvalidConfig {
                reason: "address count must be non-zero".to_string(),
            });
        }
        if self.dim == 0 {
            return Err(SdmError::InvalidConfig {
                reason: "vector length must be non-zero".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.radius_fraction) {
            return Err(SdmError::InvalidConfig {
                reason: format!(
                    "radius fraction {} is outside [0.0, 1.0]",
                    self.radius_fraction
                ),
            });
        }
        Ok((self.radius_fraction * self.dim as f64).floor() as usize)
    }
}

/// The write/read contract shared by all storage policies.
pub trait MemoryBackend {
    /// Vector length in bits.
    fn dim(&self) -> usize;

    /// Store `pattern` at every address within radius of `key`.
    ///
    /// Returns the number of activated hard locations. Zero activations is
    /// a valid outcome, not an error: it means the address count or radius
    /// is tuned too small for this key, and sustained zeros are a
    /// configuration signal for the caller.
    fn write(&mut self, key: &[u8], pattern: &[u8]) -> SdmResult<usize>;

    /// Recover the pattern most supported by the neighborhood of `key`.
    ///
    /// Deterministic and pure with respect to stored state: the same state
    /// and key always produce the same output.
    fn read(&self, key: &[u8]) -> SdmResult<Vec<u8>>;
}

/// Number of positions at which two vectors differ.
///
/// Both vectors must have the same length; callers validate dimensions
/// before comparing.
#[inline]
pub fn hamming_distance(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).filter(|(x, y)| x != y).count()
}

pub(crate) fn check_dim(expected: usize, actual: usize) -> SdmResult<()> {
    if expected != actual {
        return Err(SdmError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
