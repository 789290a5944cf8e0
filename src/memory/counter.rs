//! Counter-superposition storage policy
//!
//! The canonical SDM model: every hard location carries one signed counter
//! per bit position. A write increments counters where the pattern bit is 1
//! and decrements where it is 0, at every location within radius of the
//! key. A read sums the counters across the key's neighborhood and
//! thresholds each position back to a bit.
//!
//! Superposition is what makes this noise-tolerant: a write at key `K` is
//! recoverable from any key within `radius` of `K` because the two
//! neighborhoods overlap in locations that accumulated the same signal,
//! and two keys further than `2 * radius` apart share no locations at all,
//! so their stored patterns cannot interfere.

use crate::address;
use crate::error::SdmResult;
use crate::memory::{check_dim, hamming_distance, MemoryBackend, SdmConfig, TieBreak};

/// Sparse distributed memory backed by a p × n signed counter matrix.
///
/// Counters are `i32` in memory and unbounded by writes; the signed-byte
/// range required by the bundle format is enforced at encode time, where
/// an out-of-range counter is an error rather than a silent clamp.
pub struct CounterMemory {
    addresses: Vec<Vec<u8>>,
    counters: Vec<Vec<i32>>,
    radius: usize,
    tie_break: TieBreak,
}

impl CounterMemory {
    /// Build a memory with a deterministic address space derived from
    /// `(config.seed, config.addresses, config.dim)`.
    pub fn new(config: &SdmConfig) -> SdmResult<Self> {
        let radius = config.radius()?;
        let addresses = address::generate(config.seed, config.addresses, config.dim);
        let counters = vec![vec![0i32; config.dim]; config.addresses];
        Ok(Self {
            addresses,
            counters,
            radius,
            tie_break: config.tie_break,
        })
    }

    /// Rebuild a memory from explicit state.
    ///
    /// Used by the bundle reader, which re-derives the addresses from the
    /// recorded seed and reloads the counters from the bundle blob.
    pub fn from_parts(
        addresses: Vec<Vec<u8>>,
        counters: Vec<Vec<i32>>,
        radius: usize,
        tie_break: TieBreak,
    ) -> Self {
        debug_assert_eq!(addresses.len(), counters.len());
        Self {
            addresses,
            counters,
            radius,
            tie_break,
        }
    }

    /// Neighborhood cutoff in bit positions.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Number of hard locations.
    pub fn address_count(&self) -> usize {
        self.addresses.len()
    }

    /// The counter matrix, row per address.
    pub fn counters(&self) -> &[Vec<i32>] {
        &self.counters
    }

    /// Largest counter magnitude currently stored.
    ///
    /// Useful as a headroom check before bundling: once this exceeds 127
    /// the memory can no longer be serialized.
    pub fn max_counter_magnitude(&self) -> i32 {
        self.counters
            .iter()
            .flatten()
            .map(|c| c.abs())
            .max()
            .unwrap_or(0)
    }

    fn neighborhood<'a>(&'a self, key: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
        self.addresses
            .iter()
            .enumerate()
            .filter(move |(_, addr)| hamming_distance(addr, key) <= self.radius)
            .map(|(i, _)| i)
    }
}

impl MemoryBackend for CounterMemory {
    fn dim(&self) -> usize {
        self.addresses.first().map(|a| a.len()).unwrap_or(0)
    }

    fn write(&mut self, key: &[u8], pattern: &[u8]) -> SdmResult<usize> {
        check_dim(self.dim(), key.len())?;
        check_dim(self.dim(), pattern.len())?;

        let radius = self.radius;
        let mut activated = 0;
        for (addr, row) in self.addresses.iter().zip(self.counters.iter_mut()) {
            if hamming_distance(addr, key) > radius {
                continue;
            }
            activated += 1;
            for (counter, &bit) in row.iter_mut().zip(pattern.iter()) {
                if bit == 1 {
                    *counter += 1;
                } else {
                    *counter -= 1;
                }
            }
        }
        Ok(activated)
    }

    fn read(&self, key: &[u8]) -> SdmResult<Vec<u8>> {
        check_dim(self.dim(), key.len())?;

        let mut accumulator = vec![0i64; self.dim()];
        for i in self.neighborhood(key) {
            for (sum, &counter) in accumulator.iter_mut().zip(self.counters[i].iter()) {
                *sum += counter as i64;
            }
        }

        Ok(accumulator
            .into_iter()
            .map(|sum| self.tie_break.resolve(sum))
            .collect())
    }
}
