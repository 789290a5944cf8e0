//! Checksum-dictionary storage policy
//!
//! An alternative to counter superposition: every hard location keeps a
//! small dictionary from content digest to the exact block last written
//! there. A read collects all blocks stored across the key's neighborhood,
//! drops any whose digest no longer matches its content, and returns the
//! block that recurs most often (majority vote). This trades continuous
//! superposition for exact-block recall: retrieved data is never a blend,
//! but a key whose neighborhood holds no valid block yields nothing.
//!
//! This backend has no bundle serialization; the counter policy is the
//! canonical one for archival.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::address;
use crate::bits::bits_to_bytes;
use crate::error::SdmResult;
use crate::memory::{check_dim, hamming_distance, MemoryBackend, SdmConfig};

/// First 8 bytes of SHA-256 over the packed pattern bytes.
fn content_digest(pattern: &[u8]) -> [u8; 8] {
    let hash = Sha256::digest(bits_to_bytes(pattern));
    let mut digest = [0u8; 8];
    digest.copy_from_slice(&hash[..8]);
    digest
}

/// Sparse distributed memory storing exact blocks keyed by content digest.
pub struct ChecksumMemory {
    addresses: Vec<Vec<u8>>,
    // One dictionary per hard location; BTreeMap keeps vote tie-breaking
    // deterministic across runs.
    rows: Vec<BTreeMap<[u8; 8], Vec<u8>>>,
    radius: usize,
}

impl ChecksumMemory {
    pub fn new(config: &SdmConfig) -> SdmResult<Self> {
        let radius = config.radius()?;
        let addresses = address::generate(config.seed, config.addresses, config.dim);
        let rows = vec![BTreeMap::new(); config.addresses];
        Ok(Self {
            addresses,
            rows,
            radius,
        })
    }

    /// Number of distinct blocks currently stored across all locations.
    pub fn stored_blocks(&self) -> usize {
        let mut digests: Vec<[u8; 8]> = self.rows.iter().flat_map(|r| r.keys().copied()).collect();
        digests.sort_unstable();
        digests.dedup();
        digests.len()
    }
}

impl MemoryBackend for ChecksumMemory {
    fn dim(&self) -> usize {
        self.addresses.first().map(|a| a.len()).unwrap_or(0)
    }

    fn write(&mut self, key: &[u8], pattern: &[u8]) -> SdmResult<usize> {
        check_dim(self.dim(), key.len())?;
        check_dim(self.dim(), pattern.len())?;

        let digest = content_digest(pattern);
        let radius = self.radius;
        let mut activated = 0;
        for (addr, row) in self.addresses.iter().zip(self.rows.iter_mut()) {
            if hamming_distance(addr, key) > radius {
                continue;
            }
            activated += 1;
            row.insert(digest, pattern.to_vec());
        }
        Ok(activated)
    }

    fn read(&self, key: &[u8]) -> SdmResult<Vec<u8>> {
        check_dim(self.dim(), key.len())?;

        // Tally votes per digest; only blocks whose digest still matches
        // their content count as candidates.
        let mut votes: BTreeMap<[u8; 8], (usize, &Vec<u8>)> = BTreeMap::new();
        for (addr, row) in self.addresses.iter().zip(self.rows.iter()) {
            if hamming_distance(addr, key) > self.radius {
                continue;
            }
            for (digest, block) in row {
                if content_digest(block) != *digest {
                    continue;
                }
                votes
                    .entry(*digest)
                    .and_modify(|(count, _)| *count += 1)
                    .or_insert((1, block));
            }
        }

        // Majority vote; BTreeMap order makes equal-count ties resolve to
        // the smallest digest deterministically.
        let winner = votes
            .into_iter()
            .max_by(|(da, (ca, _)), (db, (cb, _))| ca.cmp(cb).then(db.cmp(da)));

        Ok(match winner {
            Some((_, (_, block))) => block.clone(),
            None => vec![0; self.dim()],
        })
    }
}
