use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x6d1f_2c4b_9a07_e385;

/// Stable 128-bit content fingerprint.
///
/// Sources report one per resource; the texture cache uses it to decide whether an already built
/// value can be reused for a location in a new pack state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl Fingerprint {
    /// Fingerprint of a byte slice.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut h = StableHasher::new();
        h.write_bytes(bytes);
        h.finish()
    }

    /// Combine several fingerprints, order-sensitive.
    pub fn combine(parts: &[Fingerprint]) -> Self {
        let mut h = StableHasher::new();
        h.write_u32(parts.len() as u32);
        for p in parts {
            h.write_fingerprint(*p);
        }
        h.finish()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Incremental xxh3 hasher producing a [`Fingerprint`].
pub struct StableHasher {
    inner: Xxh3,
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl StableHasher {
    /// Seeded hasher; the seed is fixed so fingerprints are stable across runs.
    pub fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    /// Feed raw bytes.
    pub fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    /// Feed a length-prefixed string.
    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    /// Feed a `u32` in little-endian order.
    pub fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Feed a `u64` in little-endian order.
    pub fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Feed another fingerprint.
    pub fn write_fingerprint(&mut self, f: Fingerprint) {
        self.write_u64(f.hi);
        self.write_u64(f.lo);
    }

    /// Finish hashing.
    pub fn finish(self) -> Fingerprint {
        let v = self.inner.digest128();
        Fingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/fingerprint.rs"]
mod tests;
