use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5d1c_7a3e_9b24_f061;

/// Stable 128-bit digest of exported frame pixels.
///
/// Two runs over the same stage and configuration produce equal fingerprints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl std::fmt::Display for FrameFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Fingerprint an RGB float buffer together with its dimensions.
pub(crate) fn fingerprint_rgb_f32(width: u32, height: u32, data: &[f32]) -> FrameFingerprint {
    let mut h = Xxh3::with_seed(XXH3_SEED);
    h.update(&width.to_le_bytes());
    h.update(&height.to_le_bytes());
    for v in data {
        h.update(&v.to_bits().to_le_bytes());
    }
    let v = h.digest128();
    FrameFingerprint {
        hi: (v >> 64) as u64,
        lo: v as u64,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/fingerprint.rs"]
mod tests;
