//! Key derivation functions.
//!
//! A [`Kdf`] stretches the composite-key seed into the final encryption key
//! at a tunable cost. Two families are provided: AES-based iterated
//! stretching ([`aes::AesKdf`]) and the memory-hard Argon2id
//! ([`argon2::Argon2Kdf`]). [`benchmark::benchmark`] calibrates a round count
//! against a wall-clock target.

pub mod aes;
pub mod argon2;
pub mod benchmark;

pub use self::aes::AesKdf;
pub use self::argon2::Argon2Kdf;
pub use self::benchmark::benchmark;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::KeyError;

/// Length of the derived encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the transform salt (32 bytes; doubles as the AES-256 key in the
/// iterated variant).
pub const SALT_LEN: usize = 32;

/// Generate a fresh random transform salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], KeyError> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::fill(&mut salt)
        .map_err(|_| KeyError::TransformFailed("OS random generator unavailable".into()))?;
    Ok(salt)
}

/// Stable identifier for a KDF family.
///
/// The serde string form is what the database header persists; the UUID is
/// the wire identifier used by the binary format layer. A Kdf is always
/// reconstructible from this identifier plus its cost parameters alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KdfKind {
    AesKdf,
    Argon2,
}

impl KdfKind {
    pub const ALL: [KdfKind; 2] = [KdfKind::AesKdf, KdfKind::Argon2];

    pub const fn uuid(self) -> [u8; 16] {
        match self {
            KdfKind::AesKdf => [
                0xc9, 0xd9, 0xf3, 0x9a, 0x62, 0x8a, 0x44, 0x60, 0xbf, 0x74, 0x0d, 0x08, 0xc1,
                0x8a, 0x4f, 0xea,
            ],
            KdfKind::Argon2 => [
                0xef, 0x63, 0x6d, 0xdf, 0x8c, 0x29, 0x44, 0x4b, 0x91, 0xf7, 0xa9, 0xa4, 0x03,
                0xe3, 0x0a, 0x0c,
            ],
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            KdfKind::AesKdf => "AES-KDF",
            KdfKind::Argon2 => "Argon2id",
        }
    }

    /// Registry entry point: a default-constructed Kdf of this family.
    ///
    /// Switching families always starts from these defaults; no parameters
    /// carry over from the previous family.
    pub fn new_kdf(self) -> Box<dyn Kdf> {
        match self {
            KdfKind::AesKdf => Box::new(AesKdf::default()),
            KdfKind::Argon2 => Box::new(Argon2Kdf::default()),
        }
    }

    /// Whether this family takes memory-cost and parallelism parameters.
    pub const fn is_memory_hard(self) -> bool {
        matches!(self, KdfKind::Argon2)
    }

    /// Flag round counts a user would likely regret.
    pub fn rounds_advisory(self, rounds: u64) -> Option<RoundsAdvisory> {
        match self {
            KdfKind::AesKdf if rounds < 100_000 => Some(RoundsAdvisory::TooLow),
            KdfKind::Argon2 if rounds > 10_000 => Some(RoundsAdvisory::TooHigh),
            _ => None,
        }
    }
}

/// Advisory on an unusual round count: weak enough to be crackable or slow
/// enough to make the database take hours to open. The core only reports;
/// accepting anyway is the caller's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundsAdvisory {
    TooLow,
    TooHigh,
}

/// A parameterized key stretching function.
///
/// A Kdf is stateless between calls apart from its stored cost parameters;
/// `transform` is a pure function of (seed, salt, parameters).
pub trait Kdf: Send + Sync {
    fn kind(&self) -> KdfKind;

    fn rounds(&self) -> u64;

    /// Set the round count. Zero is rejected with
    /// [`KeyError::InvalidKdfParameters`] and the previous value kept.
    fn set_rounds(&mut self, rounds: u64) -> Result<(), KeyError>;

    /// Stretch `seed` into the final key.
    ///
    /// Out-of-bounds parameters fail with `InvalidKdfParameters` rather than
    /// being clamped; primitive failures (e.g. the memory-hard working set
    /// cannot be allocated) surface as `KdfTransformFailed`.
    fn transform(
        &self,
        seed: &[u8; KEY_LEN],
        salt: &[u8; SALT_LEN],
    ) -> Result<Zeroizing<[u8; KEY_LEN]>, KeyError>;

    /// Snapshot of the persisted parameter set.
    fn config(&self) -> KdfConfig;
}

/// The exact parameter set that round-trips through the database header:
/// family identifier, round count, and for memory-hard families the
/// memory cost (KiB) and parallelism. No hidden state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfConfig {
    pub kind: KdfKind,
    pub rounds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_kib: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<u32>,
}

impl KdfConfig {
    /// Reconstruct a Kdf from persisted parameters. The result produces
    /// byte-identical transforms to the instance the config was taken from.
    pub fn instantiate(&self) -> Result<Box<dyn Kdf>, KeyError> {
        match self.kind {
            KdfKind::AesKdf => {
                if self.memory_kib.is_some() || self.parallelism.is_some() {
                    return Err(KeyError::InvalidKdfParameters(
                        "AES-KDF takes no memory or parallelism parameters".into(),
                    ));
                }
                let mut kdf = AesKdf::default();
                kdf.set_rounds(self.rounds)?;
                Ok(Box::new(kdf))
            }
            KdfKind::Argon2 => {
                let mut kdf = Argon2Kdf::default();
                kdf.set_rounds(self.rounds)?;
                if let Some(parallelism) = self.parallelism {
                    kdf.set_parallelism(parallelism)?;
                }
                if let Some(memory_kib) = self.memory_kib {
                    kdf.set_memory(memory_kib)?;
                }
                Ok(Box::new(kdf))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serde_uses_stable_names() {
        assert_eq!(
            serde_json::to_string(&KdfKind::AesKdf).unwrap(),
            "\"aes-kdf\""
        );
        assert_eq!(
            serde_json::to_string(&KdfKind::Argon2).unwrap(),
            "\"argon2\""
        );
    }

    #[test]
    fn uuids_are_distinct_and_stable() {
        assert_ne!(KdfKind::AesKdf.uuid(), KdfKind::Argon2.uuid());
        assert_eq!(
            hex::encode(KdfKind::Argon2.uuid()),
            "ef636ddf8c29444b91f7a9a403e30a0c"
        );
    }

    #[test]
    fn config_roundtrips_through_json() {
        for kind in KdfKind::ALL {
            let config = kind.new_kdf().config();
            let json = serde_json::to_string(&config).unwrap();
            let back: KdfConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(config, back);
        }
    }

    #[test]
    fn reconstructed_kdf_transforms_identically() {
        let seed = [0x11u8; KEY_LEN];
        let salt = [0x22u8; SALT_LEN];

        let mut original = AesKdf::default();
        original.set_rounds(64).unwrap();

        let rebuilt = original.config().instantiate().unwrap();
        assert_eq!(
            *original.transform(&seed, &salt).unwrap(),
            *rebuilt.transform(&seed, &salt).unwrap()
        );
    }

    #[test]
    fn argon2_config_roundtrip_preserves_memory_params() {
        let mut kdf = Argon2Kdf::default();
        kdf.set_parallelism(2).unwrap();
        kdf.set_memory(32 * 1024).unwrap();

        let config = kdf.config();
        assert_eq!(config.memory_kib, Some(32 * 1024));
        assert_eq!(config.parallelism, Some(2));

        let rebuilt = config.instantiate().unwrap();
        assert_eq!(rebuilt.config(), config);
    }

    #[test]
    fn memory_params_on_aes_kdf_rejected() {
        let config = KdfConfig {
            kind: KdfKind::AesKdf,
            rounds: 1000,
            memory_kib: Some(1024),
            parallelism: None,
        };

        assert!(matches!(
            config.instantiate(),
            Err(KeyError::InvalidKdfParameters(_))
        ));
    }

    #[test]
    fn advisory_thresholds() {
        assert_eq!(
            KdfKind::AesKdf.rounds_advisory(50_000),
            Some(RoundsAdvisory::TooLow)
        );
        assert_eq!(KdfKind::AesKdf.rounds_advisory(1_000_000), None);
        assert_eq!(
            KdfKind::Argon2.rounds_advisory(50_000),
            Some(RoundsAdvisory::TooHigh)
        );
        assert_eq!(KdfKind::Argon2.rounds_advisory(10), None);
    }
}
