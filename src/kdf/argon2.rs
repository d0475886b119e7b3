use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use super::{Kdf, KdfConfig, KdfKind, KEY_LEN, SALT_LEN};
use crate::error::KeyError;

/// Default number of iterations.
pub const DEFAULT_ROUNDS: u32 = 3;
/// Default memory cost (64 MiB).
pub const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
/// Default number of threads.
pub const DEFAULT_PARALLELISM: u32 = 1;
/// Argon2 requires at least 8 KiB of working set per lane.
pub const MIN_MEMORY_KIB_PER_LANE: u32 = 8;

/// Memory-hard key stretching via Argon2id (v0x13).
///
/// Cost parameters are validated on every setter; a rejected value leaves the
/// previous one in place so callers can report and fall back rather than
/// clamp blindly.
#[derive(Debug, Clone)]
pub struct Argon2Kdf {
    rounds: u32,
    memory_kib: u32,
    parallelism: u32,
}

impl Default for Argon2Kdf {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            memory_kib: DEFAULT_MEMORY_KIB,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl Argon2Kdf {
    pub fn memory_kib(&self) -> u32 {
        self.memory_kib
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    /// Set the memory cost in KiB. Values below the per-lane minimum are
    /// rejected and the prior value kept.
    pub fn set_memory(&mut self, memory_kib: u32) -> Result<(), KeyError> {
        if memory_kib < MIN_MEMORY_KIB_PER_LANE * self.parallelism {
            return Err(KeyError::InvalidKdfParameters(format!(
                "memory cost must be at least {} KiB for {} thread(s)",
                MIN_MEMORY_KIB_PER_LANE * self.parallelism,
                self.parallelism
            )));
        }
        self.memory_kib = memory_kib;
        Ok(())
    }

    /// Set the thread count. Zero, or a value the current memory cost cannot
    /// support, is rejected and the prior value kept.
    pub fn set_parallelism(&mut self, parallelism: u32) -> Result<(), KeyError> {
        if parallelism < 1 {
            return Err(KeyError::InvalidKdfParameters(
                "parallelism must be >= 1".into(),
            ));
        }
        if self.memory_kib < MIN_MEMORY_KIB_PER_LANE * parallelism {
            return Err(KeyError::InvalidKdfParameters(format!(
                "{parallelism} thread(s) need at least {} KiB of memory",
                MIN_MEMORY_KIB_PER_LANE * parallelism
            )));
        }
        self.parallelism = parallelism;
        Ok(())
    }
}

impl Kdf for Argon2Kdf {
    fn kind(&self) -> KdfKind {
        KdfKind::Argon2
    }

    fn rounds(&self) -> u64 {
        u64::from(self.rounds)
    }

    fn set_rounds(&mut self, rounds: u64) -> Result<(), KeyError> {
        if rounds < 1 {
            return Err(KeyError::InvalidKdfParameters(
                "round count must be >= 1".into(),
            ));
        }
        self.rounds = u32::try_from(rounds).map_err(|_| {
            KeyError::InvalidKdfParameters(format!("round count {rounds} exceeds Argon2 maximum"))
        })?;
        Ok(())
    }

    fn transform(
        &self,
        seed: &[u8; KEY_LEN],
        salt: &[u8; SALT_LEN],
    ) -> Result<Zeroizing<[u8; KEY_LEN]>, KeyError> {
        let params = Params::new(self.memory_kib, self.rounds, self.parallelism, Some(KEY_LEN))
            .map_err(|e| KeyError::InvalidKdfParameters(e.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        argon2
            .hash_password_into(seed, salt, &mut *key)
            .map_err(|e| KeyError::KdfTransformFailed(format!("argon2: {e}")))?;

        Ok(key)
    }

    fn config(&self) -> KdfConfig {
        KdfConfig {
            kind: KdfKind::Argon2,
            rounds: u64::from(self.rounds),
            memory_kib: Some(self.memory_kib),
            parallelism: Some(self.parallelism),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_argon2() -> Argon2Kdf {
        let mut kdf = Argon2Kdf::default();
        kdf.set_rounds(1).unwrap();
        kdf.set_memory(1024).unwrap();
        kdf
    }

    #[test]
    fn transform_is_deterministic() {
        let kdf = small_argon2();
        let seed = [0x55u8; KEY_LEN];
        let salt = [0x66u8; SALT_LEN];

        assert_eq!(
            *kdf.transform(&seed, &salt).unwrap(),
            *kdf.transform(&seed, &salt).unwrap()
        );
    }

    #[test]
    fn memory_cost_changes_output() {
        let seed = [0x55u8; KEY_LEN];
        let salt = [0x66u8; SALT_LEN];

        let a = small_argon2();
        let mut b = small_argon2();
        b.set_memory(2048).unwrap();

        assert_ne!(
            *a.transform(&seed, &salt).unwrap(),
            *b.transform(&seed, &salt).unwrap()
        );
    }

    #[test]
    fn memory_below_minimum_keeps_prior_value() {
        let mut kdf = Argon2Kdf::default();
        assert!(kdf.set_memory(4).is_err());
        assert_eq!(kdf.memory_kib(), DEFAULT_MEMORY_KIB);
    }

    #[test]
    fn zero_parallelism_rejected() {
        let mut kdf = Argon2Kdf::default();
        assert!(kdf.set_parallelism(0).is_err());
        assert_eq!(kdf.parallelism(), DEFAULT_PARALLELISM);
    }

    #[test]
    fn parallelism_must_fit_memory() {
        let mut kdf = Argon2Kdf::default();
        kdf.set_memory(MIN_MEMORY_KIB_PER_LANE * 2).unwrap();

        assert!(kdf.set_parallelism(2).is_ok());
        assert!(kdf.set_parallelism(3).is_err());
        assert_eq!(kdf.parallelism(), 2);
    }

    #[test]
    fn rounds_above_u32_rejected() {
        let mut kdf = Argon2Kdf::default();
        assert!(kdf.set_rounds(u64::from(u32::MAX) + 1).is_err());
        assert_eq!(kdf.rounds(), u64::from(DEFAULT_ROUNDS));
    }
}
