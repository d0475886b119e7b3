use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes256;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use super::{Kdf, KdfConfig, KdfKind, KEY_LEN, SALT_LEN};
use crate::error::KeyError;

pub const DEFAULT_ROUNDS: u64 = 100_000;

/// AES-based iterated key stretching.
///
/// The 32-byte salt keys an AES-256 block cipher; the two 16-byte halves of
/// the seed are encrypted in place `rounds` times and the result hashed with
/// SHA-256. Cost is linear in the round count; there is no memory parameter.
#[derive(Debug, Clone)]
pub struct AesKdf {
    rounds: u64,
}

impl Default for AesKdf {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl Kdf for AesKdf {
    fn kind(&self) -> KdfKind {
        KdfKind::AesKdf
    }

    fn rounds(&self) -> u64 {
        self.rounds
    }

    fn set_rounds(&mut self, rounds: u64) -> Result<(), KeyError> {
        if rounds < 1 {
            return Err(KeyError::InvalidKdfParameters(
                "round count must be >= 1".into(),
            ));
        }
        self.rounds = rounds;
        Ok(())
    }

    fn transform(
        &self,
        seed: &[u8; KEY_LEN],
        salt: &[u8; SALT_LEN],
    ) -> Result<Zeroizing<[u8; KEY_LEN]>, KeyError> {
        if self.rounds < 1 {
            return Err(KeyError::InvalidKdfParameters(
                "round count must be >= 1".into(),
            ));
        }

        let mut key = GenericArray::from(*salt);
        let cipher = Aes256::new(&key);
        key.as_mut_slice().zeroize();

        let mut lo = GenericArray::clone_from_slice(&seed[..16]);
        let mut hi = GenericArray::clone_from_slice(&seed[16..]);
        for _ in 0..self.rounds {
            cipher.encrypt_block(&mut lo);
            cipher.encrypt_block(&mut hi);
        }

        let mut hasher = Sha256::new();
        hasher.update(&lo);
        hasher.update(&hi);
        lo.as_mut_slice().zeroize();
        hi.as_mut_slice().zeroize();

        Ok(Zeroizing::new(hasher.finalize().into()))
    }

    fn config(&self) -> KdfConfig {
        KdfConfig {
            kind: KdfKind::AesKdf,
            rounds: self.rounds,
            memory_kib: None,
            parallelism: None,
        }
    }
}
