use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::KeyFactor;
use crate::error::KeyError;
use crate::kdf::{Kdf, KEY_LEN, SALT_LEN};

/// An ordered collection of key factors combined into one master seed.
///
/// Factor order is significant: the seed is a hash chain over the factors'
/// material, so swapping two factors yields a different key. The composite is
/// owned by a single caller at a time and is not mutated after being consumed
/// by a transform.
#[derive(Default)]
pub struct CompositeKey {
    factors: Vec<Box<dyn KeyFactor>>,
}

impl CompositeKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a factor to the end of the sequence.
    pub fn add_factor(&mut self, factor: Box<dyn KeyFactor>) {
        self.factors.push(factor);
    }

    /// Remove and return the factor at `index`.
    pub fn remove_factor(&mut self, index: usize) -> Result<Box<dyn KeyFactor>, KeyError> {
        if index >= self.factors.len() {
            return Err(KeyError::IndexOutOfRange {
                index,
                len: self.factors.len(),
            });
        }
        Ok(self.factors.remove(index))
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Combine all factor material into the 32-byte master seed.
    ///
    /// The combination is a strict left-to-right hash chain:
    /// `seed_0 = SHA256("")`, `seed_i = SHA256(seed_{i-1} || material_i)`.
    /// An empty composite is computable (the chain start); refusing to
    /// proceed with zero factors is the caller's policy.
    pub fn raw_key(&self) -> Result<Zeroizing<[u8; 32]>, KeyError> {
        let mut seed: Zeroizing<[u8; 32]> = Zeroizing::new(Sha256::digest(b"").into());

        for factor in &self.factors {
            let material = factor.key_material()?;
            let mut hasher = Sha256::new();
            hasher.update(&*seed);
            hasher.update(&*material);
            *seed = hasher.finalize().into();
        }

        Ok(seed)
    }

    /// Derive the final encryption key: compute the seed, then stretch it
    /// through `kdf`.
    ///
    /// CPU-bound; callers on an interactive thread should run this through
    /// the task layer.
    pub fn transformed_key(
        &self,
        kdf: &dyn Kdf,
        salt: &[u8; SALT_LEN],
    ) -> Result<Zeroizing<[u8; KEY_LEN]>, KeyError> {
        // seed is zeroized on drop
        let seed = self.raw_key()?;
        kdf.transform(&seed, salt)
    }
}

impl std::fmt::Debug for CompositeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeKey")
            .field("factors", &self.factors.len())
            .finish()
    }
}

/// Two composite keys are equal when they derive the same seed. Factors that
/// cannot currently produce material compare unequal.
impl PartialEq for CompositeKey {
    fn eq(&self, other: &Self) -> bool {
        match (self.raw_key(), other.raw_key()) {
            (Ok(a), Ok(b)) => *a == *b,
            _ => false,
        }
    }
}
