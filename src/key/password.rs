use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{FactorKind, KeyFactor};
use crate::error::KeyError;

/// A password factor.
///
/// Only the SHA-256 digest of the password is stored; the password itself is
/// not retained after construction.
pub struct PasswordFactor {
    digest: Zeroizing<[u8; 32]>,
}

impl PasswordFactor {
    pub fn new(password: &str) -> Self {
        let digest = Sha256::digest(password.as_bytes());
        Self {
            digest: Zeroizing::new(digest.into()),
        }
    }
}

impl KeyFactor for PasswordFactor {
    fn kind(&self) -> FactorKind {
        FactorKind::Password
    }

    fn key_material(&self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        Ok(Zeroizing::new(self.digest.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_material_is_deterministic() {
        let a = PasswordFactor::new("hunter2");
        let b = PasswordFactor::new("hunter2");

        assert_eq!(a.key_material().unwrap(), b.key_material().unwrap());
    }

    #[test]
    fn different_passwords_differ() {
        let a = PasswordFactor::new("hunter2");
        let b = PasswordFactor::new("hunter3");

        assert_ne!(a.key_material().unwrap(), b.key_material().unwrap());
    }

    #[test]
    fn material_is_digest_not_password() {
        let factor = PasswordFactor::new("hunter2");
        let material = factor.key_material().unwrap();

        assert_eq!(material.len(), 32);
        assert_ne!(material.as_slice(), b"hunter2");
    }
}
