use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::KeyError;
use crate::kdf::{generate_salt, Kdf, KdfConfig, KdfKind, KEY_LEN, SALT_LEN};
use crate::key::CompositeKey;

/// Stable identifier for the database content cipher.
///
/// Configuration only: content encryption happens in the format layer, the
/// core just records and reports the choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherKind {
    Aes256Gcm,
    XChaCha20Poly1305,
}

impl CipherKind {
    pub const ALL: [CipherKind; 2] = [CipherKind::Aes256Gcm, CipherKind::XChaCha20Poly1305];

    pub const fn uuid(self) -> [u8; 16] {
        match self {
            CipherKind::Aes256Gcm => [
                0x31, 0xc1, 0xf2, 0xe6, 0xbf, 0x71, 0x43, 0x50, 0xbe, 0x58, 0x05, 0x21, 0x6a,
                0xfc, 0x5a, 0xff,
            ],
            CipherKind::XChaCha20Poly1305 => [
                0xd6, 0x03, 0x8a, 0x2b, 0x8b, 0x6f, 0x4c, 0xb5, 0xa5, 0x24, 0x33, 0x9a, 0x31,
                0xdb, 0xb5, 0x9a,
            ],
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CipherKind::Aes256Gcm => "AES-256-GCM",
            CipherKind::XChaCha20Poly1305 => "XChaCha20-Poly1305",
        }
    }
}

struct DatabaseState {
    cipher: CipherKind,
    kdf: Box<dyn Kdf>,
    salt: [u8; SALT_LEN],
    composite: Option<CompositeKey>,
    key: Option<Zeroizing<[u8; KEY_LEN]>>,
}

/// The single mutable consumer of finished composite keys.
///
/// Owns the cipher choice and the current KDF configuration, and holds the
/// transformed key once a composite key has been committed. All state lives
/// behind one mutex: methods take `&self` so a worker thread can re-key while
/// the owner keeps a shared handle, and the lock is held for the whole re-key
/// so commits are atomic and concurrent re-keys serialize.
pub struct Database {
    state: Mutex<DatabaseState>,
}

impl Database {
    pub fn new() -> Result<Self, KeyError> {
        Ok(Self {
            state: Mutex::new(DatabaseState {
                cipher: CipherKind::XChaCha20Poly1305,
                kdf: KdfKind::Argon2.new_kdf(),
                salt: generate_salt()?,
                composite: None,
                key: None,
            }),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DatabaseState> {
        // A poisoned lock means a transform panicked before committing
        // anything; the state itself is still the last committed one.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cipher(&self) -> CipherKind {
        self.lock().cipher
    }

    pub fn set_cipher(&self, cipher: CipherKind) {
        self.lock().cipher = cipher;
    }

    /// Snapshot of the current KDF parameter set.
    pub fn kdf(&self) -> KdfConfig {
        self.lock().kdf.config()
    }

    /// The salt the current key was transformed with; persisted by the
    /// header layer alongside the KDF parameters.
    pub fn transform_salt(&self) -> [u8; SALT_LEN] {
        self.lock().salt
    }

    /// The current transformed key, if a composite key has been committed.
    pub fn key(&self) -> Option<Zeroizing<[u8; KEY_LEN]>> {
        self.lock().key.clone()
    }

    /// Re-key with a new composite key under the current KDF.
    ///
    /// All-or-nothing: a fresh salt is drawn and the composite transformed
    /// first; only on success are key, salt and composite replaced. The
    /// composite is consumed and never mutated afterwards.
    pub fn change_key(&self, composite: CompositeKey) -> Result<(), KeyError> {
        let mut state = self.lock();

        let salt = generate_salt()?;
        let key = composite.transformed_key(&*state.kdf, &salt)?;

        state.salt = salt;
        state.key = Some(key);
        state.composite = Some(composite);
        Ok(())
    }

    /// Switch to a new KDF, re-transforming the stored composite key.
    ///
    /// All-or-nothing: if the transform fails, cipher, KDF, salt and key all
    /// remain exactly as they were. Without a committed composite key there
    /// is nothing to transform and only the configuration is swapped.
    pub fn change_kdf(&self, kdf: Box<dyn Kdf>) -> Result<(), KeyError> {
        let mut state = self.lock();

        let Some(composite) = &state.composite else {
            state.kdf = kdf;
            return Ok(());
        };

        let salt = generate_salt()?;
        let key = composite.transformed_key(&*kdf, &salt)?;

        state.kdf = kdf;
        state.salt = salt;
        state.key = Some(key);
        Ok(())
    }
}
