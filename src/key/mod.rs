//! Key factors and their composition into a master seed.
//!
//! A [`KeyFactor`] is anything that can contribute raw key material: a
//! password, a key file, a hardware token. A [`CompositeKey`] owns an ordered
//! set of factors and folds their material into a single 32-byte seed.

pub mod composite;
pub mod file;
pub mod password;
pub mod token;

pub use composite::CompositeKey;
pub use file::FileFactor;
pub use password::PasswordFactor;
pub use token::{TokenFactor, TokenProvider};

use zeroize::Zeroizing;

use crate::error::KeyError;

/// Tag identifying the kind of a key factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorKind {
    Password,
    KeyFile,
    Token,
}

/// A single source of key material.
///
/// Producing material may touch an external resource (file, device); the
/// resource is released on every exit path, and the raw secret is never
/// logged or retained beyond the call.
pub trait KeyFactor: Send + Sync {
    fn kind(&self) -> FactorKind;

    /// Produce this factor's raw key material.
    ///
    /// Deterministic for a given input, except for explicitly challenge-based
    /// token factors. Fails with [`KeyError::FactorUnavailable`] when the
    /// underlying secret cannot be obtained.
    fn key_material(&self) -> Result<Zeroizing<Vec<u8>>, KeyError>;
}
