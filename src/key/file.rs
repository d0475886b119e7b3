use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{FactorKind, KeyFactor};
use crate::error::KeyError;

/// A key-file factor.
///
/// The file is read on every [`KeyFactor::key_material`] call and the handle
/// released before returning, so an edited or re-mounted key file takes
/// effect immediately. Recognized contents:
/// - exactly 32 raw bytes: used verbatim
/// - exactly 64 ASCII-hex characters: decoded to 32 bytes
/// - anything else: SHA-256 of the full contents
pub struct FileFactor {
    path: PathBuf,
}

impl FileFactor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyFactor for FileFactor {
    fn kind(&self) -> FactorKind {
        FactorKind::KeyFile
    }

    fn key_material(&self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        let contents = Zeroizing::new(fs::read(&self.path).map_err(|e| {
            KeyError::FactorUnavailable(format!("key file '{}': {e}", self.path.display()))
        })?);

        if contents.len() == 32 {
            return Ok(Zeroizing::new(contents.to_vec()));
        }

        if contents.len() == 64 {
            if let Ok(decoded) = hex_decode(&contents) {
                return Ok(decoded);
            }
        }

        Ok(Zeroizing::new(Sha256::digest(&*contents).to_vec()))
    }
}

fn hex_decode(contents: &[u8]) -> Result<Zeroizing<Vec<u8>>, hex::FromHexError> {
    let text = std::str::from_utf8(contents).map_err(|_| hex::FromHexError::OddLength)?;
    hex::decode(text.trim()).map(Zeroizing::new)
}
