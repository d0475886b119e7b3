use zeroize::Zeroizing;

use super::{FactorKind, KeyFactor};
use crate::error::KeyError;

/// A connected hardware token (or software stand-in) that can answer for key
/// material. The wire protocol is the provider's business; the core only sees
/// bytes or a failure.
pub trait TokenProvider: Send + Sync {
    /// Human-readable device label, for error messages and UI listings.
    fn label(&self) -> &str;

    /// Ask the token for key material. Challenge-based providers may return
    /// different bytes per session; that is part of their contract.
    ///
    /// A disconnected device or a cancelled touch prompt maps to
    /// [`KeyError::FactorUnavailable`].
    fn respond(&self) -> Result<Zeroizing<Vec<u8>>, KeyError>;
}

/// A key factor backed by an opaque [`TokenProvider`].
pub struct TokenFactor {
    provider: Box<dyn TokenProvider>,
}

impl TokenFactor {
    pub fn new(provider: Box<dyn TokenProvider>) -> Self {
        Self { provider }
    }

    pub fn label(&self) -> &str {
        self.provider.label()
    }
}

impl KeyFactor for TokenFactor {
    fn kind(&self) -> FactorKind {
        FactorKind::Token
    }

    fn key_material(&self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        self.provider.respond()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Deterministic in-memory provider for tests.
    pub(crate) struct StubToken {
        pub material: Vec<u8>,
        pub connected: bool,
    }

    impl TokenProvider for StubToken {
        fn label(&self) -> &str {
            "stub token"
        }

        fn respond(&self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
            if self.connected {
                Ok(Zeroizing::new(self.material.clone()))
            } else {
                Err(KeyError::FactorUnavailable("stub token disconnected".into()))
            }
        }
    }

    #[test]
    fn connected_token_yields_material() {
        let factor = TokenFactor::new(Box::new(StubToken {
            material: vec![1, 2, 3, 4],
            connected: true,
        }));

        assert_eq!(factor.kind(), FactorKind::Token);
        assert_eq!(factor.key_material().unwrap().as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn disconnected_token_is_unavailable() {
        let factor = TokenFactor::new(Box::new(StubToken {
            material: vec![],
            connected: false,
        }));

        assert!(matches!(
            factor.key_material(),
            Err(KeyError::FactorUnavailable(_))
        ));
    }
}
