use std::fmt;

/// Errors produced by the key derivation core.
///
/// All failures are returned as values; invalid configurations are never
/// silently clamped or corrected.
#[derive(Debug)]
pub enum KeyError {
    /// A key factor could not produce material (missing file, disconnected
    /// token, user cancellation).
    FactorUnavailable(String),
    /// A factor index passed to the composite key was out of range.
    IndexOutOfRange { index: usize, len: usize },
    /// KDF cost parameters violate the variant's bounds. The previous valid
    /// value is left in place.
    InvalidKdfParameters(String),
    /// Combining the key factors into a seed failed.
    TransformFailed(String),
    /// The underlying KDF primitive reported an error.
    KdfTransformFailed(String),
    /// Calibration did not converge within the iteration budget. Carries the
    /// last candidate round count; callers should keep it and treat the
    /// estimate as approximate.
    BenchmarkTimeout { rounds: u64 },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::FactorUnavailable(what) => {
                write!(f, "key factor unavailable: {what}")
            }
            KeyError::IndexOutOfRange { index, len } => {
                write!(f, "factor index {index} out of range (have {len})")
            }
            KeyError::InvalidKdfParameters(what) => {
                write!(f, "invalid KDF parameters: {what}")
            }
            KeyError::TransformFailed(what) => {
                write!(f, "key transformation failed: {what}")
            }
            KeyError::KdfTransformFailed(what) => {
                write!(f, "KDF transform failed: {what}")
            }
            KeyError::BenchmarkTimeout { rounds } => {
                write!(
                    f,
                    "benchmark did not converge; last candidate was {rounds} rounds"
                )
            }
        }
    }
}

impl std::error::Error for KeyError {}
