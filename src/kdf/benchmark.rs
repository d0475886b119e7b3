use std::time::{Duration, Instant};

use super::{Kdf, KEY_LEN, SALT_LEN};
use crate::error::KeyError;

/// Accepted deviation from the target duration (±10%).
pub const TOLERANCE: f64 = 0.10;

/// Round count the search starts from.
const START_ROUNDS: u64 = 2;

/// Probe budget before giving up.
const MAX_PROBES: u32 = 16;

/// Fixed probe input; calibration only cares about timing, not output.
const PROBE_SEED: [u8; KEY_LEN] = [0x7C; KEY_LEN];
const PROBE_SALT: [u8; SALT_LEN] = [0x3A; SALT_LEN];

/// Calibrate `kdf`'s round count so a single transform takes roughly
/// `target` wall-clock time.
///
/// The search is one-dimensional: memory cost and parallelism of memory-hard
/// KDFs are held at their configured values and only the round count moves.
/// Candidates grow monotonically (proportional scaling toward the target,
/// floor 1), and each probe depends on the previous timing, so iterations are
/// strictly sequential. The call blocks for several multiples of `target`;
/// interactive callers should run it through [`crate::task::run_and_wait`].
///
/// On success the kdf is left configured with the returned round count. If
/// the search cannot settle inside the tolerance band within the probe
/// budget, [`KeyError::BenchmarkTimeout`] carries the last candidate, which
/// callers should keep as an approximate result.
pub fn benchmark(kdf: &mut dyn Kdf, target: Duration) -> Result<u64, KeyError> {
    let target_secs = target.as_secs_f64();
    let mut rounds = START_ROUNDS;

    for _ in 0..MAX_PROBES {
        kdf.set_rounds(rounds)?;

        let started = Instant::now();
        kdf.transform(&PROBE_SEED, &PROBE_SALT)?;
        let elapsed = started.elapsed().as_secs_f64();

        if (elapsed - target_secs).abs() <= target_secs * TOLERANCE {
            return Ok(rounds);
        }

        // Sub-microsecond probes would make the scaling step degenerate.
        let elapsed = elapsed.max(1e-6);
        let scaled = ((rounds as f64) * target_secs / elapsed) as u64;
        let next = scaled.max(1).max(rounds);
        if next == rounds {
            // Already overshooting at the floor; growing further cannot help.
            return Err(KeyError::BenchmarkTimeout { rounds });
        }
        rounds = next;
    }

    Err(KeyError::BenchmarkTimeout { rounds })
}
