//! Off-thread execution for CPU-bound key work.
//!
//! Transforms and benchmarks are blocking by design; a cooperative UI loop
//! must not run them inline. [`run_and_wait`] farms a job out to a worker
//! thread and blocks only the calling context on a single-result channel,
//! so the core objects keep their single-owner-thread discipline.
//!
//! There is no mid-job cancellation: a started transform runs to completion,
//! and cancelling means abandoning the result.

use std::sync::mpsc;
use std::thread;

/// Run `job` on a worker thread and block until its result is back.
///
/// A panic inside the job is propagated to the caller rather than swallowed.
pub fn run_and_wait<T, F>(job: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);
    let worker = thread::spawn(move || {
        // Ignore a send error: the receiver only disappears if the caller
        // itself panicked.
        let _ = tx.send(job());
    });

    match rx.recv() {
        Ok(result) => {
            let _ = worker.join();
            result
        }
        Err(_) => {
            // The job died before sending; re-raise its panic here.
            match worker.join() {
                Err(panic) => std::panic::resume_unwind(panic),
                Ok(()) => unreachable!("worker finished without sending a result"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_job_result() {
        let n = run_and_wait(|| 6 * 7);
        assert_eq!(n, 42);
    }

    #[test]
    fn runs_off_the_calling_thread() {
        let caller = thread::current().id();
        let worker = run_and_wait(move || thread::current().id());
        assert_ne!(caller, worker);
    }

    #[test]
    fn propagates_errors_as_values() {
        let result: Result<u32, String> = run_and_wait(|| Err("boom".into()));
        assert_eq!(result, Err("boom".to_string()));
    }

    #[test]
    #[should_panic(expected = "job exploded")]
    fn propagates_panics() {
        run_and_wait(|| -> u32 { panic!("job exploded") });
    }
}
