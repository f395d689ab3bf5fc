//! Retry execution with exponential backoff and jitter
//!
//! Network-synced folders (OneDrive and friends) and antivirus scanners hold
//! short-lived handles on data files, so a single failed rename or read does
//! not mean the operation cannot succeed. [`RetryPolicy::run`] re-attempts a
//! fallible operation a bounded number of times, backing off between
//! attempts, and gives up immediately on errors classified as permanent.

use rand::Rng;
use std::time::Duration;

/// Backoff schedule for a retried operation.
///
/// Attempt 1 is the first try, not a retry. The delay before retry `n` is
/// `initial_delay * backoff_multiplier^(n-1)`, capped at `max_delay` and
/// optionally scaled by a uniform jitter factor in `[0.5, 1.0]`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl RetryPolicy {
    /// Policy for local file operations: few attempts, short delays.
    ///
    /// Tuned for the brief exclusive handles taken by sync clients and AV
    /// scanners, which typically clear within tens of milliseconds.
    pub fn file_ops() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(800),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Policy for network operations: longer delays, more patience.
    pub fn network_ops() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            backoff_multiplier: 3.0,
            jitter: true,
        }
    }

    /// Run `op` until it succeeds, retries exhaust, or an error is
    /// classified permanent.
    ///
    /// `should_retry` is consulted after every failure; when it returns
    /// false, or `max_attempts` has been reached, the original error is
    /// returned immediately with no further delay. `on_retry` fires once per
    /// upcoming retry (so never for the final failing attempt).
    pub fn run<T, E, F>(
        &self,
        should_retry: impl Fn(&E) -> bool,
        mut on_retry: impl FnMut(u32, &E),
        mut op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        let mut attempt = 1u32;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !should_retry(&err) {
                        return Err(err);
                    }
                    on_retry(attempt, &err);
                    std::thread::sleep(self.delay_for(attempt));
                    attempt += 1;
                }
            }
        }
    }

    /// Delay before the retry that follows failed attempt `attempt`.
    fn delay_for(&self, attempt: u32) -> Duration {
        let exp = (attempt - 1).min(30);
        let raw = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exp as i32);
        let capped = raw.min(self.max_delay.as_secs_f64());
        let scaled = if self.jitter {
            capped * rand::thread_rng().gen_range(0.5..=1.0)
        } else {
            capped
        };
        Duration::from_secs_f64(scaled)
    }
}

/// Whether an I/O error is expected to clear on its own after a short delay.
///
/// Covers the error classes seen when another process briefly holds a file:
/// would-block, timeouts, interrupted syscalls, resource-busy, and
/// descriptor exhaustion. Permission errors are permanent at this level
/// (read-only volumes stay read-only); the rename path in the atomic writer
/// makes its own narrower exception for Windows sharing violations.
pub fn is_transient_io(err: &std::io::Error) -> bool {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted => true,
        _ => matches!(
            err.raw_os_error(),
            // EBUSY, EAGAIN, ETXTBSY, EMFILE on unix;
            // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION on Windows.
            Some(16) | Some(11) | Some(26) | Some(24) | Some(32) | Some(33)
        ),
    }
}

/// Whether a network-layer error message describes a transient condition.
///
/// Matches timeouts, DNS failures, connection resets, and HTTP 5xx status
/// codes. The status match requires a bounded three-digit token beginning
/// with `5` so digit runs inside larger numbers (`15003`) never match.
pub fn is_transient_network(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    if ["timed out", "timeout", "dns", "connection reset", "econnreset", "enotfound"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return true;
    }
    has_5xx_token(message)
}

/// Look for a standalone `5xx` status token in `message`.
fn has_5xx_token(message: &str) -> bool {
    let bytes = message.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'5'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_digit()
            && bytes[i + 2].is_ascii_digit()
        {
            let before_ok = i == 0 || !bytes[i - 1].is_ascii_digit();
            let after_ok = i + 3 >= bytes.len() || !bytes[i + 3].is_ascii_digit();
            if before_ok && after_ok {
                return true;
            }
        }
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io;

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[test]
    fn succeeds_first_try_without_callbacks() {
        let retries = Cell::new(0u32);
        let result: Result<i32, io::Error> = instant_policy(3).run(
            |_| true,
            |_, _| retries.set(retries.get() + 1),
            || Ok(42),
        );
        assert_eq!(result.unwrap(), 42);
        assert_eq!(retries.get(), 0);
    }

    #[test]
    fn exhaustion_invokes_op_max_attempts_times() {
        let calls = Cell::new(0u32);
        let retries = Cell::new(0u32);
        let result: Result<(), io::Error> = instant_policy(3).run(
            |_| true,
            |_, _| retries.set(retries.get() + 1),
            || {
                calls.set(calls.get() + 1);
                Err(io::Error::from(io::ErrorKind::WouldBlock))
            },
        );
        assert!(result.is_err());
        assert_eq!(calls.get(), 3, "operation runs exactly max_attempts times");
        assert_eq!(retries.get(), 2, "on_retry skips the final failing attempt");
    }

    #[test]
    fn non_retryable_error_short_circuits() {
        let calls = Cell::new(0u32);
        let result: Result<(), io::Error> = instant_policy(10).run(
            |_| false,
            |_, _| panic!("on_retry must not fire"),
            || {
                calls.set(calls.get() + 1);
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            },
        );
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn recovers_after_transient_failures() {
        let calls = Cell::new(0u32);
        let result: Result<&str, io::Error> = instant_policy(5).run(
            |_| true,
            |_, _| {},
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(io::Error::from(io::ErrorKind::WouldBlock))
                } else {
                    Ok("done")
                }
            },
        );
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn delay_is_capped_at_max() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
            backoff_multiplier: 10.0,
            jitter: false,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(250));
        assert_eq!(policy.delay_for(8), Duration::from_millis(250));
    }

    #[test]
    fn jitter_stays_within_half_to_full_delay() {
        let policy = RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_millis(200),
            backoff_multiplier: 1.0,
            jitter: true,
        };
        for _ in 0..100 {
            let d = policy.delay_for(1);
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(200));
        }
    }

    #[test]
    fn classifies_transient_io_errors() {
        assert!(is_transient_io(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(is_transient_io(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(is_transient_io(&io::Error::from_raw_os_error(16))); // EBUSY
        assert!(is_transient_io(&io::Error::from_raw_os_error(24))); // EMFILE
        assert!(!is_transient_io(&io::Error::from(io::ErrorKind::PermissionDenied)));
        assert!(!is_transient_io(&io::Error::from(io::ErrorKind::NotFound)));
    }

    #[test]
    fn network_classification_matches_5xx_as_bounded_token() {
        assert!(is_transient_network("server returned 503 Service Unavailable"));
        assert!(is_transient_network("HTTP 500"));
        assert!(is_transient_network("request timed out"));
        assert!(is_transient_network("getaddrinfo ENOTFOUND host"));
        // Digit runs inside larger numbers must not match.
        assert!(!is_transient_network("record id 15003 rejected"));
        assert!(!is_transient_network("port 8500 refused"));
        assert!(!is_transient_network("batch 5000123 invalid"));
        assert!(!is_transient_network("bad request 404"));
    }
}
