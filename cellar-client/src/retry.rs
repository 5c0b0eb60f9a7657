use std::time::Duration;

use rand::Rng;
use tonic::Code;

use crate::Error;

/// Which failures are worth retrying and how long to pause between attempts.
///
/// One policy value is shared by the read and mutate paths, including the
/// per-entry classification inside bulk apply.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Status codes considered transient.
    pub retry_codes: Vec<Code>,
    /// First backoff pause.
    pub initial_backoff: Duration,
    /// Upper bound on any single pause.
    pub max_backoff: Duration,
    /// Growth factor applied after each attempt.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_codes: vec![Code::DeadlineExceeded, Code::Unavailable, Code::Aborted],
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            multiplier: 1.2,
        }
    }
}

impl RetryPolicy {
    /// Whether `err` is a transient RPC failure under this policy.
    /// Framing, validation, and connection errors are never retryable.
    pub fn is_retryable(&self, err: &Error) -> bool {
        matches!(err, Error::Rpc(_)) && self.retry_codes.contains(&err.code())
    }

    /// Starts a fresh backoff schedule.
    pub fn backoff(&self) -> Backoff {
        Backoff {
            cur: self.initial_backoff,
            max: self.max_backoff,
            multiplier: self.multiplier,
        }
    }
}

/// Jittered exponential backoff. Each [`next_delay`] draws a pause uniformly
/// from zero to the current ceiling, then grows the ceiling by the
/// multiplier up to the cap.
///
/// [`next_delay`]: Backoff::next_delay
#[derive(Debug)]
pub struct Backoff {
    cur: Duration,
    max: Duration,
    multiplier: f64,
}

impl Backoff {
    pub fn next_delay(&mut self) -> Duration {
        let ceiling = self.cur;
        self.cur = Duration::from_secs_f64(
            (self.cur.as_secs_f64() * self.multiplier).min(self.max.as_secs_f64()),
        );

        let millis = ceiling.as_millis() as u64;
        if millis == 0 {
            return ceiling;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
    }
}
