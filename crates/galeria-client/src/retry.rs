//! Bounded exponential-backoff retry around a single transport call
//!
//! Only connection failures are retried. An HTTP answer of any status is a
//! completed fetch and goes straight back to the caller.

use galeria_core::Clock;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::transport::{SubmissionRequest, Transport, TransportError, TransportResponse};

/// Default attempt ceiling
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Delay after the first failure; doubles after each further one
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, first one included
    pub max_attempts: u32,
    /// Wait after failed attempt `i` is `base_delay * 2^i`
    pub base_delay: Duration,
    /// Treat 5xx answers like connection failures. Off by default.
    #[serde(default)]
    pub retry_server_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            retry_server_errors: false,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn retrying_server_errors(mut self) -> Self {
        self.retry_server_errors = true;
        self
    }

    /// Backoff after the failed attempt at `attempt_index` (0-based)
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt_index))
    }

    /// Sum of every backoff when all attempts fail
    pub fn worst_case_wait(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|i| self.delay_for(i))
            .sum()
    }
}

/// Send `request`, retrying transport failures per `policy`
///
/// Sleeps through `clock` so the schedule is observable in tests. Returns
/// the last transport error once `max_attempts` calls have failed; no
/// sleep follows the final attempt.
pub async fn fetch_with_retry<T>(
    transport: &T,
    clock: &dyn Clock,
    request: &SubmissionRequest,
    policy: &RetryPolicy,
) -> Result<TransportResponse, TransportError>
where
    T: Transport + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        let last = attempt + 1 >= max_attempts;

        match transport.send(request).await {
            Ok(response)
                if policy.retry_server_errors && response.is_server_error() && !last =>
            {
                warn!(
                    attempt_id = %request.attempt_id,
                    attempt = attempt + 1,
                    status = response.status,
                    "Server error, retrying"
                );
            }
            Ok(response) => {
                if attempt > 0 {
                    info!(
                        attempt_id = %request.attempt_id,
                        attempts = attempt + 1,
                        status = response.status,
                        "Submission reached the server after retrying"
                    );
                }
                return Ok(response);
            }
            Err(err) if last => {
                warn!(
                    attempt_id = %request.attempt_id,
                    attempts = max_attempts,
                    error = %err,
                    "Giving up on submission"
                );
                return Err(err);
            }
            Err(err) => {
                warn!(
                    attempt_id = %request.attempt_id,
                    attempt = attempt + 1,
                    delay_ms = policy.delay_for(attempt).as_millis() as u64,
                    error = %err,
                    "Transport failure, retrying"
                );
            }
        }

        clock.sleep(policy.delay_for(attempt)).await;
        attempt += 1;
    }
}
