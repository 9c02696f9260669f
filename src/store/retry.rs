/// How many times a mutation may run its fetch-compute-store cycle when the
/// store keeps rejecting the write as stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 3;

    /// Surface the first conflict to the caller.
    pub const fn none() -> Self {
        RetryPolicy { max_attempts: 1 }
    }

    /// Allow up to `max_attempts` cycles in total. Zero is treated as one.
    pub const fn attempts(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
        }
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether another cycle may follow attempt number `attempt` (1-based).
    pub const fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::attempts(Self::DEFAULT_ATTEMPTS)
    }
}
