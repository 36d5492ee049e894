//! Artificial latency applied by the info handler before it responds.

use std::time::Duration;

use rand::Rng;

/// Decides how long a handler waits before writing its response.
pub trait Delay: Send + Sync + 'static {
    fn next_delay(&self) -> Duration;
}

/// Respond immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    #[inline]
    fn next_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Uniformly random whole-millisecond delay in `[0, max)`.
#[derive(Debug, Clone, Copy)]
pub struct RandomDelay {
    max: Duration,
}

impl RandomDelay {
    pub const DEFAULT_MAX: Duration = Duration::from_millis(100);

    pub fn new(max: Duration) -> Self {
        Self { max }
    }
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX)
    }
}

impl Delay for RandomDelay {
    fn next_delay(&self) -> Duration {
        let max_ms = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
    }
}

/// A fixed delay.
impl Delay for Duration {
    #[inline]
    fn next_delay(&self) -> Duration {
        *self
    }
}
