use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Paces upstream requests to a per-minute budget.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Arc<DirectRateLimiter>,
    per_minute: u32,
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer")
            .field("per_minute", &self.per_minute)
            .finish()
    }
}

impl RequestPacer {
    /// A zero budget is treated as one request per minute.
    pub fn per_minute(requests: u32) -> Self {
        let per_minute = requests.max(1);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_per_minute(per_minute))),
            per_minute,
        }
    }

    /// Take one cell if the budget allows it right now.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Wait until the budget allows one more request.
    pub async fn acquire(&self) {
        if self.try_acquire() {
            return;
        }
        tracing::debug!(per_minute = self.per_minute, "rate budget exhausted; waiting");
        self.limiter.until_ready().await;
    }

    pub const fn budget(&self) -> u32 {
        self.per_minute
    }
}

fn quota_per_minute(per_minute: u32) -> Quota {
    let burst = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
    let period = Duration::from_secs_f64((60.0 / f64::from(burst.get())).max(0.001));
    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_minute(burst))
        .allow_burst(burst)
}
