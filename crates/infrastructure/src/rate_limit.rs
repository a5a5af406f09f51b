use ferrous_recon_domain::DomainError;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const UNTHROTTLED_PER_SECOND: u32 = 1_000_000;

/// Token-bucket throttle shared by everything that talks to one remote endpoint.
pub struct RateGate {
    limiter: DefaultDirectRateLimiter,
}

impl RateGate {
    /// Allows `per_second` requests each second. Zero is treated as one.
    pub fn per_second(per_second: u32) -> Self {
        Self {
            limiter: RateLimiter::direct(Quota::per_second(Self::rate(per_second))),
        }
    }

    /// Allows one request per `period`; a zero period disables throttling.
    pub fn every(period: Duration) -> Self {
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(Self::rate(UNTHROTTLED_PER_SECOND)));
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    fn rate(per_second: u32) -> NonZeroU32 {
        NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN)
    }

    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Waits for the next slot, giving up when `ctx` is cancelled.
    pub async fn ready(&self, ctx: &CancellationToken) -> Result<(), DomainError> {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(DomainError::Cancelled),
            _ = self.wait() => Ok(()),
        }
    }
}
