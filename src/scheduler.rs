// src/scheduler.rs
use crate::error::Result;
use crate::types::RustBruterError;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Admission gate for the enumeration pipeline. At most `max_concurrent`
/// candidates hold a permit (and therefore sit inside DNS/HTTP I/O) at any
/// instant; an optional global rate limit paces how fast new candidates
/// enter.
pub struct Scheduler {
    semaphore: Arc<Semaphore>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
    max_concurrent: usize,
}

impl Scheduler {
    pub fn new(max_concurrent: usize, rate_limit: Option<u32>) -> Result<Self> {
        if max_concurrent == 0 {
            return Err(RustBruterError::ConfigError(
                "max_concurrent must be greater than 0".to_string(),
            ));
        }

        let rate_limiter = match rate_limit {
            Some(per_second) => {
                let quota = NonZeroU32::new(per_second).ok_or_else(|| {
                    RustBruterError::ConfigError(
                        "rate_limit must be greater than 0".to_string(),
                    )
                })?;
                Some(Arc::new(RateLimiter::direct(Quota::per_second(quota))))
            }
            None => None,
        };

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            rate_limiter,
            max_concurrent,
        })
    }

    /// Waits until the candidate may enter the pipeline. The permit is held
    /// across the candidate's whole DNS+HTTP lifetime and released on drop,
    /// success or failure.
    pub async fn admit(&self) -> OwnedSemaphorePermit {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("admission semaphore is never closed")
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// How many in-flight task handles the orchestrator may accumulate
    /// before it must drain completions. Keeps peak memory bounded on huge
    /// wordlists while leaving the semaphore as the actual I/O ceiling.
    pub fn batch_capacity(&self) -> usize {
        self.max_concurrent.saturating_mul(4)
    }
}
