//! Run-wide admission control for cache resolutions.

use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Bounds the number of in-flight resolutions across a whole run.
///
/// Cloning shares the same permit pool, so every task spawned for a run can
/// hold its own handle.
///
/// # Example
///
/// ```rust,ignore
/// let limiter = ConcurrencyLimiter::new(3);
/// let _guard = limiter.acquire().await?;
/// cache.resolve(url, &entity).await
/// ```
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl ConcurrencyLimiter {
    /// Limiter admitting at most `max_concurrent` holders (minimum 1).
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// Configured bound.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Permits not currently held.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a slot. The slot is released when the guard drops.
    pub async fn acquire(&self) -> Result<LimiterGuard, AcquireError> {
        let permit = self.semaphore.clone().acquire_owned().await?;
        Ok(LimiterGuard { _permit: permit })
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<LimiterGuard> {
        let permit = self.semaphore.clone().try_acquire_owned().ok()?;
        Some(LimiterGuard { _permit: permit })
    }
}

/// RAII guard for a limiter slot.
///
/// Releases the slot on drop, including when the holding task fails.
#[derive(Debug)]
pub struct LimiterGuard {
    _permit: OwnedSemaphorePermit,
}
