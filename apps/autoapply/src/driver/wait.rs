//! Bounded polling. Every "wait until" in the crate goes through here.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::driver::DriverError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
#[error("condition not met within {timeout:?}")]
pub struct WaitTimeout {
    pub timeout: Duration,
}

impl From<WaitTimeout> for DriverError {
    fn from(e: WaitTimeout) -> Self {
        DriverError::Timeout(e.to_string())
    }
}

/// Polls `predicate` until it yields `Some`, or fails with [`WaitTimeout`].
///
/// The predicate is evaluated once immediately, then every `poll_interval`
/// until `timeout` has elapsed.
pub async fn await_condition<T, F, Fut>(
    mut predicate: F,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<T, WaitTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = predicate().await {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(WaitTimeout { timeout });
        }
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Like [`await_condition`] for fallible checks. Transient driver errors
/// (stale references, missing elements) count as "not yet"; anything else aborts.
pub async fn await_driver<T, F, Fut>(
    mut check: F,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<T, DriverError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, DriverError>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match check().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) if e.is_transient() => {}
            Err(e) => return Err(e),
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(WaitTimeout { timeout }.into());
        }
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}
