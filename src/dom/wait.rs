//! Bounded waiting
//!
//! Polling a browser for state changes is a bounded retry-with-sleep,
//! never indefinite blocking: every wait has an explicit interval and
//! timeout, and expiry is a clean [`Error::WaitTimeout`].

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Interval and deadline for one bounded wait
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Sleep between probes
    pub interval: Duration,
    /// Give up after this long
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
        }
    }
}

impl PollConfig {
    /// Create a poll config
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Probe repeatedly until a value appears or the deadline passes.
///
/// The probe runs at least once. `Ok(None)` means "not yet" and schedules
/// another attempt after the interval; a probe error aborts the wait
/// immediately. Expiry returns [`Error::WaitTimeout`] with the time
/// actually waited.
pub async fn poll_until<T, F, Fut>(config: PollConfig, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let started = Instant::now();
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        if started.elapsed() >= config.timeout {
            return Err(Error::wait_timeout(started.elapsed().as_millis() as u64));
        }
        tokio::time::sleep(config.interval).await;
    }
}
