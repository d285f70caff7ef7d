//! Fixed-interval repeating work shared by the fetch and notify loops
//!
//! [`run_periodic`] runs a tick immediately, then once per period until the
//! cancellation token fires. Ticks never overlap: a slow tick only delays the
//! next one, missed ticks are not replayed in a burst.

use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::FailurePolicy;
use crate::error::{Error, Result};

/// Run `tick` every `period` until `cancel` fires
///
/// Cancellation is checked at every tick boundary and returns `Ok(())`. A
/// failing tick ends the loop with its error under [`FailurePolicy::Abort`];
/// under [`FailurePolicy::SkipAndContinue`] it is logged and the loop waits for
/// the next tick.
///
/// The tick itself is never interrupted half-way; long-running work inside it
/// should observe `cancel` on its own.
pub async fn run_periodic<F, Fut>(
    name: &str,
    period: Duration,
    cancel: &CancellationToken,
    policy: FailurePolicy,
    mut tick: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if period.is_zero() {
        return Err(Error::config(
            name,
            format!("{} interval must be greater than zero", name),
        ));
    }

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(task = name, period_secs = period.as_secs_f64(), "periodic task started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        debug!(task = name, "tick");

        if let Err(e) = tick().await {
            match policy {
                FailurePolicy::Abort => {
                    warn!(task = name, error = %e, "tick failed, stopping");
                    return Err(e);
                }
                FailurePolicy::SkipAndContinue => {
                    warn!(task = name, error = %e, "tick failed, continuing with next tick");
                }
            }
        }
    }

    info!(task = name, "periodic task cancelled");
    Ok(())
}
