//! The clock-aligned sampling loop.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use bon::Builder;
use chrono::{DateTime, Utc};
use tokio::time::sleep;

use crate::{
    api::{envoy, influxdb},
    core::flatten::points_from_sample,
    prelude::*,
};

/// Drives the loop: sleep until the next aligned tick, fetch, flatten, write,
/// repeat until terminated.
///
/// Strictly sequential: the next sleep is only computed after the previous
/// write attempt finished, so ticks never overlap.
#[derive(Builder)]
pub struct Sampler {
    envoy: envoy::Client,
    influxdb: influxdb::Client,

    #[builder(into)]
    interval: Duration,

    retry_failed_writes: bool,
    should_terminate: Arc<AtomicBool>,
}

impl Sampler {
    /// Run until terminated.
    ///
    /// A failed tick is logged and abandoned; it neither breaks the loop nor
    /// shifts the alignment of the next tick.
    pub async fn run(mut self) {
        info!(interval = ?self.interval, "sampling…");
        while !self.should_terminate.load(Ordering::Relaxed) {
            sleep(time_until_next_tick(Utc::now(), self.interval)).await;
            if let Err(error) = self.tick().await {
                warn!("tick failed: {error:#}");
            }
        }
    }

    /// One tick: fetch a snapshot, flatten it, write the batch.
    #[instrument(skip_all)]
    async fn tick(&mut self) -> Result {
        let sample = self.envoy.fetch_sample().await.context("failed to fetch a sample")?;
        let points = points_from_sample(&sample);
        match self.influxdb.write_batch(&points).await {
            Err(error) if self.retry_failed_writes => {
                warn!("write failed, retrying once: {error:#}");
                self.influxdb.write_batch(&points).await
            }
            result => result,
        }
        .context("failed to write the batch")
    }
}

/// Time until the next wall-clock instant that is a whole multiple of the
/// interval.
///
/// Aligning to absolute clock boundaries, rather than to loop start, keeps
/// sample timestamps comparable across restarts and across independent
/// instances. On a boundary this waits a full interval, never zero.
fn time_until_next_tick(now: DateTime<Utc>, interval: Duration) -> Duration {
    // The CLI rejects sub-millisecond intervals; the clamp keeps the
    // remainder arithmetic total regardless.
    let interval_millis = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX).max(1);
    let elapsed_millis = now.timestamp_millis().rem_euclid(interval_millis);
    Duration::from_millis((interval_millis - elapsed_millis).unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(5);

    fn at_millis(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn sleep_lands_on_a_boundary() {
        for millis in [1, 2_300, 4_999, 5_001, 1_700_000_000_123, 1_700_000_004_999] {
            let sleep_for = time_until_next_tick(at_millis(millis), INTERVAL);
            assert!(sleep_for > Duration::ZERO, "at {millis}");
            assert!(sleep_for <= INTERVAL, "at {millis}");
            let wake_millis = millis + i64::try_from(sleep_for.as_millis()).unwrap();
            assert_eq!(wake_millis % 5_000, 0, "at {millis}");
        }
    }

    #[test]
    fn boundary_waits_a_full_interval() {
        assert_eq!(time_until_next_tick(at_millis(1_700_000_000_000), INTERVAL), INTERVAL);
        assert_eq!(time_until_next_tick(at_millis(0), INTERVAL), INTERVAL);
    }

    /// The computation depends on nothing but the clock, so the outcome of
    /// one tick cannot shift the alignment of the next one.
    #[test]
    fn alignment_is_a_pure_function_of_the_clock() {
        let now = at_millis(1_700_000_002_300);
        assert_eq!(time_until_next_tick(now, INTERVAL), Duration::from_millis(2_700));
        assert_eq!(time_until_next_tick(now, INTERVAL), Duration::from_millis(2_700));
    }

    #[test]
    fn zero_interval_does_not_panic() {
        let sleep_for = time_until_next_tick(at_millis(1_700_000_000_123), Duration::ZERO);
        assert!(sleep_for <= Duration::from_millis(1));
    }

    #[test]
    fn sub_second_interval_ok() {
        let sleep_for = time_until_next_tick(at_millis(1_700_000_000_250), Duration::from_millis(500));
        assert_eq!(sleep_for, Duration::from_millis(250));
    }
}
