//! Domain model of one metering snapshot.

use bon::Builder;

/// One multi-channel snapshot of the meter, taken at one instant.
///
/// Constructed fresh on every tick, consumed synchronously, and dropped after
/// the corresponding write attempt. Nothing is retained across ticks.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct SampleData {
    pub total_consumption: PowerAggregate,
    pub total_production: PowerAggregate,
    pub net_consumption: PowerAggregate,
}

/// Total reading of one channel plus its per-line readings.
///
/// Line order is meaningful: line `i` here becomes `…-line{i}` in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerAggregate {
    pub total: Reading,
    pub lines: Vec<Reading>,
}

/// One power reading.
///
/// Every reading carries `P`/`Q`/`S`. Channels measured through current
/// transformers additionally carry RMS detail; channels the device derives
/// indirectly (for example, production summed from the inverters) do not.
#[derive(Builder, Debug, Copy, Clone, PartialEq)]
pub struct Reading {
    /// Device-clock timestamp, epoch seconds.
    ///
    /// This, not the wall clock at write time, is what ends up on the emitted
    /// points, which keeps retried writes idempotent.
    pub timestamp: i64,

    /// Real power, W.
    pub real_power: f64,

    /// Reactive power, VAR.
    pub reactive_power: f64,

    /// Apparent power, VA.
    pub apparent_power: f64,

    pub rms: Option<RmsDetail>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RmsDetail {
    /// RMS current, A.
    pub current: f64,

    /// RMS voltage, V.
    pub voltage: f64,
}
