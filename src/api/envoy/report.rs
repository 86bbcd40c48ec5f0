//! Models for the `production.json?details=1` report.

use serde::Deserialize;

use crate::{
    core::sample::{PowerAggregate, Reading, RmsDetail, SampleData},
    prelude::*,
};

/// The raw report: two channel arrays mixing inverter-derived and
/// current-transformer (`eim`) entries.
#[derive(Deserialize)]
pub struct ProductionReport {
    production: Vec<Channel>,

    #[serde(default)]
    consumption: Vec<Channel>,
}

#[derive(Deserialize)]
struct Channel {
    #[serde(rename = "measurementType")]
    measurement_type: Option<String>,

    #[serde(flatten)]
    reading: RawReading,

    #[serde(default)]
    lines: Vec<RawReading>,
}

/// One raw reading. `reactPwr`/`apprntPwr` are optional at the wire level
/// because inverter-derived entries omit them, but the channels we consume
/// are required to carry them.
#[derive(Deserialize)]
struct RawReading {
    #[serde(rename = "readingTime")]
    timestamp: i64,

    #[serde(rename = "wNow")]
    real_power: f64,

    #[serde(rename = "reactPwr")]
    reactive_power: Option<f64>,

    #[serde(rename = "apprntPwr")]
    apparent_power: Option<f64>,

    #[serde(rename = "rmsCurrent")]
    rms_current: Option<f64>,

    #[serde(rename = "rmsVoltage")]
    rms_voltage: Option<f64>,
}

impl TryFrom<ProductionReport> for SampleData {
    type Error = Error;

    fn try_from(report: ProductionReport) -> Result<Self> {
        Ok(Self {
            total_consumption: aggregate_from(&report.consumption, "total-consumption")?,
            total_production: aggregate_from(&report.production, "production")?,
            net_consumption: aggregate_from(&report.consumption, "net-consumption")?,
        })
    }
}

fn aggregate_from(channels: &[Channel], measurement_type: &str) -> Result<PowerAggregate> {
    let channel = channels
        .iter()
        .find(|channel| channel.measurement_type.as_deref() == Some(measurement_type))
        .with_context(|| format!("no `{measurement_type}` channel in the report"))?;
    Ok(PowerAggregate {
        total: reading_from(&channel.reading, measurement_type)?,
        lines: channel
            .lines
            .iter()
            .map(|raw| reading_from(raw, measurement_type))
            .collect::<Result<Vec<Reading>>>()?,
    })
}

fn reading_from(raw: &RawReading, measurement_type: &str) -> Result<Reading> {
    let rms = match (raw.rms_current, raw.rms_voltage) {
        (Some(current), Some(voltage)) => Some(RmsDetail { current, voltage }),
        (None, None) => None,
        _ => {
            bail!("`{measurement_type}` reading carries only one of `rmsCurrent`/`rmsVoltage`")
        }
    };
    Ok(Reading {
        timestamp: raw.timestamp,
        real_power: raw.real_power,
        reactive_power: raw
            .reactive_power
            .with_context(|| format!("`{measurement_type}` reading is missing `reactPwr`"))?,
        apparent_power: raw
            .apparent_power
            .with_context(|| format!("`{measurement_type}` reading is missing `apprntPwr`"))?,
        rms,
    })
}
