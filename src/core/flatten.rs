//! Flattening of one snapshot into an ordered sequence of points.

use crate::{
    api::influxdb::point::Point,
    core::sample::{PowerAggregate, Reading, SampleData},
};

const SOURCE_TAG: &str = "power-meter";

/// Flatten one snapshot into `3 + Σ(line counts)` points.
///
/// The order is fixed: per aggregate, lines in line order, then the total,
/// with consumption first, then production, then net. The mapping is pure,
/// so the same snapshot always yields the same sequence. Renaming or
/// reordering here would fork every series in the store.
#[must_use]
pub fn points_from_sample(sample: &SampleData) -> Vec<Point> {
    let mut points = Vec::with_capacity(
        3 + sample.total_consumption.lines.len()
            + sample.total_production.lines.len()
            + sample.net_consumption.lines.len(),
    );
    push_aggregate(&mut points, "consumption", &sample.total_consumption);
    push_aggregate(&mut points, "production", &sample.total_production);
    push_aggregate(&mut points, "net", &sample.net_consumption);
    points
}

fn push_aggregate(points: &mut Vec<Point>, prefix: &str, aggregate: &PowerAggregate) {
    for (index, line) in aggregate.lines.iter().enumerate() {
        points.push(point_from_reading(format!("{prefix}-line{index}"), line));
    }
    points.push(point_from_reading(format!("{prefix}-total"), &aggregate.total));
}

fn point_from_reading(series: String, reading: &Reading) -> Point {
    let mut point = Point::new(series, reading.timestamp)
        .with_tag("source", SOURCE_TAG)
        .with_field("P", reading.real_power)
        .with_field("Q", reading.reactive_power)
        .with_field("S", reading.apparent_power);
    if let Some(rms) = reading.rms {
        point = point.with_field("I_rms", rms.current).with_field("V_rms", rms.voltage);
    }
    point
}
