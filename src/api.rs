pub mod envoy;
pub mod influxdb;
