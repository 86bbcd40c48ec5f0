use clap::Parser;
use reqwest::Url;

#[derive(Parser)]
#[command(author, version, about)]
#[must_use]
pub struct Args {
    /// Wall-clock-aligned sampling interval, at least 1ms.
    ///
    /// Samples land on whole multiples of the interval (for example, every
    /// 5th second of real time), so series stay comparable across restarts.
    #[clap(
        long,
        env = "SAMPLING_INTERVAL",
        default_value = "5s",
        value_parser = parse_sampling_interval,
    )]
    pub sampling_interval: humantime::Duration,

    /// Deadline for a single gateway or store call.
    #[clap(long, env = "REQUEST_TIMEOUT", default_value = "10s")]
    pub request_timeout: humantime::Duration,

    /// Retry a failed batch write once before abandoning the tick.
    #[clap(long, env = "RETRY_FAILED_WRITES")]
    pub retry_failed_writes: bool,

    #[clap(flatten)]
    pub envoy: EnvoyArgs,

    #[clap(flatten)]
    pub influxdb: InfluxDbArgs,
}

/// The tick alignment works at millisecond resolution, so anything shorter
/// is rejected up front instead of surfacing mid-loop.
fn parse_sampling_interval(raw: &str) -> Result<humantime::Duration, String> {
    let interval =
        raw.parse::<humantime::Duration>().map_err(|error| error.to_string())?;
    if interval.as_millis() < 1 {
        return Err("the sampling interval must be at least 1ms".to_string());
    }
    Ok(interval)
}

#[derive(Parser)]
pub struct EnvoyArgs {
    /// Base URL of the Envoy gateway on the local network, e.g. `https://192.168.1.40/`.
    #[clap(long = "envoy-url", env = "ENVOY_URL")]
    pub url: Url,

    /// Long-lived owner token, exchanged for a local session at startup.
    #[clap(long = "envoy-token", env = "ENVOY_TOKEN")]
    pub token: String,

    /// Accept the self-signed certificate the gateway serves on the LAN.
    #[clap(
        long = "envoy-accept-invalid-certs",
        env = "ENVOY_ACCEPT_INVALID_CERTS",
        default_value_t = true,
        action = clap::ArgAction::Set,
    )]
    pub accept_invalid_certs: bool,
}

#[derive(Parser)]
pub struct InfluxDbArgs {
    /// Base URL of the InfluxDB 2.x instance.
    #[clap(long = "influxdb-url", env = "INFLUXDB_URL")]
    pub url: Url,

    #[clap(long = "influxdb-token", env = "INFLUXDB_TOKEN")]
    pub token: String,

    #[clap(long = "influxdb-org", env = "INFLUXDB_ORG")]
    pub org: String,

    #[clap(long = "influxdb-bucket", env = "INFLUXDB_BUCKET")]
    pub bucket: String,
}
