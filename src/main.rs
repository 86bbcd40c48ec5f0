#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod prelude;

use std::sync::{
    Arc,
    atomic::AtomicBool,
};

use clap::{Parser, crate_version};

use crate::{
    api::{envoy, influxdb},
    cli::Args,
    core::sampler::Sampler,
    prelude::*,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();

    let mut envoy = envoy::Client::new(args.envoy, args.request_timeout.into())?;
    envoy.login().await?;
    let influxdb = influxdb::Client::new(args.influxdb, args.request_timeout.into())?;

    let should_terminate = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&should_terminate))?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&should_terminate))?;

    Sampler::builder()
        .envoy(envoy)
        .influxdb(influxdb)
        .interval(args.sampling_interval)
        .retry_failed_writes(args.retry_failed_writes)
        .should_terminate(should_terminate)
        .build()
        .run()
        .await;

    info!("done!");
    Ok(())
}
