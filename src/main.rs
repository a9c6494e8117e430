#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod calendar;
mod cli;
mod engine;
mod error;
mod meter;
mod ops;
mod prelude;
mod quantity;
mod tables;
mod tariff;

use clap::{Parser, crate_version};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::Args,
    engine::RateEngine,
    meter::Reading,
    prelude::*,
    quantity::energy::KilowattHours,
    tables::{build_costs_table, build_rates_table, build_usage_table},
    tariff::Tariff,
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .without_time()
        .compact()
        .init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let engine = RateEngine::builder().build()?;
    let tariffs = Tariff::defaults()?;
    let readings = meter::load(&args.path, args.period()?)
        .with_context(|| format!("failed to load the readings from `{}`", args.path.display()))?;

    println!("{}", headline(&readings));

    let mut rng = args.rng();
    let costs = tariffs
        .iter()
        .map(|tariff| {
            let cost = engine.tariff_cost(tariff, &readings, &mut rng);
            if tariff.critical {
                let expected = engine.expected_cost(&tariff.rates, &readings, true);
                info!(tariff = %tariff.name, %cost, %expected, "estimated");
            }
            (tariff, cost)
        })
        .collect::<Vec<_>>();
    println!("{}", build_costs_table(&costs));
    println!("{}", build_rates_table(&tariffs));
    println!("{}", build_usage_table(&engine, &tariffs, &readings));

    info!("done!");
    Ok(())
}

fn headline(readings: &[Reading]) -> String {
    match (readings.first(), readings.last()) {
        (Some(first), Some(last)) => {
            let total: KilowattHours = readings.iter().map(|reading| reading.value).sum();
            format!(
                "The cost for {:.2} kWh spanning {} to {}:",
                total.0,
                first.timestamp.date(),
                last.timestamp.date(),
            )
        }
        _ => "No readings within the period.".to_owned(),
    }
}
