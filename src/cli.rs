use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};

use crate::{meter::Period, prelude::*};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// Green Button (ESPI) XML export with the hourly interval readings.
    pub path: PathBuf,

    /// Skip readings before this local date, for example: `2021-01-01`.
    #[clap(long, env = "SINCE")]
    pub since: Option<NaiveDate>,

    /// Skip readings after this local date (inclusive).
    #[clap(long, env = "UNTIL")]
    pub until: Option<NaiveDate>,

    /// Seed for the critical-peak draws, makes the estimates reproducible.
    #[clap(long, env = "SEED")]
    pub seed: Option<u64>,
}

impl Args {
    pub fn period(&self) -> Result<Period> {
        let period = Period::new(
            self.since.unwrap_or(NaiveDate::MIN),
            self.until.unwrap_or(NaiveDate::MAX),
        );
        ensure!(!period.is_empty(), "`--since` must not be later than `--until`");
        Ok(period)
    }

    pub fn rng(&self) -> StdRng {
        self.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }
}
