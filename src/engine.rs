use std::collections::BTreeMap;

use bon::bon;
use chrono::NaiveDateTime;
use rand::Rng;

use crate::{
    calendar::Calendar,
    error::ConfigError,
    meter::Reading,
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, price::KilowattHourPrice},
    tariff::{RateTable, RateTier, Tariff},
};

/// Share of peak readings billed at the critical rate: 20 critical days a year.
pub const CRITICAL_PROBABILITY: f64 = 20.0 / 365.0;

/// Number of Monte-Carlo repetitions averaged for critical-peak tariffs.
pub const N_TRIALS: u32 = 10;

/// Prices readings according to the season calendar.
#[must_use]
#[derive(Clone, Debug)]
pub struct RateEngine {
    calendar: Calendar,
    critical_probability: f64,
    n_trials: u32,
}

#[bon]
impl RateEngine {
    #[builder]
    pub fn new(
        #[builder(default)] calendar: Calendar,
        #[builder(default = CRITICAL_PROBABILITY)] critical_probability: f64,
        #[builder(default = N_TRIALS)] n_trials: u32,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&critical_probability) {
            return Err(ConfigError::InvalidProbability(critical_probability));
        }
        if n_trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        calendar.validate()?;
        Ok(Self { calendar, critical_probability, n_trials })
    }
}

impl Default for RateEngine {
    fn default() -> Self {
        Self {
            calendar: Calendar::default(),
            critical_probability: CRITICAL_PROBABILITY,
            n_trials: N_TRIALS,
        }
    }
}

impl RateEngine {
    /// Tier the timestamp falls into before any critical draw.
    ///
    /// Tiers missing from the table fall through to off-peak.
    pub fn base_rate(
        &self,
        rates: &RateTable,
        timestamp: NaiveDateTime,
    ) -> (RateTier, KilowattHourPrice) {
        if self.calendar.is_peak(timestamp)
            && let Some(on_peak) = rates.get(RateTier::OnPeak)
        {
            (RateTier::OnPeak, on_peak)
        } else if self.calendar.is_discount(timestamp)
            && let Some(discount) = rates.get(RateTier::Discount)
        {
            (RateTier::Discount, discount)
        } else {
            (RateTier::OffPeak, rates.off_peak())
        }
    }

    /// Pick the tier billing the reading and its price.
    ///
    /// With `use_critical`, an on-peak reading is billed at the critical rate with
    /// the critical probability, provided the table has one.
    pub fn rate<R: Rng + ?Sized>(
        &self,
        rates: &RateTable,
        reading: &Reading,
        use_critical: bool,
        rng: &mut R,
    ) -> (RateTier, KilowattHourPrice) {
        let (tier, price) = self.base_rate(rates, reading.timestamp);
        if use_critical
            && tier == RateTier::OnPeak
            && let Some(critical) = rates.get(RateTier::Critical)
            && rng.gen_bool(self.critical_probability)
        {
            (RateTier::Critical, critical)
        } else {
            (tier, price)
        }
    }

    pub fn price<R: Rng + ?Sized>(
        &self,
        rates: &RateTable,
        reading: &Reading,
        use_critical: bool,
        rng: &mut R,
    ) -> Cost {
        let (_, price) = self.rate(rates, reading, use_critical, rng);
        reading.value * price
    }

    /// Total cost of the readings rounded to cents.
    ///
    /// With `use_critical`, the critical draws make a single pass random, so the total is
    /// the mean of [`N_TRIALS`] independent passes.
    #[instrument(skip_all, fields(n_readings = readings.len(), use_critical))]
    pub fn total_cost<R: Rng + ?Sized>(
        &self,
        rates: &RateTable,
        readings: &[Reading],
        use_critical: bool,
        rng: &mut R,
    ) -> Cost {
        let n_trials = if use_critical { self.n_trials } else { 1 };
        let sum: Cost = (0..n_trials)
            .map(|_| {
                readings
                    .iter()
                    .map(|reading| self.price(rates, reading, use_critical, rng))
                    .sum::<Cost>()
            })
            .sum();
        let cost = (sum / f64::from(n_trials)).round_to_cents();
        debug!(n_trials, %cost, "calculated");
        cost
    }

    pub fn tariff_cost<R: Rng + ?Sized>(
        &self,
        tariff: &Tariff,
        readings: &[Reading],
        rng: &mut R,
    ) -> Cost {
        self.total_cost(&tariff.rates, readings, tariff.critical, rng)
    }

    /// Cost expectation over the critical draws, not rounded.
    pub fn expected_cost(
        &self,
        rates: &RateTable,
        readings: &[Reading],
        use_critical: bool,
    ) -> Cost {
        readings
            .iter()
            .map(|reading| {
                let (tier, price) = self.base_rate(rates, reading.timestamp);
                match rates.get(RateTier::Critical) {
                    Some(critical) if use_critical && tier == RateTier::OnPeak => {
                        reading.value * critical * self.critical_probability
                            + reading.value * price * (1.0 - self.critical_probability)
                    }
                    _ => reading.value * price,
                }
            })
            .sum()
    }

    /// Consumption per tier, leaving out the critical draws.
    #[must_use]
    pub fn usage_by_tier(
        &self,
        rates: &RateTable,
        readings: &[Reading],
    ) -> BTreeMap<RateTier, KilowattHours> {
        let mut usage = BTreeMap::new();
        for reading in readings {
            let (tier, _) = self.base_rate(rates, reading.timestamp);
            *usage.entry(tier).or_insert(KilowattHours::ZERO) += reading.value;
        }
        usage
    }
}
