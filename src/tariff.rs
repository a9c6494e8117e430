use std::collections::BTreeMap;

use crate::{error::ConfigError, quantity::price::KilowattHourPrice};

#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, derive_more::Display)]
pub enum RateTier {
    #[display("off-peak")]
    OffPeak,

    #[display("on-peak")]
    OnPeak,

    #[display("discount")]
    Discount,

    #[display("critical")]
    Critical,
}

impl RateTier {
    pub const ALL: [Self; 4] = [Self::OffPeak, Self::OnPeak, Self::Discount, Self::Critical];
}

/// Per-tier energy prices.
///
/// The off-peak price is always present as the fallback for any reading no other tier claims.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateTable {
    off_peak: KilowattHourPrice,
    others: BTreeMap<RateTier, KilowattHourPrice>,
}

impl RateTable {
    /// Build the table, rejecting negative prices and a missing off-peak price.
    ///
    /// A tier listed twice keeps its last price.
    pub fn try_new(
        prices: impl IntoIterator<Item = (RateTier, KilowattHourPrice)>,
    ) -> Result<Self, ConfigError> {
        let mut others = BTreeMap::new();
        for (tier, price) in prices {
            if price.0.is_nan() || price.0 < 0.0 {
                return Err(ConfigError::NegativePrice { tier, price: price.0 });
            }
            others.insert(tier, price);
        }
        let off_peak = others.remove(&RateTier::OffPeak).ok_or(ConfigError::MissingOffPeak)?;
        Ok(Self { off_peak, others })
    }

    #[must_use]
    pub const fn off_peak(&self) -> KilowattHourPrice {
        self.off_peak
    }

    #[must_use]
    pub fn get(&self, tier: RateTier) -> Option<KilowattHourPrice> {
        match tier {
            RateTier::OffPeak => Some(self.off_peak),
            _ => self.others.get(&tier).copied(),
        }
    }

    /// Defined tiers with their prices, off-peak first.
    pub fn iter(&self) -> impl Iterator<Item = (RateTier, KilowattHourPrice)> + '_ {
        std::iter::once((RateTier::OffPeak, self.off_peak))
            .chain(self.others.iter().map(|(tier, price)| (*tier, *price)))
    }
}

/// Named rate table together with the way it gets billed.
#[must_use]
#[derive(Clone, Debug, bon::Builder)]
pub struct Tariff {
    #[builder(into)]
    pub name: String,

    /// Bill a random share of peak readings at the critical rate.
    #[builder(default)]
    pub critical: bool,

    pub rates: RateTable,
}

impl Tariff {
    /// Flat-rate residential service.
    pub fn residential() -> Result<Self, ConfigError> {
        let rates = RateTable::try_new([(RateTier::OffPeak, KilowattHourPrice(0.11661))])?;
        Ok(Self::builder().name("residential").rates(rates).build())
    }

    pub fn time_of_use() -> Result<Self, ConfigError> {
        let rates = RateTable::try_new([
            (RateTier::OffPeak, KilowattHourPrice(0.10467)),
            (RateTier::OnPeak, KilowattHourPrice(0.27653)),
            (RateTier::Discount, KilowattHourPrice(0.06814)),
        ])?;
        Ok(Self::builder().name("time-of-use").rates(rates).build())
    }

    /// Time-of-use with critical-peak pricing.
    pub fn time_of_use_critical_peak() -> Result<Self, ConfigError> {
        let rates = RateTable::try_new([
            (RateTier::OffPeak, KilowattHourPrice(0.10289)),
            (RateTier::OnPeak, KilowattHourPrice(0.20533)),
            (RateTier::Discount, KilowattHourPrice(0.07740)),
            (RateTier::Critical, KilowattHourPrice(0.38351)),
        ])?;
        Ok(Self::builder().name("time-of-use-cpp").critical(true).rates(rates).build())
    }

    pub fn defaults() -> Result<Vec<Self>, ConfigError> {
        Ok(vec![Self::residential()?, Self::time_of_use()?, Self::time_of_use_critical_peak()?])
    }
}
