use std::path::PathBuf;

use crate::{calendar::Season, tariff::RateTier};

/// Malformed interval-meter export.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read `{path}`")]
    Io {
        path: PathBuf,

        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML")]
    Xml(#[from] roxmltree::Error),

    #[error("interval reading #{index} is missing `{element}`")]
    MissingElement { index: usize, element: &'static str },

    #[error("interval reading #{index} has an invalid {field}: `{text}`")]
    InvalidNumber { index: usize, field: &'static str, text: String },

    #[error("interval reading #{index} has a negative value: {value}")]
    NegativeValue { index: usize, value: f64 },

    #[error("interval reading #{index} starts at an unrepresentable timestamp {timestamp}")]
    TimestampOutOfRange { index: usize, timestamp: i64 },
}

/// Inconsistent rates, calendar, or engine parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("the rate table must define the off-peak rate")]
    MissingOffPeak,

    #[error("the {tier} rate must not be negative: {price}")]
    NegativePrice { tier: RateTier, price: f64 },

    #[error("{season} window {window} ends before it starts")]
    InvertedWindow { season: Season, window: String },

    #[error("{season} peak window {peak} overlaps with discount window {discount}")]
    OverlappingWindows { season: Season, peak: String, discount: String },

    #[error("critical-peak probability must be within 0..=1, got {0}")]
    InvalidProbability(f64),

    #[error("at least one critical-peak trial is required")]
    NoTrials,
}
