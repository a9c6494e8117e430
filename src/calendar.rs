use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use itertools::Itertools;

use crate::{error::ConfigError, ops::RangeInclusive};

/// Time-of-day window, both ends included.
pub type TimeWindow = RangeInclusive<NaiveTime>;

/// Calendar day without a year.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// February 29th is a valid month day.
    #[must_use]
    pub const fn new(month: u32, day: u32) -> Option<Self> {
        let n_days = match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 => 29,
            _ => return None,
        };
        if day == 0 || day > n_days { None } else { Some(Self { month, day }) }
    }

    #[must_use]
    pub fn of(date: impl Datelike) -> Self {
        Self { month: date.month(), day: date.day() }
    }
}

/// Inclusive range of month days.
///
/// When `start` comes after `end`, the range wraps across the year end:
/// `10-01..=04-30` covers October through April.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MonthDayRange {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl MonthDayRange {
    pub const fn new(start: MonthDay, end: MonthDay) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn is_wrapping(self) -> bool {
        self.start > self.end
    }

    #[must_use]
    pub fn contains(self, day: MonthDay) -> bool {
        if self.is_wrapping() {
            (self.start <= day) || (day <= self.end)
        } else {
            (self.start <= day) && (day <= self.end)
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Season {
    #[display("summer")]
    Summer,

    #[display("winter")]
    Winter,
}

/// Peak and discount windows of a single season.
#[derive(Clone, Debug)]
pub struct SeasonSchedule {
    pub peak: Vec<TimeWindow>,
    pub discount: Vec<TimeWindow>,
}

impl SeasonSchedule {
    #[must_use]
    pub fn is_peak(&self, time: NaiveTime) -> bool {
        self.peak.iter().any(|window| window.contains(time))
    }

    #[must_use]
    pub fn is_discount(&self, time: NaiveTime) -> bool {
        self.discount.iter().any(|window| window.contains(time))
    }

    /// Reject windows ending before they start and peak windows overlapping discount ones.
    pub fn validate(&self, season: Season) -> Result<(), ConfigError> {
        if let Some(window) =
            self.peak.iter().chain(&self.discount).find(|window| window.is_empty())
        {
            return Err(ConfigError::InvertedWindow { season, window: format!("{window:?}") });
        }
        if let Some((peak, discount)) =
            self.peak.iter().cartesian_product(&self.discount).find(|(peak, discount)| {
                peak.overlaps(**discount)
            })
        {
            return Err(ConfigError::OverlappingWindows {
                season,
                peak: format!("{peak:?}"),
                discount: format!("{discount:?}"),
            });
        }
        Ok(())
    }
}

/// Season dates and their peak and discount windows.
#[derive(Clone, Debug)]
pub struct Calendar {
    summer_dates: MonthDayRange,
    summer: SeasonSchedule,
    winter: SeasonSchedule,
}

impl Calendar {
    /// Winter is whatever the summer dates do not cover.
    pub const fn new(
        summer_dates: MonthDayRange,
        summer: SeasonSchedule,
        winter: SeasonSchedule,
    ) -> Self {
        Self { summer_dates, summer, winter }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.summer.validate(Season::Summer)?;
        self.winter.validate(Season::Winter)
    }

    #[must_use]
    pub fn season(&self, date: NaiveDate) -> Season {
        if self.summer_dates.contains(MonthDay::of(date)) { Season::Summer } else { Season::Winter }
    }

    #[must_use]
    pub const fn schedule(&self, season: Season) -> &SeasonSchedule {
        match season {
            Season::Summer => &self.summer,
            Season::Winter => &self.winter,
        }
    }

    #[must_use]
    pub fn is_peak(&self, timestamp: NaiveDateTime) -> bool {
        self.schedule(self.season(timestamp.date())).is_peak(timestamp.time())
    }

    #[must_use]
    pub fn is_discount(&self, timestamp: NaiveDateTime) -> bool {
        self.schedule(self.season(timestamp.date())).is_discount(timestamp.time())
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(
            MonthDayRange::new(month_day(10, 1), month_day(4, 30)),
            SeasonSchedule {
                peak: vec![TimeWindow::new(hour(18), hour(21))],
                discount: vec![TimeWindow::new(hour(1), hour(6))],
            },
            SeasonSchedule {
                peak: vec![TimeWindow::new(hour(6), hour(9))],
                discount: vec![
                    TimeWindow::new(hour(1), hour(3)),
                    TimeWindow::new(hour(11), hour(16)),
                ],
            },
        )
    }
}

const fn month_day(month: u32, day: u32) -> MonthDay {
    let Some(month_day) = MonthDay::new(month, day) else {
        panic!("invalid month day");
    };
    month_day
}

const fn hour(hour: u32) -> NaiveTime {
    let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) else {
        panic!("hour must be within 0..24");
    };
    time
}
