use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A billing period: one calendar month, the unit of rent obligation.
/// Ordered chronologically; renders as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u32 {
        self.month
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Inclusive month sequence from `self` through `end`; empty when
    /// `end` lies before `self`.
    pub fn through(self, end: Period) -> Vec<Period> {
        let mut periods = Vec::new();
        let mut current = self;
        while current <= end {
            periods.push(current);
            current = current.next();
        }
        periods
    }
}

/// Billing period a payment is displayed under. Payments on or after the
/// cutoff day count toward the following month: tenants routinely pay at
/// the end of a month for the month ahead. Display-only; allocation never
/// looks at this.
pub fn effective_period(date: NaiveDate, cutoff_day: u32) -> Period {
    let period = Period::from_date(date);
    if date.day() >= cutoff_day {
        period.next()
    } else {
        period
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid billing period '{0}': expected YYYY-MM")]
pub struct PeriodParseError(String);

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || PeriodParseError(raw.to_string());
        let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Period::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn sequence_is_inclusive_and_crosses_year_boundaries() {
        let start = Period::new(2024, 11).unwrap();
        let end = Period::new(2025, 2).unwrap();
        let months: Vec<String> = start.through(end).iter().map(Period::to_string).collect();
        assert_eq!(months, ["2024-11", "2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn sequence_is_empty_when_end_precedes_start() {
        let start = Period::new(2025, 3).unwrap();
        assert!(start.through(Period::new(2025, 2).unwrap()).is_empty());
    }

    #[test]
    fn payment_on_the_24th_keeps_its_own_month() {
        let period = effective_period(date(2025, 3, 24), 25);
        assert_eq!(period.to_string(), "2025-03");
    }

    #[test]
    fn payment_on_the_25th_shifts_to_the_following_month() {
        let period = effective_period(date(2025, 3, 25), 25);
        assert_eq!(period.to_string(), "2025-04");
    }

    #[test]
    fn cutoff_shift_rolls_over_december() {
        let period = effective_period(date(2024, 12, 28), 25);
        assert_eq!(period.to_string(), "2025-01");
    }

    #[test]
    fn parses_and_rejects_period_strings() {
        let parsed: Period = "2025-07".parse().expect("parses");
        assert_eq!(parsed, Period::new(2025, 7).unwrap());
        assert!("2025-13".parse::<Period>().is_err());
        assert!("2025".parse::<Period>().is_err());
        assert!("07-2025x".parse::<Period>().is_err());
    }

    #[test]
    fn previous_rolls_back_over_january() {
        assert_eq!(
            Period::new(2025, 1).unwrap().previous(),
            Period::new(2024, 12).unwrap()
        );
    }
}
