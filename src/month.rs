use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::IndicatorError;

/// Calendar month, ordered by (year, month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, IndicatorError> {
        if !(1..=12).contains(&month) {
            return Err(IndicatorError::InvalidMonth(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month immediately after this one.
    pub fn succ(&self) -> Self {
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
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = IndicatorError;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IndicatorError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

// ── Reporting window ────────────────────────────────────────────────────────

/// Ordered sequence of distinct, strictly increasing months.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingWindow {
    months: Vec<MonthKey>,
}

impl ReportingWindow {
    pub fn new(months: Vec<MonthKey>) -> Result<Self, IndicatorError> {
        if let Some(pair) = months.windows(2).find(|w| w[0] >= w[1]) {
            return Err(IndicatorError::InvalidWindow(format!(
                "months must be strictly increasing, got {} followed by {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { months })
    }

    /// Every month from `start` to `end`, both inclusive.
    pub fn contiguous(start: MonthKey, end: MonthKey) -> Result<Self, IndicatorError> {
        if start > end {
            return Err(IndicatorError::InvalidWindow(format!(
                "start {start} is after end {end}"
            )));
        }
        let mut months = vec![start];
        let mut current = start;
        while current < end {
            current = current.succ();
            months.push(current);
        }
        Ok(Self { months })
    }

    /// Parse a list of `YYYY-MM` strings.
    pub fn parse<S: AsRef<str>>(months: &[S]) -> Result<Self, IndicatorError> {
        let keys = months
            .iter()
            .map(|m| m.as_ref().parse::<MonthKey>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(keys)
    }

    pub fn months(&self) -> &[MonthKey] {
        &self.months
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn contains(&self, month: MonthKey) -> bool {
        self.months.binary_search(&month).is_ok()
    }
}

impl Default for ReportingWindow {
    /// January through July 2025.
    fn default() -> Self {
        let months = (1..=7).map(|month| MonthKey { year: 2025, month }).collect();
        Self { months }
    }
}
