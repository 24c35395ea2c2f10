//! Calendar helpers: inclusive date windows and first-of-month arithmetic.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive date range used to scope every warehouse query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Window used by the dashboard metric endpoints when the caller gives none.
    #[must_use]
    pub fn metrics_default() -> Self {
        Self {
            start: data_set_start(),
            end: NaiveDate::from_ymd_opt(2016, 12, 31).unwrap_or_default(),
        }
    }

    /// Window used by demand forecasting: the start of the data set through `today`.
    #[must_use]
    pub fn forecast_default(today: NaiveDate) -> Self {
        Self {
            start: data_set_start(),
            end: today,
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn data_set_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

/// Normalize a date to the first day of its month.
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// First-of-month date `n` calendar months after `month`.
#[must_use]
pub fn add_months(month: NaiveDate, n: u32) -> NaiveDate {
    month_start(month) + Months::new(n)
}
