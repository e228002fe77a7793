//! The opening-window gate.
//!
//! The daily opening snapshot may only be taken on a trading day between
//! 09:30:00 and 09:31:00 exchange time, both ends inclusive. The gate is a
//! pure predicate; at-most-once per day comes from pairing it with the
//! opening key's existence check and a set-if-absent write (see
//! [`crate::worker`]).

use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Weekday};

use crate::constants::{DATE_FORMAT, OPENING_WINDOW_END_SECS, OPENING_WINDOW_START_SECS};
use crate::error::{DhanError, Result};

/// Exchange holidays on which no opening snapshot is taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    dates: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Parse a comma separated list of `YYYY-MM-DD` dates. Blank entries are ignored.
    pub fn parse(list: &str) -> Result<Self> {
        let dates = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .map_err(|e| DhanError::Config(format!("bad holiday date {s:?}: {e}")))
            })
            .collect::<Result<HashSet<_>>>()?;
        Ok(Self { dates })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Whether `date` is a weekday that is not a holiday.
pub fn is_trading_day(date: NaiveDate, holidays: &HolidayCalendar) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.contains(date)
}

/// True iff `now` falls on a trading day within `[09:30:00, 09:31:00]`.
pub fn is_opening_window<Tz: TimeZone>(now: &DateTime<Tz>, holidays: &HolidayCalendar) -> bool {
    if !is_trading_day(now.date_naive(), holidays) {
        return false;
    }
    let secs = now.num_seconds_from_midnight();
    let after_start = secs >= OPENING_WINDOW_START_SECS;
    let before_end = secs < OPENING_WINDOW_END_SECS
        || (secs == OPENING_WINDOW_END_SECS && now.nanosecond() == 0);
    after_start && before_end
}
