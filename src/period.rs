use chrono::{Duration, Local, NaiveDate};

use crate::error::{Result, TallyError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;
/// Longest accepted range, about a century.
pub const MAX_RANGE_DAYS: i64 = 36_600;

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(TallyError::invalid(format!(
                "from ({start}) must not be after to ({end})"
            )));
        }
        let range = Self { start, end };
        if range.len_days() > MAX_RANGE_DAYS {
            return Err(TallyError::invalid(format!(
                "date range longer than {MAX_RANGE_DAYS} days"
            )));
        }
        Ok(range)
    }

    /// Resolve optional `from`/`to` strings. `to` defaults to `today` and
    /// `from` to 30 days before `to`.
    pub fn resolve(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Result<Self> {
        let end = match to {
            Some(raw) => parse_date(raw)?,
            None => today,
        };
        let start = match from {
            Some(raw) => parse_date(raw)?,
            None => shift_back(end, DEFAULT_LOOKBACK_DAYS)?,
        };
        Self::new(start, end)
    }

    pub fn resolve_today(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        Self::resolve(from, to, Local::now().date_naive())
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The equal-length range ending the day before this one starts.
    /// Fails when that range would start before the earliest representable date.
    pub fn previous(&self) -> Result<Self> {
        let shift = self.len_days();
        Ok(Self {
            start: shift_back(self.start, shift)?,
            end: shift_back(self.end, shift)?,
        })
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

fn shift_back(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_sub_signed(Duration::days(days))
        .ok_or_else(|| TallyError::invalid(format!("date {date} is out of range")))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| TallyError::invalid(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}
