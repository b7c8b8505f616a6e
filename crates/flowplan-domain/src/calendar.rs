//! Calendar-date arithmetic on [`NaiveDate`].
//!
//! Everything here works on year/month/day only. Results that would leave the
//! range chrono can represent saturate to [`NaiveDate::MIN`] / [`NaiveDate::MAX`].

use chrono::{Datelike, Days, NaiveDate};

/// Returns the date `days` calendar days after `date` (`days` may be negative).
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(if days < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

/// Adds `months` calendar months, clamping the day to the target month's length.
///
/// `2025-01-31 + 1 month` is `2025-02-28`, never a date in March.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let saturated = if months < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    };
    let index = month_index(date) + months as i64;
    let Ok(year) = i32::try_from(index.div_euclid(12)) else {
        return saturated;
    };
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(saturated)
}

/// January 1st of the date's year.
pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    date.with_ordinal(1).unwrap_or(date)
}

/// December 31st of the date's year.
pub fn end_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

/// First day of the date's month.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Returns `(January 1, December 31)` for `year`, or `None` outside chrono's range.
pub fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
    Some((start, end))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 {
        (year.saturating_add(1), 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Months elapsed since year 0, used for whole-month distances.
pub fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}
