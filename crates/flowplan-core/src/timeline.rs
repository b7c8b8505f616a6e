//! Bucket generation and date-to-bucket resolution for a calendar year.

use chrono::{Datelike, NaiveDate};

use flowplan_domain::{calendar, Cadence, Column};

/// The column set for one (cadence, year) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub year: i32,
    pub cadence: Cadence,
    pub columns: Vec<Column>,
}

impl Timeline {
    pub fn new(cadence: Cadence, year: i32) -> Self {
        Self {
            year,
            cadence,
            columns: generate_columns(cadence, year),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Index of the column whose bucket contains `date`, if it is part of this timeline.
    pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
        let bucket = resolve_bucket(date, self.cadence);
        self.columns
            .binary_search_by_key(&bucket, |column| column.start_date)
            .ok()
    }
}

/// Produces the ordered bucket starts spanning January 1 through December 31 of `year`.
///
/// Month buckets start on the first of each month. Fixed-step buckets start on
/// January 1 and advance by the cadence's day count; the last one may be short.
/// A year chrono cannot represent yields no columns.
pub fn generate_columns(cadence: Cadence, year: i32) -> Vec<Column> {
    let Some((start, end)) = calendar::year_bounds(year) else {
        return Vec::new();
    };
    let mut columns = Vec::new();
    match cadence.step_days() {
        None => {
            let mut cursor = calendar::start_of_month(start);
            while cursor <= end {
                columns.push(Column::new(cursor, cadence));
                cursor = calendar::add_months(cursor, 1);
            }
        }
        Some(step) => {
            let mut cursor = start;
            while cursor <= end {
                columns.push(Column::new(cursor, cadence));
                cursor = calendar::add_days(cursor, step as i64);
            }
        }
    }
    columns
}

/// Returns the start date of the bucket containing `date`.
///
/// Fixed-step buckets are anchored to January 1 of the date's own year, so the
/// result never depends on when it is computed.
pub fn resolve_bucket(date: NaiveDate, cadence: Cadence) -> NaiveDate {
    match cadence.step_days() {
        None => calendar::start_of_month(date),
        Some(step) => {
            let offset = date.ordinal0();
            let bucket_index = offset / step;
            calendar::add_days(
                calendar::start_of_year(date),
                (bucket_index * step) as i64,
            )
        }
    }
}
