//! Timeline buckets.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::recurrence::Cadence;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One time slot on the timeline; the unit of aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub start_date: NaiveDate,
    pub label: String,
}

impl Column {
    pub fn new(start_date: NaiveDate, cadence: Cadence) -> Self {
        Self {
            start_date,
            label: column_label(start_date, cadence),
        }
    }
}

/// `"Jan 2026"` for month buckets, `"03-Jan"` for day-step buckets.
pub fn column_label(start_date: NaiveDate, cadence: Cadence) -> String {
    let month = MONTH_ABBREVIATIONS[start_date.month0() as usize];
    match cadence {
        Cadence::Monthly => format!("{} {}", month, start_date.year()),
        _ => format!("{:02}-{}", start_date.day(), month),
    }
}
