//! Recurrence rules for items and the timeline cadence used for bucketing.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    calendar,
    common::{KeyKind, ParseKeyError},
};

/// How often an item repeats, independent of the display cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Recurrence {
    /// One-time item.
    #[default]
    None,
    Daily,
    Every3Days,
    Weekly,
    Every2Weeks,
    Every15Days,
    Monthly,
    Every2Months,
    Quarterly,
    Yearly,
}

/// Distance between two consecutive occurrences of a recurring item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceStep {
    Days(u32),
    Months(u32),
}

impl RecurrenceStep {
    /// Applies the step `times` times to `anchor` in a single calendar operation.
    pub fn nth_from(self, anchor: NaiveDate, times: u32) -> NaiveDate {
        match self {
            RecurrenceStep::Days(days) => calendar::add_days(anchor, days as i64 * times as i64),
            RecurrenceStep::Months(months) => {
                let total = (months as i64 * times as i64).min(i32::MAX as i64) as i32;
                calendar::add_months(anchor, total)
            }
        }
    }
}

impl Recurrence {
    pub const ALL: [Recurrence; 10] = [
        Recurrence::None,
        Recurrence::Daily,
        Recurrence::Every3Days,
        Recurrence::Weekly,
        Recurrence::Every2Weeks,
        Recurrence::Every15Days,
        Recurrence::Monthly,
        Recurrence::Every2Months,
        Recurrence::Quarterly,
        Recurrence::Yearly,
    ];

    /// The step between occurrences; `None` for one-time items.
    pub fn step(self) -> Option<RecurrenceStep> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => Some(RecurrenceStep::Days(1)),
            Recurrence::Every3Days => Some(RecurrenceStep::Days(3)),
            Recurrence::Weekly => Some(RecurrenceStep::Days(7)),
            Recurrence::Every2Weeks => Some(RecurrenceStep::Days(14)),
            Recurrence::Every15Days => Some(RecurrenceStep::Days(15)),
            Recurrence::Monthly => Some(RecurrenceStep::Months(1)),
            Recurrence::Every2Months => Some(RecurrenceStep::Months(2)),
            Recurrence::Quarterly => Some(RecurrenceStep::Months(3)),
            Recurrence::Yearly => Some(RecurrenceStep::Months(12)),
        }
    }

    pub fn is_recurring(self) -> bool {
        self != Recurrence::None
    }

    /// Storage key used in persisted plans.
    pub fn key(self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Every3Days => "every3",
            Recurrence::Weekly => "weekly",
            Recurrence::Every2Weeks => "biweekly",
            Recurrence::Every15Days => "every15",
            Recurrence::Monthly => "monthly",
            Recurrence::Every2Months => "bimonthly",
            Recurrence::Quarterly => "quarterly",
            Recurrence::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Recurrence::None => "One-time",
            Recurrence::Daily => "Daily",
            Recurrence::Every3Days => "Every 3 days",
            Recurrence::Weekly => "Weekly",
            Recurrence::Every2Weeks => "Every 2 weeks",
            Recurrence::Every15Days => "Every 15 days",
            Recurrence::Monthly => "Monthly",
            Recurrence::Every2Months => "Every 2 months",
            Recurrence::Quarterly => "Quarterly",
            Recurrence::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}

impl FromStr for Recurrence {
    type Err = ParseKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = value.trim().to_ascii_lowercase();
        Recurrence::ALL
            .into_iter()
            .find(|recurrence| recurrence.key() == key)
            .ok_or_else(|| ParseKeyError::new(KeyKind::Recurrence, value))
    }
}

impl TryFrom<String> for Recurrence {
    type Error = ParseKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Recurrence> for String {
    fn from(value: Recurrence) -> Self {
        value.key().to_string()
    }
}

/// Width of a timeline bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Cadence {
    Daily,
    Every3Days,
    #[default]
    Weekly,
    Every2Weeks,
    Every15Days,
    Monthly,
}

impl Cadence {
    pub const ALL: [Cadence; 6] = [
        Cadence::Daily,
        Cadence::Every3Days,
        Cadence::Weekly,
        Cadence::Every2Weeks,
        Cadence::Every15Days,
        Cadence::Monthly,
    ];

    /// Fixed bucket width in days; `None` for calendar-month buckets.
    pub fn step_days(self) -> Option<u32> {
        match self {
            Cadence::Daily => Some(1),
            Cadence::Every3Days => Some(3),
            Cadence::Weekly => Some(7),
            Cadence::Every2Weeks => Some(14),
            Cadence::Every15Days => Some(15),
            Cadence::Monthly => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Cadence::Daily => "daily",
            Cadence::Every3Days => "3d",
            Cadence::Weekly => "7d",
            Cadence::Every2Weeks => "14d",
            Cadence::Every15Days => "15d",
            Cadence::Monthly => "1m",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Cadence::Daily => "Daily",
            Cadence::Every3Days => "Every 3 days",
            Cadence::Weekly => "Weekly",
            Cadence::Every2Weeks => "Every 2 weeks",
            Cadence::Every15Days => "Every 15 days",
            Cadence::Monthly => "Monthly",
        };
        f.write_str(label)
    }
}

impl FromStr for Cadence {
    type Err = ParseKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" | "1d" => Ok(Cadence::Daily),
            "3d" => Ok(Cadence::Every3Days),
            "7d" | "weekly" => Ok(Cadence::Weekly),
            "14d" | "biweekly" => Ok(Cadence::Every2Weeks),
            "15d" => Ok(Cadence::Every15Days),
            "1m" | "monthly" => Ok(Cadence::Monthly),
            _ => Err(ParseKeyError::new(KeyKind::Cadence, value)),
        }
    }
}

impl TryFrom<String> for Cadence {
    type Error = ParseKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cadence> for String {
    fn from(value: Cadence) -> Self {
        value.key().to_string()
    }
}
