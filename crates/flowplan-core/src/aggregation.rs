//! Balance, cumulative and target series derived from projected rows.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use flowplan_domain::{Cadence, Category, Column, Target};

use crate::{projection::ProjectedItem, timeline::{resolve_bucket, Timeline}};

/// Signed per-bucket net flow and its running total.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BalanceSeries {
    pub balance: Vec<f64>,
    pub cumulative: Vec<f64>,
}

impl BalanceSeries {
    pub fn len(&self) -> usize {
        self.balance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balance.is_empty()
    }

    /// Running total at the end of the year; zero when there are no columns.
    pub fn closing(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }
}

/// Sums signed item values per column and folds them into a running total.
///
/// Absent values count as zero. Rows shorter than `columns` only contribute
/// to the slots they cover.
pub fn compute_balance(columns: &[Column], rows: &[ProjectedItem]) -> BalanceSeries {
    let mut balance = vec![0.0; columns.len()];
    for row in rows {
        let sign = row.category.sign();
        for (slot, value) in balance.iter_mut().zip(&row.values) {
            if let Some(value) = value {
                *slot += sign * value;
            }
        }
    }

    let cumulative = balance
        .iter()
        .scan(0.0, |running, value| {
            *running += value;
            Some(*running)
        })
        .collect();

    BalanceSeries {
        balance,
        cumulative,
    }
}

/// The target amount for every column up to the one holding the target date.
pub fn target_series(
    columns: &[Column],
    cadence: Cadence,
    target: Option<&Target>,
) -> Vec<Option<f64>> {
    let mut series = vec![None; columns.len()];
    let (Some(target), Some(first)) = (target.filter(|t| t.is_active()), columns.first()) else {
        return series;
    };

    let year = first.start_date.year();
    let visible = match target.date.year().cmp(&year) {
        std::cmp::Ordering::Less => 0,
        std::cmp::Ordering::Greater => columns.len(),
        std::cmp::Ordering::Equal => {
            let bucket = resolve_bucket(target.date, cadence);
            columns
                .iter()
                .take_while(|column| column.start_date <= bucket)
                .count()
        }
    };

    for slot in series.iter_mut().take(visible) {
        *slot = Some(target.amount);
    }
    series
}

/// Headline figures for the projected year.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Kpis {
    /// Net flow of the first bucket.
    pub this_period: f64,
    /// Cumulative balance at the last bucket.
    pub year_to_date: f64,
    /// Unsigned yearly total per category, only for categories with items.
    pub category_totals: BTreeMap<Category, f64>,
}

impl Kpis {
    pub fn from_projection(series: &BalanceSeries, rows: &[ProjectedItem]) -> Self {
        let mut category_totals = BTreeMap::new();
        for row in rows {
            *category_totals.entry(row.category).or_insert(0.0) += row.total();
        }
        Self {
            this_period: series.balance.first().copied().unwrap_or(0.0),
            year_to_date: series.closing(),
            category_totals,
        }
    }

    pub fn total_for(&self, category: Category) -> f64 {
        self.category_totals.get(&category).copied().unwrap_or(0.0)
    }
}

/// How the projected cumulative balance compares with the target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetProgress {
    pub amount: f64,
    pub date: NaiveDate,
    /// Start of the bucket the target is measured at.
    pub bucket_start: NaiveDate,
    pub projected: f64,
    /// Remaining amount to reach the target; negative when exceeded.
    pub gap: f64,
    pub reached: bool,
}

impl TargetProgress {
    /// Measures an active target against the timeline.
    ///
    /// Targets dated after the projected year are measured at the last column.
    /// Targets dated before it, and inactive targets, yield `None`.
    pub fn evaluate(target: &Target, timeline: &Timeline, series: &BalanceSeries) -> Option<Self> {
        if !target.is_active() || timeline.is_empty() {
            return None;
        }
        let position = if target.date.year() > timeline.year {
            timeline.len() - 1
        } else {
            timeline.position_of(target.date)?
        };
        let projected = *series.cumulative.get(position)?;
        let gap = target.amount - projected;
        Some(Self {
            amount: target.amount,
            date: target.date,
            bucket_start: timeline.columns[position].start_date,
            projected,
            gap,
            reached: gap <= 0.0,
        })
    }

    /// Share of the target covered so far, clamped to `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        (self.projected / self.amount).clamp(0.0, 1.0)
    }
}
