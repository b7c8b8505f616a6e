//! Projection of items onto timeline columns.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use flowplan_domain::{Cadence, Category, Column, Item, Plan};

use crate::{
    aggregation::{compute_balance, target_series, BalanceSeries, Kpis, TargetProgress},
    occurrence::iterate_occurrences,
    timeline::{resolve_bucket, Timeline},
};

/// Per-column amounts for one item; `None` means no activity in that bucket.
pub type ProjectedRow = Vec<Option<f64>>;

/// A projected row tagged with the item it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedItem {
    pub item_id: Uuid,
    pub category: Category,
    pub values: ProjectedRow,
}

impl ProjectedItem {
    /// Sum of present values.
    pub fn total(&self) -> f64 {
        self.values.iter().flatten().sum()
    }
}

/// Outcome of projecting a single item, including occurrences that missed every column.
#[derive(Debug, Clone, PartialEq)]
pub struct RowReport {
    pub values: ProjectedRow,
    pub occurrences: usize,
    pub dropped: usize,
}

/// Projects `item` onto `columns`, one slot per column.
///
/// Occurrences are generated for the year of the first column. Items without
/// a usable amount or start date produce an all-absent row.
pub fn project_item(columns: &[Column], cadence: Cadence, item: &Item) -> ProjectedRow {
    project_item_with_report(columns, cadence, item).values
}

pub fn project_item_with_report(columns: &[Column], cadence: Cadence, item: &Item) -> RowReport {
    let mut report = RowReport {
        values: vec![None; columns.len()],
        occurrences: 0,
        dropped: 0,
    };
    let (Some(first), Some((amount, start_date))) = (columns.first(), item.contribution()) else {
        return report;
    };
    let year = first.start_date.year();

    let index: HashMap<NaiveDate, usize> = columns
        .iter()
        .enumerate()
        .map(|(position, column)| (column.start_date, position))
        .collect();

    for occurrence in iterate_occurrences(start_date, item.recurrence, year) {
        report.occurrences += 1;
        let bucket = resolve_bucket(occurrence, cadence);
        match index.get(&bucket) {
            Some(&position) => {
                let slot = &mut report.values[position];
                *slot = Some(slot.unwrap_or(0.0) + amount);
            }
            None => report.dropped += 1,
        }
    }

    if report.dropped > 0 {
        tracing::warn!(
            item = %item.id,
            dropped = report.dropped,
            %cadence,
            "occurrences resolved to buckets outside the column set"
        );
    }
    report
}

/// Everything derived from a plan for one timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub timeline: Timeline,
    pub items: Vec<ProjectedItem>,
    pub series: BalanceSeries,
    pub target: Vec<Option<f64>>,
    pub kpis: Kpis,
    pub progress: Option<TargetProgress>,
    pub dropped_occurrences: usize,
}

impl Projection {
    pub fn columns(&self) -> &[Column] {
        &self.timeline.columns
    }

    pub fn balance(&self) -> &[f64] {
        &self.series.balance
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.series.cumulative
    }

    pub fn row(&self, item_id: Uuid) -> Option<&ProjectedItem> {
        self.items.iter().find(|row| row.item_id == item_id)
    }
}

/// Recomputes every item row and every derived series from scratch.
pub fn project_plan(plan: &Plan, timeline: &Timeline) -> Projection {
    let mut dropped_occurrences = 0;
    let items: Vec<ProjectedItem> = plan
        .iter_items()
        .map(|item| {
            let report = project_item_with_report(&timeline.columns, timeline.cadence, item);
            dropped_occurrences += report.dropped;
            ProjectedItem {
                item_id: item.id,
                category: item.category,
                values: report.values,
            }
        })
        .collect();

    let series = compute_balance(&timeline.columns, &items);
    let target = target_series(&timeline.columns, timeline.cadence, plan.target.as_ref());
    let kpis = Kpis::from_projection(&series, &items);
    let progress = plan
        .target
        .as_ref()
        .and_then(|target| TargetProgress::evaluate(target, timeline, &series));

    tracing::debug!(
        items = items.len(),
        columns = timeline.len(),
        year = timeline.year,
        cadence = %timeline.cadence,
        "plan projected"
    );

    Projection {
        timeline: timeline.clone(),
        items,
        series,
        target,
        kpis,
        progress,
        dropped_occurrences,
    }
}
