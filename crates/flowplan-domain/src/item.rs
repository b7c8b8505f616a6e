//! Cash-flow items and the goal target attached to a plan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{category::Category, recurrence::Recurrence};

/// A single recurring or one-time cash-flow entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: Uuid,
    #[serde(default = "Item::unassigned_category")]
    pub category: Category,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurrence: Recurrence,
}

impl Item {
    pub fn new(category: Category, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            label: label.into(),
            amount: None,
            start_date: None,
            recurrence: Recurrence::None,
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// Returns the amount and anchor date when the item contributes to the timeline.
    ///
    /// Zero, non-finite or missing amounts and a missing start date all mean
    /// "no contribution".
    pub fn contribution(&self) -> Option<(f64, NaiveDate)> {
        let amount = self.amount.filter(|value| value.is_finite() && *value != 0.0)?;
        Some((amount, self.start_date?))
    }

    fn unassigned_category() -> Category {
        Category::Income
    }
}

/// Goal balance the user wants to reach by a date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Target {
    pub amount: f64,
    pub date: NaiveDate,
}

impl Target {
    pub fn new(amount: f64, date: NaiveDate) -> Self {
        Self { amount, date }
    }

    /// Only positive, finite targets are drawn.
    pub fn is_active(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0
    }
}
