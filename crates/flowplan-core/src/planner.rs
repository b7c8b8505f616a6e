//! Owned planning state: the plan, its timeline and the projection derived from them.
//!
//! Every mutation rebuilds the projection wholesale; there is no partial
//! update path, so the projection can never disagree with the plan.

use chrono::NaiveDate;
use uuid::Uuid;

use flowplan_domain::{BudgetEvent, Cadence, Category, Item, Plan, Recurrence, Target, Transaction};

use crate::{
    projection::{project_plan, Projection},
    statement::{settle, StatementLine},
    time::Clock,
    timeline::Timeline,
    CoreError,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Unvalidated input for a new item, as collected from a form or command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
    pub label: String,
    pub amount: Option<f64>,
    pub start_date: Option<String>,
    pub recurrence: String,
}

impl ItemDraft {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            recurrence: Recurrence::None.key().to_string(),
            ..Self::default()
        }
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn start_date(mut self, value: impl Into<String>) -> Self {
        self.start_date = Some(value.into());
        self
    }

    pub fn recurrence(mut self, key: impl Into<String>) -> Self {
        self.recurrence = key.into();
        self
    }

    /// Builds an item in `category`.
    ///
    /// An unknown recurrence key is rejected. An empty recurrence means
    /// one-time. An unparsable start date is kept as `None` so the item is
    /// stored but contributes nothing until it is fixed.
    pub fn validate(self, category: Category) -> Result<Item, CoreError> {
        let recurrence = parse_recurrence(&self.recurrence)?;
        let amount = self.amount.map(finite_amount).transpose()?;
        let mut item = Item::new(category, self.label.trim()).with_recurrence(recurrence);
        item.amount = amount;
        item.start_date = self.start_date.as_deref().and_then(parse_draft_date);
        Ok(item)
    }
}

/// Field-level changes to an existing item; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub label: Option<String>,
    pub amount: Option<Option<f64>>,
    pub start_date: Option<Option<String>>,
    pub recurrence: Option<String>,
}

impl ItemPatch {
    /// Builds a single-field patch from a field name and its textual value.
    ///
    /// `amount` and `start` accept `none` to clear the field.
    pub fn from_field(field: &str, value: &str) -> Result<Self, CoreError> {
        let cleared = value.trim().eq_ignore_ascii_case("none");
        let mut patch = ItemPatch::default();
        match field.trim().to_ascii_lowercase().as_str() {
            "label" | "name" => patch.label = Some(value.to_string()),
            "amount" if cleared => patch.amount = Some(None),
            "amount" => {
                let amount = value.trim().parse::<f64>().map_err(|_| {
                    CoreError::Validation(format!("`{value}` is not a valid amount"))
                })?;
                patch.amount = Some(Some(finite_amount(amount)?));
            }
            "start" | "date" | "start_date" if cleared => patch.start_date = Some(None),
            "start" | "date" | "start_date" => patch.start_date = Some(Some(value.to_string())),
            "recurrence" | "repeat" => patch.recurrence = Some(value.to_string()),
            other => {
                return Err(CoreError::Validation(format!(
                    "unknown field `{other}` (expected label, amount, start or recurrence)"
                )))
            }
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.amount.is_none()
            && self.start_date.is_none()
            && self.recurrence.is_none()
    }

    fn apply(self, item: &mut Item) -> Result<(), CoreError> {
        // Validate before touching the item so a bad key leaves it unchanged.
        let recurrence = self.recurrence.as_deref().map(parse_recurrence).transpose()?;
        if let Some(Some(amount)) = self.amount {
            finite_amount(amount)?;
        }
        if let Some(label) = self.label {
            item.label = label.trim().to_string();
        }
        if let Some(amount) = self.amount {
            item.amount = amount;
        }
        if let Some(start_date) = self.start_date {
            item.start_date = start_date.as_deref().and_then(parse_draft_date);
        }
        if let Some(recurrence) = recurrence {
            item.recurrence = recurrence;
        }
        Ok(())
    }
}

fn parse_recurrence(key: &str) -> Result<Recurrence, CoreError> {
    if key.trim().is_empty() {
        return Ok(Recurrence::None);
    }
    Ok(key.parse::<Recurrence>()?)
}

fn finite_amount(amount: f64) -> Result<f64, CoreError> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(CoreError::Validation(format!("amount must be a finite number, got {amount}")))
    }
}

fn parse_draft_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::warn!(value = trimmed, %err, "ignoring unparsable start date");
            None
        }
    }
}

/// Single owner of a plan and everything projected from it.
#[derive(Debug, Clone)]
pub struct Planner {
    plan: Plan,
    timeline: Timeline,
    projection: Projection,
}

impl Planner {
    pub fn new(mut plan: Plan, cadence: Cadence, year: i32) -> Self {
        let corrected = plan.normalize();
        if corrected > 0 {
            tracing::warn!(corrected, plan = %plan.name, "item categories realigned with their sections");
        }
        let timeline = Timeline::new(cadence, year);
        let projection = project_plan(&plan, &timeline);
        Self {
            plan,
            timeline,
            projection,
        }
    }

    /// Starts a planner on the clock's current year.
    pub fn for_clock(plan: Plan, cadence: Cadence, clock: &dyn Clock) -> Self {
        Self::new(plan, cadence, clock.current_year())
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn cadence(&self) -> Cadence {
        self.timeline.cadence
    }

    pub fn year(&self) -> i32 {
        self.timeline.year
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn into_plan(self) -> Plan {
        self.plan
    }

    pub fn add_item(&mut self, category: Category, draft: ItemDraft) -> Result<Uuid, CoreError> {
        let item = draft.validate(category)?;
        let id = self.plan.add_item(item);
        self.mutated();
        Ok(id)
    }

    pub fn update_item(&mut self, id: Uuid, patch: ItemPatch) -> Result<(), CoreError> {
        let item = self.plan.item_mut(id).ok_or(CoreError::ItemNotFound(id))?;
        patch.apply(item)?;
        self.mutated();
        Ok(())
    }

    pub fn remove_item(&mut self, id: Uuid) -> Result<Item, CoreError> {
        let removed = self.plan.remove_item(id).ok_or(CoreError::ItemNotFound(id))?;
        self.plan.items.retain(|_, items| !items.is_empty());
        self.mutated();
        Ok(removed)
    }

    /// Resolves a full id or a unique id prefix to an item id.
    pub fn resolve_item(&self, reference: &str) -> Result<Uuid, CoreError> {
        if let Ok(id) = Uuid::parse_str(reference.trim()) {
            return self
                .plan
                .item(id)
                .map(|item| item.id)
                .ok_or(CoreError::ItemNotFound(id));
        }
        match self.plan.find_by_prefix(reference).as_slice() {
            [item] => Ok(item.id),
            [] => Err(CoreError::Validation(format!(
                "no item matches `{}`",
                reference.trim()
            ))),
            matches => Err(CoreError::Validation(format!(
                "`{}` matches {} items; use a longer prefix",
                reference.trim(),
                matches.len()
            ))),
        }
    }

    pub fn set_cadence(&mut self, cadence: Cadence) {
        if cadence == self.timeline.cadence {
            return;
        }
        self.timeline = Timeline::new(cadence, self.timeline.year);
        self.recompute();
    }

    pub fn set_target(&mut self, target: Target) -> Result<(), CoreError> {
        if !target.amount.is_finite() {
            return Err(CoreError::Validation(
                "target amount must be a finite number".into(),
            ));
        }
        self.plan.set_target(target);
        self.mutated();
        Ok(())
    }

    pub fn clear_target(&mut self) -> Option<Target> {
        let cleared = self.plan.clear_target();
        if cleared.is_some() {
            self.mutated();
        }
        cleared
    }

    /// Records a card transaction. Transactions never touch the projection.
    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<Uuid, CoreError> {
        finite_amount(transaction.amount)?;
        transaction.balance.map(finite_amount).transpose()?;
        if !(1..=31).contains(&transaction.cutoff_day) {
            return Err(CoreError::Validation(format!(
                "cutoff day must be between 1 and 31, got {}",
                transaction.cutoff_day
            )));
        }
        let id = transaction.id;
        self.plan.transactions.push(transaction);
        self.plan.touch();
        Ok(id)
    }

    /// Removes the transaction at `index` (zero-based, insertion order).
    pub fn remove_transaction(&mut self, index: usize) -> Result<Transaction, CoreError> {
        if index >= self.plan.transactions.len() {
            return Err(CoreError::Validation(format!("no transaction #{}", index + 1)));
        }
        self.plan.touch();
        Ok(self.plan.transactions.remove(index))
    }

    /// Settles every transaction in insertion order.
    pub fn statement(&self) -> Vec<StatementLine> {
        self.plan.transactions.iter().map(settle).collect()
    }

    pub fn add_event(&mut self, event: BudgetEvent) -> Result<(), CoreError> {
        if !(1..=12).contains(&event.month) {
            return Err(CoreError::Validation(format!(
                "event month must be between 1 and 12, got {}",
                event.month
            )));
        }
        if let Some(day) = event.day.filter(|day| !(1..=31).contains(day)) {
            return Err(CoreError::Validation(format!(
                "event day must be between 1 and 31, got {day}"
            )));
        }
        finite_amount(event.budget)?;
        self.plan.events.push(event);
        self.plan.touch();
        Ok(())
    }

    /// Removes the event at `index` (zero-based, insertion order).
    pub fn remove_event(&mut self, index: usize) -> Result<BudgetEvent, CoreError> {
        if index >= self.plan.events.len() {
            return Err(CoreError::Validation(format!("no event #{}", index + 1)));
        }
        self.plan.touch();
        Ok(self.plan.events.remove(index))
    }

    /// Moves the timeline to the clock's year when it has changed. Returns whether it did.
    pub fn roll_to_year(&mut self, clock: &dyn Clock) -> bool {
        let year = clock.current_year();
        if year == self.timeline.year {
            return false;
        }
        tracing::info!(from = self.timeline.year, to = year, "rolling timeline to new year");
        self.timeline = Timeline::new(self.timeline.cadence, year);
        self.recompute();
        true
    }

    /// Swaps in another plan, keeping the cadence and year. Returns the previous plan.
    pub fn replace_plan(&mut self, mut plan: Plan) -> Plan {
        plan.normalize();
        let previous = std::mem::replace(&mut self.plan, plan);
        self.recompute();
        previous
    }

    fn mutated(&mut self) {
        self.plan.touch();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.projection = project_plan(&self.plan, &self.timeline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use flowplan_domain::PaymentMethod;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn draft_with_unknown_recurrence_is_rejected() {
        let err = ItemDraft::new("Gym")
            .amount(30.0)
            .start_date("2025-01-05")
            .recurrence("fortnightly")
            .validate(Category::Expense)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecurrence(key) if key == "fortnightly"));
    }

    #[test]
    fn draft_with_bad_date_is_kept_without_contribution() {
        let item = ItemDraft::new("Gift")
            .amount(50.0)
            .start_date("31/12/2025")
            .validate(Category::Income)
            .unwrap();
        assert_eq!(item.start_date, None);
        assert!(item.contribution().is_none());
    }

    #[test]
    fn edits_recompute_the_projection() {
        let mut planner = Planner::new(Plan::new("Edits"), Cadence::Monthly, 2025);
        let id = planner
            .add_item(
                Category::Income,
                ItemDraft::new("Salary")
                    .amount(1000.0)
                    .start_date("2025-01-01")
                    .recurrence("monthly"),
            )
            .unwrap();
        assert_eq!(planner.projection().kpis.year_to_date, 12_000.0);

        planner
            .update_item(id, ItemPatch::from_field("amount", "1500").unwrap())
            .unwrap();
        assert_eq!(planner.projection().kpis.year_to_date, 18_000.0);

        planner
            .update_item(id, ItemPatch::from_field("recurrence", "quarterly").unwrap())
            .unwrap();
        assert_eq!(planner.projection().kpis.year_to_date, 6_000.0);

        let bad = planner.update_item(id, ItemPatch::from_field("recurrence", "often").unwrap());
        assert!(matches!(bad, Err(CoreError::InvalidRecurrence(_))));
        assert_eq!(planner.plan().item(id).unwrap().recurrence, Recurrence::Quarterly);

        planner.remove_item(id).unwrap();
        assert!(planner.projection().items.is_empty());
        assert!(planner.plan().items.is_empty());
        assert!(matches!(
            planner.remove_item(id),
            Err(CoreError::ItemNotFound(missing)) if missing == id
        ));
    }

    #[test]
    fn cadence_change_regenerates_columns() {
        let mut planner = Planner::new(Plan::new("Cadence"), Cadence::Weekly, 2025);
        assert_eq!(planner.projection().columns().len(), 53);
        planner.set_cadence(Cadence::Monthly);
        assert_eq!(planner.projection().columns().len(), 12);
        assert_eq!(planner.projection().balance().len(), 12);
    }

    #[test]
    fn roll_to_year_only_fires_on_year_change() {
        let mut planner = Planner::new(Plan::new("Roll"), Cadence::Daily, 2024);
        assert!(!planner.roll_to_year(&FixedClock::new(date(2024, 12, 31))));
        assert!(planner.roll_to_year(&FixedClock::new(date(2025, 1, 1))));
        assert_eq!(planner.year(), 2025);
        assert_eq!(planner.projection().columns().len(), 365);
    }

    #[test]
    fn resolve_item_accepts_unique_prefixes() {
        let mut planner = Planner::new(Plan::new("Prefix"), Cadence::Monthly, 2025);
        let id = planner
            .add_item(Category::Cash, ItemDraft::new("Wallet"))
            .unwrap();
        let text = id.to_string();
        assert_eq!(planner.resolve_item(&text[..6]).unwrap(), id);
        assert_eq!(planner.resolve_item(&text).unwrap(), id);
        assert!(planner.resolve_item("zzzz").is_err());
    }

    #[test]
    fn patch_rejects_unknown_fields_and_bad_amounts() {
        assert!(ItemPatch::from_field("colour", "red").is_err());
        assert!(ItemPatch::from_field("amount", "lots").is_err());
        assert_eq!(
            ItemPatch::from_field("amount", "none").unwrap().amount,
            Some(None)
        );
    }

    #[test]
    fn transactions_and_events_leave_the_projection_alone() {
        let mut planner = Planner::new(Plan::new("Card"), Cadence::Monthly, 2025);
        let before = planner.projection().clone();

        planner
            .add_transaction(
                Transaction::new(date(2025, 3, 20), 120.0, PaymentMethod::CreditCard, 15)
                    .with_concept("Groceries"),
            )
            .unwrap();
        planner
            .add_event(BudgetEvent::new(12, "Holidays", 800.0).on_day(24))
            .unwrap();
        assert_eq!(planner.projection(), &before);

        let lines = planner.statement();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].next_cutoff, date(2025, 4, 15));
        assert_eq!(lines[0].credits, 120.0);

        assert_eq!(planner.remove_transaction(0).unwrap().concept, "Groceries");
        assert!(planner.remove_transaction(0).is_err());
        assert_eq!(planner.remove_event(0).unwrap().name, "Holidays");
        assert!(planner.plan().events.is_empty());
    }

    #[test]
    fn transactions_and_events_are_validated() {
        let mut planner = Planner::new(Plan::new("Checks"), Cadence::Monthly, 2025);
        let on = date(2025, 3, 20);
        assert!(planner
            .add_transaction(Transaction::new(on, 10.0, PaymentMethod::Cash, 0))
            .is_err());
        assert!(planner
            .add_transaction(Transaction::new(on, 10.0, PaymentMethod::Cash, 32))
            .is_err());
        assert!(planner
            .add_transaction(Transaction::new(on, f64::NAN, PaymentMethod::Cash, 5))
            .is_err());
        assert!(planner
            .add_transaction(
                Transaction::new(on, 10.0, PaymentMethod::Cash, 5).with_balance(f64::INFINITY)
            )
            .is_err());
        assert!(planner.add_event(BudgetEvent::new(0, "Nowhere", 10.0)).is_err());
        assert!(planner.add_event(BudgetEvent::new(5, "Late", 10.0).on_day(40)).is_err());
        assert!(planner.add_event(BudgetEvent::new(5, "Odd", f64::NAN)).is_err());
        assert!(planner.plan().transactions.is_empty());
        assert!(planner.plan().events.is_empty());
    }

    #[test]
    fn non_finite_amounts_never_reach_the_plan() {
        for text in ["inf", "-inf", "NaN", "infinity"] {
            assert!(
                matches!(ItemPatch::from_field("amount", text), Err(CoreError::Validation(_))),
                "{text} accepted"
            );
        }
        assert!(ItemDraft::new("Broken")
            .amount(f64::NAN)
            .validate(Category::Expense)
            .is_err());

        let mut planner = Planner::new(Plan::new("Finite"), Cadence::Monthly, 2025);
        let id = planner
            .add_item(Category::Cash, ItemDraft::new("Wallet").amount(20.0))
            .unwrap();
        let patch = ItemPatch {
            amount: Some(Some(f64::INFINITY)),
            ..ItemPatch::default()
        };
        assert!(planner.update_item(id, patch).is_err());
        assert_eq!(planner.plan().item(id).unwrap().amount, Some(20.0));
    }
}
