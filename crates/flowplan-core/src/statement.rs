//! Statement cutoffs for card transactions and the monthly events budget.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use flowplan_domain::{
    calendar::{add_months, days_in_month, start_of_month},
    BudgetEvent, Transaction,
};

/// The first statement closing strictly after `date`.
///
/// `cutoff_day` is clamped to `1..=31` and then to the length of the month,
/// so a day-31 cutoff closes on Feb 28 in February.
pub fn next_cutoff(date: NaiveDate, cutoff_day: u32) -> NaiveDate {
    let day = cutoff_day.clamp(1, 31);
    let this_month = cutoff_in(start_of_month(date), day);
    if this_month > date {
        this_month
    } else {
        cutoff_in(add_months(start_of_month(date), 1), day)
    }
}

fn cutoff_in(month_start: NaiveDate, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(month_start.year(), month_start.month()));
    month_start.with_day(day).unwrap_or(month_start)
}

/// Where one transaction lands on the statement cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatementLine {
    pub id: Uuid,
    pub next_cutoff: NaiveDate,
    /// Amount charged to the card statement; zero unless paid by credit card.
    pub credits: f64,
    /// Amount debited immediately; zero for credit card charges.
    pub debits: f64,
    /// `amount - balance`, with a missing balance read as zero.
    pub difference: f64,
}

pub fn settle(transaction: &Transaction) -> StatementLine {
    let (credits, debits) = if transaction.method.is_credit() {
        (transaction.amount, 0.0)
    } else {
        (0.0, transaction.amount)
    };
    StatementLine {
        id: transaction.id,
        next_cutoff: next_cutoff(transaction.date, transaction.cutoff_day),
        credits,
        debits,
        difference: transaction.amount - transaction.balance.unwrap_or(0.0),
    }
}

/// Totals of every transaction closing on the same cutoff date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffTotals {
    pub cutoff: NaiveDate,
    pub credits: f64,
    pub debits: f64,
    pub count: usize,
}

/// Groups settled transactions by cutoff, earliest first.
pub fn cutoff_totals(transactions: &[Transaction]) -> Vec<CutoffTotals> {
    let mut grouped: BTreeMap<NaiveDate, CutoffTotals> = BTreeMap::new();
    for line in transactions.iter().map(settle) {
        let totals = grouped.entry(line.next_cutoff).or_insert(CutoffTotals {
            cutoff: line.next_cutoff,
            credits: 0.0,
            debits: 0.0,
            count: 0,
        });
        totals.credits += line.credits;
        totals.debits += line.debits;
        totals.count += 1;
    }
    grouped.into_values().collect()
}

/// Budget reserved per month (index 0 is January).
pub fn monthly_event_budget(events: &[BudgetEvent]) -> [f64; 12] {
    let mut months = [0.0; 12];
    for event in events {
        if let Some(slot) = event
            .month
            .checked_sub(1)
            .and_then(|index| months.get_mut(index as usize))
        {
            *slot += event.budget;
        }
    }
    months
}

/// Events in calendar order; undated events sort first within their month.
pub fn events_in_order(events: &[BudgetEvent]) -> Vec<(usize, &BudgetEvent)> {
    let mut ordered: Vec<(usize, &BudgetEvent)> = events.iter().enumerate().collect();
    ordered.sort_by_key(|(_, event)| (event.month, event.day.unwrap_or(0)));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowplan_domain::PaymentMethod;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cutoff_on_or_before_the_date_moves_to_next_month() {
        assert_eq!(next_cutoff(date(2025, 3, 10), 15), date(2025, 3, 15));
        assert_eq!(next_cutoff(date(2025, 3, 15), 15), date(2025, 4, 15));
        assert_eq!(next_cutoff(date(2025, 3, 20), 15), date(2025, 4, 15));
        assert_eq!(next_cutoff(date(2025, 12, 20), 5), date(2026, 1, 5));
    }

    #[test]
    fn cutoff_day_is_clamped_to_the_month() {
        assert_eq!(next_cutoff(date(2025, 2, 10), 31), date(2025, 2, 28));
        assert_eq!(next_cutoff(date(2025, 1, 31), 31), date(2025, 2, 28));
        assert_eq!(next_cutoff(date(2025, 4, 30), 31), date(2025, 5, 31));
        assert_eq!(next_cutoff(date(2025, 6, 1), 0), date(2025, 7, 1));
        assert_eq!(next_cutoff(date(2025, 6, 1), 99), date(2025, 6, 30));
    }

    #[test]
    fn credit_cards_accrue_and_other_methods_debit() {
        let card = Transaction::new(date(2025, 3, 20), 120.0, PaymentMethod::CreditCard, 15)
            .with_balance(100.0);
        let line = settle(&card);
        assert_eq!(line.next_cutoff, date(2025, 4, 15));
        assert_eq!((line.credits, line.debits), (120.0, 0.0));
        assert_eq!(line.difference, 20.0);

        let cash = Transaction::new(date(2025, 3, 20), 40.0, PaymentMethod::Cash, 15);
        let line = settle(&cash);
        assert_eq!((line.credits, line.debits), (0.0, 40.0));
        assert_eq!(line.difference, 40.0);
    }

    #[test]
    fn totals_group_by_cutoff() {
        let transactions = [
            Transaction::new(date(2025, 3, 20), 120.0, PaymentMethod::CreditCard, 15),
            Transaction::new(date(2025, 4, 2), 30.0, PaymentMethod::DebitCard, 15),
            Transaction::new(date(2025, 3, 1), 10.0, PaymentMethod::CreditCard, 15),
        ];
        let totals = cutoff_totals(&transactions);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].cutoff, date(2025, 3, 15));
        assert_eq!(totals[0].credits, 10.0);
        assert_eq!(totals[1].cutoff, date(2025, 4, 15));
        assert_eq!((totals[1].credits, totals[1].debits, totals[1].count), (120.0, 30.0, 2));
        assert!(cutoff_totals(&[]).is_empty());
    }

    #[test]
    fn event_budget_sums_per_month() {
        let events = [
            BudgetEvent::new(12, "Holidays", 800.0),
            BudgetEvent::new(3, "Birthday", 150.0).on_day(21),
            BudgetEvent::new(3, "Insurance renewal", 300.0).on_day(2),
            BudgetEvent::new(13, "Typo", 50.0),
        ];
        let months = monthly_event_budget(&events);
        assert_eq!(months[2], 450.0);
        assert_eq!(months[11], 800.0);
        assert_eq!(months.iter().sum::<f64>(), 1250.0);

        let names: Vec<&str> = events_in_order(&events)
            .into_iter()
            .map(|(_, event)| event.name.as_str())
            .collect();
        assert_eq!(names, ["Insurance renewal", "Birthday", "Holidays", "Typo"]);
    }
}
