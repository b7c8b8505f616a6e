use chrono::Datelike;

use flowplan_domain::{calendar, Category, Plan};

use crate::occurrence::iterate_occurrences;

/// Occurrence counts per day of one month, index 0 being the 1st.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonthActivity {
    pub year: i32,
    pub month: u32,
    pub income_counts: Vec<u32>,
    pub outflow_counts: Vec<u32>,
}

impl MonthActivity {
    pub fn days(&self) -> usize {
        self.income_counts.len()
    }

    /// `(day_of_month, income, outflow)` for days with any activity.
    pub fn active_days(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        self.income_counts
            .iter()
            .zip(&self.outflow_counts)
            .enumerate()
            .filter(|(_, (income, outflow))| **income > 0 || **outflow > 0)
            .map(|(index, (income, outflow))| (index as u32 + 1, *income, *outflow))
    }
}

/// Counts contributing occurrences per day of `month`, split into income and everything else.
///
/// An invalid month yields an empty activity.
pub fn month_activity(plan: &Plan, year: i32, month: u32) -> MonthActivity {
    let days = if (1..=12).contains(&month) {
        calendar::days_in_month(year, month) as usize
    } else {
        0
    };
    let mut activity = MonthActivity {
        year,
        month,
        income_counts: vec![0; days],
        outflow_counts: vec![0; days],
    };
    if days == 0 {
        return activity;
    }

    for item in plan.iter_items() {
        let Some((_, start_date)) = item.contribution() else {
            continue;
        };
        let counts = if item.category == Category::Income {
            &mut activity.income_counts
        } else {
            &mut activity.outflow_counts
        };
        for date in iterate_occurrences(start_date, item.recurrence, year)
            .skip_while(|date| date.month() < month)
            .take_while(|date| date.month() == month)
        {
            counts[date.day0() as usize] += 1;
        }
    }
    activity
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flowplan_domain::{Item, Recurrence};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn counts_income_and_outflow_per_day() {
        let mut plan = Plan::new("Calendar");
        plan.add_item(
            Item::new(Category::Income, "Salary")
                .with_amount(1000.0)
                .with_start_date(date(2025, 1, 15))
                .with_recurrence(Recurrence::Monthly),
        );
        plan.add_item(
            Item::new(Category::Expense, "Coffee")
                .with_amount(3.0)
                .with_start_date(date(2025, 2, 1))
                .with_recurrence(Recurrence::Weekly),
        );
        plan.add_item(Item::new(Category::Cash, "No amount").with_start_date(date(2025, 2, 1)));

        let activity = month_activity(&plan, 2025, 2);
        assert_eq!(activity.days(), 28);
        assert_eq!(activity.income_counts[14], 1);
        assert_eq!(activity.income_counts.iter().sum::<u32>(), 1);
        assert_eq!(activity.outflow_counts.iter().sum::<u32>(), 4);
        assert_eq!(
            activity.active_days().map(|(day, _, _)| day).collect::<Vec<_>>(),
            vec![1, 8, 15, 22]
        );
    }

    #[test]
    fn invalid_month_is_empty() {
        let plan = Plan::new("Empty");
        assert_eq!(month_activity(&plan, 2025, 13).days(), 0);
        assert_eq!(month_activity(&plan, 2024, 2).days(), 29);
    }
}
