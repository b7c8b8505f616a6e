//! Expansion of an item's recurrence rule into concrete dates within one year.

use std::iter::FusedIterator;

use chrono::NaiveDate;

use flowplan_domain::{calendar, Recurrence, RecurrenceStep};

/// Lazily yields every occurrence of a rule inside `[Jan 1, Dec 31]` of a year.
///
/// The k-th occurrence is always computed from the original anchor, so month
/// clamping (Jan 31 -> Feb 28) never drifts later occurrences. The sequence is a
/// pure function of its inputs; building it again starts over.
#[derive(Debug, Clone)]
pub struct Occurrences {
    anchor: NaiveDate,
    step: Option<RecurrenceStep>,
    window_start: NaiveDate,
    window_end: NaiveDate,
    skipped: u32,
    next_index: u32,
    finished: bool,
}

/// Builds the occurrence sequence of `start_date` under `recurrence` for `year`.
pub fn iterate_occurrences(start_date: NaiveDate, recurrence: Recurrence, year: i32) -> Occurrences {
    Occurrences::new(start_date, recurrence, year)
}

impl Occurrences {
    pub fn new(start_date: NaiveDate, recurrence: Recurrence, year: i32) -> Self {
        let step = recurrence.step();
        let Some((window_start, window_end)) = calendar::year_bounds(year) else {
            return Self {
                anchor: start_date,
                step,
                window_start: start_date,
                window_end: start_date,
                skipped: 0,
                next_index: 0,
                finished: true,
            };
        };

        let mut finished = start_date > window_end;
        let mut skipped = 0;
        match step {
            None => finished |= start_date < window_start,
            Some(step) if !finished => match first_index_in_window(start_date, step, window_start) {
                Some(index) => skipped = index,
                None => finished = true,
            },
            Some(_) => {}
        }

        Self {
            anchor: start_date,
            step,
            window_start,
            window_end,
            skipped,
            next_index: skipped,
            finished,
        }
    }

    /// Number of occurrences before January 1 that were jumped over.
    pub fn skipped(&self) -> u32 {
        self.skipped
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.finished {
            return None;
        }
        let Some(step) = self.step else {
            self.finished = true;
            return Some(self.anchor);
        };

        let date = step.nth_from(self.anchor, self.next_index);
        if date < self.window_start || date > self.window_end {
            self.finished = true;
            return None;
        }
        match self.next_index.checked_add(1) {
            Some(index) => self.next_index = index,
            None => self.finished = true,
        }
        Some(date)
    }
}

impl FusedIterator for Occurrences {}

/// Smallest occurrence index whose date is on or after `window_start`.
///
/// Computed by ceil-division of the elapsed distance, so a rule anchored decades
/// ago costs the same as one anchored yesterday.
fn first_index_in_window(
    anchor: NaiveDate,
    step: RecurrenceStep,
    window_start: NaiveDate,
) -> Option<u32> {
    if anchor >= window_start {
        return Some(0);
    }
    let (elapsed, width) = match step {
        RecurrenceStep::Days(days) => ((window_start - anchor).num_days(), days as i64),
        RecurrenceStep::Months(months) => (
            calendar::month_index(window_start) - calendar::month_index(anchor),
            months as i64,
        ),
    };
    if width <= 0 {
        return None;
    }
    let index = (elapsed + width - 1) / width;
    u32::try_from(index).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn collect(start: NaiveDate, recurrence: Recurrence, year: i32) -> Vec<NaiveDate> {
        iterate_occurrences(start, recurrence, year).collect()
    }

    #[test]
    fn one_time_items_only_yield_inside_the_year() {
        assert_eq!(
            collect(date(2025, 4, 2), Recurrence::None, 2025),
            vec![date(2025, 4, 2)]
        );
        assert!(collect(date(2024, 4, 2), Recurrence::None, 2025).is_empty());
        assert!(collect(date(2026, 1, 1), Recurrence::None, 2025).is_empty());
    }

    #[test]
    fn start_after_year_end_yields_nothing() {
        for recurrence in Recurrence::ALL {
            assert!(collect(date(2026, 1, 1), recurrence, 2025).is_empty());
        }
    }

    #[test]
    fn monthly_rule_yields_twelve_dates() {
        let dates = collect(date(2025, 1, 1), Recurrence::Monthly, 2025);
        assert_eq!(dates.len(), 12);
        assert_eq!(dates[11], date(2025, 12, 1));
    }

    #[test]
    fn month_end_anchor_is_clamped_without_drift() {
        let dates = collect(date(2025, 1, 31), Recurrence::Monthly, 2025);
        assert_eq!(dates[0], date(2025, 1, 31));
        assert_eq!(dates[1], date(2025, 2, 28));
        assert_eq!(dates[2], date(2025, 3, 31));
        assert_eq!(dates[3], date(2025, 4, 30));
        assert_eq!(dates.len(), 12);
    }

    #[test]
    fn yearly_rule_from_last_year_fast_forwards_in_one_step() {
        let occurrences = iterate_occurrences(date(2024, 11, 1), Recurrence::Yearly, 2025);
        assert_eq!(occurrences.skipped(), 1);
        assert_eq!(occurrences.collect::<Vec<_>>(), vec![date(2025, 11, 1)]);
    }

    #[test]
    fn distant_past_anchor_is_reached_arithmetically() {
        let occurrences = iterate_occurrences(date(1925, 1, 1), Recurrence::Daily, 2025);
        let days = (date(2025, 1, 1) - date(1925, 1, 1)).num_days() as u32;
        assert_eq!(occurrences.skipped(), days);
        assert_eq!(occurrences.count(), 365);

        let quarterly = collect(date(2000, 2, 29), Recurrence::Quarterly, 2025);
        assert_eq!(
            quarterly,
            vec![
                date(2025, 2, 28),
                date(2025, 5, 29),
                date(2025, 8, 29),
                date(2025, 11, 29)
            ]
        );
    }

    #[test]
    fn day_step_rules_land_on_the_anchor_grid() {
        let weekly = collect(date(2024, 12, 30), Recurrence::Weekly, 2025);
        assert_eq!(weekly[0], date(2025, 1, 6));
        assert_eq!(weekly.len(), 52);

        let every15 = collect(date(2024, 12, 20), Recurrence::Every15Days, 2025);
        assert_eq!(every15[0], date(2025, 1, 4));
    }

    #[test]
    fn occurrences_are_bounded_and_strictly_increasing() {
        let starts = [
            date(2019, 5, 31),
            date(2024, 12, 31),
            date(2025, 1, 1),
            date(2025, 2, 28),
            date(2025, 8, 31),
            date(2025, 12, 31),
        ];
        for start in starts {
            for recurrence in Recurrence::ALL {
                let dates = collect(start, recurrence, 2025);
                assert!(dates
                    .iter()
                    .all(|d| *d >= date(2025, 1, 1) && *d <= date(2025, 12, 31)));
                assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
            }
        }
    }

    #[test]
    fn iteration_is_restartable() {
        let first = collect(date(2025, 3, 3), Recurrence::Every3Days, 2025);
        let second = collect(date(2025, 3, 3), Recurrence::Every3Days, 2025);
        assert_eq!(first, second);
    }
}
