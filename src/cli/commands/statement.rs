use flowplan_core::{cutoff_totals, events_in_order, monthly_event_budget, CoreError};
use flowplan_domain::{BudgetEvent, PaymentMethod, Transaction};

use super::{
    expect_args, parse_amount, parse_date,
    timeline::{capitalize, parse_month, MONTH_NAMES},
};
use crate::cli::{
    output::{self, Align},
    registry::CommandEntry,
    shell_context::{CommandError, CommandResult, ShellContext},
};

const TX_USAGE: &str =
    "tx [add <date> <amount> <method> <cutoff-day> [concept] [balance] | remove <n>]";
const EVENTS_USAGE: &str = "events [add <month> <day|-> <name> <budget> | remove <n>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "tx",
            "List, add or remove card transactions and their cutoffs",
            TX_USAGE,
            cmd_tx,
        ),
        CommandEntry::new(
            "events",
            "List, add or remove budgeted yearly events",
            EVENTS_USAGE,
            cmd_events,
        ),
    ]
}

fn cmd_tx(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => list_transactions(context),
        ["add", rest @ ..] => add_transaction(context, rest),
        ["remove", n] => {
            let removed = context.planner.remove_transaction(parse_row(n)?)?;
            output::success(format!(
                "Removed transaction of {} on {}.",
                output::money(removed.amount, context.currency()),
                removed.date
            ));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(format!("usage: {TX_USAGE}"))),
    }
}

fn add_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 4, 6, TX_USAGE)?;
    let date = parse_date(args[0])?;
    let amount = parse_amount(args[1])?;
    let method: PaymentMethod = args[2].parse().map_err(CoreError::from)?;
    let cutoff_day = args[3].trim().parse::<u32>().map_err(|_| {
        CommandError::InvalidArguments(format!("`{}` is not a day of the month", args[3]))
    })?;

    let mut transaction = Transaction::new(date, amount, method, cutoff_day);
    if let Some(concept) = args.get(4) {
        transaction = transaction.with_concept(concept.trim());
    }
    if let Some(balance) = args.get(5) {
        transaction = transaction.with_balance(parse_amount(balance)?);
    }

    context.planner.add_transaction(transaction)?;
    if let Some(line) = context.planner.statement().pop() {
        output::success(format!(
            "Added {} transaction; next cutoff {}.",
            method, line.next_cutoff
        ));
    }
    Ok(())
}

fn list_transactions(context: &ShellContext) -> CommandResult {
    let transactions = &context.planner.plan().transactions;
    if transactions.is_empty() {
        output::info("No transactions yet. Use `tx add` to record one.");
        return Ok(());
    }

    let currency = context.currency();
    let rows: Vec<Vec<String>> = transactions
        .iter()
        .zip(context.planner.statement())
        .enumerate()
        .map(|(index, (transaction, line))| {
            vec![
                (index + 1).to_string(),
                transaction.date.to_string(),
                transaction.concept.clone(),
                transaction.method.to_string(),
                line.next_cutoff.to_string(),
                output::money(line.credits, currency),
                output::money(line.debits, currency),
                output::money(line.difference, currency),
            ]
        })
        .collect();

    output::section("Transactions");
    output::print_table(
        &[
            ("#", Align::Right),
            ("Date", Align::Left),
            ("Concept", Align::Left),
            ("Method", Align::Left),
            ("Next cutoff", Align::Left),
            ("Credits", Align::Right),
            ("Debits", Align::Right),
            ("Difference", Align::Right),
        ],
        &rows,
    );

    let totals: Vec<Vec<String>> = cutoff_totals(transactions)
        .into_iter()
        .map(|totals| {
            vec![
                totals.cutoff.to_string(),
                totals.count.to_string(),
                output::money(totals.credits, currency),
                output::money(totals.debits, currency),
            ]
        })
        .collect();
    output::section("Per cutoff");
    output::print_table(
        &[
            ("Cutoff", Align::Left),
            ("Count", Align::Right),
            ("Credits", Align::Right),
            ("Debits", Align::Right),
        ],
        &totals,
    );
    Ok(())
}

fn cmd_events(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => list_events(context),
        ["add", month, day, name, budget] => {
            let month = parse_month(month)?;
            let mut event = BudgetEvent::new(month, name.trim(), parse_amount(budget)?);
            if *day != "-" {
                let day = day.trim().parse::<u32>().map_err(|_| {
                    CommandError::InvalidArguments(format!("`{day}` is not a day of the month"))
                })?;
                event = event.on_day(day);
            }
            let budget = event.budget;
            context.planner.add_event(event)?;
            output::success(format!(
                "Budgeted {} for `{}` in {}.",
                output::money(budget, context.currency()),
                name.trim(),
                capitalize(MONTH_NAMES[month as usize - 1])
            ));
            Ok(())
        }
        ["remove", n] => {
            let removed = context.planner.remove_event(parse_row(n)?)?;
            output::success(format!("Removed event `{}`.", removed.name));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(format!(
            "usage: {EVENTS_USAGE}"
        ))),
    }
}

fn list_events(context: &ShellContext) -> CommandResult {
    let events = &context.planner.plan().events;
    if events.is_empty() {
        output::info("No events yet. Use `events add` to budget one.");
        return Ok(());
    }

    let currency = context.currency();
    let rows: Vec<Vec<String>> = events_in_order(events)
        .into_iter()
        .map(|(index, event)| {
            vec![
                (index + 1).to_string(),
                capitalize(MONTH_NAMES[event.month as usize - 1]),
                event.day.map(|day| day.to_string()).unwrap_or_default(),
                event.name.clone(),
                output::money(event.budget, currency),
            ]
        })
        .collect();

    output::section("Events budget");
    output::print_table(
        &[
            ("#", Align::Right),
            ("Month", Align::Left),
            ("Day", Align::Right),
            ("Event", Align::Left),
            ("Budget", Align::Right),
        ],
        &rows,
    );

    let months = monthly_event_budget(events);
    let total: f64 = months.iter().sum();
    output::info(format!("Total budget: {}", output::money(total, currency)));
    Ok(())
}

/// Parses a one-based row number from a listing into a zero-based index.
fn parse_row(value: &str) -> Result<usize, CommandError> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| CommandError::InvalidArguments(format!("`{value}` is not a row number")))
}
