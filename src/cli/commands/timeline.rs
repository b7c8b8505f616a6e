use flowplan_core::{month_activity, CoreError};
use flowplan_domain::{Cadence, Category, Target};

use super::{expect_args, parse_amount, parse_date};
use crate::cli::{
    output::{self, Align},
    registry::CommandEntry,
    shell_context::{CommandError, CommandResult, ShellContext},
};

const TARGET_USAGE: &str = "target [<amount> <date> | clear]";

pub(crate) const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "cadence",
            "Show or change the bucket width",
            "cadence [daily|3d|7d|14d|15d|1m]",
            cmd_cadence,
        ),
        CommandEntry::new(
            "timeline",
            "Show net and cumulative balance per bucket",
            "timeline",
            cmd_timeline,
        ),
        CommandEntry::new(
            "balance",
            "Show yearly figures and category totals",
            "balance",
            cmd_balance,
        ),
        CommandEntry::new("target", "Show, set or clear the savings target", TARGET_USAGE, cmd_target),
        CommandEntry::new(
            "progress",
            "Compare the projected balance with the target",
            "progress",
            cmd_progress,
        ),
        CommandEntry::new(
            "calendar",
            "Show which days of a month have activity",
            "calendar <month>",
            cmd_calendar,
        ),
    ]
}

fn cmd_cadence(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 0, 1, "cadence [key]")?;
    let Some(key) = args.first() else {
        let current = context.planner.cadence();
        output::info(format!("Cadence: {} ({})", current, current.key()));
        let options: Vec<&str> = Cadence::ALL.iter().map(|cadence| cadence.key()).collect();
        output::hint(format!("Available: {}", options.join(", ")));
        return Ok(());
    };

    let cadence: Cadence = key.parse().map_err(CoreError::from)?;
    context.planner.set_cadence(cadence);
    context.config.default_cadence = cadence.key().to_string();
    context.persist_config()?;
    output::success(format!(
        "Cadence set to {} ({} buckets).",
        cadence,
        context.planner.timeline().len()
    ));
    Ok(())
}

fn cmd_timeline(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let currency = context.currency();
    let projection = context.planner.projection();
    let has_target = projection.target.iter().any(Option::is_some);

    let rows: Vec<Vec<String>> = projection
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let mut row = vec![
                column.label.clone(),
                output::money(projection.balance()[index], currency),
                output::money(projection.cumulative()[index], currency),
            ];
            if has_target {
                row.push(
                    projection.target[index]
                        .map(|amount| output::money(amount, currency))
                        .unwrap_or_default(),
                );
            }
            row
        })
        .collect();

    let mut headers = vec![
        ("Bucket", Align::Left),
        ("Net", Align::Right),
        ("Cumulative", Align::Right),
    ];
    if has_target {
        headers.push(("Target", Align::Right));
    }

    output::section(format!(
        "{} timeline {}",
        context.planner.cadence(),
        context.planner.year()
    ));
    output::print_table(&headers, &rows);
    Ok(())
}

fn cmd_balance(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let currency = context.currency();
    let projection = context.planner.projection();
    let kpis = &projection.kpis;

    output::section(format!("Balance {}", context.planner.year()));
    output::info(format!(
        "This period : {}",
        output::money(kpis.this_period, currency)
    ));
    output::info(format!(
        "Year to date: {}",
        output::money(kpis.year_to_date, currency)
    ));

    if !kpis.category_totals.is_empty() {
        let rows: Vec<Vec<String>> = kpis
            .category_totals
            .iter()
            .map(|(category, total)| {
                let direction = if category.is_inflow() { "in" } else { "out" };
                vec![
                    category.to_string(),
                    direction.to_string(),
                    output::money(*total, currency),
                ]
            })
            .collect();
        output::print_table(
            &[
                ("Category", Align::Left),
                ("Flow", Align::Left),
                ("Total", Align::Right),
            ],
            &rows,
        );
    }

    if projection.dropped_occurrences > 0 {
        output::warning(format!(
            "{} occurrence(s) fell outside every bucket and were not counted.",
            projection.dropped_occurrences
        ));
    }
    Ok(())
}

fn cmd_target(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            let currency = context.currency();
            match context.planner.plan().target.as_ref() {
                Some(target) => output::info(format!(
                    "Target: {} by {}",
                    output::money(target.amount, currency),
                    target.date
                )),
                None => output::info("No target set."),
            }
            Ok(())
        }
        [word] if word.eq_ignore_ascii_case("clear") => {
            match context.planner.clear_target() {
                Some(_) => output::success("Target cleared."),
                None => output::info("No target to clear."),
            }
            Ok(())
        }
        [amount, date] => {
            let target = Target::new(parse_amount(amount)?, parse_date(date)?);
            if !target.is_active() {
                output::warning("A target of zero or less is kept but not tracked.");
            }
            context.planner.set_target(target)?;
            output::success(format!(
                "Target set to {} by {}.",
                output::money(target.amount, context.currency()),
                target.date
            ));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(format!(
            "usage: {TARGET_USAGE}"
        ))),
    }
}

fn cmd_progress(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let currency = context.currency();
    let Some(progress) = context.planner.projection().progress.as_ref() else {
        match context.planner.plan().target.as_ref() {
            None => output::info("No target set. Use `target <amount> <date>`."),
            Some(target) if !target.is_active() => {
                output::info("The target amount is not positive, so it is not tracked.")
            }
            Some(target) => output::info(format!(
                "The target date {} is outside the {} timeline.",
                target.date,
                context.planner.year()
            )),
        }
        return Ok(());
    };

    output::section("Target progress");
    output::info(format!(
        "Target   : {} by {}",
        output::money(progress.amount, currency),
        progress.date
    ));
    output::info(format!(
        "Projected: {} at bucket {} ({:.0}%)",
        output::money(progress.projected, currency),
        progress.bucket_start,
        progress.ratio() * 100.0
    ));
    if progress.reached {
        output::success(format!(
            "On track, ahead by {}.",
            output::money(-progress.gap, currency)
        ));
    } else {
        output::warning(format!(
            "Short by {}.",
            output::money(progress.gap, currency)
        ));
    }
    Ok(())
}

fn cmd_calendar(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 1, 1, "calendar <month>")?;
    let month = parse_month(args[0])?;
    let year = context.planner.year();
    let activity = month_activity(context.planner.plan(), year, month);

    output::section(format!("{} {}", capitalize(MONTH_NAMES[month as usize - 1]), year));
    let rows: Vec<Vec<String>> = activity
        .active_days()
        .map(|(day, income, outflow)| {
            vec![day.to_string(), income.to_string(), outflow.to_string()]
        })
        .collect();
    if rows.is_empty() {
        output::info("No activity this month.");
        return Ok(());
    }
    output::print_table(
        &[
            ("Day", Align::Right),
            (Category::Income.key(), Align::Right),
            ("outflow", Align::Right),
        ],
        &rows,
    );
    Ok(())
}

/// Accepts `1`..`12`, a full month name or any unambiguous prefix of at least three letters.
pub(crate) fn parse_month(value: &str) -> Result<u32, CommandError> {
    let trimmed = value.trim().to_ascii_lowercase();
    if let Ok(number) = trimmed.parse::<u32>() {
        if (1..=12).contains(&number) {
            return Ok(number);
        }
    } else if trimmed.len() >= 3 {
        if let Some(index) = MONTH_NAMES.iter().position(|name| name.starts_with(&trimmed)) {
            return Ok(index as u32 + 1);
        }
    }
    Err(CommandError::InvalidArguments(format!(
        "`{value}` is not a month"
    )))
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
