pub mod config;
pub mod items;
pub mod plan;
pub mod statement;
pub mod system;
pub mod timeline;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::cli::{
    registry::{CommandEntry, CommandRegistry},
    shell_context::CommandError,
};

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(plan::definitions());
    commands.extend(items::definitions());
    commands.extend(timeline::definitions());
    commands.extend(statement::definitions());
    commands.extend(config::definitions());
    commands
}

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in all_definitions() {
        registry.register(entry);
    }
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("`{value}` is not a date (expected YYYY-MM-DD)"))
    })
}

pub(crate) fn parse_amount(value: &str) -> Result<f64, CommandError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("`{value}` is not a valid amount")))
}

pub(crate) fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// Rejects argument lists outside `min..=max` with the command's usage line.
pub(crate) fn expect_args(
    args: &[&str],
    min: usize,
    max: usize,
    usage: &str,
) -> Result<(), CommandError> {
    if args.len() < min || args.len() > max {
        return Err(CommandError::InvalidArguments(format!("usage: {usage}")));
    }
    Ok(())
}
