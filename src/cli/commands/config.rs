use flowplan_config::Config;
use flowplan_core::CoreError;
use flowplan_domain::Cadence;

use crate::cli::{
    output::{self, Align, OutputPreferences},
    registry::CommandEntry,
    shell_context::{CliMode, CommandError, CommandResult, ShellContext},
};

const USAGE: &str = "config [set <key> <value> | backup [note] | backups | restore <name>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => show(&context.config),
        ["set", key, value @ ..] if !value.is_empty() => set(context, key, &value.join(" ")),
        ["backup", note @ ..] => {
            let note = note.join(" ");
            let note = Some(note.trim()).filter(|note| !note.is_empty());
            let name = context.config_manager.backup(&context.config, note)?;
            output::success(format!("Configuration backed up as {name}."));
            Ok(())
        }
        ["backups"] => {
            let backups = context.config_manager.list_backups()?;
            if backups.is_empty() {
                output::info("No configuration backups.");
            }
            for name in backups {
                output::info(format!("  {name}"));
            }
            Ok(())
        }
        ["restore", name] => {
            let restored = context.config_manager.restore(name)?;
            apply(context, restored)?;
            output::success(format!("Configuration restored from {name}."));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(format!("usage: {USAGE}"))),
    }
}

fn show(config: &Config) -> CommandResult {
    let rows: Vec<Vec<String>> = config
        .entries()
        .into_iter()
        .map(|(key, value)| vec![key.to_string(), value])
        .collect();
    output::section("Configuration");
    output::print_table(&[("Key", Align::Left), ("Value", Align::Left)], &rows);
    Ok(())
}

fn set(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let key = key.to_ascii_lowercase();
    if key == "default_cadence" {
        value.trim().parse::<Cadence>().map_err(CoreError::from)?;
    }
    let mut updated = context.config.clone();
    updated.set(&key, value)?;
    apply(context, updated)?;
    output::success(format!("{key} updated."));
    if matches!(
        key.as_str(),
        "default_cadence" | "default_plan_root" | "default_backup_root" | "backup_retention"
    ) {
        output::hint("The new value takes effect the next time the shell starts.");
    }
    Ok(())
}

/// Installs `config` as the live configuration and persists it.
fn apply(context: &mut ShellContext, config: Config) -> CommandResult {
    output::set_preferences(OutputPreferences {
        color: config.ui_color_enabled && context.mode == CliMode::Interactive,
    });
    context.config = config;
    context.persist_config()
}
