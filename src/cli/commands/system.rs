use crate::cli::{
    output::{self, Align},
    registry::CommandEntry,
    shell_context::{CommandError, CommandResult, ShellContext},
};
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("flowplan {}", meta.version));
    for (label, value) in meta.rows() {
        output::info(format!("  {label:<11}: {value}"));
    }
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.command(&name.to_lowercase()) {
            Some(entry) => {
                output::section(entry.name);
                output::info(entry.description);
                output::hint(format!("usage: {}", entry.usage));
            }
            None => context.suggest_command(name),
        }
        return Ok(());
    }

    output::section("Commands");
    let rows: Vec<Vec<String>> = context
        .registry
        .list()
        .into_iter()
        .map(|entry| vec![entry.usage.to_string(), entry.description.to_string()])
        .collect();
    output::print_table(&[("Usage", Align::Left), ("Description", Align::Left)], &rows);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
