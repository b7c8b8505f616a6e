use std::{
    borrow::Cow,
    collections::HashMap,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use flowplan_domain::{Cadence, Category, PaymentMethod, Recurrence};

use super::{
    output,
    shell_context::{CliMode, LoopControl, ShellContext},
};
use crate::{errors::CliError, utils::paths::SCRIPT_ENV};

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    output::info("Type `help` to list commands.");
    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                run_line(context, trimmed);
            }
            Err(ReadlineError::Interrupted) => {
                output::hint("Type `exit` or press Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        run_line(context, trimmed);
    }
    Ok(())
}

fn run_line(context: &mut ShellContext, line: &str) {
    match context.process_line(line) {
        Ok(LoopControl::Continue) | Ok(LoopControl::Exit) => {}
        Err(err) => context.report_error(err),
    }
}

/// Completes command names, and for a few commands their first argument.
struct CommandHelper {
    commands: Vec<String>,
    arguments: HashMap<&'static str, Vec<String>>,
}

impl CommandHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names.into_iter().map(str::to_ascii_lowercase).collect();
        commands.sort();
        commands.dedup();

        let mut arguments = HashMap::new();
        arguments.insert(
            "add",
            Category::ALL.iter().map(|c| c.key().to_string()).collect(),
        );
        arguments.insert(
            "cadence",
            Cadence::ALL.iter().map(|c| c.key().to_string()).collect(),
        );
        arguments.insert(
            "config",
            ["set", "backup", "backups", "restore"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        arguments.insert("target", vec!["clear".to_string()]);
        for command in ["tx", "events"] {
            arguments.insert(command, vec!["add".to_string(), "remove".to_string()]);
        }
        arguments.insert("help", commands.clone());
        Self {
            commands,
            arguments,
        }
    }

    fn recurrence_keys() -> Vec<String> {
        Recurrence::ALL.iter().map(|r| r.key().to_string()).collect()
    }

    fn candidates_for(&self, words: &[&str]) -> Vec<String> {
        match words {
            [] => self.commands.clone(),
            [command] => self
                .arguments
                .get(command.to_ascii_lowercase().as_str())
                .cloned()
                .unwrap_or_default(),
            // add <category> <label> <amount> <start> [recurrence]
            [command, _, _, _, _] if command.eq_ignore_ascii_case("add") => {
                Self::recurrence_keys()
            }
            // tx add <date> <amount> <method>
            [command, sub, _, _] if command.eq_ignore_ascii_case("tx")
                && sub.eq_ignore_ascii_case("add") =>
            {
                PaymentMethod::ALL.iter().map(|m| m.key().to_string()).collect()
            }
            [command, _, field] if command.eq_ignore_ascii_case("edit")
                && field.eq_ignore_ascii_case("recurrence") =>
            {
                Self::recurrence_keys()
            }
            [command, _] if command.eq_ignore_ascii_case("edit") => {
                ["label", "amount", "start", "recurrence"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let completed: Vec<&str> = prefix[..start].split_whitespace().collect();
        let needle = prefix[start..].to_ascii_lowercase();

        let candidates = self
            .candidates_for(&completed)
            .into_iter()
            .filter(|name| name.starts_with(&needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> CommandHelper {
        CommandHelper::new(vec!["add", "cadence", "calendar", "edit", "help"])
    }

    #[test]
    fn completes_commands_then_arguments() {
        let helper = helper();
        assert_eq!(helper.candidates_for(&[]).len(), 5);
        assert!(helper.candidates_for(&["add"]).contains(&"credit_card".to_string()));
        assert!(helper.candidates_for(&["cadence"]).contains(&"1m".to_string()));
        assert!(helper
            .candidates_for(&["add", "income", "Salary", "1000", "2025-01-01"])
            .contains(&"monthly".to_string()));
        assert!(helper
            .candidates_for(&["edit", "ab12", "recurrence"])
            .contains(&"quarterly".to_string()));
        assert!(helper.candidates_for(&["list", "x"]).is_empty());
        assert!(helper
            .candidates_for(&["tx", "add", "2025-03-20", "120"])
            .contains(&"credit_card".to_string()));
    }
}
