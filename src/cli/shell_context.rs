//! Shell state, dispatch, and error reporting shared by every command.

use std::{io, path::PathBuf};

use thiserror::Error;
use uuid::Uuid;

use flowplan_config::{Config, ConfigError, ConfigManager};
use flowplan_core::{Clock, CoreError, FixedClock, Planner, SystemClock};
use flowplan_domain::{Cadence, Plan};
use flowplan_storage_json::{canonical_name, JsonPlanStorage, StoragePaths};

use super::{
    commands,
    output::{self, OutputPreferences},
    registry::{CommandEntry, CommandRegistry},
};
use crate::{
    errors::{CliError, PlannerError},
    utils::paths,
};

const UNTITLED_PLAN: &str = "Untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("This plan has not been saved yet. Use `save <name>` first.")]
    PlanNotSaved,
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Planner(err.into())
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Planner(err.into())
    }
}

/// Everything one shell session owns: the planner, persistence, and preferences.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub planner: Planner,
    /// Storage slug the current plan was loaded from or saved under.
    pub plan_name: Option<String>,
    pub storage: JsonPlanStorage,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub clock: Box<dyn Clock>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let clock: Box<dyn Clock> = match paths::pinned_today() {
            Some(today) => Box::new(FixedClock::new(today)),
            None => Box::new(SystemClock),
        };
        Self::with_clock(mode, paths::app_data_dir(), clock)
    }

    pub fn with_clock(
        mode: CliMode,
        home: PathBuf,
        clock: Box<dyn Clock>,
    ) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(home.clone())?;
        let config = config_manager.load()?;
        output::set_preferences(OutputPreferences {
            color: config.ui_color_enabled && mode == CliMode::Interactive,
        });

        let storage = JsonPlanStorage::with_retention(
            StoragePaths {
                plan_root: config.resolve_plan_root(&home),
                backup_root: config.resolve_backup_root(&home),
            },
            config.backup_retention,
        )?;

        let cadence = cadence_setting(&config.default_cadence);
        let planner = Planner::for_clock(Plan::new(UNTITLED_PLAN), cadence, clock.as_ref());

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let mut context = Self {
            mode,
            registry,
            planner,
            plan_name: None,
            storage,
            config_manager,
            config,
            clock,
            running: true,
        };
        context.auto_load_last();
        tracing::debug!(home = %home.display(), ?mode, "shell context ready");
        Ok(context)
    }

    fn auto_load_last(&mut self) {
        if self.mode != CliMode::Interactive {
            return;
        }
        let Some(name) = self.config.last_opened_plan.clone() else {
            return;
        };
        match self.load_named_plan(&name) {
            Ok(()) => output::success(format!("Automatically loaded last plan `{name}`.")),
            Err(err) => {
                tracing::warn!(plan = %name, %err, "could not reopen last plan");
            }
        }
    }

    pub fn prompt(&self) -> String {
        let name = self
            .plan_name
            .as_deref()
            .unwrap_or(self.planner.plan().name.as_str());
        format!("flowplan({name}) {}> ", self.planner.year())
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    pub fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };

        if self.planner.roll_to_year(self.clock.as_ref()) {
            output::info(format!("Timeline moved to {}.", self.planner.year()));
        }

        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    /// Tokenizes and dispatches one input line.
    pub fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match shell_words::split(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(format!("Could not parse input: {err}"));
                return Ok(LoopControl::Continue);
            }
        };
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };

        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

        let control = self.dispatch(&command, raw, &args)?;
        if control == LoopControl::Exit {
            self.running = false;
        }
        Ok(control)
    }

    pub fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = self.registry.suggest(input) {
            output::hint(format!("Did you mean `{best}`?"));
        }
    }

    pub fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::PlanNotSaved => {
                output::error(CommandError::PlanNotSaved);
                output::hint("Try `save household` to give this plan a name.");
            }
            other => output::error(other),
        }
    }

    pub fn require_plan_name(&self) -> Result<String, CommandError> {
        self.plan_name.clone().ok_or(CommandError::PlanNotSaved)
    }

    /// Resolves a full item id or a unique prefix.
    pub fn resolve_item(&self, reference: &str) -> Result<Uuid, CommandError> {
        Ok(self.planner.resolve_item(reference)?)
    }

    pub fn persist_config(&self) -> CommandResult {
        Ok(self.config_manager.save(&self.config)?)
    }

    /// Records `name` as the active plan slug and as the plan to reopen next time.
    pub fn remember_plan(&mut self, name: &str) -> CommandResult {
        let slug = canonical_name(name);
        self.plan_name = Some(slug.clone());
        self.config.last_opened_plan = Some(slug);
        self.persist_config()
    }

    pub fn load_named_plan(&mut self, name: &str) -> CommandResult {
        use flowplan_core::PlanStorage;

        let plan = self.storage.load_plan(name)?;
        self.planner.replace_plan(plan);
        self.remember_plan(name)
    }
}

/// Parses a stored cadence key, falling back to weekly buckets.
pub(crate) fn cadence_setting(value: &str) -> Cadence {
    value.parse().unwrap_or_else(|err| {
        tracing::warn!(%err, "unknown default cadence in config; using weekly");
        Cadence::default()
    })
}

#[cfg(test)]
pub(crate) fn process_script(
    home: PathBuf,
    today: chrono::NaiveDate,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut context =
        ShellContext::with_clock(CliMode::Script, home, Box::new(FixedClock::new(today)))?;
    for line in lines {
        match context.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => return Err(CliError::Command(err.to_string())),
        }
    }
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flowplan_core::PlanStorage;
    use flowplan_domain::Category;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn script_builds_and_projects_a_plan() {
        let home = TempDir::new().unwrap();
        let context = process_script(
            home.path().to_path_buf(),
            today(),
            &[
                "new Household",
                "cadence 1m",
                "add income Salary 1000 2025-01-01 monthly",
                "add expense \"Gym membership\" 30 2025-01-15 monthly",
            ],
        )
        .unwrap();

        assert_eq!(context.planner.year(), 2025);
        assert_eq!(context.planner.cadence(), Cadence::Monthly);
        assert_eq!(context.planner.plan().items_in(Category::Expense)[0].label, "Gym membership");
        assert_eq!(context.planner.projection().kpis.year_to_date, 11_640.0);
    }

    #[test]
    fn save_remembers_the_plan_and_load_restores_it() {
        let home = TempDir::new().unwrap();
        let context = process_script(
            home.path().to_path_buf(),
            today(),
            &["new Trip", "add cash Wallet 20 2025-02-01", "save trip fund"],
        )
        .unwrap();
        assert_eq!(context.plan_name.as_deref(), Some("trip_fund"));
        assert_eq!(context.config.last_opened_plan.as_deref(), Some("trip_fund"));
        assert_eq!(context.storage.load_plan("trip_fund").unwrap().item_count(), 1);

        let reloaded =
            process_script(home.path().to_path_buf(), today(), &["load trip_fund"]).unwrap();
        assert_eq!(reloaded.planner.plan().name, "Trip");
    }

    #[test]
    fn failing_commands_surface_errors() {
        let home = TempDir::new().unwrap();
        let err = process_script(
            home.path().to_path_buf(),
            today(),
            &["add expense Gym 30 2025-01-05 fortnightly"],
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("fortnightly"));

        let err = process_script(home.path().to_path_buf(), today(), &["backup"])
            .err()
            .unwrap();
        assert!(err.to_string().contains("not been saved"));
    }

    #[test]
    fn exit_stops_processing() {
        let home = TempDir::new().unwrap();
        let context = process_script(
            home.path().to_path_buf(),
            today(),
            &["exit", "add income Late 1 2025-01-01"],
        )
        .unwrap();
        assert!(!context.running);
        assert!(context.planner.plan().is_empty());
    }

    #[test]
    fn bad_default_cadence_falls_back_to_weekly() {
        assert_eq!(cadence_setting("fortnight"), Cadence::Weekly);
        assert_eq!(cadence_setting("15d"), Cadence::Every15Days);
    }
}
