use std::path::Path;

use flowplan_core::PlanStorage;
use flowplan_domain::Plan;
use flowplan_storage_json::{canonical_name, load_plan_from_path, save_plan_to_path};

use super::expect_args;
use crate::cli::{
    output::{self, Align},
    registry::CommandEntry,
    shell_context::{CommandError, CommandResult, ShellContext},
};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("new", "Start an empty plan", "new <name>", cmd_new),
        CommandEntry::new("save", "Save the current plan", "save [name]", cmd_save),
        CommandEntry::new("load", "Load a saved plan", "load <name>", cmd_load),
        CommandEntry::new("plans", "List saved plans", "plans", cmd_plans),
        CommandEntry::new("delete", "Delete a saved plan", "delete <name>", cmd_delete),
        CommandEntry::new(
            "backup",
            "Back up the current plan",
            "backup [note]",
            cmd_backup,
        ),
        CommandEntry::new(
            "backups",
            "List backups of the current plan",
            "backups",
            cmd_backups,
        ),
        CommandEntry::new(
            "restore",
            "Restore the current plan from a backup",
            "restore <backup>",
            cmd_restore,
        ),
        CommandEntry::new(
            "export",
            "Write the current plan to a JSON file",
            "export <path>",
            cmd_export,
        ),
        CommandEntry::new(
            "import",
            "Replace the current plan with a JSON file",
            "import <path>",
            cmd_import,
        ),
    ]
}

/// Multi-word names arrive split by the tokenizer.
fn joined(args: &[&str]) -> Option<String> {
    let name = args.join(" ");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn cmd_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = joined(args)
        .ok_or_else(|| CommandError::InvalidArguments("usage: new <name>".into()))?;
    context.planner.replace_plan(Plan::new(name.clone()));
    context.plan_name = None;
    output::success(format!("Started plan `{name}`."));
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = match joined(args) {
        Some(name) => name,
        None => context.require_plan_name()?,
    };
    context.storage.save_plan(&name, context.planner.plan())?;
    context.remember_plan(&name)?;
    output::success(format!(
        "Saved to {}.",
        context.storage.plan_path(&name).display()
    ));
    Ok(())
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = joined(args)
        .ok_or_else(|| CommandError::InvalidArguments("usage: load <name>".into()))?;
    context.load_named_plan(&name)?;
    let plan = context.planner.plan();
    output::success(format!(
        "Loaded `{}` ({} item(s)).",
        plan.name,
        plan.item_count()
    ));
    Ok(())
}

fn cmd_plans(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let plans = context.storage.list_plan_metadata()?;
    if plans.is_empty() {
        output::info("No saved plans.");
        return Ok(());
    }
    let active = context.plan_name.as_deref();
    let rows: Vec<Vec<String>> = plans
        .iter()
        .map(|meta| {
            let marker = if Some(meta.slug.as_str()) == active { "*" } else { "" };
            vec![
                format!("{}{}", meta.slug, marker),
                meta.name.clone(),
                meta.item_count.to_string(),
                if meta.has_target { "yes" } else { "no" }.to_string(),
                meta.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    output::print_table(
        &[
            ("Slug", Align::Left),
            ("Name", Align::Left),
            ("Items", Align::Right),
            ("Target", Align::Left),
            ("Updated", Align::Left),
        ],
        &rows,
    );
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = joined(args)
        .ok_or_else(|| CommandError::InvalidArguments("usage: delete <name>".into()))?;
    context.storage.delete_plan(&name)?;

    let slug = canonical_name(&name);
    if context.plan_name.as_deref() == Some(slug.as_str()) {
        context.plan_name = None;
    }
    if context.config.last_opened_plan.as_deref() == Some(slug.as_str()) {
        context.config.last_opened_plan = None;
        context.persist_config()?;
    }
    output::success(format!("Deleted plan `{slug}`."));
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = context.require_plan_name()?;
    let note = joined(args);
    let info = context
        .storage
        .backup_plan(&name, context.planner.plan(), note.as_deref())?;
    output::success(format!("Backup written: {}", info.id));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let name = context.require_plan_name()?;
    let backups = context.storage.list_backup_metadata(&name)?;
    if backups.is_empty() {
        output::info(format!("No backups for `{name}`."));
        return Ok(());
    }
    let rows: Vec<Vec<String>> = backups
        .iter()
        .map(|meta| {
            vec![
                meta.name.clone(),
                meta.created_at
                    .map(|stamp| stamp.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".into()),
                meta.size_bytes.to_string(),
            ]
        })
        .collect();
    output::print_table(
        &[
            ("Backup", Align::Left),
            ("Created (UTC)", Align::Left),
            ("Bytes", Align::Right),
        ],
        &rows,
    );
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 1, 1, "restore <backup>")?;
    let name = context.require_plan_name()?;
    let info = context.storage.find_backup(&name, args[0])?;
    let plan = context.storage.restore_backup(&info)?;
    context.planner.replace_plan(plan);
    output::success(format!("Restored `{name}` from {}.", info.id));
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 1, 1, "export <path>")?;
    let path = Path::new(args[0]);
    save_plan_to_path(context.planner.plan(), path)?;
    output::success(format!("Exported to {}.", path.display()));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 1, 1, "import <path>")?;
    let plan = load_plan_from_path(Path::new(args[0]))?;
    let name = plan.name.clone();
    context.planner.replace_plan(plan);
    context.plan_name = None;
    output::success(format!("Imported `{name}`. Use `save <name>` to keep it."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::shell_context::process_script;
    use chrono::NaiveDate;
    use flowplan_core::PlanStorage;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn backup_and_restore_roll_back_changes() {
        let home = TempDir::new().unwrap();
        let mut context = process_script(
            home.path().to_path_buf(),
            today(),
            &["new Home", "add income Salary 1000 2025-01-01 monthly", "save home"],
        )
        .unwrap();

        context.process_line("backup before-rent").unwrap();
        let backup = context.storage.list_backups("home").unwrap()[0].id.clone();
        assert!(backup.contains("before-rent"));

        context
            .process_line("add expense Rent 700 2025-01-05 monthly")
            .unwrap();
        assert_eq!(context.planner.plan().item_count(), 2);

        context.process_line(&format!("restore {backup}")).unwrap();
        assert_eq!(context.planner.plan().item_count(), 1);
        assert_eq!(context.storage.load_plan("home").unwrap().item_count(), 1);
    }

    #[test]
    fn export_then_import_round_trips_through_a_file() {
        let home = TempDir::new().unwrap();
        let file = home.path().join("shared.json");
        let mut context = process_script(
            home.path().to_path_buf(),
            today(),
            &["new Shared", "add cash Allowance 15 2025-01-03 weekly"],
        )
        .unwrap();
        context
            .process_line(&format!("export \"{}\"", file.display()))
            .unwrap();

        context.process_line("new Other").unwrap();
        assert!(context.planner.plan().is_empty());

        context
            .process_line(&format!("import \"{}\"", file.display()))
            .unwrap();
        assert_eq!(context.planner.plan().name, "Shared");
        assert_eq!(context.planner.plan().item_count(), 1);
        assert_eq!(context.plan_name, None);
    }

    #[test]
    fn delete_forgets_the_active_plan() {
        let home = TempDir::new().unwrap();
        let mut context = process_script(
            home.path().to_path_buf(),
            today(),
            &["new Old", "save old"],
        )
        .unwrap();
        context.process_line("delete old").unwrap();
        assert_eq!(context.plan_name, None);
        assert_eq!(context.config.last_opened_plan, None);
        assert!(context.process_line("load old").is_err());
    }
}
