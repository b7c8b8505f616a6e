use flowplan_core::{CoreError, ItemDraft, ItemPatch};
use flowplan_domain::Category;

use super::{expect_args, parse_amount, parse_date, short_id};
use crate::cli::{
    output::{self, Align},
    registry::CommandEntry,
    shell_context::{CommandResult, ShellContext},
};

const ADD_USAGE: &str = "add <category> <label> <amount> <start> [recurrence]";
const EDIT_USAGE: &str = "edit <id> <field> <value>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("add", "Add a cash-flow item", ADD_USAGE, cmd_add),
        CommandEntry::new("list", "List items with their yearly totals", "list", cmd_list),
        CommandEntry::new("edit", "Change one field of an item", EDIT_USAGE, cmd_edit),
        CommandEntry::new("remove", "Remove an item", "remove <id>", cmd_remove),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 4, 5, ADD_USAGE)?;
    let category: Category = args[0].parse().map_err(CoreError::from)?;
    let amount = parse_amount(args[2])?;
    let start = args[3];
    let mut draft = ItemDraft::new(args[1]).amount(amount).start_date(start);
    if let Some(recurrence) = args.get(4) {
        draft = draft.recurrence(*recurrence);
    }

    let id = context.planner.add_item(category, draft)?;
    output::success(format!(
        "Added {} `{}` ({}).",
        category,
        args[1].trim(),
        short_id(id)
    ));
    if parse_date(start).is_err() {
        output::warning(format!(
            "Start date `{start}` was not recognized; the item will not contribute until it is set."
        ));
    }
    Ok(())
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let plan = context.planner.plan();
    if plan.is_empty() {
        output::info("No items yet. Use `add` to create one.");
        return Ok(());
    }

    let currency = context.currency();
    let projection = context.planner.projection();
    let rows: Vec<Vec<String>> = Category::ALL
        .iter()
        .flat_map(|category| plan.items_in(*category))
        .map(|item| {
            let total = projection.row(item.id).map(|row| row.total()).unwrap_or(0.0);
            vec![
                short_id(item.id),
                item.category.to_string(),
                item.label.clone(),
                item.amount
                    .map(|amount| output::money(amount, currency))
                    .unwrap_or_else(|| "-".into()),
                item.start_date
                    .map(|date| date.to_string())
                    .unwrap_or_else(|| "-".into()),
                item.recurrence.to_string(),
                output::money(total, currency),
            ]
        })
        .collect();

    output::section(format!("{} ({})", plan.name, context.planner.year()));
    output::print_table(
        &[
            ("Id", Align::Left),
            ("Category", Align::Left),
            ("Label", Align::Left),
            ("Amount", Align::Right),
            ("Start", Align::Left),
            ("Repeats", Align::Left),
            ("Year total", Align::Right),
        ],
        &rows,
    );
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 3, usize::MAX, EDIT_USAGE)?;
    let id = context.resolve_item(args[0])?;
    let value = args[2..].join(" ");
    let patch = ItemPatch::from_field(args[1], &value)?;
    context.planner.update_item(id, patch)?;
    output::success(format!("Updated item {}.", short_id(id)));
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_args(args, 1, 1, "remove <id>")?;
    let id = context.resolve_item(args[0])?;
    let removed = context.planner.remove_item(id)?;
    output::success(format!("Removed `{}`.", removed.label));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::shell_context::process_script;
    use chrono::NaiveDate;
    use flowplan_domain::{Category, Recurrence};
    use tempfile::TempDir;

    fn run(lines: &[&str]) -> crate::cli::ShellContext {
        let home = TempDir::new().unwrap();
        process_script(
            home.path().to_path_buf(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            lines,
        )
        .unwrap()
    }

    #[test]
    fn add_keeps_items_with_unrecognized_dates() {
        let context = run(&["add card Groceries 80 someday weekly"]);
        let items = context.planner.plan().items_in(Category::CreditCard);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].start_date, None);
        assert_eq!(items[0].recurrence, Recurrence::Weekly);
        assert_eq!(context.planner.projection().kpis.year_to_date, 0.0);
    }

    #[test]
    fn edit_and_remove_resolve_id_prefixes() {
        let mut context = run(&["add income Salary 1000 2025-01-01 monthly"]);
        let id = context.planner.plan().items_in(Category::Income)[0].id;
        let prefix = super::short_id(id);

        context
            .process_line(&format!("edit {prefix} amount 1500"))
            .unwrap();
        assert_eq!(context.planner.projection().kpis.year_to_date, 18_000.0);

        context
            .process_line(&format!("edit {prefix} label Main salary"))
            .unwrap();
        assert_eq!(context.planner.plan().item(id).unwrap().label, "Main salary");

        context.process_line(&format!("remove {prefix}")).unwrap();
        assert!(context.planner.plan().is_empty());
        assert!(context.process_line(&format!("remove {prefix}")).is_err());
    }

    #[test]
    fn add_rejects_unknown_categories_and_amounts() {
        let home = TempDir::new().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let err = process_script(
            home.path().to_path_buf(),
            today,
            &["add savings Jar 10 2025-01-01"],
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("savings"));

        let err = process_script(
            home.path().to_path_buf(),
            today,
            &["add cash Jar ten 2025-01-01"],
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("ten"));
    }
}
