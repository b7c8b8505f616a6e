use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use flowplan_domain::Plan;

use crate::CoreError;

/// Describes a persisted backup artifact for a plan.
#[derive(Debug, Clone)]
pub struct PlanBackupInfo {
    pub plan: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing plans and backups.
pub trait PlanStorage: Send + Sync {
    fn save_plan(&self, name: &str, plan: &Plan) -> Result<(), CoreError>;
    fn load_plan(&self, name: &str) -> Result<Plan, CoreError>;
    fn list_plans(&self) -> Result<Vec<String>, CoreError>;
    fn delete_plan(&self, name: &str) -> Result<(), CoreError>;
    fn save_plan_to_path(&self, plan: &Plan, path: &Path) -> Result<(), CoreError>;
    fn load_plan_from_path(&self, path: &Path) -> Result<Plan, CoreError>;
    fn backup_plan(
        &self,
        name: &str,
        plan: &Plan,
        note: Option<&str>,
    ) -> Result<PlanBackupInfo, CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<PlanBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &PlanBackupInfo) -> Result<Plan, CoreError>;
}

/// Flags anomalies in a loaded plan that do not prevent projection.
pub fn plan_warnings(plan: &Plan) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();

    for (category, items) in &plan.items {
        for item in items {
            if !seen.insert(item.id) {
                warnings.push(format!("item {} appears more than once", item.id));
            }
            if item.category != *category {
                warnings.push(format!(
                    "item {} is filed under {} but marked {}",
                    item.id,
                    category.key(),
                    item.category.key()
                ));
            }
            match item.amount {
                Some(amount) if !amount.is_finite() => {
                    warnings.push(format!("item {} has a non-finite amount", item.id))
                }
                Some(amount) if amount < 0.0 => warnings.push(format!(
                    "item {} has a negative amount; its category already sets the sign",
                    item.id
                )),
                _ => {}
            }
            if item.amount.is_some() && item.start_date.is_none() {
                warnings.push(format!(
                    "item {} has an amount but no start date",
                    item.id
                ));
            }
        }
    }

    if let Some(target) = plan.target.as_ref() {
        if !target.is_active() {
            warnings.push(format!("target amount {} is not positive", target.amount));
        }
    }
    warnings
}
