//! flowplan-storage-json
//!
//! Filesystem JSON persistence for plans with rotating per-plan backups.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use flowplan_core::{plan_warnings, CoreError, PlanBackupInfo, PlanStorage};
use flowplan_domain::Plan;

const PLAN_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const BACKUP_TIMESTAMP_LEN: usize = 15;
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Directories the storage reads from and writes to.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub plan_root: PathBuf,
    pub backup_root: PathBuf,
}

/// Filesystem-backed JSON persistence for plans and their backups.
#[derive(Debug, Clone)]
pub struct JsonPlanStorage {
    plans_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonPlanStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.plan_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            plans_dir: paths.plan_root,
            backups_dir: paths.backup_root,
            retention: retention.max(1),
        })
    }

    pub fn plans_dir(&self) -> &Path {
        &self.plans_dir
    }

    pub fn plan_path(&self, name: &str) -> PathBuf {
        self.plans_dir
            .join(format!("{}.{}", canonical_name(name), PLAN_EXTENSION))
    }

    pub fn backup_path(&self, name: &str, backup: &str) -> PathBuf {
        self.backup_dir(name).join(backup)
    }

    /// Summaries of every stored plan, sorted by display name.
    ///
    /// Files that fail to parse are skipped with a warning so one damaged
    /// plan does not hide the others.
    pub fn list_plan_metadata(&self) -> Result<Vec<PlanMetadata>, CoreError> {
        let mut entries = Vec::new();
        for slug in self.list_plans()? {
            let path = self.plan_path(&slug);
            let plan = match load_plan_from_path(&path) {
                Ok(plan) => plan,
                Err(err) => {
                    tracing::warn!(plan = %slug, %err, "skipping unreadable plan");
                    continue;
                }
            };
            entries.push(PlanMetadata {
                slug,
                name: plan.name.clone(),
                path,
                updated_at: plan.updated_at,
                item_count: plan.item_count(),
                has_target: plan.target.is_some(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    pub fn list_backup_metadata(&self, name: &str) -> Result<Vec<BackupMetadata>, CoreError> {
        let slug = canonical_name(name);
        let mut rows = Vec::new();
        for entry in self.list_backups(name)? {
            let size_bytes = fs::metadata(&entry.path).map(|meta| meta.len()).unwrap_or(0);
            rows.push(BackupMetadata {
                created_at: parse_backup_timestamp(&slug, &entry.id),
                name: entry.id,
                size_bytes,
                path: entry.path,
            });
        }
        rows.sort_by_key(|meta| Reverse(meta.created_at));
        Ok(rows)
    }

    /// Looks up a backup of `name` by its file name, with or without extension.
    pub fn find_backup(&self, name: &str, backup_id: &str) -> Result<PlanBackupInfo, CoreError> {
        let wanted = backup_id.trim();
        self.list_backups(name)?
            .into_iter()
            .find(|info| {
                info.id == wanted
                    || info.id.strip_suffix(&format!(".{}", PLAN_EXTENSION)) == Some(wanted)
            })
            .ok_or_else(|| CoreError::Storage(format!("backup `{}` not found", wanted)))
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn next_backup_path(&self, name: &str, note: Option<&str>) -> (PathBuf, String, String) {
        let dir = self.backup_dir(name);
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let mut file_name = format!("{}.{}", stem, PLAN_EXTENSION);
        let mut attempt = 2;
        while dir.join(&file_name).exists() {
            file_name = format!("{}-{}.{}", stem, attempt, PLAN_EXTENSION);
            attempt += 1;
        }
        (dir.join(&file_name), file_name, timestamp)
    }

    fn write_backup_file(
        &self,
        plan: &Plan,
        name: &str,
        note: Option<&str>,
    ) -> Result<PlanBackupInfo, CoreError> {
        let (path, file_name, timestamp) = self.next_backup_path(name, note);
        write_atomic(&path, &serialize_plan(plan)?)?;
        self.prune_backups(name)?;
        tracing::info!(plan = %canonical_name(name), backup = %file_name, "plan backup written");
        Ok(PlanBackupInfo {
            plan: canonical_name(name),
            id: file_name,
            created_at: timestamp,
            path,
        })
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let (backup_path, _, _) = self.next_backup_path(name, None);
        if let Some(parent) = backup_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &backup_path)?;
        self.prune_backups(name)
    }

    fn prune_backups(&self, name: &str) -> Result<(), CoreError> {
        for entry in self.list_backups(name)?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                tracing::warn!(backup = %entry.id, %err, "failed to prune old backup");
            }
        }
        Ok(())
    }
}

impl PlanStorage for JsonPlanStorage {
    fn save_plan(&self, name: &str, plan: &Plan) -> Result<(), CoreError> {
        let path = self.plan_path(name);
        self.backup_existing_file(name, &path)?;
        save_plan_to_path(plan, &path)?;
        tracing::info!(plan = %canonical_name(name), path = %path.display(), "plan saved");
        Ok(())
    }

    fn load_plan(&self, name: &str) -> Result<Plan, CoreError> {
        let path = self.plan_path(name);
        if !path.exists() {
            return Err(CoreError::PlanNotFound(name.to_string()));
        }
        let plan = load_plan_from_path(&path)?;
        tracing::info!(plan = %canonical_name(name), items = plan.item_count(), "plan loaded");
        Ok(plan)
    }

    fn list_plans(&self) -> Result<Vec<String>, CoreError> {
        if !self.plans_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.plans_dir)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(PLAN_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_plan(&self, name: &str) -> Result<(), CoreError> {
        let path = self.plan_path(name);
        if !path.exists() {
            return Err(CoreError::PlanNotFound(name.to_string()));
        }
        fs::remove_file(path)?;
        tracing::info!(plan = %canonical_name(name), "plan deleted");
        Ok(())
    }

    fn save_plan_to_path(&self, plan: &Plan, path: &Path) -> Result<(), CoreError> {
        if path.starts_with(&self.plans_dir) {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                self.backup_existing_file(stem, path)?;
            }
        }
        save_plan_to_path(plan, path)
    }

    fn load_plan_from_path(&self, path: &Path) -> Result<Plan, CoreError> {
        load_plan_from_path(path)
    }

    fn backup_plan(
        &self,
        name: &str,
        plan: &Plan,
        note: Option<&str>,
    ) -> Result<PlanBackupInfo, CoreError> {
        self.write_backup_file(plan, name, note)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<PlanBackupInfo>, CoreError> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let slug = canonical_name(name);
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PLAN_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                let created_at = parse_backup_timestamp(&slug, file_name)
                    .map(|stamp| stamp.format(BACKUP_TIMESTAMP_FORMAT).to_string())
                    .unwrap_or_default();
                entries.push(PlanBackupInfo {
                    plan: slug.clone(),
                    id: file_name.to_string(),
                    created_at,
                    path: path.clone(),
                });
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(&slug, &b.id)
                .cmp(&parse_backup_timestamp(&slug, &a.id))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }

    fn restore_backup(&self, backup: &PlanBackupInfo) -> Result<Plan, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        // Validate before overwriting the live file.
        let plan = load_plan_from_path(&backup.path)?;
        let target = self.plan_path(&backup.plan);
        self.backup_existing_file(&backup.plan, &target)?;
        save_plan_to_path(&plan, &target)?;
        tracing::info!(plan = %backup.plan, backup = %backup.id, "plan restored from backup");
        Ok(plan)
    }
}

/// Saves a plan to an arbitrary path on disk.
pub fn save_plan_to_path(plan: &Plan, path: &Path) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_plan(plan)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a plan from the provided filesystem path, realigning item categories.
pub fn load_plan_from_path(path: &Path) -> Result<Plan, CoreError> {
    let data = fs::read_to_string(path)?;
    let mut plan: Plan =
        serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
    plan.normalize();
    for warning in plan_warnings(&plan) {
        tracing::warn!(plan = %plan.name, "{warning}");
    }
    Ok(plan)
}

#[derive(Debug, Clone)]
pub struct PlanMetadata {
    pub slug: String,
    pub name: String,
    pub path: PathBuf,
    pub updated_at: DateTime<Utc>,
    pub item_count: usize,
    pub has_target: bool,
}

#[derive(Debug, Clone)]
pub struct BackupMetadata {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// File-system safe slug for a plan name.
pub fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "plan".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_backup_timestamp(slug: &str, file_name: &str) -> Option<DateTime<Utc>> {
    let rest = file_name.strip_prefix(slug)?.strip_prefix('_')?;
    let raw = rest.get(..BACKUP_TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn serialize_plan(plan: &Plan) -> Result<String, CoreError> {
    serde_json::to_string_pretty(plan).map_err(|err| CoreError::Serde(err.to_string()))
}
