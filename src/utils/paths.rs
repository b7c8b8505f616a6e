use std::{env, path::PathBuf};

use chrono::NaiveDate;
use dirs::home_dir;

const DEFAULT_DIR_NAME: &str = ".flowplan";
pub const HOME_ENV: &str = "FLOWPLAN_HOME";
pub const TODAY_ENV: &str = "FLOWPLAN_TODAY";
pub const SCRIPT_ENV: &str = "FLOWPLAN_CLI_SCRIPT";

/// Returns the application data directory, `$FLOWPLAN_HOME` or `~/.flowplan`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Date override from `$FLOWPLAN_TODAY` (`YYYY-MM-DD`), used to pin the projected year.
pub fn pinned_today() -> Option<NaiveDate> {
    let raw = env::var(TODAY_ENV).ok()?;
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::warn!(value = %raw, %err, "ignoring malformed {}", TODAY_ENV);
            None
        }
    }
}
