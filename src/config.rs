use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::schedule::{SlotOrder, TimeRange};

pub const DEFAULT_GAME_DURATION_MS: i64 = 20 * 60 * 1000;
pub const DEFAULT_TRANSITION_TIME_MS: i64 = 10 * 60 * 1000;
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Settings of one schedule generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Windows in which games can be played; empty means 09:00-17:00 on `reference_date`
    pub time_ranges: Vec<TimeRange>,
    pub game_duration_ms: i64,
    pub transition_time_ms: i64,
    pub reference_date: NaiveDate,
    /// Fixed seed for the tie-breaking shuffles. Without one every run draws a fresh seed.
    pub seed: Option<u64>,
    pub slot_order: SlotOrder,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            time_ranges: Vec::new(),
            game_duration_ms: DEFAULT_GAME_DURATION_MS,
            transition_time_ms: DEFAULT_TRANSITION_TIME_MS,
            reference_date: Local::now().date_naive(),
            seed: None,
            slot_order: SlotOrder::default(),
        }
    }
}

/// Loads settings from a JSON file, falling back to defaults if the file does not exist
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<ScheduleSettings, Box<dyn std::error::Error>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(ScheduleSettings::default());
    }
    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

/// Admin password for the web interface, from `ADMIN_PASSWORD`
pub fn admin_password() -> String {
    std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string())
}
