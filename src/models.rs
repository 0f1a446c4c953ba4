use crate::commands::Section;
use crate::streak::{DayStatus, StreakChange, StreakState};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub analytics_enabled: bool,
    pub privacy_consent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceClick {
    pub timestamp: String,
    pub category: String,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Everything the session owns. Mutated only through `commands::reduce`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppData {
    pub streak: StreakState,
    pub rules: Vec<Rule>,
    pub habits: Vec<Habit>,
    pub settings: Settings,
    pub last_daily_reset: Option<NaiveDate>,
    pub resource_clicks: Vec<ResourceClick>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            streak: StreakState::default(),
            rules: Vec::new(),
            habits: default_habits(),
            settings: Settings::default(),
            last_daily_reset: None,
            resource_clicks: Vec::new(),
        }
    }
}

pub fn default_habits() -> Vec<Habit> {
    [
        ("habit-1", "Review Trading Plan"),
        ("habit-2", "Daily Profiler 4 Steps"),
        ("habit-3", "Make Trading Ideas for day"),
    ]
    .into_iter()
    .map(|(id, text)| Habit {
        id: id.to_string(),
        text: text.to_string(),
        completed: false,
        created_at: None,
    })
    .collect()
}

/// On-disk shape of the streak, shared with the browser extension's storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakData {
    pub current_streak: i64,
    pub longest_streak: i64,
    pub streak_days: Vec<DayStatus>,
    pub last_check_in: Option<String>,
}

impl Default for StreakData {
    fn default() -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            streak_days: vec![DayStatus::Incomplete; crate::streak::WINDOW_LEN],
            last_check_in: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredData {
    pub streak_data: StreakData,
    pub rules: Vec<Rule>,
    pub habits: Vec<Habit>,
    pub settings: Settings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_daily_reset: Option<String>,
    pub resource_clicks: Vec<ResourceClick>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub outcome: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct HabitUpdateRequest {
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub analytics_enabled: Option<bool>,
    pub privacy_consent: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub category: String,
    pub resource: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakView {
    pub current_streak: usize,
    pub longest_streak: usize,
    pub streak_days: Vec<DayStatus>,
    pub last_check_in: Option<String>,
    pub checked_in_today: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub today: String,
    pub streak: StreakView,
    pub rules: Vec<Rule>,
    pub habits: Vec<Habit>,
    pub settings: Settings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub refresh: Vec<Section>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub change: StreakChange,
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub refresh: Vec<Section>,
}

#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub tracked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAnalytics {
    pub total_clicks: usize,
    pub clicks_by_category: BTreeMap<String, u64>,
    pub clicks_by_resource: BTreeMap<String, u64>,
    pub recent_clicks: Vec<ResourceClick>,
}
