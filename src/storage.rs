use crate::errors::AppError;
use crate::models::{AppData, StoredData, StreakData};
use crate::streak::{DayStatus, StreakState, WINDOW_LEN};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;
use tracing::{error, warn};

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => decode_data(value),
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

/// Creates the data file's directory. A failure is logged and the app keeps
/// running from memory, with writes failing the same way later.
pub async fn ensure_parent_dir(path: &Path) -> bool {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return true;
    };
    match fs::create_dir_all(parent).await {
        Ok(()) => true,
        Err(err) => {
            error!("failed to create data directory {}: {err}", parent.display());
            false
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(&encode_data(data)).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

/// Decodes each top-level key on its own so one bad field only loses itself.
pub fn decode_data(value: Value) -> AppData {
    let mut data = AppData::default();
    let Value::Object(mut object) = value else {
        error!("data file is not a JSON object, using defaults");
        return data;
    };

    if let Some(streak) = field::<StreakData>(&mut object, "streakData") {
        data.streak = streak_from_stored(&streak);
    }
    if let Some(rules) = field(&mut object, "rules") {
        data.rules = rules;
    }
    if let Some(habits) = field(&mut object, "habits") {
        data.habits = habits;
    }
    if let Some(settings) = field(&mut object, "settings") {
        data.settings = settings;
    }
    if let Some(label) = field::<String>(&mut object, "lastDailyReset") {
        data.last_daily_reset = parse_day(&label);
    }
    if let Some(clicks) = field(&mut object, "resourceClicks") {
        data.resource_clicks = clicks;
    }

    data
}

pub fn encode_data(data: &AppData) -> StoredData {
    StoredData {
        streak_data: streak_to_stored(&data.streak),
        rules: data.rules.clone(),
        habits: data.habits.clone(),
        settings: data.settings,
        last_daily_reset: data.last_daily_reset.map(format_day),
        resource_clicks: data.resource_clicks.clone(),
    }
}

fn field<T: DeserializeOwned>(object: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = object.remove(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!("ignoring malformed `{key}` in data file: {err}");
            None
        }
    }
}

/// Pads or truncates the day array, clears slots past the cursor and
/// restores `best >= cursor`.
pub fn streak_from_stored(stored: &StreakData) -> StreakState {
    let mut days = [DayStatus::Incomplete; WINDOW_LEN];
    for (slot, status) in days.iter_mut().zip(&stored.streak_days) {
        *slot = *status;
    }

    let cursor = stored.current_streak.clamp(0, WINDOW_LEN as i64) as usize;
    let best = usize::try_from(stored.longest_streak).unwrap_or(0).max(cursor);

    let mut state = StreakState {
        days,
        cursor,
        best,
        last_action: stored.last_check_in.as_deref().and_then(parse_day),
    };
    state.clear_unfilled();
    state
}

pub fn streak_to_stored(state: &StreakState) -> StreakData {
    StreakData {
        current_streak: state.cursor as i64,
        longest_streak: state.best as i64,
        streak_days: state.days.to_vec(),
        last_check_in: state.last_action.map(format_day),
    }
}

pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Accepts `2024-01-01` as well as the browser's `Mon Jan 01 2024`.
pub fn parse_day(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    NaiveDate::parse_from_str(label, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(label, "%a %b %d %Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let data = decode_data(json!({ "rules": [] }));
        assert_eq!(data, AppData::default());
    }

    #[test]
    fn malformed_field_only_loses_itself() {
        let data = decode_data(json!({
            "streakData": "broken",
            "rules": [{ "id": "1", "text": "No FOMO", "createdAt": "2024-01-01T00:00:00.000Z" }],
            "habits": 42
        }));

        assert_eq!(data.streak, StreakState::default());
        assert_eq!(data.rules.len(), 1);
        assert_eq!(data.rules[0].text, "No FOMO");
        assert_eq!(data.habits, crate::models::default_habits());
    }

    #[test]
    fn partial_streak_data_is_merged_over_defaults() {
        let data = decode_data(json!({
            "streakData": { "currentStreak": 3, "streakDays": ["completed", "completed", "completed"] }
        }));

        assert_eq!(data.streak.cursor, 3);
        assert_eq!(data.streak.best, 3);
        assert_eq!(data.streak.days[2], DayStatus::Completed);
        assert_eq!(data.streak.days[3], DayStatus::Incomplete);
        assert_eq!(data.streak.last_action, None);
    }

    #[test]
    fn out_of_range_streak_values_are_clamped() {
        let stored = StreakData {
            current_streak: 40,
            longest_streak: -2,
            streak_days: vec![DayStatus::Completed; 20],
            last_check_in: Some("garbage".into()),
        };

        let state = streak_from_stored(&stored);
        assert_eq!(state.cursor, WINDOW_LEN);
        assert_eq!(state.best, WINDOW_LEN);
        assert_eq!(state.last_action, None);
    }

    #[test]
    fn slots_past_the_cursor_are_cleared_on_load() {
        let data = decode_data(json!({
            "streakData": {
                "currentStreak": 0,
                "longestStreak": 6,
                "streakDays": vec!["completed"; WINDOW_LEN]
            }
        }));

        assert_eq!(data.streak.cursor, 0);
        assert_eq!(data.streak.best, 6);
        assert!(data.streak.days.iter().all(|d| *d == DayStatus::Incomplete));

        let partial = decode_data(json!({
            "streakData": {
                "currentStreak": 2,
                "streakDays": ["completed", "completed", "violated", "completed", "bogus"]
            }
        }));
        assert_eq!(partial.streak.days[..2], [DayStatus::Completed; 2]);
        assert!(partial.streak.days[2..].iter().all(|d| *d == DayStatus::Incomplete));
    }

    #[test]
    fn browser_date_strings_are_understood() {
        assert_eq!(parse_day("Mon Jan 01 2024"), Some(day(2024, 1, 1)));
        assert_eq!(parse_day("2024-01-01"), Some(day(2024, 1, 1)));
        assert_eq!(parse_day("yesterday"), None);
    }

    #[test]
    fn encoded_blob_uses_extension_key_names() {
        let mut data = AppData::default();
        data.streak.cursor = 1;
        data.streak.best = 4;
        data.streak.days[0] = DayStatus::Completed;
        data.streak.last_action = Some(day(2024, 1, 2));
        data.last_daily_reset = Some(day(2024, 1, 1));

        let value = serde_json::to_value(encode_data(&data)).unwrap();
        assert_eq!(value["streakData"]["currentStreak"], 1);
        assert_eq!(value["streakData"]["longestStreak"], 4);
        assert_eq!(value["streakData"]["streakDays"][0], "completed");
        assert_eq!(value["streakData"]["streakDays"].as_array().unwrap().len(), WINDOW_LEN);
        assert_eq!(value["streakData"]["lastCheckIn"], "2024-01-02");
        assert_eq!(value["lastDailyReset"], "2024-01-01");
        assert_eq!(value["settings"]["analyticsEnabled"], false);
        assert_eq!(value["habits"][0]["id"], "habit-1");

        assert_eq!(decode_data(value), data);
    }

    #[tokio::test]
    async fn unusable_data_directory_is_reported_not_fatal() {
        let mut blocker = std::env::temp_dir();
        blocker.push(format!("trader_discipline_blocker_{}", std::process::id()));
        std::fs::write(&blocker, b"not a directory").unwrap();

        let path = blocker.join("nested").join("state.json");
        assert!(!ensure_parent_dir(&path).await);
        assert_eq!(load_data(&path).await, AppData::default());
        assert!(persist_data(&path, &AppData::default()).await.is_err());

        assert!(ensure_parent_dir(Path::new("state.json")).await);

        let _ = std::fs::remove_file(&blocker);
    }

    #[tokio::test]
    async fn missing_file_loads_defaults_and_persist_writes_it() {
        let mut path = std::env::temp_dir();
        path.push(format!("trader_discipline_storage_{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        assert_eq!(load_data(&path).await, AppData::default());

        let mut data = AppData::default();
        data.settings.analytics_enabled = true;
        persist_data(&path, &data).await.expect("persist");
        assert_eq!(load_data(&path).await, data);

        let _ = std::fs::remove_file(&path);
    }
}
