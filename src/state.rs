use crate::commands::{reduce, Command, CommandError, Context, Effect, Transition};
use crate::models::AppData;
use crate::scheduler;
use crate::storage::persist_data;
use chrono::{DateTime, Local, NaiveDate};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Runs one command to completion while holding the data lock.
    pub async fn dispatch(&self, command: Command, ctx: Context) -> Result<Transition, CommandError> {
        let mut data = self.data.lock().await;
        let transition = reduce(&data, command, &ctx)?;
        self.commit(&mut data, &transition).await;
        Ok(transition)
    }

    /// Clears habit check-marks if the most recent reset boundary has not been
    /// applied yet. Returns the boundary that was applied.
    pub async fn apply_daily_reset(&self, now: DateTime<Local>, reset_hour: u32) -> Option<NaiveDate> {
        let mut data = self.data.lock().await;
        let boundary = scheduler::reset_due(data.last_daily_reset, now.naive_local(), reset_hour)?;

        match reduce(&data, Command::ResetHabits { boundary }, &Context::at(now)) {
            Ok(transition) => {
                self.commit(&mut data, &transition).await;
                info!("daily habit reset applied for {boundary}");
                Some(boundary)
            }
            Err(err) => {
                error!("daily habit reset failed: {err}");
                None
            }
        }
    }

    async fn commit(&self, data: &mut AppData, transition: &Transition) {
        *data = transition.data.clone();

        for effect in &transition.effects {
            if let Effect::LogViolation { note, marked } = effect {
                info!(slot = ?marked, "violation logged: {note}");
            }
        }

        if transition.should_persist() {
            if let Err(err) = persist_data(&self.data_path, data).await {
                error!("failed to persist data: {}", err.message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("trader_discipline_state_{}_{name}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    fn ctx() -> Context {
        Context::at(Local.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn persisting_commands_write_the_data_file() {
        let path = temp_path("persist");
        let state = AppState::new(path.clone(), AppData::default());

        let transition = state
            .dispatch(Command::AddRule { text: "Cut losers early".into() }, ctx())
            .await
            .expect("add rule");
        assert!(transition.should_persist());

        let stored = crate::storage::load_data(&path).await;
        assert_eq!(stored.rules.len(), 1);
        assert_eq!(stored.rules[0].text, "Cut losers early");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn no_op_commands_leave_the_data_file_alone() {
        let path = temp_path("noop");
        let state = AppState::new(path.clone(), AppData::default());

        let transition = state
            .dispatch(Command::CheckInViolated { note: "   ".into() }, ctx())
            .await
            .expect("blank violation");
        assert!(!transition.should_persist());
        assert!(!path.exists());
    }
}
