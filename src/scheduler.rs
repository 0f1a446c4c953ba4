//! Daily habit reset.
//!
//! The boundary is a local wall-clock hour. A timer task fires at every
//! boundary, and startup calls the same check to catch up on missed ones.

use crate::state::AppState;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use tracing::info;

const RETRY_DELAY: std::time::Duration = std::time::Duration::from_secs(60);

/// Date of the latest boundary at or before `now`.
pub fn most_recent_boundary(now: NaiveDateTime, reset_hour: u32) -> NaiveDate {
    let boundary_time = NaiveTime::from_hms_opt(reset_hour, 0, 0).unwrap_or_default();
    if now.time() >= boundary_time {
        now.date()
    } else {
        now.date() - Duration::days(1)
    }
}

/// The boundary to apply, if `last_reset` predates it.
pub fn reset_due(last_reset: Option<NaiveDate>, now: NaiveDateTime, reset_hour: u32) -> Option<NaiveDate> {
    let boundary = most_recent_boundary(now, reset_hour);
    match last_reset {
        Some(last) if last >= boundary => None,
        _ => Some(boundary),
    }
}

pub fn until_next_boundary<Tz: TimeZone>(now: &DateTime<Tz>, reset_hour: u32) -> std::time::Duration {
    let today = now.date_naive();
    [today, today + Duration::days(1)]
        .into_iter()
        .filter_map(|date| date.and_hms_opt(reset_hour, 0, 0))
        .filter_map(|naive| naive.and_local_timezone(now.timezone()).earliest())
        .find(|candidate| candidate > now)
        .and_then(|next| next.signed_duration_since(now).to_std().ok())
        .unwrap_or(RETRY_DELAY)
}

pub async fn run(state: AppState, reset_hour: u32) {
    info!("daily reset scheduled at {reset_hour:02}:00 local time");
    loop {
        let wait = until_next_boundary(&Local::now(), reset_hour);
        tokio::time::sleep(wait).await;
        state.apply_daily_reset(Local::now(), reset_hour).await;
    }
}
