use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of day slots in one streak cycle.
pub const WINDOW_LEN: usize = 14;

/// Unknown labels read as `Incomplete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Completed,
    Violated,
    #[default]
    #[serde(other)]
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakState {
    pub days: [DayStatus; WINDOW_LEN],
    pub cursor: usize,
    pub best: usize,
    pub last_action: Option<NaiveDate>,
}

impl Default for StreakState {
    fn default() -> Self {
        Self {
            days: [DayStatus::Incomplete; WINDOW_LEN],
            cursor: 0,
            best: 0,
            last_action: None,
        }
    }
}

impl StreakState {
    pub fn is_window_full(&self) -> bool {
        self.cursor >= WINDOW_LEN
    }

    pub fn checked_in_on(&self, day: NaiveDate) -> bool {
        self.last_action == Some(day)
    }

    /// Clears every slot from the cursor onward.
    pub fn clear_unfilled(&mut self) {
        let cursor = self.cursor.min(WINDOW_LEN);
        self.days[cursor..].fill(DayStatus::Incomplete);
    }
}

/// What a check-in did to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StreakChange {
    Advanced { index: usize },
    WindowFull,
    AlreadyCheckedIn,
    /// `marked` is the slot that held the violation before the window restarted.
    Violated { marked: Option<usize>, corrected: bool },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIn {
    pub state: StreakState,
    pub change: StreakChange,
}

impl CheckIn {
    pub fn changed(&self) -> bool {
        !matches!(
            self.change,
            StreakChange::AlreadyCheckedIn | StreakChange::Cancelled
        )
    }
}

/// Records a day on which every rule was followed.
///
/// A second followed check-in on the same day is a no-op. Once the window is
/// full the day array stops moving, but the check-in date is still recorded.
pub fn check_in_followed(state: &StreakState, today: NaiveDate) -> CheckIn {
    if state.checked_in_on(today) {
        return CheckIn {
            state: state.clone(),
            change: StreakChange::AlreadyCheckedIn,
        };
    }

    let mut next = state.clone();
    let change = if next.is_window_full() {
        StreakChange::WindowFull
    } else {
        let index = next.cursor;
        next.days[index] = DayStatus::Completed;
        next.cursor += 1;
        next.best = next.best.max(next.cursor);
        StreakChange::Advanced { index }
    };
    next.last_action = Some(today);

    CheckIn {
        state: next,
        change,
    }
}

/// Records a rule violation and restarts the window.
///
/// A blank note cancels the whole operation. When the user already checked in
/// today, the latest completed slot is converted instead of marking a new one.
pub fn check_in_violated(state: &StreakState, today: NaiveDate, note: &str) -> CheckIn {
    if note.trim().is_empty() {
        return CheckIn {
            state: state.clone(),
            change: StreakChange::Cancelled,
        };
    }

    let mut next = state.clone();
    let corrected_index = if state.checked_in_on(today) {
        next.days.iter().rposition(|day| *day == DayStatus::Completed)
    } else {
        None
    };

    let marked = match corrected_index {
        Some(index) => Some(index),
        None if !next.is_window_full() => Some(next.cursor),
        None => None,
    };
    if let Some(index) = marked {
        next.days[index] = DayStatus::Violated;
    }

    next.days = [DayStatus::Incomplete; WINDOW_LEN];
    next.cursor = 0;
    next.last_action = Some(today);

    CheckIn {
        state: next,
        change: StreakChange::Violated {
            marked,
            corrected: corrected_index.is_some(),
        },
    }
}
