//! Reducer for every user- or timer-driven change to the session data.
//!
//! `reduce` never mutates its input. It hands back the next `AppData` along
//! with the side effects the host shell has to carry out.

use crate::models::{AppData, Habit, ResourceClick, Rule, SettingsUpdate};
use crate::resources;
use crate::streak::{self, StreakChange};
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

/// Oldest clicks are dropped beyond this many.
pub const CLICK_LOG_CAP: usize = 100;
pub const MAX_TEXT_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CheckInFollowed,
    CheckInViolated { note: String },
    AddRule { text: String },
    EditRule { id: String, text: String },
    DeleteRule { id: String },
    MoveRule { from: usize, to: usize },
    AddHabit { text: String },
    SetHabitCompleted { id: String, completed: bool },
    DeleteHabit { id: String },
    MoveHabit { from: usize, to: usize },
    UpdateSettings(SettingsUpdate),
    TrackResourceClick {
        category: String,
        resource: String,
        user_agent: Option<String>,
    },
    ResetHabits { boundary: NaiveDate },
}

/// Clock readings for one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
}

impl Context {
    pub fn at(now: DateTime<Local>) -> Self {
        Self {
            today: now.date_naive(),
            now: now.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Calendar,
    Rules,
    Habits,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Persist,
    Render(Section),
    LogViolation { note: String, marked: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Streak(StreakChange),
    Updated,
    Unchanged,
    ClickTracked(bool),
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub data: AppData,
    pub effects: Vec<Effect>,
    pub outcome: Outcome,
}

impl Transition {
    fn unchanged(data: &AppData, outcome: Outcome) -> Self {
        Self {
            data: data.clone(),
            effects: Vec::new(),
            outcome,
        }
    }

    fn updated(data: AppData, outcome: Outcome, sections: &[Section]) -> Self {
        let mut effects = vec![Effect::Persist];
        effects.extend(sections.iter().copied().map(Effect::Render));
        Self {
            data,
            effects,
            outcome,
        }
    }

    pub fn should_persist(&self) -> bool {
        self.effects.contains(&Effect::Persist)
    }

    pub fn refresh(&self) -> Vec<Section> {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Render(section) => Some(*section),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("text must not be empty")]
    EmptyText,
    #[error("text must be at most 100 characters")]
    TextTooLong,
    #[error("no rule with id '{0}'")]
    UnknownRule(String),
    #[error("no habit with id '{0}'")]
    UnknownHabit(String),
    #[error("position {position} is out of range for {len} entries")]
    InvalidPosition { position: usize, len: usize },
    #[error("unknown resource '{resource}' in category '{category}'")]
    UnknownResource { category: String, resource: String },
}

pub fn reduce(data: &AppData, command: Command, ctx: &Context) -> Result<Transition, CommandError> {
    match command {
        Command::CheckInFollowed => {
            let result = streak::check_in_followed(&data.streak, ctx.today);
            Ok(streak_transition(data, result, None))
        }
        Command::CheckInViolated { note } => {
            let result = streak::check_in_violated(&data.streak, ctx.today, &note);
            Ok(streak_transition(data, result, Some(note.trim().to_string())))
        }
        Command::AddRule { text } => {
            let text = clean_text(&text)?;
            let mut next = data.clone();
            let id = next_id(ctx.now, |candidate| next.rules.iter().any(|r| r.id == candidate));
            next.rules.push(Rule {
                id,
                text,
                created_at: timestamp(ctx.now),
            });
            Ok(Transition::updated(next, Outcome::Updated, &[Section::Rules]))
        }
        Command::EditRule { id, text } => {
            let text = clean_text(&text)?;
            let mut next = data.clone();
            let rule = next
                .rules
                .iter_mut()
                .find(|rule| rule.id == id)
                .ok_or(CommandError::UnknownRule(id))?;
            if rule.text == text {
                return Ok(Transition::unchanged(data, Outcome::Unchanged));
            }
            rule.text = text;
            Ok(Transition::updated(next, Outcome::Updated, &[Section::Rules]))
        }
        Command::DeleteRule { id } => {
            let mut next = data.clone();
            let position = next
                .rules
                .iter()
                .position(|rule| rule.id == id)
                .ok_or(CommandError::UnknownRule(id))?;
            next.rules.remove(position);
            Ok(Transition::updated(next, Outcome::Updated, &[Section::Rules]))
        }
        Command::MoveRule { from, to } => {
            let mut next = data.clone();
            if !move_entry(&mut next.rules, from, to)? {
                return Ok(Transition::unchanged(data, Outcome::Unchanged));
            }
            Ok(Transition::updated(next, Outcome::Updated, &[Section::Rules]))
        }
        Command::AddHabit { text } => {
            let text = clean_text(&text)?;
            let mut next = data.clone();
            let id = next_id(ctx.now, |candidate| next.habits.iter().any(|h| h.id == candidate));
            next.habits.push(Habit {
                id,
                text,
                completed: false,
                created_at: Some(timestamp(ctx.now)),
            });
            Ok(Transition::updated(next, Outcome::Updated, &[Section::Habits]))
        }
        Command::SetHabitCompleted { id, completed } => {
            let mut next = data.clone();
            let habit = next
                .habits
                .iter_mut()
                .find(|habit| habit.id == id)
                .ok_or(CommandError::UnknownHabit(id))?;
            if habit.completed == completed {
                return Ok(Transition::unchanged(data, Outcome::Unchanged));
            }
            habit.completed = completed;
            Ok(Transition::updated(next, Outcome::Updated, &[Section::Habits]))
        }
        Command::DeleteHabit { id } => {
            let mut next = data.clone();
            let position = next
                .habits
                .iter()
                .position(|habit| habit.id == id)
                .ok_or(CommandError::UnknownHabit(id))?;
            next.habits.remove(position);
            Ok(Transition::updated(next, Outcome::Updated, &[Section::Habits]))
        }
        Command::MoveHabit { from, to } => {
            let mut next = data.clone();
            if !move_entry(&mut next.habits, from, to)? {
                return Ok(Transition::unchanged(data, Outcome::Unchanged));
            }
            Ok(Transition::updated(next, Outcome::Updated, &[Section::Habits]))
        }
        Command::UpdateSettings(update) => {
            let mut next = data.clone();
            if let Some(enabled) = update.analytics_enabled {
                next.settings.analytics_enabled = enabled;
            }
            if let Some(consent) = update.privacy_consent {
                next.settings.privacy_consent = consent;
            }
            if next.settings == data.settings {
                return Ok(Transition::unchanged(data, Outcome::Unchanged));
            }
            Ok(Transition::updated(next, Outcome::Updated, &[Section::Settings]))
        }
        Command::TrackResourceClick {
            category,
            resource,
            user_agent,
        } => {
            if resources::find(&category, &resource).is_none() {
                return Err(CommandError::UnknownResource { category, resource });
            }
            if !data.settings.analytics_enabled {
                return Ok(Transition::unchanged(data, Outcome::ClickTracked(false)));
            }
            let mut next = data.clone();
            next.resource_clicks.push(ResourceClick {
                timestamp: timestamp(ctx.now),
                category,
                resource,
                user_agent,
            });
            if next.resource_clicks.len() > CLICK_LOG_CAP {
                let overflow = next.resource_clicks.len() - CLICK_LOG_CAP;
                next.resource_clicks.drain(..overflow);
            }
            Ok(Transition::updated(next, Outcome::ClickTracked(true), &[]))
        }
        Command::ResetHabits { boundary } => {
            let mut next = data.clone();
            for habit in &mut next.habits {
                habit.completed = false;
            }
            next.last_daily_reset = Some(boundary);
            Ok(Transition::updated(next, Outcome::Updated, &[Section::Habits]))
        }
    }
}

fn streak_transition(data: &AppData, result: streak::CheckIn, note: Option<String>) -> Transition {
    if !result.changed() {
        return Transition::unchanged(data, Outcome::Streak(result.change));
    }

    let mut next = data.clone();
    next.streak = result.state;
    let mut transition = Transition::updated(next, Outcome::Streak(result.change), &[Section::Calendar]);
    if let (Some(note), StreakChange::Violated { marked, .. }) = (note, result.change) {
        transition.effects.push(Effect::LogViolation { note, marked });
    }
    transition
}

fn clean_text(text: &str) -> Result<String, CommandError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CommandError::EmptyText);
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(CommandError::TextTooLong);
    }
    Ok(text.to_string())
}

/// Returns `Ok(false)` when the move leaves the order as it was.
fn move_entry<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<bool, CommandError> {
    let len = items.len();
    for position in [from, to] {
        if position >= len {
            return Err(CommandError::InvalidPosition { position, len });
        }
    }
    if from == to {
        return Ok(false);
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(true)
}

fn next_id(now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let candidate = millis.to_string();
        if !taken(&candidate) {
            return candidate;
        }
        millis += 1;
    }
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streak::{DayStatus, WINDOW_LEN};
    use chrono::TimeZone;

    fn ctx(day: u32) -> Context {
        Context {
            today: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            now: Utc.with_ymd_and_hms(2024, 1, day, 9, 30, 0).unwrap(),
        }
    }

    fn apply(data: &AppData, command: Command, ctx: &Context) -> Transition {
        reduce(data, command, ctx).expect("command failed")
    }

    #[test]
    fn followed_check_in_persists_and_renders_calendar() {
        let t = apply(&AppData::default(), Command::CheckInFollowed, &ctx(1));

        assert_eq!(t.outcome, Outcome::Streak(StreakChange::Advanced { index: 0 }));
        assert!(t.should_persist());
        assert_eq!(t.refresh(), vec![Section::Calendar]);
        assert_eq!(t.data.streak.cursor, 1);
    }

    #[test]
    fn duplicate_followed_check_in_has_no_effects() {
        let first = apply(&AppData::default(), Command::CheckInFollowed, &ctx(1));
        let second = apply(&first.data, Command::CheckInFollowed, &ctx(1));

        assert_eq!(second.outcome, Outcome::Streak(StreakChange::AlreadyCheckedIn));
        assert!(second.effects.is_empty());
        assert_eq!(second.data, first.data);
    }

    #[test]
    fn violation_logs_note_and_keeps_rules_and_habits() {
        let mut data = AppData::default();
        data = apply(&data, Command::AddRule { text: "Max 2 trades".into() }, &ctx(1)).data;
        data = apply(&data, Command::CheckInFollowed, &ctx(1)).data;

        let t = apply(
            &data,
            Command::CheckInViolated {
                note: "  took a third trade ".into(),
            },
            &ctx(1),
        );

        assert!(t.effects.contains(&Effect::LogViolation {
            note: "took a third trade".into(),
            marked: Some(0),
        }));
        assert_eq!(t.data.streak.cursor, 0);
        assert_eq!(t.data.streak.best, 1);
        assert_eq!(t.data.rules, data.rules);
        assert_eq!(t.data.habits, data.habits);
    }

    #[test]
    fn cancelled_violation_changes_nothing() {
        let data = apply(&AppData::default(), Command::CheckInFollowed, &ctx(1)).data;
        let t = apply(&data, Command::CheckInViolated { note: " ".into() }, &ctx(2));

        assert_eq!(t.outcome, Outcome::Streak(StreakChange::Cancelled));
        assert!(t.effects.is_empty());
        assert_eq!(t.data, data);
    }

    #[test]
    fn add_rule_trims_and_stamps_creation_time() {
        let t = apply(&AppData::default(), Command::AddRule { text: "  Respect the stop  ".into() }, &ctx(3));
        let rule = &t.data.rules[0];

        assert_eq!(rule.text, "Respect the stop");
        assert_eq!(rule.id, ctx(3).now.timestamp_millis().to_string());
        assert_eq!(rule.created_at, "2024-01-03T09:30:00.000Z");
        assert_eq!(t.refresh(), vec![Section::Rules]);
    }

    #[test]
    fn rules_added_in_the_same_millisecond_get_distinct_ids() {
        let mut data = AppData::default();
        for text in ["one", "two", "three"] {
            data = apply(&data, Command::AddRule { text: text.into() }, &ctx(3)).data;
        }
        let mut ids: Vec<_> = data.rules.iter().map(|r| r.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn blank_or_oversized_text_is_rejected() {
        let data = AppData::default();
        assert_eq!(
            reduce(&data, Command::AddRule { text: "   ".into() }, &ctx(1)).unwrap_err(),
            CommandError::EmptyText
        );
        assert_eq!(
            reduce(&data, Command::AddHabit { text: "x".repeat(MAX_TEXT_LEN + 1) }, &ctx(1)).unwrap_err(),
            CommandError::TextTooLong
        );
    }

    #[test]
    fn edit_and_delete_rule_by_id() {
        let data = apply(&AppData::default(), Command::AddRule { text: "Old".into() }, &ctx(1)).data;
        let id = data.rules[0].id.clone();

        let edited = apply(&data, Command::EditRule { id: id.clone(), text: "New".into() }, &ctx(1)).data;
        assert_eq!(edited.rules[0].text, "New");

        let deleted = apply(&edited, Command::DeleteRule { id: id.clone() }, &ctx(1)).data;
        assert!(deleted.rules.is_empty());

        assert_eq!(
            reduce(&deleted, Command::DeleteRule { id: id.clone() }, &ctx(1)).unwrap_err(),
            CommandError::UnknownRule(id)
        );
    }

    #[test]
    fn move_habit_reorders_list() {
        let t = apply(&AppData::default(), Command::MoveHabit { from: 2, to: 0 }, &ctx(1));
        let ids: Vec<_> = t.data.habits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["habit-3", "habit-1", "habit-2"]);

        let err = reduce(&t.data, Command::MoveHabit { from: 0, to: 3 }, &ctx(1)).unwrap_err();
        assert_eq!(err, CommandError::InvalidPosition { position: 3, len: 3 });

        let same = apply(&t.data, Command::MoveHabit { from: 1, to: 1 }, &ctx(1));
        assert_eq!(same.outcome, Outcome::Unchanged);
    }

    #[test]
    fn toggle_habit_then_daily_reset_clears_it_but_not_the_streak() {
        let mut data = apply(&AppData::default(), Command::CheckInFollowed, &ctx(1)).data;
        data = apply(
            &data,
            Command::SetHabitCompleted {
                id: "habit-2".into(),
                completed: true,
            },
            &ctx(1),
        )
        .data;
        assert!(data.habits[1].completed);

        let boundary = ctx(1).today;
        let t = apply(&data, Command::ResetHabits { boundary }, &ctx(1));

        assert!(t.data.habits.iter().all(|h| !h.completed));
        assert_eq!(t.data.last_daily_reset, Some(boundary));
        assert_eq!(t.data.streak, data.streak);
        assert_eq!(t.data.streak.days[0], DayStatus::Completed);
    }

    #[test]
    fn clicks_are_ignored_until_analytics_enabled() {
        let resource = &resources::DIRECTORY[0];
        let click = || Command::TrackResourceClick {
            category: resource.category.to_string(),
            resource: resource.name.to_string(),
            user_agent: None,
        };

        let off = apply(&AppData::default(), click(), &ctx(1));
        assert_eq!(off.outcome, Outcome::ClickTracked(false));
        assert!(off.data.resource_clicks.is_empty());

        let enabled = apply(
            &AppData::default(),
            Command::UpdateSettings(SettingsUpdate {
                analytics_enabled: Some(true),
                privacy_consent: None,
            }),
            &ctx(1),
        )
        .data;
        let on = apply(&enabled, click(), &ctx(1));
        assert_eq!(on.outcome, Outcome::ClickTracked(true));
        assert_eq!(on.data.resource_clicks.len(), 1);
        assert!(on.refresh().is_empty());
    }

    #[test]
    fn click_log_keeps_newest_hundred() {
        let resource = &resources::DIRECTORY[0];
        let mut data = AppData::default();
        data.settings.analytics_enabled = true;
        for _ in 0..CLICK_LOG_CAP + 5 {
            data = apply(
                &data,
                Command::TrackResourceClick {
                    category: resource.category.to_string(),
                    resource: resource.name.to_string(),
                    user_agent: Some("test".into()),
                },
                &ctx(1),
            )
            .data;
        }
        assert_eq!(data.resource_clicks.len(), CLICK_LOG_CAP);
    }

    #[test]
    fn unknown_resource_is_rejected() {
        let err = reduce(
            &AppData::default(),
            Command::TrackResourceClick {
                category: "nope".into(),
                resource: "nothing".into(),
                user_agent: None,
            },
            &ctx(1),
        )
        .unwrap_err();
        assert!(matches!(err, CommandError::UnknownResource { .. }));
    }

    #[test]
    fn full_window_check_in_still_persists_the_date() {
        let mut data = AppData::default();
        for day in 1..=WINDOW_LEN as u32 {
            data = apply(&data, Command::CheckInFollowed, &ctx(day)).data;
        }
        let t = apply(&data, Command::CheckInFollowed, &ctx(20));
        assert_eq!(t.outcome, Outcome::Streak(StreakChange::WindowFull));
        assert!(t.should_persist());
        assert_eq!(t.data.streak.last_action, Some(ctx(20).today));
    }
}
