use crate::analytics::build_analytics;
use crate::commands::{Command, Context, Outcome};
use crate::errors::AppError;
use crate::models::{
    AppData, CheckInRequest, CheckInResponse, ClickRequest, ClickResponse, HabitUpdateRequest,
    MutationResponse, ReorderRequest, ResourceAnalytics, SettingsUpdate, Snapshot, StreakView,
    TextRequest,
};
use crate::state::AppState;
use crate::storage::format_day;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Html,
    Json,
};
use chrono::{Local, NaiveDate};
use tracing::debug;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let today = Local::now().date_naive();
    let data = state.data.lock().await;
    Html(render_index(&build_snapshot(&data, today)))
}

pub async fn get_state(State(state): State<AppState>) -> Json<Snapshot> {
    let today = Local::now().date_naive();
    let data = state.data.lock().await;
    Json(build_snapshot(&data, today))
}

pub async fn check_in(
    State(state): State<AppState>,
    Json(payload): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, AppError> {
    let command = match payload.outcome.trim() {
        "followed" => Command::CheckInFollowed,
        "violated" => Command::CheckInViolated {
            note: payload.note.unwrap_or_default(),
        },
        _ => return Err(AppError::bad_request("outcome must be 'followed' or 'violated'")),
    };

    let ctx = Context::at(Local::now());
    let transition = state.dispatch(command, ctx).await?;
    let Outcome::Streak(change) = transition.outcome else {
        return Err(AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "check-in did not reach the streak engine".to_string(),
        });
    };

    Ok(Json(CheckInResponse {
        change,
        refresh: transition.refresh(),
        snapshot: build_snapshot(&transition.data, ctx.today),
    }))
}

pub async fn add_rule(
    State(state): State<AppState>,
    Json(payload): Json<TextRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(&state, Command::AddRule { text: payload.text }).await
}

pub async fn edit_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TextRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(&state, Command::EditRule { id, text: payload.text }).await
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(&state, Command::DeleteRule { id }).await
}

pub async fn reorder_rules(
    State(state): State<AppState>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(
        &state,
        Command::MoveRule {
            from: payload.from,
            to: payload.to,
        },
    )
    .await
}

pub async fn add_habit(
    State(state): State<AppState>,
    Json(payload): Json<TextRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(&state, Command::AddHabit { text: payload.text }).await
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<HabitUpdateRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(
        &state,
        Command::SetHabitCompleted {
            id,
            completed: payload.completed,
        },
    )
    .await
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(&state, Command::DeleteHabit { id }).await
}

pub async fn reorder_habits(
    State(state): State<AppState>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(
        &state,
        Command::MoveHabit {
            from: payload.from,
            to: payload.to,
        },
    )
    .await
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<SettingsUpdate>,
) -> Result<Json<MutationResponse>, AppError> {
    mutate(&state, Command::UpdateSettings(payload)).await
}

pub async fn track_click(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ClickRequest>,
) -> Result<Json<ClickResponse>, AppError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let command = Command::TrackResourceClick {
        category: payload.category,
        resource: payload.resource,
        user_agent,
    };
    let transition = state.dispatch(command, Context::at(Local::now())).await?;
    let tracked = transition.outcome == Outcome::ClickTracked(true);
    if !tracked {
        debug!("resource click ignored, analytics disabled");
    }

    Ok(Json(ClickResponse { tracked }))
}

pub async fn get_analytics(State(state): State<AppState>) -> Json<ResourceAnalytics> {
    let data = state.data.lock().await;
    Json(build_analytics(&data.resource_clicks))
}

async fn mutate(state: &AppState, command: Command) -> Result<Json<MutationResponse>, AppError> {
    let ctx = Context::at(Local::now());
    let transition = state.dispatch(command, ctx).await?;

    Ok(Json(MutationResponse {
        refresh: transition.refresh(),
        snapshot: build_snapshot(&transition.data, ctx.today),
    }))
}

pub fn build_snapshot(data: &AppData, today: NaiveDate) -> Snapshot {
    let streak = &data.streak;
    Snapshot {
        today: format_day(today),
        streak: StreakView {
            current_streak: streak.cursor,
            longest_streak: streak.best,
            streak_days: streak.days.to_vec(),
            last_check_in: streak.last_action.map(format_day),
            checked_in_today: streak.checked_in_on(today),
        },
        rules: data.rules.clone(),
        habits: data.habits.clone(),
        settings: data.settings,
    }
}
