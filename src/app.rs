use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/state", get(handlers::get_state))
        .route("/api/check-in", post(handlers::check_in))
        .route("/api/rules", post(handlers::add_rule))
        .route("/api/rules/reorder", post(handlers::reorder_rules))
        .route(
            "/api/rules/:id",
            put(handlers::edit_rule).delete(handlers::delete_rule),
        )
        .route("/api/habits", post(handlers::add_habit))
        .route("/api/habits/reorder", post(handlers::reorder_habits))
        .route(
            "/api/habits/:id",
            put(handlers::update_habit).delete(handlers::delete_habit),
        )
        .route("/api/settings", put(handlers::update_settings))
        .route("/api/resources/click", post(handlers::track_click))
        .route("/api/resources/analytics", get(handlers::get_analytics))
        .with_state(state)
}
