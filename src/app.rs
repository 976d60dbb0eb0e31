use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/track/:metric/add", post(handlers::track_add))
        .route("/track/:metric/sub", post(handlers::track_sub))
        .route("/reset", post(handlers::reset_form))
        .route("/settings", get(handlers::settings_page).post(handlers::settings_form))
        .route("/api/state", get(handlers::get_state))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/counters/:metric", put(handlers::put_counter))
        .route("/api/goals", put(handlers::put_goals))
        .route("/api/reset", post(handlers::post_reset))
        .route("/api/settings", get(handlers::get_settings).put(handlers::put_settings))
        .route("/api/session", get(handlers::get_session).post(handlers::post_session))
        .with_state(state)
}
