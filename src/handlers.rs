use crate::errors::AppError;
use crate::manager::ActivityManager;
use crate::models::{
    CountRequest, Goals, GoalsRequest, Metric, SessionRequest, SessionResponse, StateResponse,
    SummaryResponse,
};
use crate::settings::{SettingsForm, SettingsResponse, SettingsUpdate, cap_goals};
use crate::state::AppState;
use crate::stats::build_summary;
use crate::storage::KeyValueStore;
use crate::ui::{render_index, render_login, render_settings};
use axum::{
    Json,
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

pub async fn index(State(state): State<AppState>) -> Response {
    let mut manager = state.manager.lock().await;
    if !manager.is_logged_in() {
        return Redirect::to("/login").into_response();
    }

    manager.refresh_day();
    let warning = manager.take_warning();
    let summary = build_summary(manager.state());
    Html(render_index(&summary, manager.preferences().theme, warning.as_deref())).into_response()
}

pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Response {
    let manager = state.manager.lock().await;
    if manager.is_logged_in() {
        return Redirect::to("/").into_response();
    }
    Html(render_login(query.error.as_deref())).into_response()
}

pub async fn login(State(state): State<AppState>) -> Redirect {
    state.manager.lock().await.set_logged_in(true);
    Redirect::to("/")
}

pub async fn logout(State(state): State<AppState>) -> Redirect {
    state.manager.lock().await.set_logged_in(false);
    Redirect::to("/login")
}

pub async fn track_add(
    State(state): State<AppState>,
    Path(metric): Path<String>,
) -> Result<Redirect, AppError> {
    let metric = parse_metric(&metric)?;
    state.manager.lock().await.adjust_count(metric, 1);
    Ok(Redirect::to("/"))
}

pub async fn track_sub(
    State(state): State<AppState>,
    Path(metric): Path<String>,
) -> Result<Redirect, AppError> {
    let metric = parse_metric(&metric)?;
    state.manager.lock().await.adjust_count(metric, -1);
    Ok(Redirect::to("/"))
}

pub async fn reset_form(State(state): State<AppState>) -> Redirect {
    state.manager.lock().await.reset_today();
    Redirect::to("/")
}

pub async fn settings_page(State(state): State<AppState>) -> Html<String> {
    let manager = state.manager.lock().await;
    Html(render_settings(&settings_response(&*manager)))
}

pub async fn settings_form(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect, AppError> {
    state.manager.lock().await.save_settings(form.into_update())?;
    Ok(Redirect::to("/"))
}

pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let mut manager = state.manager.lock().await;
    manager.refresh_day();
    Json(snapshot(&mut *manager))
}

pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let mut manager = state.manager.lock().await;
    manager.refresh_day();
    Json(build_summary(manager.state()))
}

pub async fn put_counter(
    State(state): State<AppState>,
    Path(metric): Path<String>,
    Json(payload): Json<CountRequest>,
) -> Result<Json<StateResponse>, AppError> {
    let metric = parse_metric(&metric)?;
    let mut manager = state.manager.lock().await;
    manager.set_count(metric, payload.count);
    Ok(Json(snapshot(&mut *manager)))
}

pub async fn put_goals(
    State(state): State<AppState>,
    Json(payload): Json<GoalsRequest>,
) -> Result<Json<StateResponse>, AppError> {
    let goals = cap_goals(Goals {
        reply_goal: payload.reply_goal,
        post_goal: payload.post_goal,
        retweet_goal: payload.retweet_goal,
    });
    let mut manager = state.manager.lock().await;
    manager.set_goals(goals)?;
    Ok(Json(snapshot(&mut *manager)))
}

pub async fn post_reset(State(state): State<AppState>) -> Json<StateResponse> {
    let mut manager = state.manager.lock().await;
    manager.reset_today();
    Json(snapshot(&mut *manager))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    let manager = state.manager.lock().await;
    Json(settings_response(&*manager))
}

pub async fn put_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<SettingsResponse>, AppError> {
    let update = SettingsUpdate {
        goals: cap_goals(update.goals),
        ..update
    };
    let mut manager = state.manager.lock().await;
    manager.save_settings(update)?;
    Ok(Json(settings_response(&*manager)))
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let manager = state.manager.lock().await;
    Json(SessionResponse {
        logged_in: manager.is_logged_in(),
    })
}

pub async fn post_session(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> Json<SessionResponse> {
    let mut manager = state.manager.lock().await;
    manager.set_logged_in(payload.logged_in);
    Json(SessionResponse {
        logged_in: manager.is_logged_in(),
    })
}

fn parse_metric(raw: &str) -> Result<Metric, AppError> {
    raw.parse().map_err(AppError::bad_request)
}

fn snapshot<S: KeyValueStore>(manager: &mut ActivityManager<S>) -> StateResponse {
    StateResponse {
        warning: manager.take_warning(),
        state: manager.state().clone(),
    }
}

fn settings_response<S: KeyValueStore>(manager: &ActivityManager<S>) -> SettingsResponse {
    let preferences = manager.preferences();
    SettingsResponse {
        goals: manager.state().goals,
        theme: preferences.theme,
        notifications: preferences.notifications,
        capabilities: manager.capabilities(),
    }
}
