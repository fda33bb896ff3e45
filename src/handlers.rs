use crate::errors::AppError;
use crate::models::{
    DashboardView, Item, Mode, ModeRequest, NewItemRequest, Notification, NotificationsQuery,
};
use crate::state::AppState;
use crate::ui::{SERVICE_WORKER_JS, render_index};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect},
};
use serde::Serialize;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.dashboard().await))
}

pub async fn service_worker() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        SERVICE_WORKER_JS,
    )
}

pub async fn add_item_form(
    State(state): State<AppState>,
    Form(payload): Form<NewItemRequest>,
) -> Result<Redirect, AppError> {
    state.create_item(payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn mark_done_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.complete_item(&id).await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_item_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.delete_item(&id).await?;
    Ok(Redirect::to("/"))
}

pub async fn set_mode_form(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> Result<Redirect, AppError> {
    state.set_mode(parse_mode(&mode)?).await;
    Ok(Redirect::to("/"))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(state.dashboard().await)
}

pub async fn list_items(State(state): State<AppState>) -> Json<Vec<Item>> {
    Json(state.items().await)
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<NewItemRequest>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let item = state.create_item(payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub item: Item,
    pub successor: Option<Item>,
}

pub async fn mark_done(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CompletionResponse>, AppError> {
    let completion = state.complete_item(&id).await?;
    Ok(Json(CompletionResponse {
        item: completion.item,
        successor: completion.successor,
    }))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.delete_item(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_mode(
    State(state): State<AppState>,
    Json(payload): Json<ModeRequest>,
) -> Result<Json<DashboardView>, AppError> {
    let mode = parse_mode(&payload.mode)?;
    Ok(Json(state.set_mode(mode).await))
}

pub async fn get_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationsQuery>,
) -> Json<Vec<Notification>> {
    Json(state.notifications.since(query.after.unwrap_or(0)))
}

fn parse_mode(value: &str) -> Result<Mode, AppError> {
    Mode::parse(value).ok_or_else(|| AppError::bad_request("mode must be 'personal' or 'business'"))
}
