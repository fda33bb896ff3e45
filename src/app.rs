use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/service-worker.js", get(handlers::service_worker))
        .route("/items", post(handlers::add_item_form))
        .route("/items/:id/done", post(handlers::mark_done_form))
        .route("/items/:id/delete", post(handlers::delete_item_form))
        .route("/mode/:mode", post(handlers::set_mode_form))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/items", get(handlers::list_items).post(handlers::create_item))
        .route("/api/items/:id", delete(handlers::delete_item))
        .route("/api/items/:id/done", post(handlers::mark_done))
        .route("/api/mode", post(handlers::set_mode))
        .route("/api/notifications", get(handlers::get_notifications))
        .with_state(state)
}
