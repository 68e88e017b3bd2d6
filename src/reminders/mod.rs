use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reminders", post(handlers::store))
        // GET takes a user id; PUT/DELETE take a reminder id
        .route(
            "/reminders/:id",
            get(handlers::index)
                .put(handlers::update)
                .delete(handlers::destroy),
        )
        .route("/reminders/:id/status", patch(handlers::update_status))
}
