use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod handlers;
mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/journals", post(handlers::store))
        // GET takes a user id, DELETE a journal id, mirroring the mobile API
        .route(
            "/journals/:id",
            get(handlers::index).delete(handlers::destroy),
        )
}
