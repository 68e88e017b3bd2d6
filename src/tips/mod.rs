use axum::{routing::get, Router};

use crate::state::AppState;

pub mod handlers;
mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tips", get(handlers::index).post(handlers::store))
        .route("/tips/:id", get(handlers::show))
}
