use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mama-data", post(handlers::store))
        .route("/mama-data/:user_id", get(handlers::show))
}
