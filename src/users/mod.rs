use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:user_id",
            get(handlers::get_user).put(handlers::update_user),
        )
        .route(
            "/users/:user_id/image",
            post(handlers::update_image).get(handlers::get_image),
        )
}
