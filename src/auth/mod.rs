use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod jwt;
mod liveness;
pub mod otp;
pub mod password;
pub mod repo;
pub(crate) mod validate;

pub use dto::PublicUser;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route(
            "/auth/logout/:user_id",
            post(handlers::logout_user).layer(middleware::from_fn_with_state(
                state,
                liveness::require_active_session,
            )),
        )
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/user-profile", get(handlers::user_profile))
        .route(
            "/auth/request-password-reset",
            post(handlers::request_password_reset),
        )
        .route("/auth/verify-otp-reset", post(handlers::verify_otp_reset))
}
