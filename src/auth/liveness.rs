use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Rejects the request outright unless the target user still has a mirrored
/// session token. This is the only reader of `session_token`.
pub async fn require_active_session(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(ApiError::from)?;

    match user {
        Some(user) if user.session_token.is_some() => Ok(next.run(request).await),
        _ => {
            warn!(user_id, "liveness check failed");
            Err(ApiError::Unauthenticated)
        }
    }
}
