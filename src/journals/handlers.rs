use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    auth::repo as users_repo,
    error::{ApiError, FieldErrors},
    journals::repo::{self, Journal},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    pub user_id: i64,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedJournalResponse {
    pub message: &'static str,
    pub data: Journal,
}

#[derive(Debug, Serialize)]
pub struct JournalListResponse {
    pub data: Vec<Journal>,
}

#[instrument(skip(state, payload))]
pub async fn store(
    State(state): State<AppState>,
    Json(payload): Json<CreateJournalRequest>,
) -> Result<(StatusCode, Json<CreatedJournalResponse>), ApiError> {
    let mut errors = FieldErrors::new();
    if payload.content.trim().is_empty() {
        errors.push("content", "The content field is required.");
    }
    if !users_repo::user_exists(&state.db, payload.user_id).await? {
        errors.push("user_id", "The selected user id is invalid.");
    }
    errors.into_result()?;

    let journal = repo::insert(&state.db, payload.user_id, payload.content.trim()).await?;
    info!(user_id = journal.user_id, journal_id = journal.id, "journal created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedJournalResponse {
            message: "Journal created successfully",
            data: journal,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<JournalListResponse>, ApiError> {
    let journals = repo::list_for_user(&state.db, user_id).await?;
    if journals.is_empty() {
        return Err(ApiError::NotFound("Journals"));
    }
    Ok(Json(JournalListResponse { data: journals }))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if repo::delete(&state.db, id).await? == 0 {
        return Err(ApiError::NotFound("Journal"));
    }
    info!(journal_id = id, "journal deleted");
    Ok(Json(
        serde_json::json!({ "message": "Journal deleted successfully" }),
    ))
}
