use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    error::{ApiError, FieldErrors},
    state::AppState,
    storage::{acceptable_image, tip_image_key},
    tips::repo::{self, MamaTip},
};

#[derive(Debug, Deserialize)]
pub struct CreateTipRequest {
    pub name: String,
    pub tip_content: String,
    #[serde(default)]
    pub image: Option<serde_bytes::ByteBuf>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "image/jpeg".to_string()
}

#[derive(Debug, Serialize)]
pub struct TipListResponse {
    pub status: &'static str,
    pub data: Vec<MamaTip>,
}

#[derive(Debug, Serialize)]
pub struct TipResponse {
    pub status: &'static str,
    pub data: MamaTip,
}

#[derive(Debug, Serialize)]
pub struct CreatedTipResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: MamaTip,
}

#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<TipListResponse>, ApiError> {
    let tips = repo::list(&state.db).await?;
    Ok(Json(TipListResponse {
        status: "success",
        data: tips,
    }))
}

#[instrument(skip(state, payload))]
pub async fn store(
    State(state): State<AppState>,
    Json(payload): Json<CreateTipRequest>,
) -> Result<(StatusCode, Json<CreatedTipResponse>), ApiError> {
    let name = payload.name.trim();
    let mut errors = FieldErrors::new();
    if name.is_empty() {
        errors.push("name", "The name field is required.");
    } else if name.chars().count() > 255 {
        errors.push("name", "The name must not be greater than 255 characters.");
    }
    if payload.tip_content.trim().is_empty() {
        errors.push("tip_content", "The tip content field is required.");
    }
    errors.into_result()?;

    // the illustration is optional; a present one must be a real image
    let image_path = match &payload.image {
        Some(image) => {
            if !acceptable_image(image, &payload.content_type) {
                return Err(ApiError::BadRequest("Please upload a valid image"));
            }
            let key = tip_image_key(&payload.content_type);
            state
                .storage
                .put_object(
                    &key,
                    Bytes::copy_from_slice(image),
                    &payload.content_type,
                )
                .await?;
            Some(key)
        }
        None => None,
    };

    let tip = repo::insert(
        &state.db,
        name,
        image_path.as_deref(),
        payload.tip_content.trim(),
    )
    .await?;

    info!(tip_id = tip.id, "tip created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedTipResponse {
            status: "success",
            message: "Tip created successfully",
            data: tip,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TipResponse>, ApiError> {
    let tip = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Tip"))?;
    Ok(Json(TipResponse {
        status: "success",
        data: tip,
    }))
}
