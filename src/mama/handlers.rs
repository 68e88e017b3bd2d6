use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::repo,
    error::{ApiError, FieldErrors},
    mama::{
        dto::{CreateMamaDataRequest, CreatedMamaDataResponse, MamaDataResponse, AGE_GROUPS, BABY_GENDERS},
        repo as mama_repo,
    },
    state::AppState,
};

#[instrument(skip(state, payload))]
pub async fn store(
    State(state): State<AppState>,
    Json(payload): Json<CreateMamaDataRequest>,
) -> Result<(StatusCode, Json<CreatedMamaDataResponse>), ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let mut errors = FieldErrors::new();

    if !repo::user_exists(&state.db, payload.user_id).await? {
        errors.push("user_id", "The selected user id is invalid.");
    }
    if !AGE_GROUPS.contains(&payload.age_group.as_str()) {
        errors.push("age_group", "The selected age group is invalid.");
    }
    if let Some(due_date) = payload.due_date {
        if due_date <= today {
            errors.push("due_date", "The due date must be a date after today.");
        }
    }
    if let Some(first_day) = payload.first_day_circle {
        if first_day >= today {
            errors.push("first_day_circle", "The first day circle must be a date before today.");
        }
    }
    if let Some(period) = payload.gestational_period {
        if !(1..=42).contains(&period) {
            errors.push("gestational_period", "The gestational period must be between 1 and 42.");
        }
    }
    if let Some(gender) = &payload.baby_gender {
        if !BABY_GENDERS.contains(&gender.as_str()) {
            errors.push("baby_gender", "The selected baby gender is invalid.");
        }
    }
    errors.into_result()?;

    let data = mama_repo::insert(&state.db, &payload).await?;
    info!(user_id = data.user_id, mama_data_id = data.id, "mama data created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedMamaDataResponse {
            message: "Mama data created successfully",
            data,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<MamaDataResponse>, ApiError> {
    let data = mama_repo::latest_for_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("Mama data"))?;
    Ok(Json(MamaDataResponse {
        status: "success",
        data,
    }))
}
