use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use crate::{
    auth::repo as users_repo,
    error::{ApiError, FieldErrors},
    reminders::{
        dto::{
            validate_typed_fields, CreateReminderRequest, ReminderListResponse, ReminderResponse,
            UpdateReminderRequest, UpdateStatusRequest, REMINDER_TYPES,
        },
        repo::{self, ReminderChanges},
    },
    state::AppState,
};

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ReminderListResponse>, ApiError> {
    let reminders = repo::list_for_user(&state.db, user_id).await?;
    if reminders.is_empty() {
        return Err(ApiError::NotFound("Reminders"));
    }
    Ok(Json(ReminderListResponse { data: reminders }))
}

#[instrument(skip(state, payload))]
pub async fn store(
    State(state): State<AppState>,
    Json(payload): Json<CreateReminderRequest>,
) -> Result<(StatusCode, Json<ReminderResponse>), ApiError> {
    let mut errors = FieldErrors::new();
    if !users_repo::user_exists(&state.db, payload.user_id).await? {
        errors.push("user_id", "The selected user id is invalid.");
    }
    if let Some(question) = &payload.question {
        if question.chars().count() > 1000 {
            errors.push("question", "The question must not be greater than 1000 characters.");
        }
    }
    let fields = validate_typed_fields(
        &mut errors,
        &payload.kind,
        payload.appointment,
        payload.dose_unit,
        payload.medicine_details,
    );
    errors.into_result()?;

    let reminder = repo::insert(
        &state.db,
        payload.user_id,
        &payload.kind,
        fields.appointment.as_deref(),
        payload.reminder_time,
        fields.dose_unit.as_deref(),
        fields.medicine_details.as_ref(),
        payload.question.as_deref(),
    )
    .await?;

    info!(user_id = reminder.user_id, reminder_id = reminder.id, "reminder created");
    Ok((
        StatusCode::CREATED,
        Json(ReminderResponse {
            message: "Reminder created successfully",
            data: reminder,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateReminderRequest>,
) -> Result<Json<ReminderResponse>, ApiError> {
    let mut errors = FieldErrors::new();
    let mut changes = ReminderChanges {
        reminder_time: payload.reminder_time,
        ..Default::default()
    };

    // re-typing a reminder replaces its type-specific fields wholesale
    match payload.kind {
        Some(kind) => {
            if !REMINDER_TYPES.contains(&kind.as_str()) {
                errors.push("type", "The selected type is invalid.");
            } else {
                let fields = validate_typed_fields(
                    &mut errors,
                    &kind,
                    payload.appointment,
                    payload.dose_unit,
                    payload.medicine_details,
                );
                changes.kind = Some(kind);
                changes.appointment = Some(fields.appointment);
                changes.dose_unit = Some(fields.dose_unit);
                changes.medicine_details = Some(fields.medicine_details);
            }
        }
        None => {
            // detail fields only make sense relative to a type
            if payload.appointment.is_some()
                || payload.dose_unit.is_some()
                || payload.medicine_details.is_some()
            {
                errors.push(
                    "type",
                    "The type field is required when updating appointment, dose unit, or medicine details.",
                );
            }
        }
    }
    errors.into_result()?;

    repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Reminder"))?;

    let reminder = repo::update(&state.db, id, changes)
        .await?
        .ok_or(ApiError::NotFound("Reminder"))?;

    info!(reminder_id = reminder.id, "reminder updated");
    Ok(Json(ReminderResponse {
        message: "Reminder updated successfully",
        data: reminder,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ReminderResponse>, ApiError> {
    let reminder = repo::set_status(&state.db, id, payload.status)
        .await?
        .ok_or(ApiError::NotFound("Reminder"))?;

    info!(reminder_id = reminder.id, status = reminder.status, "reminder status updated");
    Ok(Json(ReminderResponse {
        message: "Reminder status updated successfully",
        data: reminder,
    }))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if repo::delete(&state.db, id).await? == 0 {
        return Err(ApiError::NotFound("Reminder"));
    }
    info!(reminder_id = id, "reminder deleted");
    Ok(Json(
        serde_json::json!({ "message": "Reminder deleted successfully" }),
    ))
}
