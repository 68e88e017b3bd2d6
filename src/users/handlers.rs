use axum::{
    extract::{Path, State},
    Json,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        password::hash_password,
        repo::{self, User, UserChanges},
        validate, PublicUser,
    },
    error::{ApiError, FieldErrors},
    state::AppState,
    storage::{acceptable_image, profile_image_key, DEFAULT_PROFILE_IMAGE},
    users::dto::{
        ImagePathData, ImageResponse, Patch, UpdateImageRequest, UpdateUserRequest, UpdatedUser,
        UpdateUserResponse,
    },
};

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user.into()))
}

/// Contact-field patches resolve to: no change, clear, or a new value.
fn contact_patch(field: &Patch<String>, lowercase: bool) -> Option<Option<String>> {
    match field {
        Patch::Missing => None,
        Patch::Null => Some(None),
        // empty strings behave like an omitted key
        Patch::Value(v) => validate::normalize_optional(Some(v.clone()), lowercase).map(Some),
    }
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UpdateUserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let mut errors = FieldErrors::new();
    let mut changes = UserChanges::default();

    if let Patch::Value(username) = &payload.username {
        let username = username.trim();
        if !username.is_empty() {
            validate::check_username(&mut errors, username);
            if repo::username_taken(&state.db, username, Some(user.id)).await? {
                errors.push("username", "The username has already been taken.");
            }
            changes.username = Some(username.to_string());
        }
    }

    let email_patch = contact_patch(&payload.email, true);
    let phone_patch = contact_patch(&payload.phone_number, false);

    // at least one contact field must survive the patch
    let effective_email = email_patch.clone().unwrap_or_else(|| user.email.clone());
    let effective_phone = phone_patch
        .clone()
        .unwrap_or_else(|| user.phone_number.clone());
    if effective_email.is_none() && effective_phone.is_none() {
        errors.push("login", "Either email or phone number is required");
    }

    if let Some(Some(email)) = &email_patch {
        validate::check_email_format(&mut errors, email);
        if repo::email_taken(&state.db, email, Some(user.id)).await? {
            errors.push("email", "The email has already been taken.");
        }
    }
    if let Some(Some(phone)) = &phone_patch {
        if repo::phone_taken(&state.db, phone, Some(user.id)).await? {
            errors.push("phone_number", "The phone number has already been taken.");
        }
    }
    changes.email = email_patch;
    changes.phone_number = phone_patch;

    if let Patch::Value(password) = &payload.password {
        let confirmation = match &payload.password_confirmation {
            Patch::Value(c) => c.as_str(),
            _ => "",
        };
        validate::check_password(&mut errors, password, confirmation);
        if errors.is_empty() {
            changes.password_hash = Some(hash_password(password)?);
        }
    }

    errors.into_result()?;

    let updated = User::update(&state.db, user.id, changes)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    info!(user_id = updated.id, "user updated");
    Ok(Json(UpdateUserResponse {
        message: "User updated successfully",
        data: UpdatedUser {
            id: updated.id,
            username: updated.username,
            email: updated.email,
            phone_number: updated.phone_number,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_image(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateImageRequest>,
) -> Result<Json<ImageResponse>, ApiError> {
    if !acceptable_image(&payload.image, &payload.content_type) {
        return Err(ApiError::BadRequest("Please upload a valid image"));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let key = profile_image_key(user.id, &payload.content_type);
    state
        .storage
        .put_object(
            &key,
            Bytes::from(payload.image.into_vec()),
            &payload.content_type,
        )
        .await?;

    // replaced pictures are removed; the shared default is never deleted
    if user.image_path != DEFAULT_PROFILE_IMAGE {
        if let Err(e) = state.storage.delete_object(&user.image_path).await {
            warn!(error = %e, key = %user.image_path, "failed to delete previous image");
        }
    }

    let updated = User::update(
        &state.db,
        user.id,
        UserChanges {
            image_path: Some(key),
            ..Default::default()
        },
    )
    .await?
    .ok_or(ApiError::NotFound("User"))?;

    info!(user_id = updated.id, "profile image updated");
    Ok(Json(ImageResponse {
        status: "success",
        message: Some("Image updated successfully"),
        data: ImagePathData {
            image_path: updated.image_path,
            url: None,
        },
    }))
}

#[instrument(skip(state))]
pub async fn get_image(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ImageResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let url = if user.image_path == DEFAULT_PROFILE_IMAGE {
        None
    } else {
        Some(state.storage.presign_get(&user.image_path, 3600).await?)
    };

    Ok(Json(ImageResponse {
        status: "success",
        message: None,
        data: ImagePathData {
            image_path: user.image_path,
            url,
        },
    }))
}
