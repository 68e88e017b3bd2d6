use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            LoginRequest, MessageResponse, PublicUser, RegisterRequest, RegisterResponse,
            RequestPasswordResetRequest, TokenResponse, VerifyOtpResetRequest,
        },
        jwt::{AuthUser, BearerToken, JwtKeys},
        otp,
        password::{hash_password, verify_password},
        repo::{self, User},
        validate,
    },
    error::{ApiError, FieldErrors},
    state::AppState,
};

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let username = payload.username.trim().to_string();
    let email = validate::normalize_optional(payload.email, true);
    let phone_number = validate::normalize_optional(payload.phone_number, false);

    let mut errors = FieldErrors::new();
    validate::check_username(&mut errors, &username);
    if let Some(email) = &email {
        validate::check_email_format(&mut errors, email);
    }
    validate::check_password(&mut errors, &payload.password, &payload.password_confirmation);
    if email.is_none() && phone_number.is_none() {
        errors.push("login", "Either email or phone number is required");
    }

    if errors.is_empty() {
        if repo::username_taken(&state.db, &username, None).await? {
            errors.push("username", "The username has already been taken.");
        }
        if let Some(email) = &email {
            if repo::email_taken(&state.db, email, None).await? {
                errors.push("email", "The email has already been taken.");
            }
        }
        if let Some(phone) = &phone_number {
            if repo::phone_taken(&state.db, phone, None).await? {
                errors.push("phone_number", "The phone number has already been taken.");
            }
        }
    }
    errors.into_result()?;

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &username,
        email.as_deref(),
        phone_number.as_deref(),
        &hash,
    )
    .await?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User successfully registered",
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let login = payload.login.trim().to_lowercase();
    let mut errors = FieldErrors::new();
    if login.is_empty() {
        errors.push("login", "The login field is required.");
    }
    if payload.password.is_empty() {
        errors.push("password", "The password field is required.");
    }
    errors.into_result()?;

    // Unknown identifier and wrong password must be indistinguishable
    let user = User::find_by_login(&state.db, &login)
        .await?
        .ok_or_else(|| {
            warn!("login with unknown identifier");
            ApiError::InvalidCredentials
        })?;

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    User::set_session_token(&state.db, user.id, &token).await?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
        expires_in: keys.ttl.as_secs() as i64,
        user: user.into(),
    }))
}

/// Logout keyed by the caller's bearer token; idempotent.
#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    User::clear_session_token(&state.db, user_id).await?;
    info!(user_id, "user logged out");
    Ok(Json(MessageResponse {
        message: "Successfully logged out",
    }))
}

/// Logout keyed by an explicit user id; the liveness middleware has already
/// rejected targets without an active mirrored token.
#[instrument(skip(state))]
pub async fn logout_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    User::clear_session_token(&state.db, user_id).await?;
    info!(user_id, "user logged out");
    Ok(Json(MessageResponse {
        message: "Successfully logged out",
    }))
}

#[instrument(skip(state, token))]
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<TokenResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let (new_token, claims) = keys.refresh(&token).map_err(|_| {
        warn!("refresh with invalid or expired token");
        ApiError::Unauthenticated
    })?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    info!(user_id = user.id, "token refreshed");
    Ok(Json(TokenResponse {
        access_token: new_token,
        token_type: "bearer",
        expires_in: keys.ttl.as_secs() as i64,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn user_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Json(user.into()))
}

/// Uniform 200 whether or not the identifier matches an account, so the
/// endpoint cannot be used to enumerate registered users.
#[instrument(skip(state, payload))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<RequestPasswordResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let login = payload.login.trim().to_lowercase();
    if login.is_empty() {
        return Err(ApiError::validation("login", "The login field is required."));
    }

    if let Some(user) = User::find_by_login(&state.db, &login).await? {
        let code = otp::issue_code(&state.db, user.id).await?;
        match otp::channel_for(&user) {
            Some(channel) => {
                if let Err(e) = state.notifier.send_otp(&channel, &code).await {
                    // keep the response uniform; the failure is an ops problem
                    error!(error = %e, user_id = user.id, "otp delivery failed");
                }
            }
            None => error!(user_id = user.id, "user has no contact channel for otp"),
        }
    }

    Ok(Json(MessageResponse {
        message: "If the account exists, a reset code has been sent",
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_otp_reset(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let login = payload.login.trim().to_lowercase();
    let mut errors = FieldErrors::new();
    if login.is_empty() {
        errors.push("login", "The login field is required.");
    }
    if payload.otp.trim().is_empty() {
        errors.push("otp", "The otp field is required.");
    }
    validate::check_password(&mut errors, &payload.password, &payload.password_confirmation);
    errors.into_result()?;

    let user = User::find_by_login(&state.db, &login)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let hash = hash_password(&payload.password)?;
    otp::consume_and_reset_password(&state.db, user.id, payload.otp.trim(), &hash).await?;

    info!(user_id = user.id, "password reset via otp");
    Ok(Json(MessageResponse {
        message: "Password has been reset successfully",
    }))
}
