use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Field-level validation messages, keyed by request field name.
#[derive(Debug, Default, Clone)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ok when no errors were collected, otherwise a 422 `ApiError`.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }

    fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Domain error taxonomy; every handler failure is translated into one of
/// these before it reaches the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("The given data was invalid.")]
    Validation(FieldErrors),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthenticated.")]
    Unauthenticated,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("Invalid OTP code")]
    OtpInvalid,
    #[error("OTP code has expired")]
    OtpExpired,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        ApiError::Validation(errors)
    }
}

/// Maps a unique-constraint name to the request field it guards.
fn unique_violation_field(constraint: &str) -> &'static str {
    if constraint.contains("email") {
        "email"
    } else if constraint.contains("phone") {
        "phone_number"
    } else if constraint.contains("username") {
        "username"
    } else {
        "id"
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        // Concurrent inserts can slip past the pre-insert uniqueness checks;
        // surface the database's unique violation as a 422, not a 500.
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some("23505") {
                let field = db
                    .constraint()
                    .map(unique_violation_field)
                    .unwrap_or("id");
                return ApiError::validation(field, format!("The {field} has already been taken."));
            }
        }
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "message": "The given data was invalid.",
                    "errors": errors.into_map(),
                }),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Invalid credentials" }),
            ),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Unauthenticated." }),
            ),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "message": format!("{what} not found") }),
            ),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "message": message }))
            }
            ApiError::OtpInvalid => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid OTP code" }),
            ),
            ApiError::OtpExpired => (
                StatusCode::GONE,
                json!({ "message": "OTP code has expired" }),
            ),
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "An error occurred" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_collect_per_field() {
        let mut errors = FieldErrors::new();
        errors.push("email", "The email has already been taken.");
        errors.push("email", "The email must be a valid email address.");
        errors.push("username", "The username field is required.");
        let map = errors.into_map();
        assert_eq!(map["email"].len(), 2);
        assert_eq!(map["username"].len(), 1);
    }

    #[test]
    fn empty_field_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn non_empty_field_errors_become_validation() {
        let mut errors = FieldErrors::new();
        errors.push("login", "Either email or phone number is required");
        let err = errors.into_result().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn unique_violation_field_matches_constraint_names() {
        assert_eq!(unique_violation_field("users_email_key"), "email");
        assert_eq!(unique_violation_field("users_phone_number_key"), "phone_number");
        assert_eq!(unique_violation_field("users_username_key"), "username");
        assert_eq!(unique_violation_field("users_pkey"), "id");
    }

    #[test]
    fn validation_response_is_422() {
        let response = ApiError::validation("password", "The password must be at least 6 characters.")
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn credential_and_token_failures_are_401() {
        assert_eq!(
            ApiError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn otp_failures_are_distinct_statuses() {
        assert_eq!(ApiError::OtpInvalid.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::OtpExpired.into_response().status(), StatusCode::GONE);
    }
}
