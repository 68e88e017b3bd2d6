use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo::User;

/// Request body for user registration. Either email or phone number must be
/// present.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub password: String,
    pub password_confirmation: String,
}

/// Request body for login; `login` matches either email or phone number.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestPasswordResetRequest {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpResetRequest {
    pub login: String,
    pub otp: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Public part of the user returned to clients.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub image_path: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            image_path: user.image_path,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: PublicUser,
}

/// Response returned after login or refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: 1,
            username: "mama1".into(),
            email: Some("m@x.com".into()),
            phone_number: None,
            password_hash: "$argon2id$secret".into(),
            session_token: Some("token".into()),
            image_path: "image/default.png".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_user_never_exposes_hash_or_token() {
        let json = serde_json::to_string(&PublicUser::from(sample_user())).unwrap();
        assert!(json.contains("mama1"));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("session_token"));
    }

    #[test]
    fn register_request_contact_fields_default_to_none() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"mama1","password":"secret1","password_confirmation":"secret1"}"#,
        )
        .unwrap();
        assert!(req.email.is_none());
        assert!(req.phone_number.is_none());
    }

    #[test]
    fn token_response_shape() {
        let response = TokenResponse {
            access_token: "abc".into(),
            token_type: "bearer",
            expires_in: 3600,
            user: PublicUser::from(sample_user()),
        };
        let value: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["token_type"], "bearer");
        assert_eq!(value["expires_in"], 3600);
        assert_eq!(value["user"]["id"], 1);
    }
}
