use serde::{Deserialize, Serialize};

/// Tri-state patch field: distinguishes a key that was absent from the
/// request body from one explicitly set to `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|opt| match opt {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }
}

/// Partial profile update; fields left out of the body stay untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub phone_number: Patch<String>,
    #[serde(default)]
    pub password: Patch<String>,
    #[serde(default)]
    pub password_confirmation: Patch<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateUserResponse {
    pub message: &'static str,
    pub data: UpdatedUser,
}

/// Profile image upload: raw bytes plus their content type.
#[derive(Debug, Deserialize)]
pub struct UpdateImageRequest {
    pub image: serde_bytes::ByteBuf,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "image/jpeg".to_string()
}

#[derive(Debug, Serialize)]
pub struct ImagePathData {
    pub image_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: ImagePathData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_missing_null_and_value() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"email": null, "username": "mama2"}"#).unwrap();
        assert_eq!(req.email, Patch::Null);
        assert_eq!(req.username, Patch::Value("mama2".into()));
        assert_eq!(req.phone_number, Patch::Missing);
        assert!(req.password.is_missing());
    }

    #[test]
    fn empty_body_leaves_everything_missing() {
        let req: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(req.username.is_missing());
        assert!(req.email.is_missing());
        assert!(req.phone_number.is_missing());
    }

    #[test]
    fn image_request_defaults_to_jpeg() {
        let req: UpdateImageRequest = serde_json::from_str(r#"{"image": [1, 2, 3]}"#).unwrap();
        assert_eq!(req.content_type, "image/jpeg");
        assert_eq!(req.image.len(), 3);
    }
}
