use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use async_trait::async_trait;
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Path stored for users who never uploaded a profile picture.
pub const DEFAULT_PROFILE_IMAGE: &str = "image/default.png";

pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// True when the upload is non-empty, within the size cap, and of an
/// accepted image content type.
pub fn acceptable_image(bytes: &[u8], content_type: &str) -> bool {
    !bytes.is_empty()
        && bytes.len() <= MAX_IMAGE_BYTES
        && ALLOWED_IMAGE_TYPES.contains(&content_type)
}

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String>;
}

/// Builds a fresh object key for a user's profile image. Keys are never
/// reused so a stale presigned URL cannot serve a replaced picture.
pub fn profile_image_key(user_id: i64, content_type: &str) -> String {
    format!(
        "image/{}-{}.{}",
        user_id,
        Uuid::new_v4(),
        extension_for(content_type)
    )
}

/// Object key for a tip illustration; tips are not tied to a user.
pub fn tip_image_key(content_type: &str) -> String {
    format!("tips/{}.{}", Uuid::new_v4(), extension_for(content_type))
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/jpeg" | "image/jpg" => "jpg",
        _ => "bin",
    }
}

/// S3/MinIO-backed implementation used in production.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    pub async fn from_config(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new("us-east-1".to_string()))
            .credentials_provider(Credentials::new(
                cfg.access_key.clone(),
                cfg.secret_key.clone(),
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        })
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }

    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let req = self.client.get_object().bucket(&self.bucket).key(key);
        let presigned = req
            .presigned(PresigningConfig::expires_in(
                std::time::Duration::from_secs(seconds),
            )?)
            .await
            .context("s3 presign_get")?;
        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_keys_are_unique_per_upload() {
        let a = profile_image_key(7, "image/png");
        let b = profile_image_key(7, "image/png");
        assert_ne!(a, b);
        assert!(a.starts_with("image/7-"));
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn extension_follows_content_type() {
        assert!(profile_image_key(1, "image/jpeg").ends_with(".jpg"));
        assert!(profile_image_key(1, "image/gif").ends_with(".gif"));
        assert!(profile_image_key(1, "application/pdf").ends_with(".bin"));
    }

    #[test]
    fn tip_keys_live_under_their_own_prefix() {
        let key = tip_image_key("image/png");
        assert!(key.starts_with("tips/"));
        assert!(key.ends_with(".png"));
        assert_ne!(key, tip_image_key("image/png"));
    }

    #[test]
    fn image_acceptance_rules() {
        assert!(acceptable_image(&[1, 2, 3], "image/jpeg"));
        assert!(!acceptable_image(&[], "image/jpeg"));
        assert!(!acceptable_image(&[1], "application/pdf"));
        assert!(!acceptable_image(&vec![0u8; MAX_IMAGE_BYTES + 1], "image/png"));
    }
}
