use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Illustration shown when a tip is created without one.
pub const DEFAULT_TIP_IMAGE: &str = "tips/default-tip.png";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MamaTip {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub tip_content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<MamaTip>> {
    sqlx::query_as::<_, MamaTip>(
        "SELECT id, name, image, tip_content, created_at, updated_at FROM mama_tips ORDER BY id",
    )
    .fetch_all(db)
    .await
}

pub async fn insert(
    db: &PgPool,
    name: &str,
    image: Option<&str>,
    tip_content: &str,
) -> sqlx::Result<MamaTip> {
    sqlx::query_as::<_, MamaTip>(
        r#"
        INSERT INTO mama_tips (name, image, tip_content)
        VALUES ($1, $2, $3)
        RETURNING id, name, image, tip_content, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(image.unwrap_or(DEFAULT_TIP_IMAGE))
    .bind(tip_content)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<MamaTip>> {
    sqlx::query_as::<_, MamaTip>(
        "SELECT id, name, image, tip_content, created_at, updated_at FROM mama_tips WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}
