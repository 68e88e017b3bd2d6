use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Journal {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub async fn insert(db: &PgPool, user_id: i64, content: &str) -> sqlx::Result<Journal> {
    sqlx::query_as::<_, Journal>(
        r#"
        INSERT INTO journals (user_id, content)
        VALUES ($1, $2)
        RETURNING id, user_id, content, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(content)
    .fetch_one(db)
    .await
}

pub async fn list_for_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<Journal>> {
    sqlx::query_as::<_, Journal>(
        r#"
        SELECT id, user_id, content, created_at, updated_at
        FROM journals
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Returns the number of deleted rows (0 when the id does not exist).
pub async fn delete(db: &PgPool, id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM journals WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
