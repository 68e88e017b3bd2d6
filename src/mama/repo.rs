use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};

use crate::mama::dto::CreateMamaDataRequest;

/// Pregnancy profile record; the latest row per user is the current one.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MamaData {
    pub id: i64,
    pub user_id: i64,
    pub first_child: Option<bool>,
    pub age_group: String,
    pub due_date: Option<Date>,
    pub first_day_circle: Option<Date>,
    pub gestational_period: Option<i32>,
    pub baby_gender: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str = "id, user_id, first_child, age_group, due_date, first_day_circle, gestational_period, baby_gender, created_at, updated_at";

pub async fn insert(db: &PgPool, req: &CreateMamaDataRequest) -> sqlx::Result<MamaData> {
    sqlx::query_as::<_, MamaData>(&format!(
        r#"
        INSERT INTO mama_data
            (user_id, first_child, age_group, due_date, first_day_circle, gestational_period, baby_gender)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(req.user_id)
    .bind(req.first_child)
    .bind(&req.age_group)
    .bind(req.due_date)
    .bind(req.first_day_circle)
    .bind(req.gestational_period)
    .bind(&req.baby_gender)
    .fetch_one(db)
    .await
}

pub async fn latest_for_user(db: &PgPool, user_id: i64) -> sqlx::Result<Option<MamaData>> {
    sqlx::query_as::<_, MamaData>(&format!(
        "SELECT {COLUMNS} FROM mama_data WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
}
