use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;

const COLUMNS: &str = r#"id, user_id, type, appointment, reminder_time, dose_unit, medicine_details, question, status, created_at, updated_at"#;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reminder {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub appointment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub reminder_time: OffsetDateTime,
    pub dose_unit: Option<String>,
    pub medicine_details: Option<serde_json::Value>,
    pub question: Option<String>,
    pub status: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields replaced when a reminder is re-typed; `reminder_time` alone may
/// change without touching the rest.
#[derive(Debug, Default)]
pub struct ReminderChanges {
    pub kind: Option<String>,
    pub appointment: Option<Option<String>>,
    pub reminder_time: Option<OffsetDateTime>,
    pub dose_unit: Option<Option<String>>,
    pub medicine_details: Option<Option<serde_json::Value>>,
}

impl ReminderChanges {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.appointment.is_none()
            && self.reminder_time.is_none()
            && self.dose_unit.is_none()
            && self.medicine_details.is_none()
    }
}

pub async fn list_for_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<Reminder>> {
    sqlx::query_as::<_, Reminder>(&format!(
        "SELECT {COLUMNS} FROM reminders WHERE user_id = $1 ORDER BY reminder_time ASC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<Reminder>> {
    sqlx::query_as::<_, Reminder>(&format!("SELECT {COLUMNS} FROM reminders WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    db: &PgPool,
    user_id: i64,
    kind: &str,
    appointment: Option<&str>,
    reminder_time: OffsetDateTime,
    dose_unit: Option<&str>,
    medicine_details: Option<&serde_json::Value>,
    question: Option<&str>,
) -> sqlx::Result<Reminder> {
    sqlx::query_as::<_, Reminder>(&format!(
        r#"
        INSERT INTO reminders
            (user_id, type, appointment, reminder_time, dose_unit, medicine_details, question, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(kind)
    .bind(appointment)
    .bind(reminder_time)
    .bind(dose_unit)
    .bind(medicine_details)
    .bind(question)
    .fetch_one(db)
    .await
}

pub async fn update(db: &PgPool, id: i64, changes: ReminderChanges) -> sqlx::Result<Option<Reminder>> {
    if changes.is_empty() {
        return find_by_id(db, id).await;
    }
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE reminders SET updated_at = now()");
    if let Some(kind) = changes.kind {
        qb.push(", type = ").push_bind(kind);
    }
    if let Some(appointment) = changes.appointment {
        qb.push(", appointment = ").push_bind(appointment);
    }
    if let Some(reminder_time) = changes.reminder_time {
        qb.push(", reminder_time = ").push_bind(reminder_time);
    }
    if let Some(dose_unit) = changes.dose_unit {
        qb.push(", dose_unit = ").push_bind(dose_unit);
    }
    if let Some(medicine_details) = changes.medicine_details {
        qb.push(", medicine_details = ").push_bind(medicine_details);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(format!(" RETURNING {COLUMNS}"));
    qb.build_query_as::<Reminder>().fetch_optional(db).await
}

pub async fn set_status(db: &PgPool, id: i64, status: bool) -> sqlx::Result<Option<Reminder>> {
    sqlx::query_as::<_, Reminder>(&format!(
        "UPDATE reminders SET status = $1, updated_at = now() WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM reminders WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_changes_are_detected() {
        assert!(ReminderChanges::default().is_empty());
        let changes = ReminderChanges {
            reminder_time: Some(OffsetDateTime::now_utc()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
