use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;

const USER_COLUMNS: &str =
    "id, username, email, phone_number, password_hash, session_token, image_path, created_at, updated_at";

/// User record in the database. Never serialized directly; handlers map it
/// through `PublicUser` so the hash and token mirror stay server-side.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub session_token: Option<String>,
    pub image_path: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Partial update: outer `None` leaves the column untouched, inner `None`
/// writes SQL NULL.
#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<Option<String>>,
    pub phone_number: Option<Option<String>>,
    pub password_hash: Option<String>,
    pub image_path: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.password_hash.is_none()
            && self.image_path.is_none()
    }
}

impl User {
    /// Find a user by email or phone number.
    pub async fn find_by_login(db: &PgPool, login: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR phone_number = $1"
        ))
        .bind(login)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Create a new user with an already-hashed password.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: Option<&str>,
        phone_number: Option<&str>,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, phone_number, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(phone_number)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    /// Apply a partial update; returns the fresh row, or None when the id
    /// does not exist.
    pub async fn update(db: &PgPool, id: i64, changes: UserChanges) -> sqlx::Result<Option<User>> {
        if changes.is_empty() {
            return Self::find_by_id(db, id).await;
        }
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET updated_at = now()");
        if let Some(username) = changes.username {
            qb.push(", username = ").push_bind(username);
        }
        if let Some(email) = changes.email {
            qb.push(", email = ").push_bind(email);
        }
        if let Some(phone_number) = changes.phone_number {
            qb.push(", phone_number = ").push_bind(phone_number);
        }
        if let Some(password_hash) = changes.password_hash {
            qb.push(", password_hash = ").push_bind(password_hash);
        }
        if let Some(image_path) = changes.image_path {
            qb.push(", image_path = ").push_bind(image_path);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {USER_COLUMNS}"));
        qb.build_query_as::<User>().fetch_optional(db).await
    }

    /// Mirror the freshly issued token onto the user row (login only).
    pub async fn set_session_token(db: &PgPool, id: i64, token: &str) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET session_token = $1, updated_at = now() WHERE id = $2")
            .bind(token)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Drop the mirrored token (logout only); idempotent.
    pub async fn clear_session_token(db: &PgPool, id: i64) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET session_token = NULL, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn set_password_hash<'e, E: PgExecutor<'e>>(
        executor: E,
        id: i64,
        password_hash: &str,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}

pub async fn user_exists(db: &PgPool, id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(db)
        .await
}

/// True when `value` is already used in `column` by some other user.
async fn column_taken(
    db: &PgPool,
    column: &'static str,
    value: &str,
    exclude_id: Option<i64>,
) -> sqlx::Result<bool> {
    // column names come from the three wrappers below, never from input
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM users WHERE {column} = $1 AND ($2::BIGINT IS NULL OR id <> $2))"
    );
    sqlx::query_scalar::<_, bool>(&sql)
        .bind(value)
        .bind(exclude_id)
        .fetch_one(db)
        .await
}

pub async fn username_taken(db: &PgPool, value: &str, exclude_id: Option<i64>) -> sqlx::Result<bool> {
    column_taken(db, "username", value, exclude_id).await
}

pub async fn email_taken(db: &PgPool, value: &str, exclude_id: Option<i64>) -> sqlx::Result<bool> {
    column_taken(db, "email", value, exclude_id).await
}

pub async fn phone_taken(db: &PgPool, value: &str, exclude_id: Option<i64>) -> sqlx::Result<bool> {
    column_taken(db, "phone_number", value, exclude_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_changes_are_detected() {
        assert!(UserChanges::default().is_empty());
        let changes = UserChanges {
            email: Some(None),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
