use rand::Rng;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;

use crate::auth::repo::User;
use crate::error::ApiError;
use crate::notify::OtpChannel;

/// Codes are valid for ten minutes from issuance.
pub const OTP_TTL: time::Duration = time::Duration::minutes(10);

/// Uniformly random six-digit code, zero-padded.
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}

/// Delivery channel for a user's reset code; email wins when both exist.
pub fn channel_for(user: &User) -> Option<OtpChannel> {
    if let Some(email) = &user.email {
        return Some(OtpChannel::Email(email.clone()));
    }
    user.phone_number
        .as_ref()
        .map(|phone| OtpChannel::Sms(phone.clone()))
}

/// Issue a fresh code for the user. Earlier unconsumed codes are retired so
/// only the latest one can reset the password.
pub async fn issue_code(db: &PgPool, user_id: i64) -> sqlx::Result<String> {
    let code = generate_code();
    let expires_at = OffsetDateTime::now_utc() + OTP_TTL;

    let mut tx = db.begin().await?;
    sqlx::query("UPDATE otp_codes SET used_at = now() WHERE user_id = $1 AND used_at IS NULL")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT INTO otp_codes (user_id, code, expires_at) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(&code)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    debug!(user_id, "otp code issued");
    Ok(code)
}

/// Decides the fate of a lookup for an unconsumed code. `None` covers both
/// a wrong code and one already spent, so a second verification attempt is
/// indistinguishable from a bad guess.
fn evaluate_candidate(
    candidate: Option<(i64, OffsetDateTime)>,
    now: OffsetDateTime,
) -> Result<i64, ApiError> {
    let (otp_id, expires_at) = candidate.ok_or(ApiError::OtpInvalid)?;
    if expires_at < now {
        return Err(ApiError::OtpExpired);
    }
    Ok(otp_id)
}

/// Consume the code and install the new password hash in one transaction.
/// The conditional `used_at IS NULL` update guarantees single use even when
/// two verification attempts race.
pub async fn consume_and_reset_password(
    db: &PgPool,
    user_id: i64,
    code: &str,
    new_password_hash: &str,
) -> Result<(), ApiError> {
    let mut tx = db.begin().await?;

    let row: Option<(i64, OffsetDateTime)> = sqlx::query_as(
        r#"
        SELECT id, expires_at
        FROM otp_codes
        WHERE user_id = $1 AND code = $2 AND used_at IS NULL
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(code)
    .fetch_optional(&mut *tx)
    .await?;

    let otp_id = evaluate_candidate(row, OffsetDateTime::now_utc())?;

    let consumed = sqlx::query("UPDATE otp_codes SET used_at = now() WHERE id = $1 AND used_at IS NULL")
        .bind(otp_id)
        .execute(&mut *tx)
        .await?;
    if consumed.rows_affected() == 0 {
        // a concurrent verification won the race
        return Err(ApiError::OtpInvalid);
    }

    User::set_password_hash(&mut *tx, user_id, new_password_hash).await?;
    tx.commit().await?;

    debug!(user_id, "otp consumed, password reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_zero_padded_digits() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn ttl_is_ten_minutes() {
        assert_eq!(OTP_TTL.whole_seconds(), 600);
    }

    fn user_with(email: Option<&str>, phone: Option<&str>) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: 1,
            username: "mama1".into(),
            email: email.map(Into::into),
            phone_number: phone.map(Into::into),
            password_hash: "hash".into(),
            session_token: None,
            image_path: "image/default.png".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn code_within_its_window_is_accepted() {
        let now = OffsetDateTime::now_utc();
        let candidate = Some((5, now + OTP_TTL));
        assert_eq!(evaluate_candidate(candidate, now).unwrap(), 5);
    }

    #[test]
    fn code_older_than_ten_minutes_is_expired() {
        let issued = OffsetDateTime::now_utc() - time::Duration::minutes(11);
        let candidate = Some((5, issued + OTP_TTL));
        assert!(matches!(
            evaluate_candidate(candidate, OffsetDateTime::now_utc()),
            Err(ApiError::OtpExpired)
        ));
    }

    #[test]
    fn spent_or_unknown_code_is_invalid() {
        // consumption sets used_at, so a second lookup finds nothing,
        // same as a code that never existed
        assert!(matches!(
            evaluate_candidate(None, OffsetDateTime::now_utc()),
            Err(ApiError::OtpInvalid)
        ));
    }

    #[test]
    fn code_at_the_exact_expiry_instant_still_passes() {
        let now = OffsetDateTime::now_utc();
        assert!(evaluate_candidate(Some((1, now)), now).is_ok());
    }

    #[test]
    fn channel_prefers_email_over_sms() {
        let both = user_with(Some("m@x.com"), Some("+255123456789"));
        assert_eq!(channel_for(&both), Some(OtpChannel::Email("m@x.com".into())));

        let phone_only = user_with(None, Some("+255123456789"));
        assert_eq!(
            channel_for(&phone_only),
            Some(OtpChannel::Sms("+255123456789".into()))
        );

        let neither = user_with(None, None);
        assert_eq!(channel_for(&neither), None);
    }
}
