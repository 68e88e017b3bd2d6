use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FieldErrors;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Treats empty/whitespace-only optional fields as absent; email is also
/// lowercased so lookups are case-insensitive.
pub fn normalize_optional(value: Option<String>, lowercase: bool) -> Option<String> {
    let trimmed = value.as_deref().map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        None
    } else if lowercase {
        Some(trimmed.to_lowercase())
    } else {
        Some(trimmed.to_string())
    }
}

pub fn check_username(errors: &mut FieldErrors, username: &str) {
    let len = username.chars().count();
    if !(3..=100).contains(&len) {
        errors.push("username", "The username must be between 3 and 100 characters.");
    }
}

pub fn check_email_format(errors: &mut FieldErrors, email: &str) {
    if email.chars().count() > 100 {
        errors.push("email", "The email must not be greater than 100 characters.");
    }
    if !is_valid_email(email) {
        errors.push("email", "The email must be a valid email address.");
    }
}

pub fn check_password(errors: &mut FieldErrors, password: &str, confirmation: &str) {
    if password.chars().count() < 6 {
        errors.push("password", "The password must be at least 6 characters.");
    }
    if password != confirmation {
        errors.push("password", "The password confirmation does not match.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("m@x.com"));
        assert!(is_valid_email("john.doe@example.co.tz"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn normalize_drops_empty_and_lowercases() {
        assert_eq!(normalize_optional(None, true), None);
        assert_eq!(normalize_optional(Some("  ".into()), true), None);
        assert_eq!(
            normalize_optional(Some(" M@X.Com ".into()), true),
            Some("m@x.com".into())
        );
        assert_eq!(
            normalize_optional(Some(" +255 ".into()), false),
            Some("+255".into())
        );
    }

    #[test]
    fn username_length_bounds() {
        let mut errors = FieldErrors::new();
        check_username(&mut errors, "ab");
        assert!(!errors.is_empty());

        let mut errors = FieldErrors::new();
        check_username(&mut errors, "mama1");
        assert!(errors.is_empty());

        let mut errors = FieldErrors::new();
        check_username(&mut errors, &"x".repeat(101));
        assert!(!errors.is_empty());
    }

    #[test]
    fn password_rules() {
        let mut errors = FieldErrors::new();
        check_password(&mut errors, "short", "short");
        assert!(!errors.is_empty());

        let mut errors = FieldErrors::new();
        check_password(&mut errors, "secret1", "different");
        assert!(!errors.is_empty());

        let mut errors = FieldErrors::new();
        check_password(&mut errors, "secret1", "secret1");
        assert!(errors.is_empty());
    }
}
