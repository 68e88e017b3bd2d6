use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::FieldErrors;
use crate::reminders::repo::Reminder;

pub const REMINDER_TYPES: [&str; 3] = ["doctor's appointment", "medicine", "medical tests"];
pub const DOSE_UNITS: [&str; 3] = ["tablets", "drops", "capsule"];

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub appointment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub reminder_time: OffsetDateTime,
    #[serde(default)]
    pub dose_unit: Option<String>,
    #[serde(default)]
    pub medicine_details: Option<serde_json::Value>,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReminderRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub appointment: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub reminder_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub dose_unit: Option<String>,
    #[serde(default)]
    pub medicine_details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: bool,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub message: &'static str,
    pub data: Reminder,
}

#[derive(Debug, Serialize)]
pub struct ReminderListResponse {
    pub data: Vec<Reminder>,
}

/// The type-consistent subset of a reminder's detail fields. Fields that do
/// not belong to the reminder type are dropped, matching the table's check
/// constraints.
#[derive(Debug, Default, PartialEq)]
pub struct TypedFields {
    pub appointment: Option<String>,
    pub dose_unit: Option<String>,
    pub medicine_details: Option<serde_json::Value>,
}

pub fn validate_typed_fields(
    errors: &mut FieldErrors,
    kind: &str,
    appointment: Option<String>,
    dose_unit: Option<String>,
    medicine_details: Option<serde_json::Value>,
) -> TypedFields {
    match kind {
        "doctor's appointment" => {
            if appointment.as_deref().map(str::trim).unwrap_or("").is_empty() {
                errors.push(
                    "appointment",
                    "The appointment field is required when type is doctor's appointment.",
                );
            }
            TypedFields {
                appointment,
                ..Default::default()
            }
        }
        "medicine" => {
            match dose_unit.as_deref() {
                None => errors.push("dose_unit", "The dose unit field is required when type is medicine."),
                Some(unit) if !DOSE_UNITS.contains(&unit) => {
                    errors.push("dose_unit", "The selected dose unit is invalid.")
                }
                Some(_) => {}
            }
            if medicine_details.is_none() {
                errors.push(
                    "medicine_details",
                    "The medicine details field is required when type is medicine.",
                );
            }
            TypedFields {
                dose_unit,
                medicine_details,
                ..Default::default()
            }
        }
        "medical tests" => TypedFields::default(),
        _ => {
            errors.push("type", "The selected type is invalid.");
            TypedFields::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn appointment_type_requires_appointment_and_drops_medicine_fields() {
        let mut errors = FieldErrors::new();
        let fields = validate_typed_fields(
            &mut errors,
            "doctor's appointment",
            Some("Dr. Asha, Room 4".into()),
            Some("tablets".into()),
            Some(json!({"name": "iron"})),
        );
        assert!(errors.is_empty());
        assert_eq!(fields.appointment.as_deref(), Some("Dr. Asha, Room 4"));
        assert!(fields.dose_unit.is_none());
        assert!(fields.medicine_details.is_none());
    }

    #[test]
    fn medicine_type_requires_dose_and_details() {
        let mut errors = FieldErrors::new();
        validate_typed_fields(&mut errors, "medicine", None, None, None);
        assert!(!errors.is_empty());

        let mut errors = FieldErrors::new();
        let fields = validate_typed_fields(
            &mut errors,
            "medicine",
            Some("ignored".into()),
            Some("drops".into()),
            Some(json!({"name": "folic acid", "dose": 2})),
        );
        assert!(errors.is_empty());
        assert!(fields.appointment.is_none());
        assert_eq!(fields.dose_unit.as_deref(), Some("drops"));
    }

    #[test]
    fn medicine_rejects_unknown_dose_unit() {
        let mut errors = FieldErrors::new();
        validate_typed_fields(
            &mut errors,
            "medicine",
            None,
            Some("litres".into()),
            Some(json!({})),
        );
        assert!(!errors.is_empty());
    }

    #[test]
    fn medical_tests_clears_everything() {
        let mut errors = FieldErrors::new();
        let fields = validate_typed_fields(
            &mut errors,
            "medical tests",
            Some("x".into()),
            Some("tablets".into()),
            Some(json!({})),
        );
        assert!(errors.is_empty());
        assert_eq!(fields, TypedFields::default());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut errors = FieldErrors::new();
        validate_typed_fields(&mut errors, "yoga class", None, None, None);
        assert!(!errors.is_empty());
    }
}
