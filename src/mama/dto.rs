use serde::{Deserialize, Serialize};
use time::Date;

use crate::mama::repo::MamaData;

pub const AGE_GROUPS: [&str; 4] = [
    "18-24 years old",
    "25-34 years old",
    "35-44 years old",
    "44 years old or above",
];

pub const BABY_GENDERS: [&str; 3] = ["boy", "girl", "i don't know yet"];

#[derive(Debug, Deserialize)]
pub struct CreateMamaDataRequest {
    pub user_id: i64,
    #[serde(default)]
    pub first_child: Option<bool>,
    pub age_group: String,
    #[serde(default)]
    pub due_date: Option<Date>,
    #[serde(default)]
    pub first_day_circle: Option<Date>,
    #[serde(default)]
    pub gestational_period: Option<i32>,
    #[serde(default)]
    pub baby_gender: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedMamaDataResponse {
    pub message: &'static str,
    pub data: MamaData,
}

#[derive(Debug, Serialize)]
pub struct MamaDataResponse {
    pub status: &'static str,
    pub data: MamaData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_dates_and_optionals() {
        let req: CreateMamaDataRequest = serde_json::from_str(
            r#"{
                "user_id": 1,
                "age_group": "25-34 years old",
                "due_date": "2030-01-15",
                "gestational_period": 12,
                "baby_gender": "girl"
            }"#,
        )
        .unwrap();
        assert_eq!(req.user_id, 1);
        assert_eq!(req.due_date.unwrap().to_string(), "2030-01-15");
        assert!(req.first_child.is_none());
        assert!(req.first_day_circle.is_none());
    }

    #[test]
    fn allowed_enums_match_product_wording() {
        assert!(AGE_GROUPS.contains(&"44 years old or above"));
        assert!(BABY_GENDERS.contains(&"i don't know yet"));
    }
}
