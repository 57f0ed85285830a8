use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DailyStatus {
    Done,
    NotDone,
}

impl DailyStatus {
    /// A reason is only kept while the day is not done.
    pub fn normalize_reason(self, reason: Option<&str>) -> Option<String> {
        match self {
            DailyStatus::Done => None,
            DailyStatus::NotDone => reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        }
    }
}

/// Whether a teacher finished their attendance entry for a day.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct TeacherDailyStatus {
    pub teacher_id: i64,
    #[schema(example = "2024-03-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: DailyStatus,
    pub reason: Option<String>,
}
