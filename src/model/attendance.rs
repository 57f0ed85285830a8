use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Sick,
    Excused,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub teacher_id: i64,
    #[schema(example = "2024-03-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(example = "2024-03-01", format = "date", value_type = Option<String>)]
    pub sick_date: Option<NaiveDate>,
    #[schema(example = "2024-03-01", format = "date", value_type = Option<String>)]
    pub excused_start_date: Option<NaiveDate>,
    pub excused_days: Option<i32>,
    pub excused_reason: Option<String>,
    #[schema(example = "2024-03-01T07:15:00", format = "date-time", value_type = String)]
    pub created_at: NaiveDateTime,
}

/// Day count as sent by a form: a number, or text that may not parse.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DayCount {
    Number(i64),
    Fraction(f64),
    Text(String),
}

impl DayCount {
    /// Anything missing, unparsable or below one counts as a single day.
    pub fn days(&self) -> i32 {
        let parsed = match self {
            DayCount::Number(n) => i32::try_from(*n).ok(),
            DayCount::Fraction(f) if f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => {
                Some(*f as i32)
            }
            DayCount::Fraction(_) => None,
            DayCount::Text(s) => s.trim().parse::<i32>().ok(),
        };
        parsed.filter(|d| *d >= 1).unwrap_or(1)
    }
}

/// What a teacher submitted for one student.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StudentSubmission {
    /// Students without a status are left untouched.
    pub status: Option<AttendanceStatus>,
    #[schema(example = "2024-03-01")]
    pub sick_date: Option<String>,
    #[schema(example = "2024-03-01")]
    pub excused_start_date: Option<String>,
    pub excused_days: Option<DayCount>,
    pub excused_reason: Option<String>,
}

/// Status plus the detail fields that go with it, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub status: AttendanceStatus,
    pub sick_date: Option<NaiveDate>,
    pub excused_start_date: Option<NaiveDate>,
    pub excused_days: Option<i32>,
    pub excused_reason: Option<String>,
}

impl AttendanceEntry {
    /// Derives the stored fields for `date`. Returns `None` when no status was submitted.
    pub fn from_submission(
        submission: &StudentSubmission,
        date: NaiveDate,
    ) -> AppResult<Option<Self>> {
        let Some(status) = submission.status else {
            return Ok(None);
        };

        let entry = match status {
            AttendanceStatus::Present => AttendanceEntry {
                status,
                sick_date: None,
                excused_start_date: None,
                excused_days: None,
                excused_reason: None,
            },
            AttendanceStatus::Sick => AttendanceEntry {
                status,
                sick_date: Some(date_or(submission.sick_date.as_deref(), date, "sick_date")?),
                excused_start_date: None,
                excused_days: None,
                excused_reason: None,
            },
            AttendanceStatus::Excused => AttendanceEntry {
                status,
                sick_date: None,
                excused_start_date: Some(date_or(
                    submission.excused_start_date.as_deref(),
                    date,
                    "excused_start_date",
                )?),
                excused_days: Some(submission.excused_days.as_ref().map_or(1, DayCount::days)),
                excused_reason: submission
                    .excused_reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string),
            },
        };

        Ok(Some(entry))
    }
}

fn date_or(value: Option<&str>, default: NaiveDate, field: &str) -> AppResult<NaiveDate> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map_err(|_| AppError::validation(format!("Invalid {field}: {v}"))),
    }
}

/// Insert/update counts of one recorded batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BatchOutcome {
    pub inserted: u32,
    pub updated: u32,
    pub skipped: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn missing_status_is_skipped() {
        let sub = StudentSubmission {
            sick_date: Some("2024-03-01".into()),
            ..Default::default()
        };
        assert_eq!(AttendanceEntry::from_submission(&sub, day("2024-03-01")).unwrap(), None);
    }

    #[test]
    fn present_clears_every_detail_field() {
        let sub = StudentSubmission {
            status: Some(AttendanceStatus::Present),
            sick_date: Some("2024-02-28".into()),
            excused_days: Some(DayCount::Number(3)),
            excused_reason: Some("family".into()),
            ..Default::default()
        };
        let entry = AttendanceEntry::from_submission(&sub, day("2024-03-01"))
            .unwrap()
            .unwrap();
        assert_eq!(entry.status, AttendanceStatus::Present);
        assert_eq!(entry.sick_date, None);
        assert_eq!(entry.excused_days, None);
        assert_eq!(entry.excused_reason, None);
    }

    #[test]
    fn sick_date_defaults_to_target_date() {
        let sub = StudentSubmission {
            status: Some(AttendanceStatus::Sick),
            sick_date: Some("  ".into()),
            ..Default::default()
        };
        let entry = AttendanceEntry::from_submission(&sub, day("2024-03-01"))
            .unwrap()
            .unwrap();
        assert_eq!(entry.sick_date, Some(day("2024-03-01")));
    }

    #[test]
    fn excused_defaults() {
        let sub = StudentSubmission {
            status: Some(AttendanceStatus::Excused),
            excused_days: Some(DayCount::Text("two".into())),
            excused_reason: Some(" wedding, out of town ".into()),
            ..Default::default()
        };
        let entry = AttendanceEntry::from_submission(&sub, day("2024-03-01"))
            .unwrap()
            .unwrap();
        assert_eq!(entry.excused_start_date, Some(day("2024-03-01")));
        assert_eq!(entry.excused_days, Some(1));
        assert_eq!(entry.excused_reason.as_deref(), Some("wedding, out of town"));
        assert_eq!(entry.sick_date, None);
    }

    #[test]
    fn excused_day_count_parsing() {
        assert_eq!(DayCount::Text("3".into()).days(), 3);
        assert_eq!(DayCount::Text(" 4 ".into()).days(), 4);
        assert_eq!(DayCount::Text("".into()).days(), 1);
        assert_eq!(DayCount::Number(0).days(), 1);
        assert_eq!(DayCount::Number(-2).days(), 1);
        assert_eq!(DayCount::Number(5).days(), 5);
    }

    #[test]
    fn fractional_day_count_falls_back_to_one() {
        let sub: StudentSubmission =
            serde_json::from_str(r#"{"status":"EXCUSED","excused_days":2.5}"#).unwrap();
        let entry = AttendanceEntry::from_submission(&sub, day("2024-03-01"))
            .unwrap()
            .unwrap();
        assert_eq!(entry.excused_days, Some(1));

        let sub: StudentSubmission =
            serde_json::from_str(r#"{"status":"EXCUSED","excused_days":1e1}"#).unwrap();
        assert_eq!(sub.excused_days.map(|d| d.days()), Some(10));
        assert_eq!(DayCount::Fraction(f64::NAN).days(), 1);
        assert_eq!(DayCount::Fraction(-3.0).days(), 1);
    }

    #[test]
    fn malformed_date_is_a_validation_error() {
        let sub = StudentSubmission {
            status: Some(AttendanceStatus::Sick),
            sick_date: Some("01/03/2024".into()),
            ..Default::default()
        };
        let err = AttendanceEntry::from_submission(&sub, day("2024-03-01")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
