use std::fmt::Write;

use crate::model::report::ExportRow;

pub const EXPORT_HEADER: &str =
    "Tanggal,Guru,Siswa,Kelas,Status,Tanggal Sakit,Mulai Izin,Hari Izin,Alasan Izin,Waktu Input";

/// Makes free text safe for an unquoted CSV cell.
pub fn clean_field(value: &str) -> String {
    value
        .replace(',', ";")
        .replace(['\r', '\n'], " ")
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Renders export rows, header first, one line per row.
pub fn export_csv(rows: &[ExportRow]) -> String {
    let mut out = String::with_capacity(EXPORT_HEADER.len() + rows.len() * 96);
    out.push_str(EXPORT_HEADER);
    out.push('\n');

    for row in rows {
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{}",
            row.date.format("%Y-%m-%d"),
            clean_field(&row.teacher_name),
            clean_field(&row.student_name),
            row.class_level,
            row.status,
            opt(row.sick_date),
            opt(row.excused_start_date),
            opt(row.excused_days),
            row.excused_reason.as_deref().map(clean_field).unwrap_or_default(),
            row.created_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use chrono::NaiveDate;

    fn row() -> ExportRow {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        ExportRow {
            date,
            teacher_id: 2,
            teacher_name: "Siti Rahma".into(),
            student_id: 5,
            student_name: "Budi".into(),
            class_level: 8,
            status: AttendanceStatus::Excused,
            sick_date: None,
            excused_start_date: Some(date),
            excused_days: Some(2),
            excused_reason: Some("wedding, out of town".into()),
            created_at: date.and_hms_opt(7, 30, 0).unwrap(),
        }
    }

    #[test]
    fn header_comes_first() {
        let csv = export_csv(&[]);
        assert_eq!(csv, format!("{EXPORT_HEADER}\n"));
    }

    #[test]
    fn commas_in_reason_become_semicolons() {
        let csv = export_csv(&[row()]);
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "2024-03-01,Siti Rahma,Budi,8,EXCUSED,,2024-03-01,2,wedding; out of town,2024-03-01 07:30:00"
        );
        assert_eq!(line.split(',').count(), 10);
    }

    #[test]
    fn clean_field_flattens_newlines() {
        assert_eq!(clean_field("a,b\nc"), "a;b c");
    }
}
