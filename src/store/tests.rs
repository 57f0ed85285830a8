use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::test_utils::{insert_student, insert_teacher, insert_user, setup_store};
use super::Store;
use crate::model::{
    attendance::{AttendanceEntry, AttendanceStatus},
    daily_status::DailyStatus,
    report::ExportFilter,
    role::Role,
    student::StudentFilter,
    user::TeacherUpdate,
};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn present() -> AttendanceEntry {
    AttendanceEntry {
        status: AttendanceStatus::Present,
        sick_date: None,
        excused_start_date: None,
        excused_days: None,
        excused_reason: None,
    }
}

fn sick(on: &str) -> AttendanceEntry {
    AttendanceEntry {
        status: AttendanceStatus::Sick,
        sick_date: Some(day(on)),
        ..present()
    }
}

async fn count_attendance(store: &super::SqliteStore) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance")
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[actix_web::test]
async fn schema_init_is_idempotent() {
    let store = setup_store().await;
    store.init_schema().await.unwrap();
    assert_eq!(store.count_users_with_role(Role::Admin).await.unwrap(), 0);
}

#[actix_web::test]
async fn sick_submission_records_and_marks_day_done() {
    let store = setup_store().await;
    let teacher = insert_teacher(&store, "siti").await;
    let student = insert_student(&store, teacher, "Budi", 8).await;

    let entries = BTreeMap::from([(student, sick("2024-03-01"))]);
    let outcome = store
        .record_attendance_batch(teacher, day("2024-03-01"), &entries)
        .await
        .unwrap();
    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.updated, 0);

    let records = store.list_attendance(teacher, day("2024-03-01")).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student_id, student);
    assert_eq!(records[0].status, AttendanceStatus::Sick);
    assert_eq!(records[0].sick_date, Some(day("2024-03-01")));

    let status = store
        .get_daily_status(teacher, day("2024-03-01"))
        .await
        .unwrap()
        .expect("daily status written");
    assert_eq!(status.status, DailyStatus::Done);
    assert_eq!(status.reason, None);
}

#[actix_web::test]
async fn resubmitting_updates_instead_of_duplicating() {
    let store = setup_store().await;
    let teacher = insert_teacher(&store, "siti").await;
    let a = insert_student(&store, teacher, "Ani", 7).await;
    let b = insert_student(&store, teacher, "Budi", 7).await;
    let date = day("2024-03-04");

    let entries = BTreeMap::from([(a, present()), (b, sick("2024-03-04"))]);
    store.record_attendance_batch(teacher, date, &entries).await.unwrap();
    let second = store.record_attendance_batch(teacher, date, &entries).await.unwrap();

    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 2);
    assert_eq!(count_attendance(&store).await, 2);

    let changed = BTreeMap::from([(b, present())]);
    store.record_attendance_batch(teacher, date, &changed).await.unwrap();
    let records = store.list_attendance(teacher, date).await.unwrap();
    assert_eq!(records.len(), 2);
    let budi = records.iter().find(|r| r.student_id == b).unwrap();
    assert_eq!(budi.status, AttendanceStatus::Present);
    assert_eq!(budi.sick_date, None);
}

#[actix_web::test]
async fn students_without_status_and_inactive_students_are_untouched() {
    let store = setup_store().await;
    let teacher = insert_teacher(&store, "siti").await;
    let other_teacher = insert_teacher(&store, "joko").await;
    let active = insert_student(&store, teacher, "Ani", 9).await;
    let skipped = insert_student(&store, teacher, "Budi", 9).await;
    let inactive = insert_student(&store, teacher, "Citra", 9).await;
    let foreign = insert_student(&store, other_teacher, "Dodi", 9).await;
    store.toggle_student_active(teacher, inactive).await.unwrap();

    let entries = BTreeMap::from([
        (active, present()),
        (inactive, present()),
        (foreign, present()),
    ]);
    let outcome = store
        .record_attendance_batch(teacher, day("2024-03-05"), &entries)
        .await
        .unwrap();

    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.skipped, 1);
    let records = store.list_attendance(teacher, day("2024-03-05")).await.unwrap();
    let ids: Vec<i64> = records.iter().map(|r| r.student_id).collect();
    assert_eq!(ids, vec![active]);
    assert!(!ids.contains(&skipped));
    assert!(store.list_attendance(other_teacher, day("2024-03-05")).await.unwrap().is_empty());
}

#[actix_web::test]
async fn failed_write_rolls_back_whole_batch() {
    let store = setup_store().await;
    let teacher = insert_teacher(&store, "siti").await;
    let first = insert_student(&store, teacher, "Ani", 8).await;
    let doomed = insert_student(&store, teacher, "Budi", 8).await;

    sqlx::query(&format!(
        "CREATE TRIGGER reject_student BEFORE INSERT ON attendance \
         WHEN NEW.student_id = {doomed} \
         BEGIN SELECT RAISE(ABORT, 'forced failure'); END"
    ))
    .execute(store.pool())
    .await
    .unwrap();

    let entries = BTreeMap::from([(first, present()), (doomed, present())]);
    let err = store
        .record_attendance_batch(teacher, day("2024-03-06"), &entries)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("forced failure"));

    assert_eq!(count_attendance(&store).await, 0);
    assert!(store
        .get_daily_status(teacher, day("2024-03-06"))
        .await
        .unwrap()
        .is_none());
}

#[actix_web::test]
async fn daily_status_upsert_keeps_one_row() {
    let store = setup_store().await;
    let teacher = insert_teacher(&store, "siti").await;
    let date = day("2024-03-07");

    store
        .set_daily_status(teacher, date, DailyStatus::NotDone, Some("exam duty"))
        .await
        .unwrap();
    let status = store.get_daily_status(teacher, date).await.unwrap().unwrap();
    assert_eq!(status.status, DailyStatus::NotDone);
    assert_eq!(status.reason.as_deref(), Some("exam duty"));

    store.set_daily_status(teacher, date, DailyStatus::Done, None).await.unwrap();
    let status = store.get_daily_status(teacher, date).await.unwrap().unwrap();
    assert_eq!(status.status, DailyStatus::Done);
    assert_eq!(status.reason, None);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teacher_daily_status")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[actix_web::test]
async fn roster_filter_by_class_orders_by_name() {
    let store = setup_store().await;
    let teacher = insert_teacher(&store, "siti").await;
    insert_student(&store, teacher, "Zaki", 8).await;
    insert_student(&store, teacher, "Ani", 7).await;
    insert_student(&store, teacher, "Maya", 8).await;
    insert_student(&store, teacher, "Bayu", 8).await;

    let students = store
        .list_students(
            teacher,
            StudentFilter {
                class_level: Some(8),
                active_only: false,
            },
        )
        .await
        .unwrap();
    let names: Vec<&str> = students.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Bayu", "Maya", "Zaki"]);
    assert!(students.iter().all(|s| s.class_level == 8));
}

#[actix_web::test]
async fn student_toggle_is_scoped_to_owner() {
    let store = setup_store().await;
    let owner = insert_teacher(&store, "siti").await;
    let intruder = insert_teacher(&store, "joko").await;
    let student = insert_student(&store, owner, "Ani", 7).await;

    assert_eq!(store.toggle_student_active(intruder, student).await.unwrap(), None);
    assert_eq!(store.toggle_student_active(owner, student).await.unwrap(), Some(false));
    assert_eq!(store.toggle_student_active(owner, student).await.unwrap(), Some(true));
}

#[actix_web::test]
async fn teacher_accounts_update_and_toggle() {
    let store = setup_store().await;
    let admin = insert_user(&store, "admin", Role::Admin).await;
    let teacher = insert_teacher(&store, "siti").await;

    let update = TeacherUpdate {
        name: "Siti Rahma".into(),
        email: None,
        username: "siti.rahma".into(),
        subject: Some("IPA".into()),
        password_hash: Some("new-hash".into()),
    };
    assert!(store.update_teacher(teacher, &update).await.unwrap());
    assert!(!store.update_teacher(admin, &update).await.unwrap());

    let user = store.get_user(teacher).await.unwrap().unwrap();
    assert_eq!(user.username, "siti.rahma");
    assert_eq!(user.subject.as_deref(), Some("IPA"));
    assert_eq!(user.password_hash, "new-hash");

    assert_eq!(store.toggle_user_active(teacher, Role::Teacher).await.unwrap(), Some(false));
    assert_eq!(store.toggle_user_active(admin, Role::Teacher).await.unwrap(), None);

    let teachers = store.list_teachers().await.unwrap();
    assert_eq!(teachers.len(), 1);
    assert!(!teachers[0].active);
}

#[actix_web::test]
async fn duplicate_username_is_a_unique_violation() {
    let store = setup_store().await;
    insert_teacher(&store, "siti").await;
    let err = store
        .create_user(&crate::model::user::NewUser {
            name: "Other".into(),
            email: None,
            username: "siti".into(),
            password_hash: "x".into(),
            role: Role::Teacher,
            subject: None,
        })
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db) => assert!(db.is_unique_violation()),
        other => panic!("unexpected error: {other}"),
    }
}

#[actix_web::test]
async fn reports_join_names_and_filter() {
    let store = setup_store().await;
    let siti = insert_teacher(&store, "siti").await;
    let joko = insert_teacher(&store, "joko").await;
    let ani = insert_student(&store, siti, "Ani", 7).await;
    let budi = insert_student(&store, joko, "Budi", 8).await;

    store
        .record_attendance_batch(siti, day("2024-03-01"), &BTreeMap::from([(ani, present())]))
        .await
        .unwrap();
    store
        .record_attendance_batch(joko, day("2024-03-02"), &BTreeMap::from([(budi, sick("2024-03-02"))]))
        .await
        .unwrap();

    let all = store
        .export_rows(&ExportFilter {
            from: day("2024-03-01"),
            to: day("2024-03-02"),
            class_level: None,
            teacher_id: None,
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].student_name, "Ani");
    assert_eq!(all[0].teacher_name, "siti name");
    assert_eq!(all[1].status, AttendanceStatus::Sick);

    let class_eight = store
        .export_rows(&ExportFilter {
            from: day("2024-03-01"),
            to: day("2024-03-02"),
            class_level: Some(8),
            teacher_id: None,
        })
        .await
        .unwrap();
    assert_eq!(class_eight.len(), 1);
    assert_eq!(class_eight[0].student_id, budi);

    let statuses = store.teacher_statuses(day("2024-03-01")).await.unwrap();
    assert_eq!(statuses.len(), 2);
    let siti_row = statuses.iter().find(|r| r.teacher_id == siti).unwrap();
    assert_eq!(siti_row.status, Some(DailyStatus::Done));
    let joko_row = statuses.iter().find(|r| r.teacher_id == joko).unwrap();
    assert_eq!(joko_row.status, None);
}
