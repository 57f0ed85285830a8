use crate::api::attendance::{AttendanceSheet, AttendanceSubmission, RosterEntry};
use crate::api::daily_status::SetDailyStatus;
use crate::api::monitor::{MonitorReport, StatusCounts, TeacherMonitorRow};
use crate::api::students::CreateStudent;
use crate::api::teachers::{CreateTeacher, UpdateTeacher};
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, BatchOutcome, DayCount, StudentSubmission,
};
use crate::model::daily_status::{DailyStatus, TeacherDailyStatus};
use crate::model::report::ExportRow;
use crate::model::role::Role;
use crate::model::student::Student;
use crate::model::user::UserResponse;
use crate::models::{LoginReqDto, LoginResponse};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Absensi API",
        version = "1.0.0",
        description = r#"
## School Attendance Tracker

Teachers record daily attendance for the students of grades 7 to 9 they manage.
Administrators manage teacher accounts and monitor every class.

### Key Features
- **Teacher Management** (admin): create, edit and activate/deactivate teachers
- **Roster Management** (teacher): add students and toggle them active
- **Attendance**: one atomic batch per day, marking the day DONE
- **Daily Status**: report DONE / NOT_DONE with a reason
- **Monitoring & Export** (admin): per-teacher overview and CSV download

### Security
All `/api` endpoints require a **JWT Bearer** token obtained from `/auth/login`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::me,

        crate::api::teachers::list_teachers,
        crate::api::teachers::create_teacher,
        crate::api::teachers::update_teacher,
        crate::api::teachers::toggle_teacher,

        crate::api::students::list_students,
        crate::api::students::create_student,
        crate::api::students::toggle_student,

        crate::api::attendance::attendance_sheet,
        crate::api::attendance::submit_attendance,

        crate::api::daily_status::get_daily_status,
        crate::api::daily_status::set_daily_status,

        crate::api::monitor::monitor,
        crate::api::export::export_attendance
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            UserResponse,
            Role,
            CreateTeacher,
            UpdateTeacher,
            Student,
            CreateStudent,
            AttendanceStatus,
            AttendanceRecord,
            DayCount,
            StudentSubmission,
            AttendanceSubmission,
            BatchOutcome,
            RosterEntry,
            AttendanceSheet,
            DailyStatus,
            TeacherDailyStatus,
            SetDailyStatus,
            StatusCounts,
            TeacherMonitorRow,
            MonitorReport,
            ExportRow
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and identity"),
        (name = "Teachers", description = "Teacher account management"),
        (name = "Students", description = "Per-teacher student rosters"),
        (name = "Attendance", description = "Daily attendance and status"),
        (name = "Monitoring", description = "Admin overview and CSV export"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
