pub mod attendance;
pub mod daily_status;
pub mod export;
pub mod monitor;
pub mod students;
pub mod teachers;
