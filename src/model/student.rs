use serde::Serialize;
use utoipa::ToSchema;

/// Class levels taught at the school.
pub const CLASS_LEVELS: [i32; 3] = [7, 8, 9];

pub fn is_valid_class_level(level: i32) -> bool {
    CLASS_LEVELS.contains(&level)
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 5,
    "name": "Budi Santoso",
    "class_level": 8,
    "active": true,
    "teacher_id": 2
}))]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub class_level: i32,
    pub active: bool,
    pub teacher_id: i64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StudentFilter {
    pub class_level: Option<i32>,
    pub active_only: bool,
}
