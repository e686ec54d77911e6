use serde::Serialize;

// 课程实体
#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub teacher_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
