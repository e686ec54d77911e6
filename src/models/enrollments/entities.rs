use serde::Serialize;

// 选课实体
#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub grade: Option<f64>,
    pub remark: Option<String>,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
}

// 带学生邮箱与课程名的选课记录
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentDetail {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub student_email: String,
    pub course_name: String,
    pub teacher_id: i64,
}
