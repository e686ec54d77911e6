use serde::Deserialize;

// 评分表单
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeForm {
    /// /manage_students 提交时携带，/grade/{id} 从路径获取
    #[serde(default)]
    pub enrollment_id: Option<i64>,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub remark: Option<String>,
}

// 选课记录查询条件（用于存储层），各条件为与关系
#[derive(Debug, Clone, Default)]
pub struct EnrollmentListQuery {
    pub course_id: Option<i64>,
    pub student_id: Option<i64>,
    /// 按授课教师筛选
    pub teacher_id: Option<i64>,
}
