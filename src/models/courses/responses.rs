use serde::Serialize;

use super::entities::Course;
use crate::models::enrollments::entities::EnrollmentDetail;
use crate::models::users::responses::UserOption;

// 课程列表项
#[derive(Debug, Clone, Serialize)]
pub struct CourseListItem {
    #[serde(flatten)]
    pub course: Course,
    /// 当前学生是否已选
    pub enrolled: bool,
}

// 课程详情
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    pub enrollments: Vec<EnrollmentDetail>,
    /// 仅管理员可见
    pub teacher: Option<UserOption>,
    /// 当前用户是否为授课教师
    pub can_grade: bool,
}
