use std::sync::Arc;

use crate::models::{
    courses::entities::Course,
    enrollments::{
        entities::{Enrollment, EnrollmentDetail},
        requests::EnrollmentListQuery,
    },
    users::{
        entities::{Role, RoleName, User},
        requests::CreateUserRequest,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 角色管理方法
    // 角色不存在时创建
    async fn ensure_role(&self, name: RoleName) -> Result<Role>;

    /// 用户管理方法
    // 创建用户并关联角色（同一事务）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息（含角色）
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息（含角色）
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 列出持有某角色的用户
    async fn list_users_by_role(&self, role: RoleName) -> Result<Vec<User>>;
    // 统计持有某角色的用户数
    async fn count_users_by_role(&self, role: RoleName) -> Result<u64>;

    /// 课程管理方法
    // 创建课程
    async fn create_course(&self, name: &str, teacher_id: i64) -> Result<Course>;
    // 通过ID获取课程
    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>>;
    // 列出课程，可按教师筛选
    async fn list_courses(&self, teacher_id: Option<i64>) -> Result<Vec<Course>>;
    // 修改课程名称
    async fn update_course_name(&self, course_id: i64, name: &str) -> Result<Option<Course>>;
    // 删除课程及其选课记录
    async fn delete_course(&self, course_id: i64) -> Result<bool>;
    // 统计课程数，可按教师筛选
    async fn count_courses(&self, teacher_id: Option<i64>) -> Result<u64>;

    /// 选课管理方法
    // 创建选课记录，重复时返回 Conflict
    async fn create_enrollment(&self, student_id: i64, course_id: i64) -> Result<Enrollment>;
    // 通过ID获取选课记录
    async fn get_enrollment_by_id(&self, enrollment_id: i64) -> Result<Option<EnrollmentDetail>>;
    // 获取学生在某课程的选课记录
    async fn get_enrollment(&self, student_id: i64, course_id: i64) -> Result<Option<Enrollment>>;
    // 按条件列出选课记录
    async fn list_enrollments(&self, query: EnrollmentListQuery) -> Result<Vec<EnrollmentDetail>>;
    // 登记成绩
    async fn set_grade(
        &self,
        enrollment_id: i64,
        grade: f64,
        remark: Option<String>,
    ) -> Result<Option<Enrollment>>;
    // 统计学生的选课数
    async fn count_enrollments_for_student(&self, student_id: i64) -> Result<u64>;
    // 统计教师所授课程中的不同学生数
    async fn count_distinct_students_for_teacher(&self, teacher_id: i64) -> Result<u64>;
    // 统计学生所选课程中的不同教师数
    async fn count_distinct_teachers_for_student(&self, student_id: i64) -> Result<u64>;
}

/// 根据配置创建存储后端
pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
