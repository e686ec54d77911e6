//! 角色视图范围
//!
//! 登录用户按最高角色解析为 [`Actor`]，仪表盘统计、可见课程、
//! 可见选课记录等视图数据通过对应的 [`RoleScope`] 实现计算。

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::courses::entities::Course;
use crate::models::dashboard::DashboardCounts;
use crate::models::enrollments::{entities::EnrollmentDetail, requests::EnrollmentListQuery};
use crate::models::users::entities::{RoleName, User};
use crate::storage::Storage;

/// 当前请求的操作者
#[derive(Debug, Clone)]
pub enum Actor {
    Admin(User),
    Teacher(User),
    Student(User),
}

impl Actor {
    /// 多角色时取权限最高者，无角色返回 None
    pub fn from_user(user: User) -> Option<Self> {
        match user.highest_role()? {
            RoleName::Admin => Some(Actor::Admin(user)),
            RoleName::Teacher => Some(Actor::Teacher(user)),
            RoleName::Student => Some(Actor::Student(user)),
        }
    }

    pub fn user(&self) -> &User {
        match self {
            Actor::Admin(user) | Actor::Teacher(user) | Actor::Student(user) => user,
        }
    }

    pub fn role(&self) -> RoleName {
        match self {
            Actor::Admin(_) => RoleName::Admin,
            Actor::Teacher(_) => RoleName::Teacher,
            Actor::Student(_) => RoleName::Student,
        }
    }

    pub fn scope(&self) -> &'static dyn RoleScope {
        match self {
            Actor::Admin(_) => &AdminScope,
            Actor::Teacher(_) => &TeacherScope,
            Actor::Student(_) => &StudentScope,
        }
    }
}

#[async_trait]
pub trait RoleScope: Send + Sync {
    /// 仪表盘统计
    async fn dashboard_counts(
        &self,
        storage: &dyn Storage,
        user: &User,
    ) -> Result<DashboardCounts>;

    /// 课程列表中可见的课程
    async fn visible_courses(&self, storage: &dyn Storage, user: &User) -> Result<Vec<Course>>;

    /// 课程详情中可见的选课记录
    async fn course_enrollments(
        &self,
        storage: &dyn Storage,
        user: &User,
        course: &Course,
    ) -> Result<Vec<EnrollmentDetail>> {
        let _ = user;
        storage
            .list_enrollments(EnrollmentListQuery {
                course_id: Some(course.id),
                ..Default::default()
            })
            .await
    }

    /// 课程详情中是否展示授课教师信息
    fn sees_teacher_info(&self) -> bool {
        false
    }

    /// 课程详情中是否展示评分表单
    ///
    /// 与评分路由的校验一致：持有 Teacher 角色且为该课程的授课教师，
    /// 与解析出的最高角色无关
    fn can_grade(&self, user: &User, course: &Course) -> bool {
        user.has_role(RoleName::Teacher) && course.teacher_id == user.id
    }
}

pub struct AdminScope;

#[async_trait]
impl RoleScope for AdminScope {
    async fn dashboard_counts(
        &self,
        storage: &dyn Storage,
        _user: &User,
    ) -> Result<DashboardCounts> {
        Ok(DashboardCounts {
            course_count: Some(storage.count_courses(None).await?),
            student_count: Some(storage.count_users_by_role(RoleName::Student).await?),
            teacher_count: Some(storage.count_users_by_role(RoleName::Teacher).await?),
        })
    }

    async fn visible_courses(&self, storage: &dyn Storage, _user: &User) -> Result<Vec<Course>> {
        storage.list_courses(None).await
    }

    fn sees_teacher_info(&self) -> bool {
        true
    }
}

pub struct TeacherScope;

#[async_trait]
impl RoleScope for TeacherScope {
    async fn dashboard_counts(
        &self,
        storage: &dyn Storage,
        user: &User,
    ) -> Result<DashboardCounts> {
        Ok(DashboardCounts {
            course_count: Some(storage.count_courses(Some(user.id)).await?),
            student_count: Some(storage.count_distinct_students_for_teacher(user.id).await?),
            teacher_count: None,
        })
    }

    async fn visible_courses(&self, storage: &dyn Storage, user: &User) -> Result<Vec<Course>> {
        storage.list_courses(Some(user.id)).await
    }
}

pub struct StudentScope;

#[async_trait]
impl RoleScope for StudentScope {
    async fn dashboard_counts(
        &self,
        storage: &dyn Storage,
        user: &User,
    ) -> Result<DashboardCounts> {
        Ok(DashboardCounts {
            course_count: Some(storage.count_enrollments_for_student(user.id).await?),
            student_count: None,
            teacher_count: Some(storage.count_distinct_teachers_for_student(user.id).await?),
        })
    }

    async fn visible_courses(&self, storage: &dyn Storage, _user: &User) -> Result<Vec<Course>> {
        storage.list_courses(None).await
    }

    // 学生只能看到自己的选课记录
    async fn course_enrollments(
        &self,
        storage: &dyn Storage,
        user: &User,
        course: &Course,
    ) -> Result<Vec<EnrollmentDetail>> {
        storage
            .list_enrollments(EnrollmentListQuery {
                course_id: Some(course.id),
                student_id: Some(user.id),
                ..Default::default()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(id: i64, roles: Vec<RoleName>) -> User {
        User {
            id,
            email: format!("u{id}@example.com"),
            password_hash: String::new(),
            active: true,
            fs_uniquifier: "x".into(),
            roles,
            confirmed_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn course_of(teacher_id: i64) -> Course {
        Course {
            id: 1,
            name: "Algebra".into(),
            teacher_id,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_actor_resolves_highest_role() {
        let actor = Actor::from_user(user_with(1, vec![RoleName::Student, RoleName::Admin]));
        assert!(matches!(actor, Some(Actor::Admin(_))));
        assert!(Actor::from_user(user_with(2, vec![])).is_none());
    }

    #[test]
    fn test_only_owning_teacher_can_grade() {
        let teacher = user_with(5, vec![RoleName::Teacher]);
        assert!(TeacherScope.can_grade(&teacher, &course_of(5)));
        assert!(!TeacherScope.can_grade(&teacher, &course_of(6)));

        let admin = user_with(5, vec![RoleName::Admin]);
        assert!(!AdminScope.can_grade(&admin, &course_of(5)));
    }

    #[test]
    fn test_admin_who_teaches_can_grade_own_course() {
        let user = user_with(5, vec![RoleName::Admin, RoleName::Teacher]);
        let actor = Actor::from_user(user).unwrap();
        assert!(matches!(actor, Actor::Admin(_)));
        assert!(actor.scope().can_grade(actor.user(), &course_of(5)));
        assert!(!actor.scope().can_grade(actor.user(), &course_of(6)));
    }

    #[test]
    fn test_only_admin_sees_teacher_info() {
        assert!(AdminScope.sees_teacher_info());
        assert!(!TeacherScope.sees_teacher_info());
        assert!(!StudentScope.sees_teacher_info());
    }
}
