//! 选课存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, db_err};
use crate::entity::courses::{self, Entity as Courses};
use crate::entity::enrollments::{ActiveModel, Column, Entity as Enrollments, Model};
use crate::entity::users::{self, Entity as Users};
use crate::errors::Result;
use crate::models::enrollments::{
    entities::{Enrollment, EnrollmentDetail},
    requests::EnrollmentListQuery,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建选课记录，(student_id, course_id) 唯一索引冲突时返回 Conflict
    pub async fn create_enrollment_impl(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Enrollment> {
        let model = ActiveModel {
            course_id: Set(course_id),
            student_id: Set(student_id),
            grade: Set(None),
            remark: Set(None),
            enrolled_at: Set(chrono::Utc::now().timestamp()),
            graded_at: Set(None),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("Failed to create enrollment"))?;

        Ok(result.into_enrollment())
    }

    /// 通过 ID 获取选课记录
    pub async fn get_enrollment_by_id_impl(
        &self,
        enrollment_id: i64,
    ) -> Result<Option<EnrollmentDetail>> {
        let result = Enrollments::find_by_id(enrollment_id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query enrollment"))?;

        let Some(model) = result else {
            return Ok(None);
        };

        Ok(self.attach_details(vec![model]).await?.pop())
    }

    /// 获取学生在某课程的选课记录
    pub async fn get_enrollment_impl(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query enrollment"))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    /// 按条件列出选课记录
    pub async fn list_enrollments_impl(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<Vec<EnrollmentDetail>> {
        let mut select = Enrollments::find();

        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        if let Some(teacher_id) = query.teacher_id {
            select = select
                .inner_join(Courses)
                .filter(courses::Column::TeacherId.eq(teacher_id));
        }

        let rows = select
            .order_by_asc(Column::CourseId)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list enrollments"))?;

        self.attach_details(rows).await
    }

    /// 登记成绩
    pub async fn set_grade_impl(
        &self,
        enrollment_id: i64,
        grade: f64,
        remark: Option<String>,
    ) -> Result<Option<Enrollment>> {
        let existing = Enrollments::find_by_id(enrollment_id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query enrollment"))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        model.grade = Set(Some(grade));
        model.remark = Set(remark);
        model.graded_at = Set(Some(chrono::Utc::now().timestamp()));

        let result = model
            .update(&self.db)
            .await
            .map_err(db_err("Failed to update grade"))?;

        Ok(Some(result.into_enrollment()))
    }

    /// 统计学生的选课数
    pub async fn count_enrollments_for_student_impl(&self, student_id: i64) -> Result<u64> {
        Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .count(&self.db)
            .await
            .map_err(db_err("Failed to count enrollments"))
    }

    /// 统计教师所授课程中的不同学生数
    pub async fn count_distinct_students_for_teacher_impl(&self, teacher_id: i64) -> Result<u64> {
        let student_ids: Vec<i64> = Enrollments::find()
            .select_only()
            .column(Column::StudentId)
            .distinct()
            .inner_join(Courses)
            .filter(courses::Column::TeacherId.eq(teacher_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to count students"))?;

        Ok(student_ids.len() as u64)
    }

    /// 统计学生所选课程中的不同教师数
    pub async fn count_distinct_teachers_for_student_impl(&self, student_id: i64) -> Result<u64> {
        let teacher_ids: Vec<i64> = Courses::find()
            .select_only()
            .column(courses::Column::TeacherId)
            .distinct()
            .inner_join(Enrollments)
            .filter(Column::StudentId.eq(student_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to count teachers"))?;

        Ok(teacher_ids.len() as u64)
    }

    /// 补充学生邮箱与课程信息
    async fn attach_details(&self, rows: Vec<Model>) -> Result<Vec<EnrollmentDetail>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let course_ids: Vec<i64> = rows.iter().map(|r| r.course_id).collect();
        let student_ids: Vec<i64> = rows.iter().map(|r| r.student_id).collect();

        let courses: HashMap<i64, courses::Model> = Courses::find()
            .filter(courses::Column::Id.is_in(course_ids))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query courses"))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let students: HashMap<i64, String> = Users::find()
            .filter(users::Column::Id.is_in(student_ids))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query students"))?
            .into_iter()
            .map(|u| (u.id, u.email))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let course = courses.get(&row.course_id)?;
                let student_email = students.get(&row.student_id).cloned().unwrap_or_default();
                Some(EnrollmentDetail {
                    course_name: course.name.clone(),
                    teacher_id: course.teacher_id,
                    student_email,
                    enrollment: row.into_enrollment(),
                })
            })
            .collect())
    }
}
