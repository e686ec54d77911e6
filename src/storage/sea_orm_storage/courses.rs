//! 课程存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::enrollments::{self, Entity as Enrollments};
use crate::errors::Result;
use crate::models::courses::entities::Course;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(&self, name: &str, teacher_id: i64) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(name.to_string()),
            teacher_id: Set(teacher_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("Failed to create course"))?;

        Ok(result.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, course_id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query course"))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 列出课程
    pub async fn list_courses_impl(&self, teacher_id: Option<i64>) -> Result<Vec<Course>> {
        let mut select = Courses::find();

        // 教师筛选
        if let Some(teacher_id) = teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        let rows = select
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list courses"))?;

        Ok(rows.into_iter().map(|m| m.into_course()).collect())
    }

    /// 修改课程名称
    pub async fn update_course_name_impl(
        &self,
        course_id: i64,
        name: &str,
    ) -> Result<Option<Course>> {
        let existing = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query course"))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        model.name = Set(name.to_string());
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(db_err("Failed to update course"))?;

        Ok(Some(result.into_course()))
    }

    /// 删除课程，选课记录在同一事务中一并删除
    pub async fn delete_course_impl(&self, course_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let existing = Courses::find_by_id(course_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query course"))?;

        let Some(existing) = existing else {
            return Ok(false);
        };

        Enrollments::delete_many()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .exec(&txn)
            .await
            .map_err(db_err("Failed to delete enrollments"))?;

        existing
            .delete(&txn)
            .await
            .map_err(db_err("Failed to delete course"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;

        Ok(true)
    }

    /// 统计课程数
    pub async fn count_courses_impl(&self, teacher_id: Option<i64>) -> Result<u64> {
        let mut select = Courses::find();

        if let Some(teacher_id) = teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        select
            .count(&self.db)
            .await
            .map_err(db_err("Failed to count courses"))
    }
}
