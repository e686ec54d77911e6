//! 选课实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub grade: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub remark: Option<String>,
    pub enrolled_at: i64,
    pub graded_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_enrollment(self) -> crate::models::enrollments::entities::Enrollment {
        use crate::models::enrollments::entities::Enrollment;
        use chrono::{DateTime, Utc};

        Enrollment {
            id: self.id,
            course_id: self.course_id,
            student_id: self.student_id,
            grade: self.grade,
            remark: self.remark,
            enrolled_at: DateTime::<Utc>::from_timestamp(self.enrolled_at, 0).unwrap_or_default(),
            graded_at: self
                .graded_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
        }
    }
}
