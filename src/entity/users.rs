//! 用户实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub active: bool,
    #[sea_orm(unique)]
    pub fs_uniquifier: String,
    pub confirmed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::courses::Entity")]
    Courses,
    #[sea_orm(has_many = "super::enrollments::Entity")]
    Enrollments,
    #[sea_orm(has_many = "super::roles_users::Entity")]
    RolesUsers,
    #[sea_orm(has_one = "super::web_auths::Entity")]
    WebAuth,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::web_auths::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WebAuth.def()
    }
}

// 通过 roles_users 关联角色
impl Related<super::roles::Entity> for Entity {
    fn to() -> RelationDef {
        super::roles_users::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::roles_users::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_user(
        self,
        roles: Vec<super::roles::Model>,
    ) -> crate::models::users::entities::User {
        use crate::models::users::entities::{RoleName, User};
        use chrono::{DateTime, Utc};

        let mut role_names: Vec<RoleName> = roles
            .into_iter()
            .filter_map(|r| r.name.parse::<RoleName>().ok())
            .collect();
        role_names.sort();
        role_names.dedup();

        User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            active: self.active,
            fs_uniquifier: self.fs_uniquifier,
            roles: role_names,
            confirmed_at: self
                .confirmed_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
