//! 角色实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::roles_users::Entity")]
    RolesUsers,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        super::roles_users::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::roles_users::Relation::Role.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_role(self) -> crate::models::users::entities::Role {
        use crate::models::users::entities::{Role, RoleName};

        Role {
            id: self.id,
            name: self.name.parse::<RoleName>().unwrap_or(RoleName::Student),
            description: self.description,
        }
    }
}
