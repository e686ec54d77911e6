//! 用户与角色存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::roles::{self, Entity as Roles};
use crate::entity::roles_users;
use crate::entity::users::{self, ActiveModel, Column, Entity as Users};
use crate::errors::{CourseDeskError, Result};
use crate::models::users::{
    entities::{Role, RoleName, User},
    requests::CreateUserRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 角色不存在时创建
    pub async fn ensure_role_impl(&self, name: RoleName) -> Result<Role> {
        let existing = Roles::find()
            .filter(roles::Column::Name.eq(name.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query role"))?;

        if let Some(role) = existing {
            return Ok(role.into_role());
        }

        let model = roles::ActiveModel {
            name: Set(name.as_str().to_string()),
            description: Set(Some(name.description().to_string())),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("Failed to create role"))?;

        Ok(result.into_role())
    }

    /// 创建用户，用户行与角色关联在同一事务中写入
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let role = Roles::find()
            .filter(roles::Column::Name.eq(req.role.as_str()))
            .one(&txn)
            .await
            .map_err(db_err("Failed to query role"))?
            .ok_or_else(|| CourseDeskError::not_found(format!("Role {} not found", req.role)))?;

        let model = ActiveModel {
            email: Set(req.email),
            password_hash: Set(req.password_hash),
            active: Set(true),
            fs_uniquifier: Set(uuid::Uuid::new_v4().simple().to_string()),
            confirmed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let user = model
            .insert(&txn)
            .await
            .map_err(db_err("Failed to create user"))?;

        roles_users::ActiveModel {
            user_id: Set(user.id),
            role_id: Set(role.id),
        }
        .insert(&txn)
        .await
        .map_err(db_err("Failed to assign role"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit transaction"))?;

        Ok(user.into_user(vec![role]))
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query user"))?;

        self.with_roles(result).await
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query user"))?;

        self.with_roles(result).await
    }

    /// 列出持有某角色的用户，按邮箱排序
    pub async fn list_users_by_role_impl(&self, role: RoleName) -> Result<Vec<User>> {
        let ids: Vec<i64> = Users::find()
            .select_only()
            .column(Column::Id)
            .join(JoinType::InnerJoin, users::Relation::RolesUsers.def())
            .join(JoinType::InnerJoin, roles_users::Relation::Role.def())
            .filter(roles::Column::Name.eq(role.as_str()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list users"))?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Users::find()
            .filter(Column::Id.is_in(ids))
            .order_by_asc(Column::Email)
            .find_with_related(Roles)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list users"))?;

        Ok(rows
            .into_iter()
            .map(|(user, roles)| user.into_user(roles))
            .collect())
    }

    /// 统计持有某角色的用户数
    pub async fn count_users_by_role_impl(&self, role: RoleName) -> Result<u64> {
        Users::find()
            .join(JoinType::InnerJoin, users::Relation::RolesUsers.def())
            .join(JoinType::InnerJoin, roles_users::Relation::Role.def())
            .filter(roles::Column::Name.eq(role.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err("Failed to count users"))
    }

    /// 加载用户的角色
    async fn with_roles(&self, user: Option<users::Model>) -> Result<Option<User>> {
        let Some(user) = user else {
            return Ok(None);
        };

        let roles = user
            .find_related(Roles)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query user roles"))?;

        Ok(Some(user.into_user(roles)))
    }
}
