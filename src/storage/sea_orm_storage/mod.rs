//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 各领域的具体实现位于子模块中，此处仅负责连接与 trait 委托。

mod courses;
mod enrollments;
mod users;

use crate::config::AppConfig;
use crate::errors::{CourseDeskError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM storage initialized, database: {}", db_url);

        Ok(storage)
    }

    /// 使用已有连接创建存储实例并运行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| CourseDeskError::database_operation(format!("Migration failed: {e}")))?;

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| CourseDeskError::database_config(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| CourseDeskError::database_connection(format!("SQLite connection failed: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| CourseDeskError::database_connection(format!("Cannot connect to database: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(CourseDeskError::database_config(format!(
                "Cannot infer database type from URL: {url}. Supported: sqlite://, postgres://, mysql://, or a .db/.sqlite file path"
            )))
        }
    }
}

/// 包装数据库错误并附加上下文，唯一约束冲突保持为 Conflict
pub(crate) fn db_err(context: &'static str) -> impl Fn(DbErr) -> CourseDeskError {
    move |e| match CourseDeskError::from(e) {
        CourseDeskError::DatabaseOperation(msg) => {
            CourseDeskError::database_operation(format!("{context}: {msg}"))
        }
        other => other,
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 角色模块
    async fn ensure_role(&self, name: RoleName) -> Result<Role> {
        self.ensure_role_impl(name).await
    }

    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_by_role(&self, role: RoleName) -> Result<Vec<User>> {
        self.list_users_by_role_impl(role).await
    }

    async fn count_users_by_role(&self, role: RoleName) -> Result<u64> {
        self.count_users_by_role_impl(role).await
    }

    // 课程模块
    async fn create_course(&self, name: &str, teacher_id: i64) -> Result<Course> {
        self.create_course_impl(name, teacher_id).await
    }

    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(course_id).await
    }

    async fn list_courses(&self, teacher_id: Option<i64>) -> Result<Vec<Course>> {
        self.list_courses_impl(teacher_id).await
    }

    async fn update_course_name(&self, course_id: i64, name: &str) -> Result<Option<Course>> {
        self.update_course_name_impl(course_id, name).await
    }

    async fn delete_course(&self, course_id: i64) -> Result<bool> {
        self.delete_course_impl(course_id).await
    }

    async fn count_courses(&self, teacher_id: Option<i64>) -> Result<u64> {
        self.count_courses_impl(teacher_id).await
    }

    // 选课模块
    async fn create_enrollment(&self, student_id: i64, course_id: i64) -> Result<Enrollment> {
        self.create_enrollment_impl(student_id, course_id).await
    }

    async fn get_enrollment_by_id(&self, enrollment_id: i64) -> Result<Option<EnrollmentDetail>> {
        self.get_enrollment_by_id_impl(enrollment_id).await
    }

    async fn get_enrollment(&self, student_id: i64, course_id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_impl(student_id, course_id).await
    }

    async fn list_enrollments(&self, query: EnrollmentListQuery) -> Result<Vec<EnrollmentDetail>> {
        self.list_enrollments_impl(query).await
    }

    async fn set_grade(
        &self,
        enrollment_id: i64,
        grade: f64,
        remark: Option<String>,
    ) -> Result<Option<Enrollment>> {
        self.set_grade_impl(enrollment_id, grade, remark).await
    }

    async fn count_enrollments_for_student(&self, student_id: i64) -> Result<u64> {
        self.count_enrollments_for_student_impl(student_id).await
    }

    async fn count_distinct_students_for_teacher(&self, teacher_id: i64) -> Result<u64> {
        self.count_distinct_students_for_teacher_impl(teacher_id).await
    }

    async fn count_distinct_teachers_for_student(&self, student_id: i64) -> Result<u64> {
        self.count_distinct_teachers_for_student_impl(student_id).await
    }
}
