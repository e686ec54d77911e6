use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::FsUniquifier)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::ConfirmedAt).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建角色表
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Roles::Name)
                            .string_len(80)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Roles::Description).string_len(255).null())
                    .to_owned(),
            )
            .await?;

        // 创建用户角色关联表（复合主键）
        manager
            .create_table(
                Table::create()
                    .table(RolesUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RolesUsers::UserId).big_integer().not_null())
                    .col(ColumnDef::new(RolesUsers::RoleId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(RolesUsers::UserId)
                            .col(RolesUsers::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RolesUsers::Table, RolesUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RolesUsers::Table, RolesUsers::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 WebAuthn 凭据表（每个用户至多一条）
        manager
            .create_table(
                Table::create()
                    .table(WebAuths::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WebAuths::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WebAuths::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(WebAuths::Table, WebAuths::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建课程表
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Courses::TeacherId).big_integer().not_null())
                    .col(ColumnDef::new(Courses::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Courses::Table, Courses::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建选课表
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enrollments::Grade).double().null())
                    .col(ColumnDef::new(Enrollments::Remark).text().null())
                    .col(
                        ColumnDef::new(Enrollments::EnrolledAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enrollments::GradedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        // 同一学生在同一课程中只能有一条选课记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_enrollments_student_course")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .col(Enrollments::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_enrollments_course_id")
                    .table(Enrollments::Table)
                    .col(Enrollments::CourseId)
                    .to_owned(),
            )
            .await?;

        // 课程表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_courses_teacher_id")
                    .table(Courses::Table)
                    .col(Courses::TeacherId)
                    .to_owned(),
            )
            .await?;

        // 角色关联表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_roles_users_role_id")
                    .table(RolesUsers::Table)
                    .col(RolesUsers::RoleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WebAuths::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RolesUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Active,
    FsUniquifier,
    ConfirmedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum RolesUsers {
    Table,
    UserId,
    RoleId,
}

#[derive(DeriveIden)]
enum WebAuths {
    Table,
    Id,
    UserId,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Name,
    TeacherId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Enrollments {
    Table,
    Id,
    CourseId,
    StudentId,
    Grade,
    Remark,
    EnrolledAt,
    GradedAt,
}
