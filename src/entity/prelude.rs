//! 预导入模块，方便使用

pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::enrollments::{
    ActiveModel as EnrollmentActiveModel, Entity as Enrollments, Model as EnrollmentModel,
};
pub use super::roles::{ActiveModel as RoleActiveModel, Entity as Roles, Model as RoleModel};
pub use super::roles_users::{
    ActiveModel as RoleUserActiveModel, Entity as RolesUsers, Model as RoleUserModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
pub use super::web_auths::{
    ActiveModel as WebAuthActiveModel, Entity as WebAuths, Model as WebAuthModel,
};
