use serde::Serialize;

use super::entities::User;

// 下拉选项中的用户
#[derive(Debug, Clone, Serialize)]
pub struct UserOption {
    pub id: i64,
    pub email: String,
}

impl From<&User> for UserOption {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}
