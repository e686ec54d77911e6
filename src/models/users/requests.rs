use super::entities::RoleName;

// 用户创建请求（用于存储层，密码已哈希）
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub password_hash: String,
    pub role: RoleName,
}
