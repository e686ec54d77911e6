use serde::Deserialize;

// 登录表单
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// 登录成功后跳转的本地路径
    #[serde(default)]
    pub next: Option<String>,
}

// 登录页查询参数
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
}

// 注册表单
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "Student".to_string()
}
