use serde::{Deserialize, Serialize};

/// 角色名称，排序靠后的权限更高
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoleName {
    Student,
    Teacher,
    Admin,
}

impl RoleName {
    pub const STUDENT: &'static str = "Student";
    pub const TEACHER: &'static str = "Teacher";
    pub const ADMIN: &'static str = "Admin";

    pub fn all() -> &'static [RoleName] {
        &[RoleName::Student, RoleName::Teacher, RoleName::Admin]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Student => Self::STUDENT,
            RoleName::Teacher => Self::TEACHER,
            RoleName::Admin => Self::ADMIN,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RoleName::Student => "Enrolls in courses and views own grades",
            RoleName::Teacher => "Teaches courses and grades enrolled students",
            RoleName::Admin => "Manages users and courses",
        }
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::STUDENT => Ok(RoleName::Student),
            Self::TEACHER => Ok(RoleName::Teacher),
            Self::ADMIN => Ok(RoleName::Admin),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

// 角色实体
#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub id: i64,
    pub name: RoleName,
    pub description: Option<String>,
}

// 用户实体
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)] // 不输出到模板上下文
    pub password_hash: String,
    pub active: bool,
    #[serde(skip_serializing)]
    pub fs_uniquifier: String,
    /// 已去重并按权限升序排列
    pub roles: Vec<RoleName>,
    pub confirmed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }

    /// 多角色时取权限最高者
    pub fn highest_role(&self) -> Option<RoleName> {
        self.roles.iter().max().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(roles: Vec<RoleName>) -> User {
        User {
            id: 1,
            email: "a@b.io".into(),
            password_hash: String::new(),
            active: true,
            fs_uniquifier: "x".into(),
            roles,
            confirmed_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_role_name_parse() {
        assert_eq!("Admin".parse::<RoleName>(), Ok(RoleName::Admin));
        assert_eq!("Teacher".parse::<RoleName>(), Ok(RoleName::Teacher));
        assert_eq!("Student".parse::<RoleName>(), Ok(RoleName::Student));
        assert!("admin".parse::<RoleName>().is_err());
        assert!("".parse::<RoleName>().is_err());
    }

    #[test]
    fn test_role_name_display_roundtrip() {
        for role in RoleName::all() {
            assert_eq!(role.to_string().parse::<RoleName>(), Ok(*role));
        }
    }

    #[test]
    fn test_highest_role() {
        assert_eq!(user_with(vec![]).highest_role(), None);
        assert_eq!(
            user_with(vec![RoleName::Student, RoleName::Teacher]).highest_role(),
            Some(RoleName::Teacher)
        );
        assert_eq!(
            user_with(vec![RoleName::Admin, RoleName::Student]).highest_role(),
            Some(RoleName::Admin)
        );
    }

    #[test]
    fn test_has_role() {
        let user = user_with(vec![RoleName::Teacher]);
        assert!(user.has_role(RoleName::Teacher));
        assert!(!user.has_role(RoleName::Admin));
    }
}
