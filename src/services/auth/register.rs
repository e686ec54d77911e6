use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::errors::CourseDeskError;
use crate::middlewares::Session;
use crate::models::FlashLevel;
use crate::models::auth::requests::RegisterForm;
use crate::models::users::{entities::RoleName, requests::CreateUserRequest};
use crate::utils::password::hash_password;
use crate::utils::validate::{normalize_email, validate_email, validate_password_simple};
use crate::views;

use super::AuthService;

const EMAIL_TAKEN: &str = "Email is already registered.";

/// 注册入口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationMode {
    /// 管理员创建用户，可指定任意角色
    Admin,
    /// 公开自助注册，仅允许学生角色
    SelfService,
}

impl RegistrationMode {
    fn action(&self) -> &'static str {
        match self {
            RegistrationMode::Admin => "/register_user",
            RegistrationMode::SelfService => "/register",
        }
    }

    fn allowed_roles(&self) -> &'static [RoleName] {
        match self {
            RegistrationMode::Admin => RoleName::all(),
            RegistrationMode::SelfService => &[RoleName::Student],
        }
    }
}

/// 校验注册表单，返回规范化后的邮箱与角色
pub(crate) fn validate_registration(
    form: &RegisterForm,
    mode: RegistrationMode,
) -> Result<(String, RoleName), String> {
    let email = normalize_email(&form.email);
    validate_email(&email).map_err(str::to_string)?;

    let role: RoleName = form
        .role
        .trim()
        .parse()
        .map_err(|_| format!("Unknown role: {}", form.role.trim()))?;

    if !mode.allowed_roles().contains(&role) {
        return Err(format!("The {role} role cannot be self-assigned."));
    }

    if form.password != form.password_confirm {
        return Err("Passwords do not match.".to_string());
    }

    validate_password_simple(&form.password)?;

    Ok((email, role))
}

fn register_context(mode: RegistrationMode, email: &str, role: &str) -> Value {
    let roles: Vec<Value> = mode
        .allowed_roles()
        .iter()
        .map(|r| json!({ "name": r.as_str(), "selected": r.as_str() == role }))
        .collect();

    json!({
        "action": mode.action(),
        "admin_mode": mode == RegistrationMode::Admin,
        "email": email,
        "roles": roles,
    })
}

/// 自助注册未开放时的响应
fn self_registration_disabled(session: &Session) -> HttpResponse {
    session.flash(FlashLevel::Warning, "Self-registration is disabled.");
    views::redirect("/login")
}

pub async fn register_page(
    service: &AuthService,
    request: &HttpRequest,
    session: &Session,
    mode: RegistrationMode,
) -> ActixResult<HttpResponse> {
    if mode == RegistrationMode::SelfService && !service.get_config().app.allow_self_registration
    {
        return Ok(self_registration_disabled(session));
    }

    Ok(views::render(
        request,
        "register",
        register_context(mode, "", RoleName::STUDENT),
    ))
}

pub async fn handle_register(
    service: &AuthService,
    request: &HttpRequest,
    session: &Session,
    form: RegisterForm,
    mode: RegistrationMode,
) -> ActixResult<HttpResponse> {
    if mode == RegistrationMode::SelfService && !service.get_config().app.allow_self_registration
    {
        return Ok(self_registration_disabled(session));
    }

    let storage = service.get_storage(request);

    let rejected = |message: &str| {
        session.flash(FlashLevel::Danger, message);
        views::render_with_status(
            request,
            StatusCode::BAD_REQUEST,
            "register",
            register_context(mode, form.email.trim(), form.role.trim()),
        )
    };

    // 1. 表单校验
    let (email, role) = match validate_registration(&form, mode) {
        Ok(valid) => valid,
        Err(message) => {
            warn!("Registration rejected for {}: {}", form.email.trim(), message);
            return Ok(rejected(&message));
        }
    };

    // 2. 检查邮箱是否已存在
    match storage.get_user_by_email(&email).await {
        Ok(Some(_)) => return Ok(rejected(EMAIL_TAKEN)),
        Ok(None) => {}
        Err(e) => return Ok(views::failure(request, e)),
    }

    // 3. 哈希密码
    let password_hash = match hash_password(&form.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(views::failure(request, e)),
    };

    // 4. 创建用户（唯一约束兜底并发注册）
    let user = match storage
        .create_user(CreateUserRequest {
            email,
            password_hash,
            role,
        })
        .await
    {
        Ok(user) => user,
        Err(CourseDeskError::Conflict(_)) => return Ok(rejected(EMAIL_TAKEN)),
        Err(e) => return Ok(views::failure(request, e)),
    };

    info!("User {} registered with role {}", user.email, role);

    match mode {
        RegistrationMode::Admin => {
            session.flash(
                FlashLevel::Success,
                format!("User {} created with role {}.", user.email, role),
            );
            Ok(views::redirect("/register_user"))
        }
        RegistrationMode::SelfService => {
            session.flash(
                FlashLevel::Success,
                "Registration successful. Please log in.",
            );
            Ok(views::redirect("/login"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str, confirm: &str, role: &str) -> RegisterForm {
        RegisterForm {
            email: email.into(),
            password: password.into(),
            password_confirm: confirm.into(),
            role: role.into(),
        }
    }

    #[test]
    fn test_valid_student_registration() {
        let result = validate_registration(
            &form(" New@Example.com ", "SecurePass123", "SecurePass123", "Student"),
            RegistrationMode::SelfService,
        );
        assert_eq!(
            result,
            Ok(("new@example.com".to_string(), RoleName::Student))
        );
    }

    #[test]
    fn test_self_service_rejects_privileged_roles() {
        for role in ["Admin", "Teacher"] {
            let result = validate_registration(
                &form("a@example.com", "SecurePass123", "SecurePass123", role),
                RegistrationMode::SelfService,
            );
            assert!(result.is_err(), "{role} should be rejected");
        }
    }

    #[test]
    fn test_admin_may_assign_any_role() {
        for role in ["Admin", "Teacher", "Student"] {
            let result = validate_registration(
                &form("a@example.com", "SecurePass123", "SecurePass123", role),
                RegistrationMode::Admin,
            );
            assert!(result.is_ok(), "{role} should be accepted");
        }
    }

    #[test]
    fn test_rejects_unknown_role_and_mismatch() {
        assert_eq!(
            validate_registration(
                &form("a@example.com", "SecurePass123", "SecurePass123", "Janitor"),
                RegistrationMode::Admin,
            ),
            Err("Unknown role: Janitor".to_string())
        );
        assert_eq!(
            validate_registration(
                &form("a@example.com", "SecurePass123", "SecurePass124", "Student"),
                RegistrationMode::Admin,
            ),
            Err("Passwords do not match.".to_string())
        );
    }

    #[test]
    fn test_rejects_bad_email_and_weak_password() {
        assert!(
            validate_registration(
                &form("not-an-email", "SecurePass123", "SecurePass123", "Student"),
                RegistrationMode::Admin,
            )
            .is_err()
        );
        assert!(
            validate_registration(
                &form("a@example.com", "short", "short", "Student"),
                RegistrationMode::Admin,
            )
            .is_err()
        );
    }
}
