use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use serde_json::json;
use tracing::{info, warn};

use crate::middlewares::Session;
use crate::models::FlashLevel;
use crate::models::auth::requests::{LoginForm, LoginQuery};
use crate::utils::password::verify_password;
use crate::utils::validate::{normalize_email, safe_next};
use crate::views;

use super::AuthService;

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

pub async fn login_page(request: &HttpRequest, query: LoginQuery) -> ActixResult<HttpResponse> {
    Ok(views::render(
        request,
        "login",
        json!({
            "email": "",
            "next": safe_next(query.next.as_deref()),
        }),
    ))
}

pub async fn handle_login(
    service: &AuthService,
    request: &HttpRequest,
    session: &Session,
    form: LoginForm,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let email = normalize_email(&form.email);
    let next = safe_next(form.next.as_deref()).map(str::to_string);

    // 1. 根据邮箱获取用户
    let user = match storage.get_user_by_email(&email).await {
        Ok(user) => user,
        Err(e) => return Ok(views::failure(request, e)),
    };

    // 2. 验证密码与账号状态
    let user = match user {
        Some(user) if verify_password(&form.password, &user.password_hash) => {
            if !user.active {
                warn!("Login rejected for inactive user {}", user.id);
                return Ok(login_failed(
                    request,
                    session,
                    &email,
                    next.as_deref(),
                    "This account is disabled.",
                ));
            }
            user
        }
        _ => {
            info!("Failed login attempt for {}", email);
            return Ok(login_failed(
                request,
                session,
                &email,
                next.as_deref(),
                INVALID_CREDENTIALS,
            ));
        }
    };

    // 3. 写入会话并轮换令牌
    session.login(user.id, &user.fs_uniquifier);
    session.flash(FlashLevel::Success, "Logged in successfully.");
    info!("User {} logged in successfully", user.email);

    Ok(views::redirect(next.as_deref().unwrap_or("/")))
}

fn login_failed(
    request: &HttpRequest,
    session: &Session,
    email: &str,
    next: Option<&str>,
    message: &str,
) -> HttpResponse {
    session.flash(FlashLevel::Danger, message);
    views::render_with_status(
        request,
        StatusCode::UNAUTHORIZED,
        "login",
        json!({
            "email": email,
            "next": next,
        }),
    )
}
