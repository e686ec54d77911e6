use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, Session};
use crate::models::auth::requests::{LoginForm, LoginQuery, RegisterForm};
use crate::models::users::entities::RoleName;
use crate::services::{AuthService, auth::RegistrationMode};

// 懒加载的全局 AuthService 实例
static AUTH_SERVICE: Lazy<AuthService> = Lazy::new(AuthService::new_lazy);

pub async fn login_page(
    req: HttpRequest,
    query: web::Query<LoginQuery>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login_page(&req, query.into_inner()).await
}

pub async fn login(
    req: HttpRequest,
    session: Session,
    form: web::Form<LoginForm>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login(&req, &session, form.into_inner()).await
}

pub async fn logout(session: Session) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.logout(&session).await
}

pub async fn register_page(req: HttpRequest, session: Session) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .register_page(&req, &session, RegistrationMode::SelfService)
        .await
}

pub async fn register(
    req: HttpRequest,
    session: Session,
    form: web::Form<RegisterForm>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .register(
            &req,
            &session,
            form.into_inner(),
            RegistrationMode::SelfService,
        )
        .await
}

pub async fn register_user_page(req: HttpRequest, session: Session) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .register_page(&req, &session, RegistrationMode::Admin)
        .await
}

pub async fn register_user(
    req: HttpRequest,
    session: Session,
    form: web::Form<RegisterForm>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .register(&req, &session, form.into_inner(), RegistrationMode::Admin)
        .await
}

// 配置路由
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/login")
            .wrap(middlewares::RateLimit::login())
            .route(web::get().to(login_page))
            .route(web::post().to(login)),
    )
    .service(
        web::resource("/logout")
            .route(web::get().to(logout))
            .route(web::post().to(logout)),
    )
    .service(
        web::resource("/register")
            .wrap(middlewares::RateLimit::register())
            .route(web::get().to(register_page))
            .route(web::post().to(register)),
    )
    .service(
        // 管理员创建任意角色的用户
        web::resource("/register_user")
            .wrap(middlewares::RequireRole::new(RoleName::Admin))
            .wrap(middlewares::RequireLogin)
            .route(web::get().to(register_user_page))
            .route(web::post().to(register_user)),
    );
}
