//! 集成测试共用的环境与辅助函数
#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::LOCATION;
use actix_web::test::TestRequest;
use sea_orm::{ConnectOptions, Database};

use coursedesk::cache::{ObjectCache, object_cache::MokaCacheWrapper};
use coursedesk::config::AppConfig;
use coursedesk::models::courses::entities::Course;
use coursedesk::models::users::{
    entities::{RoleName, User},
    requests::CreateUserRequest,
};
use coursedesk::runtime::lifetime::startup::seed_roles;
use coursedesk::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use coursedesk::utils::password::hash_password;

pub const PASSWORD: &str = "CourseDesk42";

pub struct TestContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 内存 SQLite + 迁移 + 固定角色
pub async fn setup() -> TestContext {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    // 内存库只存在于单个连接中
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("in-memory sqlite should connect");
    let storage: Arc<dyn Storage> = Arc::new(
        SeaOrmStorage::from_connection(db)
            .await
            .expect("migrations should apply"),
    );
    seed_roles(&storage).await.expect("roles should be seeded");

    let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::new(1_000, 3_600));

    TestContext { storage, cache }
}

impl TestContext {
    pub async fn create_user(&self, email: &str, role: RoleName) -> User {
        self.storage
            .create_user(CreateUserRequest {
                email: email.to_string(),
                password_hash: hash_password(PASSWORD).expect("hash"),
                role,
            })
            .await
            .expect("user should be created")
    }

    pub async fn create_course(&self, name: &str, teacher: &User) -> Course {
        self.storage
            .create_course(name, teacher.id)
            .await
            .expect("course should be created")
    }
}

/// 组装与 main.rs 相同的应用
#[macro_export]
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(coursedesk::middlewares::SessionMiddleware)
                .app_data(
                    actix_web::web::QueryConfig::default()
                        .error_handler(coursedesk::utils::query_error_handler),
                )
                .app_data(
                    actix_web::web::FormConfig::default()
                        .error_handler(coursedesk::utils::form_error_handler),
                )
                .app_data(
                    actix_web::web::PathConfig::default()
                        .error_handler(coursedesk::utils::path_error_handler),
                )
                .app_data(actix_web::web::Data::new($ctx.storage.clone()))
                .app_data(actix_web::web::Data::new($ctx.cache.clone()))
                .configure(coursedesk::routes::configure_auth_routes)
                .configure(coursedesk::routes::configure_dashboard_routes)
                .configure(coursedesk::routes::configure_course_routes)
                .configure(coursedesk::routes::configure_enrollment_routes)
                .configure(coursedesk::routes::configure_grading_routes)
                .configure(coursedesk::routes::configure_asset_routes),
        )
        .await
    };
}

/// 登录并返回会话 Cookie
#[macro_export]
macro_rules! login {
    ($app:expr, $email:expr) => {{
        let resp = actix_web::test::call_service(
            &$app,
            $crate::common::login_request($email, $crate::common::PASSWORD).to_request(),
        )
        .await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::FOUND, "login failed");
        $crate::common::session_cookie(&resp).expect("login should set a session cookie")
    }};
}

static PEER_COUNTER: AtomicU32 = AtomicU32::new(1);

/// 每次请求使用不同的客户端地址，避免触发登录限流
pub fn next_peer() -> SocketAddr {
    let n = PEER_COUNTER.fetch_add(1, Ordering::Relaxed);
    SocketAddr::from((Ipv4Addr::from(0x0A00_0000 | n), 40_000))
}

pub fn login_request(email: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/login")
        .peer_addr(next_peer())
        .set_form([("email", email), ("password", password)])
}

pub fn get(uri: &str, cookie: &Cookie<'static>) -> TestRequest {
    TestRequest::get().uri(uri).cookie(cookie.clone())
}

pub fn post_form<T: serde::Serialize>(uri: &str, cookie: &Cookie<'static>, form: T) -> TestRequest {
    TestRequest::post()
        .uri(uri)
        .peer_addr(next_peer())
        .cookie(cookie.clone())
        .set_form(form)
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    let name = &AppConfig::get().session.cookie_name;
    resp.response()
        .cookies()
        .find(|c| c.name() == name.as_str() && !c.value().is_empty())
        .map(|c| c.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
