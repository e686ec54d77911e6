pub mod login;
pub mod logout;
pub mod register;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::middlewares::Session;
use crate::models::auth::requests::{LoginForm, LoginQuery, RegisterForm};
use crate::storage::Storage;

pub use register::RegistrationMode;

pub struct AuthService {
    storage: Option<Arc<dyn Storage>>,
}

impl AuthService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 登录页
    pub async fn login_page(
        &self,
        request: &HttpRequest,
        query: LoginQuery,
    ) -> ActixResult<HttpResponse> {
        login::login_page(request, query).await
    }

    // 登录验证
    pub async fn login(
        &self,
        request: &HttpRequest,
        session: &Session,
        form: LoginForm,
    ) -> ActixResult<HttpResponse> {
        login::handle_login(self, request, session, form).await
    }

    // 登出
    pub async fn logout(&self, session: &Session) -> ActixResult<HttpResponse> {
        logout::handle_logout(session).await
    }

    // 注册页
    pub async fn register_page(
        &self,
        request: &HttpRequest,
        session: &Session,
        mode: RegistrationMode,
    ) -> ActixResult<HttpResponse> {
        register::register_page(self, request, session, mode).await
    }

    // 注册用户
    pub async fn register(
        &self,
        request: &HttpRequest,
        session: &Session,
        form: RegisterForm,
        mode: RegistrationMode,
    ) -> ActixResult<HttpResponse> {
        register::handle_register(self, request, session, form, mode).await
    }
}
