/*!
 * 登录校验中间件
 *
 * 必须在 `SessionMiddleware` 内层使用。根据会话中的用户 ID 加载用户，
 * 校验账号处于激活状态且 `fs_uniquifier` 与数据库一致，
 * 通过后将用户写入请求扩展，否则重定向到 `/login?next=<原路径>`。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * web::resource("/courses")
 *     .wrap(RequireLogin)
 *     .route(web::get().to(list_courses))
 * ```
 *
 * 处理程序中读取当前用户：
 *
 * ```rust,ignore
 * let user = RequireLogin::extract_user(&req);
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use crate::middlewares::Session;
use crate::models::users::entities::User;
use crate::storage::Storage;
use crate::views;

#[derive(Clone)]
pub struct RequireLogin;

/// 对 next 参数中的保留字符做百分号编码
fn encode_next(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '+' => out.push_str("%2B"),
            '#' => out.push_str("%23"),
            '=' => out.push_str("%3D"),
            '?' => out.push_str("%3F"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
    out
}

/// 登录页地址，携带原请求路径
pub(crate) fn login_redirect_location(req: &ServiceRequest) -> String {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    format!("/login?next={}", encode_next(target))
}

// 从会话解析当前用户
async fn resolve_user(req: &ServiceRequest) -> Result<User, String> {
    let session = req
        .extensions()
        .get::<Session>()
        .cloned()
        .ok_or_else(|| "Session middleware is not installed".to_string())?;

    let user_id = session
        .user_id()
        .ok_or_else(|| "No user in session".to_string())?;

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone();

    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            session.clear();
            return Err(format!("User {user_id} no longer exists"));
        }
        Err(e) => {
            error!("Failed to load user {} for session: {}", user_id, e);
            return Err("Failed to retrieve user from storage".to_string());
        }
    };

    if !user.active {
        session.clear();
        return Err(format!("User {user_id} is not active"));
    }

    if session.fs_uniquifier().as_deref() != Some(user.fs_uniquifier.as_str()) {
        session.clear();
        return Err(format!("Session identifier for user {user_id} is outdated"));
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireLogin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireLoginMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireLoginMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireLoginMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireLoginMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            match resolve_user(&req).await {
                Ok(user) => {
                    debug!("Session authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "Authentication required for request to {}: {}",
                        req.path(),
                        err
                    );
                    let location = login_redirect_location(&req);
                    Ok(req.into_response(views::redirect(&location).map_into_right_body()))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取用户信息
impl RequireLogin {
    /// 从请求扩展中提取当前用户
    /// 此函数应该在应用了RequireLogin中间件的路由处理程序中使用
    pub fn extract_user(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    /// 从请求扩展中提取用户ID
    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }
}
