/*!
 * 基于角色的访问控制中间件
 *
 * 此中间件必须在 RequireLogin 中间件之后使用，用于验证用户是否持有指定角色。
 * 缺少角色时写入提示消息并重定向到首页。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * web::resource("/create_course")
 *     .wrap(RequireRole::new(RoleName::Admin))
 *     .wrap(RequireLogin)
 *     .route(web::get().to(create_course_page))
 * ```
 *
 * 注意 actix-web 中后注册的 wrap 先执行。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{info, warn};

use super::require_login::login_redirect_location;
use crate::middlewares::Session;
use crate::models::FlashLevel;
use crate::models::users::entities::{RoleName, User};
use crate::views;

pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to access that page.";

#[derive(Clone)]
pub struct RequireRole {
    required_role: RoleName,
}

impl RequireRole {
    /// 创建需要特定角色的中间件
    pub fn new(role: RoleName) -> Self {
        Self {
            required_role: role,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_role: self.required_role,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_role: RoleName,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let required_role = self.required_role;

        Box::pin(async move {
            let user = req.extensions().get::<User>().cloned();

            match user {
                Some(user) => {
                    if user.has_role(required_role) {
                        let res = srv.call(req).await?.map_into_left_body();
                        Ok(res)
                    } else {
                        info!(
                            "Access denied for user {} (roles: {:?}) to {}. Required role: {:?}",
                            user.id,
                            user.roles,
                            req.path(),
                            required_role
                        );
                        if let Some(session) = req.extensions().get::<Session>() {
                            session.flash(FlashLevel::Danger, PERMISSION_DENIED_MESSAGE);
                        }
                        Ok(req.into_response(views::redirect("/").map_into_right_body()))
                    }
                }
                None => {
                    warn!(
                        "Role check failed: no user found in request. Make sure RequireLogin middleware is applied first."
                    );
                    let location = login_redirect_location(&req);
                    Ok(req.into_response(views::redirect(&location).map_into_right_body()))
                }
            }
        })
    }
}
