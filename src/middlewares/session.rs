/*!
 * 服务端会话中间件
 *
 * 会话数据以 JSON 形式保存在对象缓存中，键为 `session:<token>`，
 * 浏览器只持有随机令牌（HttpOnly、SameSite=Lax，生产环境附加 Secure）。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * App::new()
 *     .wrap(SessionMiddleware)
 *     .route("/", web::get().to(index));
 *
 * async fn index(session: Session) -> HttpResponse {
 *     session.flash(FlashLevel::Info, "Hello");
 *     HttpResponse::Ok().finish()
 * }
 * ```
 *
 * ## 持久化规则
 *
 * - 会话为空时不写入缓存，也不下发 Cookie
 * - 登录时轮换令牌，旧令牌立即失效
 * - 清空会话时删除缓存条目并使 Cookie 过期
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    cookie::{Cookie, SameSite},
    dev::{Payload, ServiceRequest, ServiceResponse},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::{FlashLevel, FlashMessage};
use crate::utils::random_code::generate_random_code;

const SESSION_TOKEN_LENGTH: usize = 32;
const SESSION_KEY_PREFIX: &str = "session:";

/// 会话中保存的数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs_uniquifier: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<FlashMessage>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.fs_uniquifier.is_none() && self.flashes.is_empty()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    /// 请求携带且在缓存中存在的令牌
    token: Option<String>,
    data: SessionData,
    /// 需要更换令牌（登录、清空）
    rotate: bool,
}

/// 请求内的会话句柄，克隆后共享同一份状态
#[derive(Clone, Default)]
pub struct Session(Rc<RefCell<SessionState>>);

impl Session {
    fn new(token: Option<String>, data: SessionData) -> Self {
        Self(Rc::new(RefCell::new(SessionState {
            token,
            data,
            rotate: false,
        })))
    }

    /// 从请求扩展中获取会话
    pub fn extract(req: &HttpRequest) -> Option<Session> {
        req.extensions().get::<Session>().cloned()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.0.borrow().data.user_id
    }

    pub fn fs_uniquifier(&self) -> Option<String> {
        self.0.borrow().data.fs_uniquifier.clone()
    }

    /// 登录：写入身份并轮换令牌
    pub fn login(&self, user_id: i64, fs_uniquifier: &str) {
        let mut state = self.0.borrow_mut();
        state.data.user_id = Some(user_id);
        state.data.fs_uniquifier = Some(fs_uniquifier.to_string());
        state.rotate = true;
    }

    /// 清空会话，之后写入的提示消息进入新会话
    pub fn clear(&self) {
        let mut state = self.0.borrow_mut();
        state.data = SessionData::default();
        state.rotate = true;
    }

    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        self.0
            .borrow_mut()
            .data
            .flashes
            .push(FlashMessage::new(level, message));
    }

    /// 取出并清空待显示的提示消息
    pub fn take_flashes(&self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.0.borrow_mut().data.flashes)
    }
}

impl FromRequest for Session {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Session::extract(req).ok_or_else(|| {
            actix_web::error::ErrorInternalServerError("Session middleware is not installed")
        }))
    }
}

/// 请求结束后对会话执行的操作
#[derive(Debug, PartialEq)]
enum PersistPlan {
    /// 无需处理
    Keep,
    /// 写入缓存，`set_cookie` 为新令牌时下发 Cookie
    Save {
        token: String,
        json: String,
        set_cookie: bool,
        stale: Option<String>,
    },
    /// 删除缓存条目并使 Cookie 过期
    Remove { token: String },
}

fn plan_persist(state: &mut SessionState) -> Result<PersistPlan, serde_json::Error> {
    let rotate = std::mem::take(&mut state.rotate);

    if state.data.is_empty() {
        return Ok(match state.token.take() {
            Some(token) => PersistPlan::Remove { token },
            None => PersistPlan::Keep,
        });
    }

    let json = serde_json::to_string(&state.data)?;
    let (token, set_cookie, stale) = match state.token.take() {
        Some(old) if rotate => (generate_random_code(SESSION_TOKEN_LENGTH), true, Some(old)),
        Some(old) => (old, false, None),
        None => (generate_random_code(SESSION_TOKEN_LENGTH), true, None),
    };

    Ok(PersistPlan::Save {
        token,
        json,
        set_cookie,
        stale,
    })
}

fn session_cookie(value: String) -> Cookie<'static> {
    let config = AppConfig::get();
    Cookie::build(config.session.cookie_name.clone(), value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.is_production())
        .finish()
}

async fn load_session(req: &ServiceRequest, cache: &Arc<dyn ObjectCache>) -> Session {
    let config = AppConfig::get();
    let Some(token) = req
        .cookie(&config.session.cookie_name)
        .map(|c| c.value().to_string())
    else {
        return Session::default();
    };

    match cache.get_raw(&format!("{SESSION_KEY_PREFIX}{token}")).await {
        CacheResult::Found(json) => match serde_json::from_str::<SessionData>(&json) {
            Ok(data) => Session::new(Some(token), data),
            Err(e) => {
                debug!("Discarding unreadable session data: {}", e);
                cache.remove(&format!("{SESSION_KEY_PREFIX}{token}")).await;
                Session::default()
            }
        },
        CacheResult::NotFound => {
            debug!("Session token not found in cache, starting a new session");
            Session::default()
        }
    }
}

#[derive(Clone)]
pub struct SessionMiddleware;

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
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
            let cache = req
                .app_data::<web::Data<Arc<dyn ObjectCache>>>()
                .expect("Cache not found in app data")
                .get_ref()
                .clone();

            let session = load_session(&req, &cache).await;
            req.extensions_mut().insert(session.clone());

            let mut res = srv.call(req).await?;

            let plan = plan_persist(&mut session.0.borrow_mut());
            let config = AppConfig::get();

            match plan {
                Ok(PersistPlan::Keep) => {}
                Ok(PersistPlan::Save {
                    token,
                    json,
                    set_cookie,
                    stale,
                }) => {
                    if let Some(stale) = stale {
                        cache.remove(&format!("{SESSION_KEY_PREFIX}{stale}")).await;
                    }
                    cache
                        .insert_raw(
                            format!("{SESSION_KEY_PREFIX}{token}"),
                            json,
                            config.session.ttl,
                        )
                        .await;
                    if set_cookie
                        && let Err(e) = res.response_mut().add_cookie(&session_cookie(token))
                    {
                        warn!("Failed to set session cookie: {}", e);
                    }
                }
                Ok(PersistPlan::Remove { token }) => {
                    cache.remove(&format!("{SESSION_KEY_PREFIX}{token}")).await;
                    if let Err(e) = res
                        .response_mut()
                        .add_removal_cookie(&session_cookie(String::new()))
                    {
                        warn!("Failed to expire session cookie: {}", e);
                    }
                }
                Err(e) => warn!("Failed to serialize session: {}", e),
            }

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(token: Option<&str>, data: SessionData, rotate: bool) -> SessionState {
        SessionState {
            token: token.map(str::to_string),
            data,
            rotate,
        }
    }

    fn logged_in() -> SessionData {
        SessionData {
            user_id: Some(7),
            fs_uniquifier: Some("abc".into()),
            flashes: vec![],
        }
    }

    #[test]
    fn test_empty_new_session_is_not_persisted() {
        let mut s = state(None, SessionData::default(), false);
        assert_eq!(plan_persist(&mut s).unwrap(), PersistPlan::Keep);
    }

    #[test]
    fn test_emptied_session_is_removed() {
        let mut s = state(Some("old"), SessionData::default(), true);
        assert_eq!(
            plan_persist(&mut s).unwrap(),
            PersistPlan::Remove {
                token: "old".into()
            }
        );
    }

    #[test]
    fn test_existing_session_keeps_token() {
        let mut s = state(Some("tok"), logged_in(), false);
        match plan_persist(&mut s).unwrap() {
            PersistPlan::Save {
                token,
                set_cookie,
                stale,
                ..
            } => {
                assert_eq!(token, "tok");
                assert!(!set_cookie);
                assert_eq!(stale, None);
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn test_login_rotates_token() {
        let mut s = state(Some("tok"), logged_in(), true);
        match plan_persist(&mut s).unwrap() {
            PersistPlan::Save {
                token,
                set_cookie,
                stale,
                ..
            } => {
                assert_ne!(token, "tok");
                assert_eq!(token.len(), SESSION_TOKEN_LENGTH);
                assert!(set_cookie);
                assert_eq!(stale.as_deref(), Some("tok"));
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn test_flash_roundtrip() {
        let session = Session::default();
        session.flash(FlashLevel::Success, "Saved");
        session.flash(FlashLevel::Danger, "Oops");
        let flashes = session.take_flashes();
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].level, FlashLevel::Success);
        assert!(session.take_flashes().is_empty());
    }

    #[test]
    fn test_clear_keeps_later_flashes() {
        let session = Session::new(Some("tok".into()), logged_in());
        session.clear();
        session.flash(FlashLevel::Info, "Logged out");
        assert_eq!(session.user_id(), None);
        assert_eq!(session.take_flashes().len(), 1);
    }
}
