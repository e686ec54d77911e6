/*!
 * 速率限制中间件
 *
 * 此中间件用于限制请求频率，防止暴力破解和 DDoS 攻击。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::rate_limit::RateLimit;
 *
 * web::resource("/login")
 *     .wrap(RateLimit::login())  // 5次/分钟，仅统计 POST
 *     .route(web::get().to(login_page))
 *     .route(web::post().to(login))
 * ```
 *
 * ## 限制规则
 *
 * - 使用客户端 IP 作为限制键
 * - 窗口从首个请求开始计时，到期后计数清零
 * - 可选择不统计 GET/HEAD 请求
 * - 超过限制返回 429 页面，`Retry-After` 为窗口剩余秒数
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, StatusCode, header::HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::Expiry;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::views;

/// 一个限制键在当前窗口内的计数
#[derive(Clone, Debug, PartialEq)]
struct RateWindow {
    count: u32,
    started: Instant,
    window: Duration,
}

/// 条目在各自窗口结束时过期，更新计数不顺延
struct WindowExpiry;

impl Expiry<String, RateWindow> for WindowExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &RateWindow,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.window)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        _value: &RateWindow,
        _updated_at: Instant,
        duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        duration_until_expiry
    }
}

/// 全局速率限制缓存
/// 键: 路由前缀:ip:<地址>
static RATE_LIMIT_CACHE: Lazy<Cache<String, RateWindow>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .expire_after(WindowExpiry)
        .build()
});

/// 记录一次请求；超限时返回需等待的秒数
fn record_request(
    current: Option<RateWindow>,
    now: Instant,
    max_requests: u32,
    window: Duration,
) -> Result<RateWindow, u64> {
    match current {
        Some(entry) if now.saturating_duration_since(entry.started) < entry.window => {
            if entry.count >= max_requests {
                let left = entry
                    .window
                    .saturating_sub(now.saturating_duration_since(entry.started));
                Err(left.as_secs().max(1))
            } else {
                Ok(RateWindow {
                    count: entry.count + 1,
                    ..entry
                })
            }
        }
        _ => Ok(RateWindow {
            count: 1,
            started: now,
            window,
        }),
    }
}

/// 速率限制配置
#[derive(Clone)]
pub struct RateLimit {
    /// 时间窗口内允许的最大请求数
    max_requests: u32,
    /// 时间窗口（秒）
    window_secs: u64,
    /// 限制键前缀（用于区分不同端点）
    key_prefix: String,
    /// 是否只统计会修改状态的请求
    skip_safe_methods: bool,
}

impl RateLimit {
    /// 创建新的速率限制器
    ///
    /// # 参数
    /// - `max_requests`: 时间窗口内允许的最大请求数
    /// - `window_secs`: 时间窗口（秒）
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            key_prefix: String::new(),
            skip_safe_methods: false,
        }
    }

    /// 设置限制键前缀
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 不统计 GET/HEAD 请求
    pub fn unsafe_methods_only(mut self) -> Self {
        self.skip_safe_methods = true;
        self
    }

    /// 登录提交限制：5次/分钟/IP
    pub fn login() -> Self {
        Self::new(5, 60).with_prefix("login").unsafe_methods_only()
    }

    /// 自助注册提交限制：3次/分钟/IP
    pub fn register() -> Self {
        Self::new(3, 60)
            .with_prefix("register")
            .unsafe_methods_only()
    }
}

/// 从请求中提取客户端 IP
///
/// 安全注意事项：
/// - 如果服务部署在反向代理后面，需要在反向代理中配置正确的 X-Forwarded-For / X-Real-IP 头
/// - 此实现会验证 IP 格式，防止伪造的无效头导致问题
/// - 在不可信网络中直接暴露服务时，攻击者可能伪造转发头来绕过限制
fn extract_client_ip(req: &ServiceRequest) -> String {
    // 尝试从连接信息获取真实 IP（最可信）
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    // 如果连接信息有有效 IP，优先使用
    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    // 从 X-Forwarded-For 头获取（用于反向代理场景）
    // 只取第一个 IP（最接近客户端的）
    if let Some(forwarded) = req.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    // 从 X-Real-IP 头获取
    if let Some(real_ip) = req.headers().get("X-Real-IP")
        && let Ok(ip) = real_ip.to_str()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    // 如果都没有有效 IP，使用连接信息的默认值
    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

/// 验证 IP 地址格式是否有效
fn is_valid_ip(ip: &str) -> bool {
    use std::net::IpAddr;
    ip.parse::<IpAddr>().is_ok()
}

/// 创建速率限制错误响应
fn create_rate_limit_response(req: &ServiceRequest, retry_after: u64) -> HttpResponse {
    let mut response = views::error_page(
        req.request(),
        StatusCode::TOO_MANY_REQUESTS,
        "Too many attempts. Please wait a minute and try again.",
    );
    response.headers_mut().insert(
        actix_web::http::header::RETRY_AFTER,
        HeaderValue::from(retry_after),
    );
    response
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            max_requests: self.max_requests,
            window_secs: self.window_secs,
            key_prefix: self.key_prefix.clone(),
            skip_safe_methods: self.skip_safe_methods,
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    max_requests: u32,
    window_secs: u64,
    key_prefix: String,
    skip_safe_methods: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let max_requests = self.max_requests;
        let window_secs = self.window_secs;
        let key_prefix = self.key_prefix.clone();
        let skip_safe_methods = self.skip_safe_methods;

        Box::pin(async move {
            if skip_safe_methods && (req.method() == Method::GET || req.method() == Method::HEAD) {
                let res = srv.call(req).await?.map_into_left_body();
                return Ok(res);
            }

            let identifier = format!("ip:{}", extract_client_ip(&req));
            let cache_key = if key_prefix.is_empty() {
                identifier
            } else {
                format!("{}:{}", key_prefix, identifier)
            };

            let current = RATE_LIMIT_CACHE.get(&cache_key).await;
            let window = Duration::from_secs(window_secs);

            match record_request(current, Instant::now(), max_requests, window) {
                Ok(entry) => {
                    RATE_LIMIT_CACHE.insert(cache_key, entry).await;
                }
                Err(retry_after) => {
                    warn!(
                        "Rate limit exceeded for key: {} (limit: {} per {}s)",
                        cache_key, max_requests, window_secs
                    );
                    let response = create_rate_limit_response(&req, retry_after);
                    return Ok(req.into_response(response.map_into_right_body()));
                }
            }

            // 继续处理请求
            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window_secs, 60);
        assert_eq!(login.key_prefix, "login");

        assert!(login.skip_safe_methods);

        let register = RateLimit::register();
        assert_eq!(register.max_requests, 3);
        assert_eq!(register.window_secs, 60);
        assert_eq!(register.key_prefix, "register");
    }

    #[test]
    fn test_custom_limit_counts_all_methods() {
        let limit = RateLimit::new(100, 60).with_prefix("api");
        assert!(!limit.skip_safe_methods);
        assert_eq!(limit.key_prefix, "api");
    }

    #[test]
    fn test_window_counts_up_to_limit() {
        let start = Instant::now();
        let window = Duration::from_secs(60);

        let mut entry = record_request(None, start, 2, window).unwrap();
        assert_eq!(entry.count, 1);
        entry = record_request(Some(entry), start + Duration::from_secs(1), 2, window).unwrap();
        assert_eq!(entry.count, 2);
        assert_eq!(entry.started, start);

        let retry = record_request(Some(entry), start + Duration::from_secs(20), 2, window);
        assert_eq!(retry, Err(40));
    }

    #[test]
    fn test_window_length_follows_configuration() {
        let start = Instant::now();
        let window = Duration::from_secs(300);
        let full = RateWindow {
            count: 5,
            started: start,
            window,
        };

        // 超过 60 秒仍在 300 秒窗口内
        assert_eq!(
            record_request(Some(full.clone()), start + Duration::from_secs(90), 5, window),
            Err(210)
        );

        let fresh =
            record_request(Some(full), start + Duration::from_secs(300), 5, window).unwrap();
        assert_eq!(fresh.count, 1);
        assert_eq!(fresh.window, window);
    }

    #[test]
    fn test_expiry_keeps_window_deadline() {
        let entry = RateWindow {
            count: 1,
            started: Instant::now(),
            window: Duration::from_secs(300),
        };
        let key = "login:ip:127.0.0.1".to_string();
        assert_eq!(
            WindowExpiry.expire_after_create(&key, &entry, Instant::now()),
            Some(Duration::from_secs(300))
        );
        assert_eq!(
            WindowExpiry.expire_after_update(
                &key,
                &entry,
                Instant::now(),
                Some(Duration::from_secs(12))
            ),
            Some(Duration::from_secs(12))
        );
    }

    #[test]
    fn test_ip_validation() {
        assert!(is_valid_ip("127.0.0.1"));
        assert!(is_valid_ip("::1"));
        assert!(!is_valid_ip("not-an-ip"));
        assert!(!is_valid_ip("10.0.0.1:8080"));
    }
}
