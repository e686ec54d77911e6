//! 静态资源路由
//!
//! 使用 rust-embed 嵌入 `static/` 目录，支持：
//! - 自定义资源目录覆盖（开发用）
//! - 按扩展名设置 MIME 类型与缓存头
//! - 未匹配的路径重定向到首页

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use rust_embed::Embed;
use std::path::Path;

use crate::views;

/// 嵌入静态资源
/// 编译时从 static/ 目录读取文件
#[derive(Embed)]
#[folder = "static/"]
struct StaticAssets;

/// 获取文件的 MIME 类型
fn get_mime_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    match ext {
        "html" => "text/html; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" => "application/json; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "webp" => "image/webp",
        "txt" => "text/plain; charset=utf-8",
        "map" => "application/json",
        _ => "application/octet-stream",
    }
}

/// 检查是否应该设置缓存
fn should_cache(path: &str) -> bool {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    matches!(
        ext,
        "css" | "js" | "woff" | "woff2" | "ttf" | "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp"
    )
}

/// 拒绝包含上级目录的路径
fn is_safe_path(path: &str) -> bool {
    !path.is_empty() && !path.split(['/', '\\']).any(|seg| seg == "..")
}

/// 尝试从自定义目录读取文件（开发用）
fn try_custom_file(path: &str) -> Option<Vec<u8>> {
    let custom_path = format!("./static-custom/{}", path);
    std::fs::read(&custom_path).ok()
}

/// 获取文件内容（优先自定义目录，然后嵌入资源）
fn get_file(path: &str) -> Option<Vec<u8>> {
    try_custom_file(path).or_else(|| StaticAssets::get(path).map(|f| f.data.to_vec()))
}

/// 静态资源请求处理
pub async fn serve_static(req: HttpRequest) -> ActixResult<HttpResponse> {
    let path = req.match_info().query("tail").trim_start_matches('/');

    let content = if is_safe_path(path) {
        get_file(path)
    } else {
        None
    };

    match content {
        Some(data) => {
            let mut response = HttpResponse::Ok();
            response.content_type(get_mime_type(path));

            // 设置缓存头
            if should_cache(path) {
                response.insert_header(("Cache-Control", "public, max-age=86400"));
            } else {
                response.insert_header(("Cache-Control", "no-cache"));
            }

            Ok(response.body(data))
        }
        None => Ok(views::error_page(
            &req,
            StatusCode::NOT_FOUND,
            "Asset not found.",
        )),
    }
}

/// 未知路径回到首页
pub async fn fallback() -> HttpResponse {
    views::redirect("/")
}

/// 配置静态资源与兜底路由，须最后注册
pub fn configure_asset_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/static/{tail:.*}", web::get().to(serve_static))
        .default_service(web::to(fallback));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_mime_type() {
        assert_eq!(get_mime_type("index.html"), "text/html; charset=utf-8");
        assert_eq!(
            get_mime_type("app.js"),
            "application/javascript; charset=utf-8"
        );
        assert_eq!(get_mime_type("app.css"), "text/css; charset=utf-8");
        assert_eq!(get_mime_type("logo.png"), "image/png");
        assert_eq!(get_mime_type("unknown.xyz"), "application/octet-stream");
    }

    #[test]
    fn test_should_cache() {
        assert!(should_cache("app.css"));
        assert!(should_cache("logo.svg"));
        assert!(!should_cache("robots.txt"));
    }

    #[test]
    fn test_is_safe_path() {
        assert!(is_safe_path("app.css"));
        assert!(is_safe_path("img/logo.png"));
        assert!(!is_safe_path(""));
        assert!(!is_safe_path("../Cargo.toml"));
        assert!(!is_safe_path("img/../../secret"));
    }
}
