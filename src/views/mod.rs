//! HTML 视图渲染
//!
//! 模板在编译期由 rust-embed 嵌入，首次使用时注册到全局 Handlebars 注册表。
//! `partials/` 下的文件注册为局部模板，其余按去掉 `.hbs` 后缀的文件名注册为页面。
//! 每个页面的上下文都会注入当前用户、待显示的提示消息与系统名称。

use actix_web::{
    HttpMessage, HttpRequest, HttpResponse,
    http::{StatusCode, header::LOCATION},
};
use handlebars::{Handlebars, handlebars_helper};
use once_cell::sync::OnceCell;
use rust_embed::Embed;
use serde_json::{Map, Value, json};
use tracing::{debug, error, warn};

use crate::config::AppConfig;
use crate::errors::{CourseDeskError, Result};
use crate::middlewares::Session;
use crate::models::users::entities::{RoleName, User};

#[derive(Embed)]
#[folder = "templates/"]
struct TemplateAssets;

static TEMPLATES: OnceCell<Handlebars<'static>> = OnceCell::new();

static HTML_500: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Internal Server Error</title>
<link rel="stylesheet" href="/static/app.css">
</head>
<body>
<main class="container">
<h1>Internal Server Error</h1>
<p>Something went wrong on our end. Please try again later.</p>
</main>
</body>
</html>"#;

const PARTIAL_PREFIX: &str = "partials/";
const TEMPLATE_SUFFIX: &str = ".hbs";

// 成绩显示：最多两位小数，去掉末尾的零与小数点
handlebars_helper!(format_grade: |grade: f64| {
    format!("{grade:.2}")
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
});

// RFC 3339 时间只保留日期部分
handlebars_helper!(format_date: |ts: str| ts.get(..10).unwrap_or(ts).to_string());

fn build_registry() -> Result<Handlebars<'static>> {
    let mut registry = Handlebars::new();
    registry.register_helper("format_grade", Box::new(format_grade));
    registry.register_helper("format_date", Box::new(format_date));

    for path in TemplateAssets::iter() {
        let Some(file) = TemplateAssets::get(&path) else {
            continue;
        };
        let source = std::str::from_utf8(&file.data)
            .map_err(|e| CourseDeskError::template(format!("{path} is not valid UTF-8: {e}")))?;
        let name = path.trim_end_matches(TEMPLATE_SUFFIX);

        if let Some(partial) = name.strip_prefix(PARTIAL_PREFIX) {
            registry
                .register_partial(partial, source)
                .map_err(|e| CourseDeskError::template(format!("Partial {partial}: {e}")))?;
        } else {
            registry
                .register_template_string(name, source)
                .map_err(|e| CourseDeskError::template(format!("Template {name}: {e}")))?;
        }
        debug!("Registered template {}", name);
    }

    Ok(registry)
}

/// 获取全局模板注册表，首次调用时完成注册
pub fn registry() -> Result<&'static Handlebars<'static>> {
    TEMPLATES.get_or_try_init(build_registry)
}

/// 启动时预先注册模板，尽早暴露模板错误
pub fn init() -> Result<()> {
    let registry = registry()?;
    debug!("{} templates registered", registry.get_templates().len());
    Ok(())
}

fn current_user_context(user: &User) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "role": user.highest_role(),
        "is_admin": user.has_role(RoleName::Admin),
        "is_teacher": user.has_role(RoleName::Teacher),
        "is_student": user.has_role(RoleName::Student),
    })
}

/// 组装页面上下文：页面数据 + 当前用户 + 提示消息
fn page_context(req: &HttpRequest, data: Value) -> Value {
    let mut ctx = match data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };

    let config = AppConfig::get();
    ctx.insert(
        "app".to_string(),
        json!({
            "name": config.app.system_name,
            "allow_self_registration": config.app.allow_self_registration,
        }),
    );

    if let Some(user) = req.extensions().get::<User>() {
        ctx.insert("current_user".to_string(), current_user_context(user));
    }

    let flashes = Session::extract(req)
        .map(|session| session.take_flashes())
        .unwrap_or_default();
    ctx.insert("flashes".to_string(), json!(flashes));

    Value::Object(ctx)
}

/// 渲染页面（200）
pub fn render(req: &HttpRequest, template: &str, data: Value) -> HttpResponse {
    render_with_status(req, StatusCode::OK, template, data)
}

/// 以指定状态码渲染页面
pub fn render_with_status(
    req: &HttpRequest,
    status: StatusCode,
    template: &str,
    data: Value,
) -> HttpResponse {
    let ctx = page_context(req, data);

    let rendered = registry().and_then(|registry| {
        registry
            .render(template, &ctx)
            .map_err(CourseDeskError::from)
    });

    match rendered {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            error!("Failed to render template {}: {}", template, e);
            html_500()
        }
    }
}

/// 302 重定向
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}

/// 无法渲染模板时的兜底 500 页面
pub fn html_500() -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type("text/html; charset=utf-8")
        .body(HTML_500)
}

/// 渲染错误页面
pub fn error_page(req: &HttpRequest, status: StatusCode, message: &str) -> HttpResponse {
    render_with_status(
        req,
        status,
        "error",
        json!({
            "status": status.as_u16(),
            "reason": status.canonical_reason().unwrap_or("Error"),
            "message": message,
        }),
    )
}

/// 将业务错误映射为错误页面，基础设施错误记录日志并返回 500
pub fn failure(req: &HttpRequest, err: CourseDeskError) -> HttpResponse {
    let status = match &err {
        CourseDeskError::NotFound(_) => StatusCode::NOT_FOUND,
        CourseDeskError::Validation(_) => StatusCode::BAD_REQUEST,
        CourseDeskError::Authorization(_) => StatusCode::FORBIDDEN,
        CourseDeskError::Conflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("{} {} failed [{}]: {}", req.method(), req.path(), err.code(), err);
        return error_page(req, status, "An internal error occurred.");
    }

    warn!("{} {} rejected: {}", req.method(), req.path(), err);
    error_page(req, status, err.message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_register() {
        let registry = build_registry().expect("templates should compile");
        for name in [
            "login",
            "register",
            "dashboard",
            "courses",
            "course_detail",
            "create_course",
            "manage_courses",
            "enroll",
            "manage_students",
            "grade",
            "error",
        ] {
            assert!(registry.has_template(name), "missing template {name}");
        }
    }

    #[test]
    fn test_format_grade_helper() {
        let registry = build_registry().expect("templates should compile");
        let out = registry
            .render_template("{{format_grade g}}", &json!({ "g": 85.0 }))
            .expect("render");
        assert_eq!(out, "85");
        let out = registry
            .render_template("{{format_grade g}}", &json!({ "g": 72.5 }))
            .expect("render");
        assert_eq!(out, "72.5");
        for (g, expected) in [(85.001, "85"), (85.004, "85"), (99.999, "100"), (0.0, "0")] {
            let out = registry
                .render_template("{{format_grade g}}", &json!({ "g": g }))
                .expect("render");
            assert_eq!(out, expected, "grade {g}");
        }
    }

    #[test]
    fn test_format_date_helper() {
        let registry = build_registry().expect("templates should compile");
        let out = registry
            .render_template(
                "{{format_date t}}",
                &json!({ "t": "2025-03-01T08:30:00Z" }),
            )
            .expect("render");
        assert_eq!(out, "2025-03-01");
    }
}
