use actix_web::{
    HttpRequest,
    error::{InternalError, PathError, QueryPayloadError, UrlencodedError},
    http::StatusCode,
};
use tracing::debug;

use crate::views;

/// 表单解析错误处理器
pub fn form_error_handler(err: UrlencodedError, req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid form data: {err}");
    debug!("{} {}: {}", req.method(), req.path(), message);
    let response = views::error_page(req, StatusCode::BAD_REQUEST, &message);
    InternalError::from_response(err, response).into()
}

/// 查询参数错误处理器
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid query parameters: {err}");
    debug!("{} {}: {}", req.method(), req.path(), message);
    let response = views::error_page(req, StatusCode::BAD_REQUEST, &message);
    InternalError::from_response(err, response).into()
}

/// 路径参数错误处理器，无法解析的 ID 视为不存在
pub fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    debug!("{} {}: invalid path parameter: {}", req.method(), req.path(), err);
    let response = views::error_page(req, StatusCode::NOT_FOUND, "Page not found.");
    InternalError::from_response(err, response).into()
}
