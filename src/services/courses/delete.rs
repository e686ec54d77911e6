use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::CourseService;
use crate::middlewares::{RequireLogin, Session};
use crate::models::FlashLevel;
use crate::views;

pub async fn delete_course(
    service: &CourseService,
    request: &HttpRequest,
    session: &Session,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let uid = RequireLogin::extract_user_id(request).unwrap_or_default();

    // 选课记录在同一事务中删除
    match storage.delete_course(course_id).await {
        Ok(true) => {
            info!("Course {} deleted by {}", course_id, uid);
            session.flash(FlashLevel::Success, "Course deleted.");
            Ok(views::redirect("/manage_courses"))
        }
        Ok(false) => Ok(views::error_page(
            request,
            StatusCode::NOT_FOUND,
            "Course not found.",
        )),
        Err(e) => Ok(views::failure(request, e)),
    }
}
