use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde_json::json;
use tracing::info;

use super::{CourseService, validate_course_name};
use crate::middlewares::{RequireLogin, Session};
use crate::models::FlashLevel;
use crate::models::courses::requests::UpdateCourseForm;
use crate::views;

const MANAGE_COURSES_PATH: &str = "/manage_courses";

pub async fn manage_courses_page(
    service: &CourseService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let courses = match storage.list_courses(None).await {
        Ok(courses) => courses,
        Err(e) => return Ok(views::failure(request, e)),
    };

    Ok(views::render(
        request,
        "manage_courses",
        json!({ "courses": courses }),
    ))
}

pub async fn update_course(
    service: &CourseService,
    request: &HttpRequest,
    session: &Session,
    form: UpdateCourseForm,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let uid = RequireLogin::extract_user_id(request).unwrap_or_default();

    let Ok(course_id) = form.course_id.trim().parse::<i64>() else {
        session.flash(FlashLevel::Danger, "Course not found.");
        return Ok(views::redirect(MANAGE_COURSES_PATH));
    };

    let name = match validate_course_name(&form.name) {
        Ok(name) => name,
        Err(message) => {
            session.flash(FlashLevel::Danger, message);
            return Ok(views::redirect(MANAGE_COURSES_PATH));
        }
    };

    // 只修改名称
    match storage.update_course_name(course_id, name).await {
        Ok(Some(course)) => {
            info!("Course {} renamed to {} by {}", course.id, course.name, uid);
            session.flash(
                FlashLevel::Success,
                format!("Course renamed to \"{}\".", course.name),
            );
            Ok(views::redirect(MANAGE_COURSES_PATH))
        }
        Ok(None) => {
            session.flash(FlashLevel::Danger, "Course not found.");
            Ok(views::redirect(MANAGE_COURSES_PATH))
        }
        Err(e) => Ok(views::failure(request, e)),
    }
}
