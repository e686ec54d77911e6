use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use serde_json::json;
use tracing::info;

use super::EnrollmentService;
use crate::errors::CourseDeskError;
use crate::middlewares::{RequireLogin, Session};
use crate::models::FlashLevel;
use crate::views;

fn already_enrolled_message(course_name: &str) -> String {
    format!("You are already enrolled in {course_name}.")
}

pub async fn enroll_page(
    service: &EnrollmentService,
    request: &HttpRequest,
    session: &Session,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireLogin::extract_user_id(request) else {
        return Ok(views::redirect("/login"));
    };

    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Ok(views::error_page(
                request,
                StatusCode::NOT_FOUND,
                "Course not found.",
            ));
        }
        Err(e) => return Ok(views::failure(request, e)),
    };

    match storage.get_enrollment(uid, course_id).await {
        Ok(Some(_)) => {
            session.flash(FlashLevel::Info, already_enrolled_message(&course.name));
            Ok(views::redirect(&format!("/courses/{course_id}")))
        }
        Ok(None) => Ok(views::render(request, "enroll", json!({ "course": course }))),
        Err(e) => Ok(views::failure(request, e)),
    }
}

pub async fn enroll(
    service: &EnrollmentService,
    request: &HttpRequest,
    session: &Session,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireLogin::extract_user_id(request) else {
        return Ok(views::redirect("/login"));
    };

    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Ok(views::error_page(
                request,
                StatusCode::NOT_FOUND,
                "Course not found.",
            ));
        }
        Err(e) => return Ok(views::failure(request, e)),
    };

    // 唯一索引保证并发提交只会成功一次
    match storage.create_enrollment(uid, course_id).await {
        Ok(enrollment) => {
            info!(
                "Student {} enrolled in course {} (enrollment {})",
                uid, course_id, enrollment.id
            );
            session.flash(
                FlashLevel::Success,
                format!("You have enrolled in {}.", course.name),
            );
            Ok(views::redirect(&format!("/courses/{course_id}")))
        }
        Err(CourseDeskError::Conflict(_)) => {
            session.flash(FlashLevel::Warning, already_enrolled_message(&course.name));
            Ok(views::redirect(&format!("/courses/{course_id}")))
        }
        Err(e) => Ok(views::failure(request, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_enrolled_message() {
        assert_eq!(
            already_enrolled_message("Physics"),
            "You are already enrolled in Physics."
        );
    }
}
