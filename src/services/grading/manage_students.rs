use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use serde_json::json;

use super::{GradingService, apply::apply_grade};
use crate::errors::CourseDeskError;
use crate::middlewares::{RequireLogin, Session};
use crate::models::FlashLevel;
use crate::models::enrollments::requests::{EnrollmentListQuery, GradeForm};
use crate::views;

const MANAGE_STUDENTS_PATH: &str = "/manage_students";

pub async fn manage_students_page(
    service: &GradingService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireLogin::extract_user_id(request) else {
        return Ok(views::redirect("/login"));
    };

    let enrollments = match storage
        .list_enrollments(EnrollmentListQuery {
            teacher_id: Some(uid),
            ..Default::default()
        })
        .await
    {
        Ok(rows) => rows,
        Err(e) => return Ok(views::failure(request, e)),
    };

    Ok(views::render(
        request,
        "manage_students",
        json!({ "enrollments": enrollments }),
    ))
}

pub async fn submit_grade(
    service: &GradingService,
    request: &HttpRequest,
    session: &Session,
    form: GradeForm,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireLogin::extract_user_id(request) else {
        return Ok(views::redirect("/login"));
    };

    let Some(enrollment_id) = form.enrollment_id else {
        return Ok(views::error_page(
            request,
            StatusCode::NOT_FOUND,
            "Enrollment not found.",
        ));
    };

    match apply_grade(storage.as_ref(), uid, enrollment_id, &form.grade, form.remark).await {
        Ok(_) => {
            session.flash(FlashLevel::Success, "Grade saved.");
            Ok(views::redirect(MANAGE_STUDENTS_PATH))
        }
        Err(CourseDeskError::Authorization(message) | CourseDeskError::Validation(message)) => {
            session.flash(FlashLevel::Danger, message);
            Ok(views::redirect(MANAGE_STUDENTS_PATH))
        }
        Err(e) => Ok(views::failure(request, e)),
    }
}
