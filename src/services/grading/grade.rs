use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use serde_json::json;

use super::{
    GradingService,
    apply::{apply_grade, load_owned},
};
use crate::errors::CourseDeskError;
use crate::middlewares::{RequireLogin, Session};
use crate::models::FlashLevel;
use crate::models::enrollments::requests::GradeForm;
use crate::views;

pub async fn grade_page(
    service: &GradingService,
    request: &HttpRequest,
    session: &Session,
    enrollment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireLogin::extract_user_id(request) else {
        return Ok(views::redirect("/login"));
    };

    match load_owned(storage.as_ref(), uid, enrollment_id).await {
        Ok(enrollment) => Ok(views::render(
            request,
            "grade",
            json!({ "enrollment": enrollment }),
        )),
        Err(CourseDeskError::Authorization(message)) => {
            session.flash(FlashLevel::Danger, message);
            Ok(views::redirect("/manage_students"))
        }
        Err(e) => Ok(views::failure(request, e)),
    }
}

pub async fn submit_grade(
    service: &GradingService,
    request: &HttpRequest,
    session: &Session,
    enrollment_id: i64,
    form: GradeForm,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(uid) = RequireLogin::extract_user_id(request) else {
        return Ok(views::redirect("/login"));
    };

    match apply_grade(
        storage.as_ref(),
        uid,
        enrollment_id,
        &form.grade,
        form.remark.clone(),
    )
    .await
    {
        Ok(enrollment) => {
            session.flash(FlashLevel::Success, "Grade saved.");
            Ok(views::redirect(&format!(
                "/courses/{}",
                enrollment.course_id
            )))
        }
        Err(CourseDeskError::Authorization(message)) => {
            session.flash(FlashLevel::Danger, message);
            Ok(views::redirect("/manage_students"))
        }
        Err(CourseDeskError::Validation(message)) => {
            session.flash(FlashLevel::Danger, message);
            // 重新渲染表单并回显输入
            let enrollment = match load_owned(storage.as_ref(), uid, enrollment_id).await {
                Ok(enrollment) => enrollment,
                Err(e) => return Ok(views::failure(request, e)),
            };
            Ok(views::render_with_status(
                request,
                StatusCode::BAD_REQUEST,
                "grade",
                json!({
                    "enrollment": enrollment,
                    "form": {
                        "grade": form.grade,
                        "remark": form.remark,
                    },
                }),
            ))
        }
        Err(e) => Ok(views::failure(request, e)),
    }
}
