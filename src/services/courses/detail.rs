use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use serde_json::json;

use super::CourseService;
use crate::middlewares::RequireLogin;
use crate::models::courses::responses::CourseDetail;
use crate::models::users::responses::UserOption;
use crate::services::actor::Actor;
use crate::views;

pub async fn get_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 查询课程信息
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

    let Some(actor) = RequireLogin::extract_user(request).and_then(Actor::from_user) else {
        let detail = CourseDetail {
            course,
            enrollments: Vec::new(),
            teacher: None,
            can_grade: false,
        };
        return Ok(views::render(request, "course_detail", json!(detail)));
    };
    let scope = actor.scope();
    let user = actor.user();

    let enrollments = match scope
        .course_enrollments(storage.as_ref(), user, &course)
        .await
    {
        Ok(rows) => rows,
        Err(e) => return Ok(views::failure(request, e)),
    };

    // 管理员额外获取授课教师信息
    let teacher = if scope.sees_teacher_info() {
        match storage.get_user_by_id(course.teacher_id).await {
            Ok(teacher) => teacher.as_ref().map(UserOption::from),
            Err(e) => return Ok(views::failure(request, e)),
        }
    } else {
        None
    };

    let is_student = matches!(actor, Actor::Student(_));
    let detail = CourseDetail {
        can_grade: scope.can_grade(user, &course),
        course,
        enrollments,
        teacher,
    };

    Ok(views::render(
        request,
        "course_detail",
        json!({
            "course": detail.course,
            "enrollments": detail.enrollments,
            "teacher": detail.teacher,
            "can_grade": detail.can_grade,
            "is_student": is_student,
            "enrolled": is_student && !detail.enrollments.is_empty(),
        }),
    ))
}
