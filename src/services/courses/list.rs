use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde_json::json;

use super::CourseService;
use crate::middlewares::RequireLogin;
use crate::models::courses::responses::CourseListItem;
use crate::models::enrollments::requests::EnrollmentListQuery;
use crate::services::actor::Actor;
use crate::views;

pub async fn list_courses(
    service: &CourseService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(actor) = RequireLogin::extract_user(request).and_then(Actor::from_user) else {
        return Ok(views::render(request, "courses", json!({ "courses": [] })));
    };
    let user = actor.user();

    let courses = match actor.scope().visible_courses(storage.as_ref(), user).await {
        Ok(courses) => courses,
        Err(e) => return Ok(views::failure(request, e)),
    };

    // 学生额外标记已选课程
    let enrolled: HashSet<i64> = if matches!(actor, Actor::Student(_)) {
        match storage
            .list_enrollments(EnrollmentListQuery {
                student_id: Some(user.id),
                ..Default::default()
            })
            .await
        {
            Ok(rows) => rows.into_iter().map(|r| r.enrollment.course_id).collect(),
            Err(e) => return Ok(views::failure(request, e)),
        }
    } else {
        HashSet::new()
    };

    let items: Vec<CourseListItem> = courses
        .into_iter()
        .map(|course| CourseListItem {
            enrolled: enrolled.contains(&course.id),
            course,
        })
        .collect();

    Ok(views::render(
        request,
        "courses",
        json!({
            "courses": items,
            "is_student": matches!(actor, Actor::Student(_)),
            "is_admin": matches!(actor, Actor::Admin(_)),
        }),
    ))
}
