use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use super::{CourseService, validate_course_name};
use crate::errors::{CourseDeskError, Result};
use crate::middlewares::{RequireLogin, Session};
use crate::models::FlashLevel;
use crate::models::courses::requests::CreateCourseForm;
use crate::models::users::{entities::RoleName, responses::UserOption};
use crate::storage::Storage;
use crate::views;

/// 表单回显
#[derive(Debug, Default, Serialize)]
struct CreateCourseFormView {
    name: String,
    teacher_id: Option<i64>,
}

async fn teacher_options(storage: &Arc<dyn Storage>) -> Result<Vec<UserOption>> {
    let teachers = storage.list_users_by_role(RoleName::Teacher).await?;
    Ok(teachers.iter().map(UserOption::from).collect())
}

pub async fn create_course_page(
    service: &CourseService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let teachers = match teacher_options(&storage).await {
        Ok(teachers) => teachers,
        Err(e) => return Ok(views::failure(request, e)),
    };

    Ok(views::render(
        request,
        "create_course",
        json!({
            "teachers": teachers,
            "form": CreateCourseFormView::default(),
        }),
    ))
}

/// 校验授课教师：必须是已存在且持有 Teacher 角色的用户
async fn validate_teacher(storage: &Arc<dyn Storage>, teacher_id: &str) -> Result<i64> {
    let teacher_id: i64 = teacher_id
        .trim()
        .parse()
        .map_err(|_| CourseDeskError::validation("Please choose a teacher."))?;

    match storage.get_user_by_id(teacher_id).await? {
        Some(user) if user.has_role(RoleName::Teacher) => Ok(teacher_id),
        Some(_) => Err(CourseDeskError::validation(
            "The selected user is not a teacher.",
        )),
        None => Err(CourseDeskError::validation("The selected teacher does not exist.")),
    }
}

pub async fn create_course(
    service: &CourseService,
    request: &HttpRequest,
    session: &Session,
    form: CreateCourseForm,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let uid = RequireLogin::extract_user_id(request).unwrap_or_default();

    let validated = match validate_course_name(&form.name) {
        Ok(name) => validate_teacher(&storage, &form.teacher_id)
            .await
            .map(|teacher_id| (name, teacher_id)),
        Err(message) => Err(CourseDeskError::validation(message)),
    };

    let (name, teacher_id) = match validated {
        Ok(valid) => valid,
        Err(CourseDeskError::Validation(message)) => {
            session.flash(FlashLevel::Danger, message);
            let teachers = match teacher_options(&storage).await {
                Ok(teachers) => teachers,
                Err(e) => return Ok(views::failure(request, e)),
            };
            return Ok(views::render_with_status(
                request,
                StatusCode::BAD_REQUEST,
                "create_course",
                json!({
                    "teachers": teachers,
                    "form": CreateCourseFormView {
                        name: form.name.trim().to_string(),
                        teacher_id: form.teacher_id.trim().parse().ok(),
                    },
                }),
            ));
        }
        Err(e) => return Ok(views::failure(request, e)),
    };

    // 创建课程
    match storage.create_course(name, teacher_id).await {
        Ok(course) => {
            info!(
                "Course {} ({}) created for teacher {} by {}",
                course.name, course.id, teacher_id, uid
            );
            session.flash(
                FlashLevel::Success,
                format!("Course \"{}\" created.", course.name),
            );
            Ok(views::redirect(&format!("/courses/{}", course.id)))
        }
        Err(e) => Ok(views::failure(request, e)),
    }
}
