use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, Session};
use crate::models::enrollments::requests::GradeForm;
use crate::models::users::entities::RoleName;
use crate::services::GradingService;

static GRADING_SERVICE: Lazy<GradingService> = Lazy::new(GradingService::new_lazy);

pub async fn manage_students_page(req: HttpRequest) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.manage_students_page(&req).await
}

pub async fn submit_from_manage(
    req: HttpRequest,
    session: Session,
    form: web::Form<GradeForm>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .submit_from_manage(&req, &session, form.into_inner())
        .await
}

pub async fn grade_page(
    req: HttpRequest,
    session: Session,
    enrollment_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .grade_page(&req, &session, enrollment_id.into_inner())
        .await
}

pub async fn submit_grade(
    req: HttpRequest,
    session: Session,
    enrollment_id: web::Path<i64>,
    form: web::Form<GradeForm>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .submit_grade(&req, &session, enrollment_id.into_inner(), form.into_inner())
        .await
}

// 评分仅限授课教师，归属校验在服务层完成
pub fn configure_grading_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/manage_students")
            .wrap(middlewares::RequireRole::new(RoleName::Teacher))
            .wrap(middlewares::RequireLogin)
            .route(web::get().to(manage_students_page))
            .route(web::post().to(submit_from_manage)),
    )
    .service(
        web::resource("/grade/{enrollment_id}")
            .wrap(middlewares::RequireRole::new(RoleName::Teacher))
            .wrap(middlewares::RequireLogin)
            .route(web::get().to(grade_page))
            .route(web::post().to(submit_grade)),
    );
}
