use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, Session};
use crate::models::users::entities::RoleName;
use crate::services::EnrollmentService;

static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);

pub async fn enroll_page(
    req: HttpRequest,
    session: Session,
    course_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .enroll_page(&req, &session, course_id.into_inner())
        .await
}

pub async fn enroll(
    req: HttpRequest,
    session: Session,
    course_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .enroll(&req, &session, course_id.into_inner())
        .await
}

pub fn configure_enrollment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/enroll/{course_id}")
            .wrap(middlewares::RequireRole::new(RoleName::Student))
            .wrap(middlewares::RequireLogin)
            .route(web::get().to(enroll_page))
            .route(web::post().to(enroll)),
    );
}
