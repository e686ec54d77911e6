use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, Session};
use crate::models::courses::requests::{CreateCourseForm, UpdateCourseForm};
use crate::models::users::entities::RoleName;
use crate::services::CourseService;

// 懒加载的全局 COURSE_SERVICE 实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

// HTTP处理程序
pub async fn list_courses(req: HttpRequest) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(&req).await
}

pub async fn get_course(req: HttpRequest, course_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(&req, course_id.into_inner()).await
}

pub async fn create_course_page(req: HttpRequest) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.create_course_page(&req).await
}

pub async fn create_course(
    req: HttpRequest,
    session: Session,
    form: web::Form<CreateCourseForm>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .create_course(&req, &session, form.into_inner())
        .await
}

pub async fn manage_courses_page(req: HttpRequest) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.manage_courses_page(&req).await
}

pub async fn update_course(
    req: HttpRequest,
    session: Session,
    form: web::Form<UpdateCourseForm>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_course(&req, &session, form.into_inner())
        .await
}

pub async fn delete_course(
    req: HttpRequest,
    session: Session,
    course_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .delete_course(&req, &session, course_id.into_inner())
        .await
}

// 配置路由
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/courses")
            .wrap(middlewares::RequireLogin)
            .route(web::get().to(list_courses)),
    )
    .service(
        web::resource("/courses/{course_id}")
            .wrap(middlewares::RequireLogin)
            .route(web::get().to(get_course)),
    )
    // 以下仅管理员可用
    .service(
        web::resource("/create_course")
            .wrap(middlewares::RequireRole::new(RoleName::Admin))
            .wrap(middlewares::RequireLogin)
            .route(web::get().to(create_course_page))
            .route(web::post().to(create_course)),
    )
    .service(
        web::resource("/manage_courses")
            .wrap(middlewares::RequireRole::new(RoleName::Admin))
            .wrap(middlewares::RequireLogin)
            .route(web::get().to(manage_courses_page))
            .route(web::post().to(update_course)),
    )
    .service(
        web::resource("/delete_course/{course_id}")
            .wrap(middlewares::RequireRole::new(RoleName::Admin))
            .wrap(middlewares::RequireLogin)
            .route(web::post().to(delete_course)),
    );
}
