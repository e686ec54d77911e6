pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::Session;
use crate::models::courses::requests::{CreateCourseForm, UpdateCourseForm};
use crate::storage::Storage;

/// 课程名称最大长度，与数据库列宽一致
pub(crate) const COURSE_NAME_MAX_LEN: usize = 100;

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 获取课程列表
    pub async fn list_courses(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_courses(self, request).await
    }

    // 根据课程 ID 获取课程详情
    pub async fn get_course(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_course(self, request, course_id).await
    }

    // 创建课程页面
    pub async fn create_course_page(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        create::create_course_page(self, request).await
    }

    // 创建课程
    pub async fn create_course(
        &self,
        request: &HttpRequest,
        session: &Session,
        form: CreateCourseForm,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, request, session, form).await
    }

    // 课程管理页面
    pub async fn manage_courses_page(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::manage_courses_page(self, request).await
    }

    // 修改课程名称
    pub async fn update_course(
        &self,
        request: &HttpRequest,
        session: &Session,
        form: UpdateCourseForm,
    ) -> ActixResult<HttpResponse> {
        manage::update_course(self, request, session, form).await
    }

    // 删除课程
    pub async fn delete_course(
        &self,
        request: &HttpRequest,
        session: &Session,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_course(self, request, session, course_id).await
    }
}

/// 校验课程名称，返回去除首尾空白后的名称
pub(crate) fn validate_course_name(name: &str) -> Result<&str, &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Course name is required.");
    }
    if name.chars().count() > COURSE_NAME_MAX_LEN {
        return Err("Course name must be at most 100 characters.");
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_course_name() {
        assert_eq!(validate_course_name("  Linear Algebra "), Ok("Linear Algebra"));
        assert_eq!(validate_course_name("   "), Err("Course name is required."));
        assert!(validate_course_name(&"x".repeat(COURSE_NAME_MAX_LEN)).is_ok());
        assert!(validate_course_name(&"x".repeat(COURSE_NAME_MAX_LEN + 1)).is_err());
    }
}
