pub mod apply;
pub mod grade;
pub mod manage_students;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::Session;
use crate::models::enrollments::requests::GradeForm;
use crate::storage::Storage;

pub use apply::GRADE_DENIED_MESSAGE;

pub struct GradingService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradingService {
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

    // 教师所授课程的全部选课记录
    pub async fn manage_students_page(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage_students::manage_students_page(self, request).await
    }

    // 在学生管理页提交成绩
    pub async fn submit_from_manage(
        &self,
        request: &HttpRequest,
        session: &Session,
        form: GradeForm,
    ) -> ActixResult<HttpResponse> {
        manage_students::submit_grade(self, request, session, form).await
    }

    // 单条评分页
    pub async fn grade_page(
        &self,
        request: &HttpRequest,
        session: &Session,
        enrollment_id: i64,
    ) -> ActixResult<HttpResponse> {
        grade::grade_page(self, request, session, enrollment_id).await
    }

    // 提交单条成绩
    pub async fn submit_grade(
        &self,
        request: &HttpRequest,
        session: &Session,
        enrollment_id: i64,
        form: GradeForm,
    ) -> ActixResult<HttpResponse> {
        grade::submit_grade(self, request, session, enrollment_id, form).await
    }
}
