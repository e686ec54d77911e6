pub mod enroll;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::Session;
use crate::storage::Storage;

pub struct EnrollmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl EnrollmentService {
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

    // 选课确认页
    pub async fn enroll_page(
        &self,
        request: &HttpRequest,
        session: &Session,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        enroll::enroll_page(self, request, session, course_id).await
    }

    // 选课
    pub async fn enroll(
        &self,
        request: &HttpRequest,
        session: &Session,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        enroll::enroll(self, request, session, course_id).await
    }
}
