use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::DashboardService;

static DASHBOARD_SERVICE: Lazy<DashboardService> = Lazy::new(DashboardService::new_lazy);

pub async fn index(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.index(&req).await
}

pub fn configure_dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .wrap(middlewares::RequireLogin)
            .route(web::get().to(index)),
    );
}
