use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde_json::json;

use super::DashboardService;
use crate::middlewares::RequireLogin;
use crate::models::dashboard::DashboardCounts;
use crate::services::actor::Actor;
use crate::views;

pub async fn dashboard(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireLogin::extract_user(request) else {
        return Ok(views::redirect("/login"));
    };

    // 无角色用户不显示统计
    let (role, counts) = match Actor::from_user(user) {
        Some(actor) => {
            match actor
                .scope()
                .dashboard_counts(storage.as_ref(), actor.user())
                .await
            {
                Ok(counts) => (Some(actor.role()), counts),
                Err(e) => return Ok(views::failure(request, e)),
            }
        }
        None => (None, DashboardCounts::default()),
    };

    Ok(views::render(
        request,
        "dashboard",
        json!({
            "role": role,
            "counts": counts,
        }),
    ))
}
