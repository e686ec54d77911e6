use actix_web::{HttpResponse, Result as ActixResult};
use tracing::info;

use crate::middlewares::Session;
use crate::models::FlashLevel;
use crate::views;

/// 处理用户登出
/// 清空会话（删除缓存条目并使 Cookie 过期），提示消息写入新会话
pub async fn handle_logout(session: &Session) -> ActixResult<HttpResponse> {
    if let Some(user_id) = session.user_id() {
        info!("User {} logged out", user_id);
    }
    session.clear();
    session.flash(FlashLevel::Info, "You have been logged out.");

    Ok(views::redirect("/login"))
}
