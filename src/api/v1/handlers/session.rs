/*
 * Responsibility
 * - GET /session: middleware が解決した principal をそのまま返す
 */
use axum::Json;

use crate::api::v1::{dto::users::SessionResponse, extractors::CurrentPrincipal};

pub async fn current_session(CurrentPrincipal(principal): CurrentPrincipal) -> Json<SessionResponse> {
    Json(SessionResponse::from(principal))
}
