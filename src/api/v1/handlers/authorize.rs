/*
 * Responsibility
 * - POST /authorize: gateway の authorizer イベントを評価して policy document を返す
 * - 失敗は NotSignedIn / Unauthorized のどちらかだけ (詳細はログのみ)
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::dto::authorizer_event::AuthorizerEvent,
    error::AppError,
    services::auth::{AuthorizerRequest, policy::AuthorizerResponse},
    state::AppState,
};

pub async fn authorize(
    State(state): State<AppState>,
    Json(event): Json<AuthorizerEvent>,
) -> Result<Json<AuthorizerResponse>, AppError> {
    let headers = event.header_map();
    let request = AuthorizerRequest::new(&headers, event.resource())
        .with_authorization_token(event.authorization_token.as_deref());

    let decision = state.authorizer.authorize(&request)?;

    Ok(Json(decision.to_response()))
}
