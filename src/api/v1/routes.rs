/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 公開ルート (health / authorize / webhook / 公開プロフィール) と principal 必須ルートを分ける
 * - principal 必須ルートにだけ middleware::auth::principal を掛ける
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware;
use crate::state::AppState;

use crate::api::v1::handlers::{
    authorize::authorize, health::health, session::current_session,
    users::{get_me, get_user},
    webhooks::clerk_user_webhook,
};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/authorize", post(authorize))
        .route("/users/{user_id}", get(get_user))
        .route("/webhooks/clerk", post(clerk_user_webhook));

    let protected = Router::new()
        .route("/session", get(current_session))
        .route("/users/me", get(get_me));
    let protected = middleware::auth::principal::apply(protected, state);

    public.merge(protected)
}
