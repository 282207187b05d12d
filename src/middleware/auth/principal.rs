//! Credential check → Principal を extensions に入れる
//!
//! gateway の authorizer と同じ `Authorizer::authorize` を通す。
//! resource は `"<METHOD> <path>"` で、判定はこのリクエストにだけ有効。

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::AuthorizerRequest;
use crate::state::AppState;

/// 保護対象の Router に認可を掛ける。
///
/// 例：
/// ```ignore
/// let protected = middleware::auth::principal::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // route_layer: マッチしたルートにだけ掛ける (未知の path は 404 のまま)
    router.route_layer(middleware::from_fn_with_state(state, principal_middleware))
}

async fn principal_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // nest 後の path ではなく、クライアントが叩いた path で scope する
    let resource = format!("{} {}", req.method(), original_uri.path());

    let decision = state
        .authorizer
        .authorize(&AuthorizerRequest::new(req.headers(), &resource))?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(decision.principal);

    Ok(next.run(req).await)
}
