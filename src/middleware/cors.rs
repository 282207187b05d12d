//! CORS policy for browser clients.
//!
//! Policy:
//! - Bearer mode: tokens travel in a header, so no credentials are allowed.
//!   Development is permissive (`*`), production uses the configured allowlist.
//! - Session mode: the session lives in a cookie, so credentials are allowed and the
//!   origin must be explicit. Development mirrors the caller's origin, production uses
//!   the allowlist. An empty allowlist allows no origin at all.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::services::auth::AuthorizerMode;

fn allowlist(config: &Config) -> AllowOrigin {
    let allowed: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    AllowOrigin::predicate(move |origin: &HeaderValue, _req| allowed.iter().any(|v| v == origin))
}

pub fn apply(router: Router, config: &Config) -> Router {
    let with_cookies = config.auth_mode == AuthorizerMode::Session;

    let cors = match (config.app_env.is_production(), with_cookies) {
        (true, _) => CorsLayer::new().allow_origin(allowlist(config)),
        (false, true) => CorsLayer::new().allow_origin(AllowOrigin::mirror_request()),
        (false, false) => CorsLayer::new().allow_origin(Any),
    }
    // wildcard origins never reach here with credentials
    .allow_credentials(with_cookies)
    .allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static("x-request-id"),
    ])
    .max_age(Duration::from_secs(60 * 10));

    router.layer(cors)
}
