/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool, authorizer: Authorizer (起動時に一度だけ構築)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use sqlx::PgPool;

use crate::services::auth::Authorizer;

// webhook key を持つので Debug は derive しない
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub authorizer: Arc<Authorizer>,
    pub clerk_webhook_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(db: PgPool, authorizer: Arc<Authorizer>, clerk_webhook_key: Option<String>) -> Self {
        Self {
            db,
            authorizer,
            clerk_webhook_key: clerk_webhook_key.map(Arc::from),
        }
    }
}
