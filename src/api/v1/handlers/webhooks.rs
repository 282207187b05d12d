/*
 * Responsibility
 * - POST /webhooks/clerk: identity provider のユーザー変更を users テーブルへ同期
 * - 共有シークレット (X-Clerk-Webhook-Key, 旧名 X-Clerk-Webhook-Secret) で送信元を確認
 */
use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::{
    api::v1::dto::clerk_webhook::{
        ClerkDeletedUser, ClerkUser, ClerkWebhookEvent, USER_CREATED, USER_DELETED, USER_UPDATED,
        WebhookResponse,
    },
    error::AppError,
    repos::user_repo::{self, UserPatch},
    state::AppState,
};

pub const WEBHOOK_KEY_HEADER: &str = "x-clerk-webhook-key";
pub const LEGACY_WEBHOOK_KEY_HEADER: &str = "x-clerk-webhook-secret";

// Compares fixed-length digests so the time taken does not depend on where the inputs differ.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn verify_webhook_key(headers: &HeaderMap, expected: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = expected else {
        tracing::warn!("webhook received but CLERK_WEBHOOK_KEY is not configured");
        return Err(AppError::Unauthorized);
    };

    let provided = headers
        .get(WEBHOOK_KEY_HEADER)
        .or_else(|| headers.get(LEGACY_WEBHOOK_KEY_HEADER))
        .and_then(|v| v.to_str().ok());

    if !provided.is_some_and(|p| keys_match(p, expected)) {
        tracing::warn!("webhook key mismatch");
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

fn payload<T: DeserializeOwned>(data: Value) -> Result<T, AppError> {
    serde_json::from_value(data)
        .map_err(|e| AppError::bad_request("INVALID_WEBHOOK_PAYLOAD", e.to_string()))
}

pub async fn clerk_user_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    // sender is checked before the body is even parsed
    verify_webhook_key(&headers, state.clerk_webhook_key.as_deref())?;

    let event: ClerkWebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request("INVALID_WEBHOOK_PAYLOAD", e.to_string()))?;

    let applied = match event.event_type.as_str() {
        USER_CREATED => {
            let user = payload::<ClerkUser>(event.data)?
                .into_new_user()
                .map_err(|m| AppError::bad_request("INVALID_WEBHOOK_PAYLOAD", m))?;
            user_repo::insert(&state.db, &user).await?
        }
        USER_UPDATED => {
            let user = payload::<ClerkUser>(event.data)?
                .into_new_user()
                .map_err(|m| AppError::bad_request("INVALID_WEBHOOK_PAYLOAD", m))?;
            let id = user.id.clone();
            user_repo::apply_patch(&state.db, &id, &UserPatch::from(user)).await?
        }
        USER_DELETED => {
            let user = payload::<ClerkDeletedUser>(event.data)?;
            user_repo::delete(&state.db, &user.id).await?
        }
        other => {
            tracing::debug!(event = %other, "ignoring webhook event");
            false
        }
    };

    tracing::info!(event = %event.event_type, applied, "user webhook processed");

    Ok(Json(WebhookResponse {
        event: event.event_type,
        applied,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    fn with_key(value: &'static str) -> HeaderMap {
        with_named_key(WEBHOOK_KEY_HEADER, value)
    }

    fn with_named_key(name: &'static str, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
        headers
    }

    #[test]
    fn webhook_key_must_match() {
        let headers = with_key("secret");

        assert!(verify_webhook_key(&headers, Some("secret")).is_ok());
        assert!(matches!(
            verify_webhook_key(&headers, Some("other")),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            verify_webhook_key(&HeaderMap::new(), Some("secret")),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn unconfigured_key_rejects_everything() {
        let headers = with_key("");
        assert!(matches!(
            verify_webhook_key(&headers, None),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn legacy_header_name_is_accepted() {
        let headers = with_named_key(LEGACY_WEBHOOK_KEY_HEADER, "secret");
        assert!(verify_webhook_key(&headers, Some("secret")).is_ok());
    }

    #[test]
    fn same_length_mismatch_is_rejected() {
        let headers = with_key("secret-a");
        assert!(matches!(
            verify_webhook_key(&headers, Some("secret-b")),
            Err(AppError::Unauthorized)
        ));
        assert!(!keys_match("", "secret"));
        assert!(keys_match("secret", "secret"));
    }
}
