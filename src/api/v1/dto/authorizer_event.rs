/*
 * Responsibility
 * - gateway の authorizer イベント (TOKEN / REQUEST 型) の受け口
 * - ヘッダ map を HeaderMap (大文字小文字を区別しない) に変換する
 */
use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerEvent {
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub method_arn: Option<String>,
    // HTTP APIs send routeArn instead of methodArn
    #[serde(default)]
    pub route_arn: Option<String>,
    #[serde(default)]
    pub authorization_token: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

impl AuthorizerEvent {
    pub fn resource(&self) -> &str {
        self.method_arn
            .as_deref()
            .or(self.route_arn.as_deref())
            .unwrap_or_default()
    }

    /// Header names that are not valid HTTP tokens are dropped.
    pub fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in self.headers.iter().flatten() {
            let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) else {
                continue;
            };
            map.append(name, value);
        }
        map
    }
}
