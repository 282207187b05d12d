/*
 * Responsibility
 * - identity provider (Clerk) のユーザー webhook payload
 * - payload → users 行 (NewUser / UserPatch) への変換
 */
use serde::Deserialize;
use serde_json::Value;

use crate::repos::user_repo::NewUser;

pub const USER_CREATED: &str = "user.created";
pub const USER_UPDATED: &str = "user.updated";
pub const USER_DELETED: &str = "user.deleted";

#[derive(Debug, Deserialize)]
pub struct ClerkWebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct ClerkEmailAddress {
    pub email_address: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClerkPrivateMetadata {
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub ranks: Option<Value>,
    #[serde(default)]
    pub badges: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ClerkUser {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<ClerkEmailAddress>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub private_metadata: Option<ClerkPrivateMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct ClerkDeletedUser {
    pub id: String,
}

fn metadata_json(value: Option<&Value>) -> Option<String> {
    value
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
}

impl ClerkUser {
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// The first listed address is the one stored.
    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .first()
            .map(|e| e.email_address.trim())
            .filter(|e| !e.is_empty())
    }

    pub fn into_new_user(self) -> Result<NewUser, &'static str> {
        let email = self.primary_email().ok_or("user has no email address")?.to_string();
        let name = self.display_name();
        let metadata = self.private_metadata.unwrap_or_default();

        Ok(NewUser {
            id: self.id,
            username: self.username,
            email,
            name,
            image_url: self.image_url,
            tags: metadata_json(metadata.tags.as_ref()),
            ranks: metadata_json(metadata.ranks.as_ref()),
            badges: metadata_json(metadata.badges.as_ref()),
        })
    }
}

#[derive(Debug, serde::Serialize)]
pub struct WebhookResponse {
    pub event: String,
    pub applied: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn created_payload() -> Value {
        json!({
            "id": "user_29w83sxmDNGwOuEthce5gg56FcC",
            "username": null,
            "email_addresses": [{ "email_address": "example@example.org", "id": "idn_1" }],
            "first_name": "Example",
            "last_name": null,
            "image_url": "https://img.clerk.com/xxxxxx",
            "private_metadata": { "tags": ["rust"], "badges": ["FIRST_1000"] }
        })
    }

    #[test]
    fn created_user_maps_to_row() {
        let user: ClerkUser = serde_json::from_value(created_payload()).unwrap();
        let row = user.into_new_user().unwrap();

        assert_eq!(row.id, "user_29w83sxmDNGwOuEthce5gg56FcC");
        assert_eq!(row.email, "example@example.org");
        assert_eq!(row.name.as_deref(), Some("Example"));
        assert_eq!(row.tags.as_deref(), Some(r#"["rust"]"#));
        assert_eq!(row.badges.as_deref(), Some(r#"["FIRST_1000"]"#));
        assert!(row.ranks.is_none());
        assert!(row.username.is_none());
    }

    #[test]
    fn full_name_joins_both_parts() {
        let mut payload = created_payload();
        payload["last_name"] = json!("Person");
        let user: ClerkUser = serde_json::from_value(payload).unwrap();
        assert_eq!(user.display_name().as_deref(), Some("Example Person"));
    }

    #[test]
    fn user_without_email_is_rejected() {
        let mut payload = created_payload();
        payload["email_addresses"] = json!([]);
        let user: ClerkUser = serde_json::from_value(payload).unwrap();
        assert!(user.into_new_user().is_err());
    }

    #[test]
    fn envelope_keeps_unknown_types() {
        let event: ClerkWebhookEvent =
            serde_json::from_value(json!({ "type": "session.created", "object": "event" })).unwrap();
        assert_eq!(event.event_type, "session.created");
        assert!(event.data.is_null());
    }
}
