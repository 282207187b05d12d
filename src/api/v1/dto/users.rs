/*
 * Responsibility
 * - Users の response DTO
 * - JSON テキストで保存している列はここで Value に戻す
 */
use serde::Serialize;
use serde_json::Value;

use crate::repos::user_repo::{PublicUserRow, UserRow};
use crate::services::auth::Principal;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: Option<String>,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<Value>,
    pub ranks: Option<Value>,
    pub badges: Option<Value>,
}

// Malformed stored JSON is surfaced as null rather than failing the request.
fn parse_json(text: Option<String>) -> Option<Value> {
    text.and_then(|t| serde_json::from_str(&t).ok())
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            name: row.name,
            image_url: row.image_url,
            tags: parse_json(row.tags),
            ranks: parse_json(row.ranks),
            badges: parse_json(row.badges),
        }
    }
}

/// Public profile; never carries id, username or email.
#[derive(Debug, Serialize)]
pub struct PublicUserResponse {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<Value>,
    pub ranks: Option<Value>,
    pub badges: Option<Value>,
}

impl From<PublicUserRow> for PublicUserResponse {
    fn from(row: PublicUserRow) -> Self {
        Self {
            name: row.name,
            image_url: row.image_url,
            tags: parse_json(row.tags),
            ranks: parse_json(row.ranks),
            badges: parse_json(row.badges),
        }
    }
}

/// Who the middleware resolved this request to.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub principal_id: String,
    pub principal: Principal,
}

impl From<Principal> for SessionResponse {
    fn from(principal: Principal) -> Self {
        Self {
            principal_id: principal.id.clone(),
            principal,
        }
    }
}
