/*
 * Responsibility
 * - users テーブル向け SQLx 操作 (identity provider からの同期先)
 * - 更新は固定カラムの型付き patch のみ (動的 SQL は組み立てない)
 * - principal (email) をキーにした本人の行の参照
 * - id / username による公開プロフィール (公開カラムのみ) の参照
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    // JSON text
    pub tags: Option<String>,
    pub ranks: Option<String>,
    pub badges: Option<String>,
}

/// Columns anyone may read about a user.
#[derive(Debug, Clone, FromRow)]
pub struct PublicUserRow {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<String>,
    pub ranks: Option<String>,
    pub badges: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: String,
    pub username: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<String>,
    pub ranks: Option<String>,
    pub badges: Option<String>,
}

/// The columns a sync update may touch. `None` leaves the column as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<String>,
    pub ranks: Option<String>,
    pub badges: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<NewUser> for UserPatch {
    fn from(user: NewUser) -> Self {
        Self {
            username: user.username,
            email: Some(user.email),
            name: user.name,
            image_url: user.image_url,
            tags: user.tags,
            ranks: user.ranks,
            badges: user.badges,
        }
    }
}

pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, email, name, image_url, tags, ranks, badges
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn find_by_id_or_username(
    db: &PgPool,
    key: &str,
) -> Result<Option<PublicUserRow>, RepoError> {
    let row = sqlx::query_as::<_, PublicUserRow>(
        r#"
        SELECT name, image_url, tags, ranks, badges
        FROM users
        WHERE id = $1 OR username = $1
        LIMIT 1
        "#,
    )
    .bind(key)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn insert(db: &PgPool, user: &NewUser) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (id, username, email, name, image_url, tags, ranks, badges)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.image_url)
    .bind(&user.tags)
    .bind(&user.ranks)
    .bind(&user.badges)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn apply_patch(db: &PgPool, id: &str, patch: &UserPatch) -> Result<bool, RepoError> {
    if patch.is_empty() {
        return Ok(false);
    }

    let result = sqlx::query(
        r#"
        UPDATE users
        SET
            username = COALESCE($2, username),
            email = COALESCE($3, email),
            name = COALESCE($4, name),
            image_url = COALESCE($5, image_url),
            tags = COALESCE($6, tags),
            ranks = COALESCE($7, ranks),
            badges = COALESCE($8, badges)
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&patch.username)
    .bind(&patch.email)
    .bind(&patch.name)
    .bind(&patch.image_url)
    .bind(&patch.tags)
    .bind(&patch.ranks)
    .bind(&patch.badges)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(db: &PgPool, id: &str) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
